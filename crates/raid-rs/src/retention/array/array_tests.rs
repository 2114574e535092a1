use super::*;
use crate::hostfs::MemHostFs;

fn array(n: usize) -> DiskArray {
    let fs: Arc<dyn HostFs> = Arc::new(MemHostFs::new());
    DiskArray::init(std::path::Path::new("/array"), n, fs).unwrap()
}

#[test]
fn rejects_fewer_than_four_disks() {
    let fs: Arc<dyn HostFs> = Arc::new(MemHostFs::new());
    assert!(matches!(
        DiskArray::init(std::path::Path::new("/array"), 3, fs),
        Err(RaidError::InvalidArgument(_))
    ));
}

#[test]
fn write_then_read_round_trips_through_the_right_disk() {
    let a = array(8);
    a.write_chunk(3, 10, b"payload-for-disk-3").unwrap();
    assert_eq!(a.read_chunk(3, 10).unwrap(), b"payload-for-disk-3");
}

#[test]
fn out_of_range_disk_index_is_rejected() {
    let a = array(8);
    assert!(matches!(
        a.write_chunk(8, 0, b"x"),
        Err(RaidError::InvalidArgument(_))
    ));
}

#[test]
fn fail_and_replace_round_trip_through_statuses() {
    let mut a = array(8);
    assert_eq!(a.status(2), Some(DiskStatus::Ok));

    a.fail_disk(2).unwrap();
    assert_eq!(a.status(2), Some(DiskStatus::Failed));
    assert_eq!(a.failed_disk_count(), 1);

    a.replace_disk(2).unwrap();
    assert_eq!(a.status(2), Some(DiskStatus::NeedsRebuild));
    assert_eq!(a.failed_disk_count(), 0);

    a.mark_rebuilt(2);
    assert_eq!(a.status(2), Some(DiskStatus::Ok));
}

#[test]
fn status_string_lists_every_disk() {
    let a = array(5);
    let s = a.status_string();
    for i in 0..5 {
        assert!(s.contains(&format!("disk {i}:")));
    }
}
