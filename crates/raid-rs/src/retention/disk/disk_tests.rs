use super::*;
use crate::hostfs::MemHostFs;

fn disk(index: usize) -> Disk {
    let fs: Arc<dyn HostFs> = Arc::new(MemHostFs::new());
    Disk::create(index, PathBuf::from(format!("/disks/disk{index}")), fs).unwrap()
}

#[test]
fn write_then_read_round_trips_a_chunk() {
    let d = disk(0);
    d.write_chunk(7, b"stripe-payload").unwrap();
    assert_eq!(d.read_chunk(7).unwrap(), b"stripe-payload");
}

#[test]
fn reading_an_unwritten_stripe_is_unrecoverable_corruption() {
    let d = disk(0);
    assert!(matches!(
        d.read_chunk(3),
        Err(RaidError::UnrecoverableCorruption(_))
    ));
}

#[test]
fn fail_then_read_reports_unrecoverable_corruption() {
    let mut d = disk(0);
    d.write_chunk(1, b"x").unwrap();
    d.fail().unwrap();
    assert!(d.is_missing());
    assert_eq!(d.status(), DiskStatus::Failed);
    assert!(matches!(
        d.read_chunk(1),
        Err(RaidError::UnrecoverableCorruption(_))
    ));
}

#[test]
fn write_while_failed_is_a_silent_no_op() {
    let mut d = disk(0);
    d.fail().unwrap();
    assert!(d.write_chunk(1, b"ignored").is_ok());
}

#[test]
fn replace_clears_failed_and_sets_needs_rebuild() {
    let mut d = disk(0);
    d.fail().unwrap();
    d.replace().unwrap();
    assert!(d.is_operational());
    assert_eq!(d.status(), DiskStatus::NeedsRebuild);

    d.mark_rebuilt();
    assert_eq!(d.status(), DiskStatus::Ok);
}
