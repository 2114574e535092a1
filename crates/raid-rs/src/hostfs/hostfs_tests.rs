use super::*;

#[test]
fn mem_hostfs_write_then_read_round_trips() {
    let fs = MemHostFs::new();
    let path = Path::new("/disks/disk0/000042.chunk");
    fs.write(path, b"hello").unwrap();
    assert!(fs.file_exists(path));
    assert_eq!(fs.read(path).unwrap(), b"hello");
}

#[test]
fn mem_hostfs_missing_file_errors() {
    let fs = MemHostFs::new();
    assert!(fs.read(Path::new("/nope")).is_err());
}

#[test]
fn mem_hostfs_remove_dir_all_drops_nested_files() {
    let fs = MemHostFs::new();
    fs.write(Path::new("/disks/disk0/a.chunk"), b"1").unwrap();
    fs.write(Path::new("/disks/disk0/b.chunk"), b"2").unwrap();
    fs.write(Path::new("/disks/disk1/a.chunk"), b"3").unwrap();

    fs.remove_dir_all(Path::new("/disks/disk0")).unwrap();

    assert!(!fs.file_exists(Path::new("/disks/disk0/a.chunk")));
    assert!(!fs.file_exists(Path::new("/disks/disk0/b.chunk")));
    assert!(fs.file_exists(Path::new("/disks/disk1/a.chunk")));
}

#[test]
fn std_hostfs_round_trips_through_a_real_tempdir() {
    let dir = tempfile::tempdir().unwrap();
    let fs = StdHostFs;
    let path = dir.path().join("disk0").join("000001.chunk");

    fs.write(&path, b"stripe-bytes").unwrap();
    assert!(fs.file_exists(&path));
    assert_eq!(fs.read(&path).unwrap(), b"stripe-bytes");

    fs.remove_file(&path).unwrap();
    assert!(!fs.file_exists(&path));
}

#[test]
fn std_hostfs_remove_dir_all_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let fs = StdHostFs;
    let missing = dir.path().join("never-created");
    assert!(fs.remove_dir_all(&missing).is_ok());
}
