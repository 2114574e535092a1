//! `HostFs`: the narrow seam between the engine and whatever filesystem
//! backs each simulated disk directory. Kept thin on purpose so tests can
//! swap in an in-memory fake instead of touching the real filesystem.

#[cfg(test)]
mod hostfs_tests;

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Operations the engine needs from a filesystem, one simulated disk
/// directory at a time.
pub trait HostFs: std::fmt::Debug {
    /// Creates `path` and any missing parent directories. Idempotent.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Removes `path` and everything under it. Idempotent if `path` is
    /// already absent.
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// `true` if `path` names an existing directory.
    fn dir_exists(&self, path: &Path) -> bool;

    /// Reads the entire contents of `path`.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Writes `contents` to `path`, truncating or creating as needed.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// `true` if `path` names an existing file.
    fn file_exists(&self, path: &Path) -> bool;

    /// Removes a single file. Idempotent if `path` is already absent.
    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// `StdHostFs` backs [`HostFs`] with `std::fs`: every simulated disk is a
/// real directory on the host, every stripe chunk a real file within it.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdHostFs;

impl HostFs for StdHostFs {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        match fs::remove_dir_all(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn dir_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let mut file = fs::File::open(path)?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        Ok(buf)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(path)?;
        file.write_all(contents)
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// `MemHostFs` is an in-memory [`HostFs`] fake for unit tests that want
/// to exercise engine logic without touching the real filesystem.
#[derive(Debug, Default)]
pub struct MemHostFs {
    files: std::sync::Mutex<std::collections::HashMap<PathBuf, Vec<u8>>>,
    dirs: std::sync::Mutex<std::collections::HashSet<PathBuf>>,
}

impl MemHostFs {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HostFs for MemHostFs {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.dirs.lock().unwrap().insert(path.to_path_buf());
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        self.dirs.lock().unwrap().retain(|d| !d.starts_with(path));
        self.files.lock().unwrap().retain(|f, _| !f.starts_with(path));
        Ok(())
    }

    fn dir_exists(&self, path: &Path) -> bool {
        self.dirs.lock().unwrap().contains(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{}", path.display())))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            self.dirs.lock().unwrap().insert(parent.to_path_buf());
        }
        self.files.lock().unwrap().insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }

    fn file_exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.files.lock().unwrap().remove(path);
        Ok(())
    }
}
