//! A single simulated disk: a host directory holding one file per stripe
//! chunk written to it.

#[cfg(test)]
mod disk_tests;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{RaidError, RaidResult};
use crate::hostfs::HostFs;

/// Health of one disk as seen by the array.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DiskStatus {
    /// Present and trustworthy.
    Ok,
    /// Hot-removed; its directory has been torn down.
    Failed,
    /// Present, but freshly replaced and not yet reconstructed.
    NeedsRebuild,
}

/// One simulated disk: a directory under the array's root, addressed by
/// disk index, holding one chunk file per stripe written to it.
pub struct Disk {
    index: usize,
    root: PathBuf,
    fs: Arc<dyn HostFs>,
    failed: bool,
    /// The directory exists but its contents should not be trusted (a
    /// freshly replaced disk, before reconstruction writes it back).
    pub needs_rebuild: bool,
}

impl Disk {
    /// Creates disk `index` rooted at `root`, creating the directory if
    /// it does not already exist.
    ///
    /// # Errors
    /// Returns [`RaidError::Io`] if the directory cannot be created.
    pub fn create(index: usize, root: PathBuf, fs: Arc<dyn HostFs>) -> RaidResult<Self> {
        fs.create_dir_all(&root)?;
        Ok(Self {
            index,
            root,
            fs,
            failed: false,
            needs_rebuild: false,
        })
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn chunk_path(&self, stripe_index: u64) -> PathBuf {
        self.root.join(format!("{stripe_index:012}.chunk"))
    }

    /// Writes `data` as the chunk for `stripe_index`. A no-op (still
    /// reports success) when this disk is currently failed.
    ///
    /// # Errors
    /// Returns [`RaidError::Io`] on a host filesystem failure.
    pub fn write_chunk(&self, stripe_index: u64, data: &[u8]) -> RaidResult<()> {
        if self.failed {
            return Ok(());
        }
        self.fs.write(&self.chunk_path(stripe_index), data)?;
        Ok(())
    }

    /// Reads the chunk for `stripe_index`.
    ///
    /// # Errors
    /// Returns [`RaidError::UnrecoverableCorruption`] if the disk is
    /// failed or the chunk is missing, or [`RaidError::Io`] on any other
    /// host filesystem failure.
    pub fn read_chunk(&self, stripe_index: u64) -> RaidResult<Vec<u8>> {
        if self.failed {
            return Err(RaidError::UnrecoverableCorruption(format!(
                "disk {} is failed",
                self.index
            )));
        }
        let path = self.chunk_path(stripe_index);
        if !self.fs.file_exists(&path) {
            return Err(RaidError::UnrecoverableCorruption(format!(
                "disk {} has no chunk for stripe {stripe_index}",
                self.index
            )));
        }
        Ok(self.fs.read(&path)?)
    }

    /// Marks this disk as hot-removed: tears down its directory and
    /// refuses further reads/writes until [`Disk::replace`] is called.
    ///
    /// # Errors
    /// Returns [`RaidError::Io`] if the directory cannot be removed.
    pub fn fail(&mut self) -> RaidResult<()> {
        self.fs.remove_dir_all(&self.root)?;
        self.failed = true;
        Ok(())
    }

    /// Hot-swaps in a fresh, empty directory for this disk slot. The
    /// disk is marked [`DiskStatus::NeedsRebuild`] until the engine
    /// reconstructs and rewrites every stripe it should hold.
    ///
    /// # Errors
    /// Returns [`RaidError::Io`] if the directory cannot be recreated.
    pub fn replace(&mut self) -> RaidResult<()> {
        self.fs.create_dir_all(&self.root)?;
        self.failed = false;
        self.needs_rebuild = true;
        Ok(())
    }

    #[must_use]
    pub const fn is_missing(&self) -> bool {
        self.failed
    }

    #[must_use]
    pub const fn is_operational(&self) -> bool {
        !self.failed
    }

    #[must_use]
    pub fn status(&self) -> DiskStatus {
        if self.failed {
            DiskStatus::Failed
        } else if self.needs_rebuild {
            DiskStatus::NeedsRebuild
        } else {
            DiskStatus::Ok
        }
    }

    /// Clears the rebuild flag once the engine has finished repopulating
    /// every stripe this disk should hold.
    pub fn mark_rebuilt(&mut self) {
        self.needs_rebuild = false;
    }
}
