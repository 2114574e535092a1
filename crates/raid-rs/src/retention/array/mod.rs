//! `DiskArray`: the fixed-width collection of simulated disks an engine
//! stripes across.

#[cfg(test)]
mod array_tests;

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{RaidError, RaidResult};
use crate::hostfs::HostFs;
use crate::retention::disk::{Disk, DiskStatus};

/// `DiskArray` owns every disk directory an [`crate::engine::Engine`]
/// stripes across. Disk count is decided at construction (`N >= 4`, the
/// engine validates this), not fixed at compile time: a simulator needs
/// to be able to stand up arrays of different widths in the same binary.
pub struct DiskArray {
    disks: Vec<Disk>,
}

impl DiskArray {
    /// Creates an array of `n` disks as sibling directories `disk0..diskN`
    /// under `root`.
    ///
    /// # Errors
    /// Returns [`RaidError::InvalidArgument`] if `n < 4`, or
    /// [`RaidError::Io`] if a disk directory cannot be created.
    pub fn init(root: &std::path::Path, n: usize, fs: Arc<dyn HostFs>) -> RaidResult<Self> {
        if n < 4 {
            return Err(RaidError::InvalidArgument(format!(
                "RAID-6 requires at least 4 disks, got {n}"
            )));
        }
        let mut disks = Vec::with_capacity(n);
        for i in 0..n {
            let disk_root: PathBuf = root.join(format!("disk{i}"));
            disks.push(Disk::create(i, disk_root, fs.clone())?);
        }
        Ok(Self { disks })
    }

    #[must_use]
    pub fn disk_count(&self) -> usize {
        self.disks.len()
    }

    /// Writes `data` as the chunk at `stripe_index` on disk `phys`.
    ///
    /// # Errors
    /// Returns [`RaidError::InvalidArgument`] if `phys` is out of range,
    /// or bubbles up an [`RaidError::Io`] from the host filesystem.
    pub fn write_chunk(&self, phys: usize, stripe_index: u64, data: &[u8]) -> RaidResult<()> {
        self.disk(phys)?.write_chunk(stripe_index, data)
    }

    /// Reads the chunk at `stripe_index` on disk `phys`.
    ///
    /// # Errors
    /// Returns [`RaidError::InvalidArgument`] if `phys` is out of range,
    /// or [`RaidError::UnrecoverableCorruption`]/[`RaidError::Io`] from
    /// the underlying disk.
    pub fn read_chunk(&self, phys: usize, stripe_index: u64) -> RaidResult<Vec<u8>> {
        self.disk(phys)?.read_chunk(stripe_index)
    }

    fn disk(&self, phys: usize) -> RaidResult<&Disk> {
        self.disks
            .get(phys)
            .ok_or_else(|| RaidError::InvalidArgument(format!("disk index out of range: {phys}")))
    }

    /// Hot-removes disk `phys`.
    ///
    /// # Errors
    /// Returns [`RaidError::InvalidArgument`] if `phys` is out of range.
    pub fn fail_disk(&mut self, phys: usize) -> RaidResult<()> {
        let n = self.disks.len();
        self.disks
            .get_mut(phys)
            .ok_or_else(|| RaidError::InvalidArgument(format!("disk index out of range: {phys} (n={n})")))?
            .fail()
    }

    /// Hot-swaps disk `phys` with a fresh, empty directory.
    ///
    /// # Errors
    /// Returns [`RaidError::InvalidArgument`] if `phys` is out of range.
    pub fn replace_disk(&mut self, phys: usize) -> RaidResult<()> {
        let n = self.disks.len();
        self.disks
            .get_mut(phys)
            .ok_or_else(|| RaidError::InvalidArgument(format!("disk index out of range: {phys} (n={n})")))?
            .replace()
    }

    pub fn mark_rebuilt(&mut self, phys: usize) {
        if let Some(disk) = self.disks.get_mut(phys) {
            disk.mark_rebuilt();
        }
    }

    #[must_use]
    pub fn status(&self, phys: usize) -> Option<DiskStatus> {
        self.disks.get(phys).map(Disk::status)
    }

    #[must_use]
    pub fn statuses(&self) -> Vec<DiskStatus> {
        self.disks.iter().map(Disk::status).collect()
    }

    #[must_use]
    pub fn failed_disk_count(&self) -> usize {
        self.disks.iter().filter(|d| d.is_missing()).count()
    }

    #[must_use]
    pub fn status_string(&self) -> String {
        let mut out = String::new();
        for disk in &self.disks {
            let state = match disk.status() {
                DiskStatus::Ok => "OK",
                DiskStatus::Failed => "FAILED",
                DiskStatus::NeedsRebuild => "NEEDS_REBUILD",
            };
            out.push_str(&format!(
                "disk {}: {state} (path={})\n",
                disk.index(),
                disk.root().display()
            ));
        }
        out
    }
}
