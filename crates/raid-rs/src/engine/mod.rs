//! The stripe engine: named files, rotated P+Q placement, and recovery.

mod layout;
mod recover;
mod seal;
pub mod types;


use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::error::{RaidError, RaidResult};
use crate::gf::{conway, GField};
use crate::hostfs::HostFs;
use crate::metrics::{self, DiskOp, IoOpType, RaidOp};
use crate::retention::array::DiskArray;
use crate::retention::disk::DiskStatus;

pub use types::{Extent, WriteCursor};

/// `Engine` owns one RAID-6 array: its disks, its rotating parity
/// layout, and the file/free-list/utilization bookkeeping needed to
/// serve named reads and writes on top of it.
pub struct Engine {
    n: usize,
    chunk_size: usize,
    m: u32,
    entry_width: usize,
    gf: GField,
    array: DiskArray,
    files: HashMap<String, Vec<Extent>>,
    free_list: VecDeque<Extent>,
    utilization: HashMap<u64, Vec<usize>>,
    cursor: WriteCursor,
    /// When set, a missing chunk encountered during a read triggers an
    /// immediate reconstruct-and-retry instead of surfacing an error.
    pub verify_on_read: bool,
}

impl Engine {
    /// Creates a new array of `n` disks under `root`, each
    /// `chunk_size`-byte stripe wide. The root directory is erased and
    /// recreated; callers that want to reopen an existing on-disk array
    /// must replay its writes themselves (see the design notes on
    /// metadata persistence).
    ///
    /// # Errors
    /// Returns [`RaidError::InvalidArgument`] if `n` is outside
    /// `[4, 40] ∪ {64, 97, 100}` or `chunk_size == 0`; otherwise
    /// propagates [`RaidError::Io`] from the host filesystem.
    #[instrument(skip(fs), fields(n, chunk_size))]
    pub fn new(n: usize, chunk_size: usize, root: impl AsRef<Path>, fs: Arc<dyn HostFs>) -> RaidResult<Self> {
        if n < 4 || conway::exponents(n as u32).is_none() {
            return Err(RaidError::InvalidArgument(format!(
                "disk count {n} is outside the supported domain [4,40] u {{64,97,100}}"
            )));
        }
        if chunk_size == 0 {
            return Err(RaidError::InvalidArgument("chunk_size must be >= 1".into()));
        }

        let root = root.as_ref().to_path_buf();
        fs.remove_dir_all(&root)?;
        let array = DiskArray::init(&root, n, fs)?;
        let gf = GField::new(n as u32)?;

        info!(n, chunk_size, "initialized raid-6 array");

        Ok(Self {
            n,
            chunk_size,
            m: n as u32,
            entry_width: layout::chunk_entry_width(n),
            gf,
            array,
            files: HashMap::new(),
            free_list: VecDeque::new(),
            utilization: HashMap::new(),
            cursor: WriteCursor::default(),
            verify_on_read: true,
        })
    }

    #[must_use]
    pub const fn disk_count(&self) -> usize {
        self.n
    }

    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    #[must_use]
    pub const fn cursor(&self) -> WriteCursor {
        self.cursor
    }

    #[must_use]
    pub fn list_files(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.keys().cloned().collect();
        names.sort();
        names
    }

    #[must_use]
    pub fn disk_statuses(&self) -> Vec<DiskStatus> {
        self.array.statuses()
    }

    #[must_use]
    pub fn failed_disk_count(&self) -> usize {
        self.array.failed_disk_count()
    }

    /// Writes `payload` under `name`, appending a new extent list (or
    /// reusing freed extents) and returning once every touched stripe
    /// has been sealed.
    ///
    /// # Errors
    /// Propagates any [`RaidError`] raised while persisting chunks.
    #[instrument(skip(self, payload), fields(name, len = payload.len()))]
    pub fn write(&mut self, name: &str, payload: &[u8]) -> RaidResult<()> {
        if payload.is_empty() {
            return Err(RaidError::InvalidArgument("payload must be non-empty".into()));
        }
        let extents = self.take_target_extents(payload.len());
        self.write_into_extents(name, payload, &extents, 0)?;
        metrics::record_raid_op(RaidOp {
            op: IoOpType::Write,
            bytes: payload.len() as u64,
            latency_seconds: 0.0,
            error: false,
        });
        Ok(())
    }

    /// Reads the file at `src_path` and writes its contents under `name`.
    ///
    /// # Errors
    /// Returns [`RaidError::Io`] if `src_path` cannot be read, or any
    /// error [`Engine::write`] would raise.
    pub fn write_from_file(&mut self, src_path: &Path, name: &str, fs: &dyn HostFs) -> RaidResult<()> {
        let bytes = fs.read(src_path)?;
        self.write(name, &bytes)
    }

    /// Reads back the full contents of `name`.
    ///
    /// # Errors
    /// Returns [`RaidError::NotFound`] if `name` is unknown, or any
    /// error raised while reading/reconstructing a stripe.
    #[instrument(skip(self), fields(name))]
    pub fn read(&mut self, name: &str) -> RaidResult<Vec<u8>> {
        let extents = self
            .files
            .get(name)
            .cloned()
            .ok_or_else(|| RaidError::NotFound(name.to_string()))?;

        let mut out = Vec::new();
        for extent in &extents {
            self.read_extent_into(extent, &mut out)?;
        }
        metrics::record_raid_op(RaidOp {
            op: IoOpType::Read,
            bytes: out.len() as u64,
            latency_seconds: 0.0,
            error: false,
        });
        Ok(out)
    }

    /// Reads `name` and writes its bytes to `dst_path`.
    ///
    /// # Errors
    /// Propagates [`Engine::read`] errors, or [`RaidError::Io`] if
    /// `dst_path` cannot be written.
    pub fn read_to_file(&mut self, name: &str, dst_path: &Path, fs: &dyn HostFs) -> RaidResult<()> {
        let bytes = self.read(name)?;
        fs.write(dst_path, &bytes)?;
        Ok(())
    }

    /// Removes `name` from the file table, releasing its extents to the
    /// free list. No on-disk bytes are cleared.
    ///
    /// # Errors
    /// Returns [`RaidError::NotFound`] if `name` is unknown.
    pub fn delete(&mut self, name: &str) -> RaidResult<()> {
        let extents = self
            .files
            .remove(name)
            .ok_or_else(|| RaidError::NotFound(name.to_string()))?;
        for extent in extents {
            self.free_list.push_back(extent);
        }
        Ok(())
    }

    /// Rewrites `name`'s contents from `src_path`. Reuses `name`'s
    /// existing extents where they still fit, releases any now-unneeded
    /// tail extents to the free list, and appends a new extent at the
    /// frontier for any shortfall.
    ///
    /// # Errors
    /// Returns [`RaidError::NotFound`] if `name` is unknown, or any
    /// error raised while persisting chunks.
    pub fn update_from_file(&mut self, name: &str, src_path: &Path, fs: &dyn HostFs) -> RaidResult<()> {
        let payload = fs.read(src_path)?;
        self.update(name, &payload)
    }

    /// Rewrites `name`'s contents with `payload` in place, per the
    /// reuse/release/append contract described on [`Engine::update_from_file`].
    ///
    /// # Errors
    /// Returns [`RaidError::NotFound`] if `name` is unknown.
    pub fn update(&mut self, name: &str, payload: &[u8]) -> RaidResult<()> {
        let existing = self
            .files
            .get(name)
            .cloned()
            .ok_or_else(|| RaidError::NotFound(name.to_string()))?;

        let mut reused = Vec::new();
        let mut remaining = payload.len();
        for extent in existing {
            if remaining == 0 {
                self.free_list.push_back(extent);
                continue;
            }
            if extent.length <= remaining {
                remaining -= extent.length;
                reused.push(extent);
            } else {
                let (release_stripe, release_column, release_offset) =
                    self.advance_position(extent.stripe_index, extent.logical_disk, extent.offset, remaining);
                let keep = Extent {
                    length: remaining,
                    ..extent
                };
                let release = Extent {
                    stripe_index: release_stripe,
                    logical_disk: release_column,
                    offset: release_offset,
                    length: extent.length - remaining,
                };
                reused.push(keep);
                self.free_list.push_back(release);
                remaining = 0;
            }
        }

        self.files.remove(name);
        if remaining > 0 {
            let fresh = self.take_target_extents(remaining);
            self.write_into_extents(name, payload, &reused, 0)?;
            let reused_len: usize = reused.iter().map(|e| e.length).sum();
            self.write_into_extents(name, payload, &fresh, reused_len)?;
        } else {
            self.write_into_extents(name, payload, &reused, 0)?;
        }
        Ok(())
    }

    /// Reconstructs one or two lost disks (`lost_disks`) across every
    /// stripe up to the append frontier.
    ///
    /// # Errors
    /// Returns [`RaidError::InvalidArgument`] if `lost_disks` is empty
    /// or has more than two entries, and [`RaidError::UnrecoverableCorruption`]
    /// if reconstruction fails a post-repair parity check.
    pub fn recover(&mut self, lost_disks: &[usize]) -> RaidResult<()> {
        recover::recovering_disks(self, lost_disks)
    }

    /// Simulates a hot disk failure by tearing down `disk`'s directory.
    /// Reads against it fail until [`Engine::recover`] replaces it.
    ///
    /// # Errors
    /// Returns [`RaidError::InvalidArgument`] if `disk` is out of range.
    pub fn fail_disk(&mut self, disk: usize) -> RaidResult<()> {
        self.array.fail_disk(disk)
    }

    /// Verifies a sealed stripe's P and Q against a fresh recomputation,
    /// rewriting both if they disagree. Returns `true` if a mismatch was
    /// found and repaired.
    ///
    /// # Errors
    /// Returns [`RaidError::OutOfRange`] if `stripe` is at or beyond the
    /// write frontier (it has never been sealed), or propagates any other
    /// [`RaidError`] raised while reading or rewriting it.
    pub fn scrub_stripe(&mut self, stripe: u64) -> RaidResult<bool> {
        match self.max_sealed_stripe() {
            Some(max) if stripe <= max => seal::scrub(self, stripe),
            _ => Err(RaidError::OutOfRange(stripe)),
        }
    }

    fn max_sealed_stripe(&self) -> Option<u64> {
        if self.cursor.current_stripe == 0 && self.cursor.current_column == 0 {
            return None;
        }
        Some(if self.cursor.current_column > 0 {
            self.cursor.current_stripe
        } else {
            self.cursor.current_stripe - 1
        })
    }

    /// Walks `n` bytes forward from `(stripe, column, offset)` through the
    /// rotation, wrapping columns at `n - 2` per stripe, and returns the
    /// resulting position. `offset` is always an intra-chunk byte offset,
    /// never a cumulative count, so this is the only correct way to find
    /// where a run of `n` consumed bytes leaves off.
    fn advance_position(&self, mut stripe: u64, mut column: usize, mut offset: usize, mut n: usize) -> (u64, usize, usize) {
        while n > 0 {
            let avail = self.chunk_size - offset;
            let step = avail.min(n);
            n -= step;
            offset += step;
            if offset == self.chunk_size {
                offset = 0;
                column += 1;
                if column == self.n - 2 {
                    column = 0;
                    stripe += 1;
                }
            }
        }
        (stripe, column, offset)
    }

    fn take_target_extents(&mut self, payload_len: usize) -> Vec<Extent> {
        let mut extents = Vec::new();
        let mut remaining = payload_len;

        while remaining > 0 {
            let Some(free) = self.free_list.pop_front() else {
                break;
            };
            let take = free.length.min(remaining);
            extents.push(Extent {
                stripe_index: free.stripe_index,
                logical_disk: free.logical_disk,
                offset: free.offset,
                length: take,
            });
            if take < free.length {
                let (res_stripe, res_column, res_offset) =
                    self.advance_position(free.stripe_index, free.logical_disk, free.offset, take);
                self.free_list.push_front(Extent {
                    stripe_index: res_stripe,
                    logical_disk: res_column,
                    offset: res_offset,
                    length: free.length - take,
                });
            }
            remaining -= take;
        }

        if remaining > 0 {
            extents.push(Extent {
                stripe_index: self.cursor.current_stripe,
                logical_disk: self.cursor.current_column,
                offset: 0,
                length: remaining,
            });
        }
        extents
    }

    fn write_into_extents(&mut self, name: &str, payload: &[u8], extents: &[Extent], file_offset: usize) -> RaidResult<()> {
        let mut src_pos = file_offset;
        let mut persisted = Vec::with_capacity(extents.len());

        for extent in extents {
            let was_frontier = extent.stripe_index > self.cursor.current_stripe
                || (extent.stripe_index == self.cursor.current_stripe && extent.logical_disk >= self.cursor.current_column);

            let mut stripe = extent.stripe_index;
            let mut column = extent.logical_disk;
            let mut intra_offset = extent.offset;
            let mut remaining = extent.length;
            let bytes_written_start = src_pos;

            while remaining > 0 {
                let mut buf = if intra_offset > 0 {
                    self.read_data_column(stripe, column)?
                } else {
                    vec![0u64; self.chunk_size]
                };
                let writable = (self.chunk_size - intra_offset).min(remaining);
                for (slot, byte) in buf[intra_offset..intra_offset + writable]
                    .iter_mut()
                    .zip(&payload[src_pos..src_pos + writable])
                {
                    *slot = *byte as u64;
                }
                let utilized = intra_offset + writable;
                self.write_data_column(stripe, column, &buf, utilized)?;

                src_pos += writable;
                remaining -= writable;
                intra_offset = 0;
                column += 1;
                if column == self.n - 2 {
                    seal::seal(self, stripe)?;
                    stripe += 1;
                    column = 0;
                }
            }

            if column > 0 {
                // A partially filled stripe still needs fresh parity.
                seal::seal(self, stripe)?;
            }

            if was_frontier {
                self.cursor = WriteCursor {
                    current_stripe: stripe,
                    current_column: column,
                };
            }

            persisted.push(Extent {
                stripe_index: extent.stripe_index,
                logical_disk: extent.logical_disk,
                offset: 0,
                length: src_pos - bytes_written_start,
            });
        }

        self.files.entry(name.to_string()).or_default().extend(persisted);
        Ok(())
    }

    fn read_extent_into(&mut self, extent: &Extent, out: &mut Vec<u8>) -> RaidResult<()> {
        let mut stripe = extent.stripe_index;
        let mut column = extent.logical_disk;
        let mut remaining = extent.length;
        let mut intra_offset = extent.offset;

        while remaining > 0 {
            let (data_cols, _) = self.read_stripe(stripe, &[], false, self.verify_on_read)?;
            let column_entries = &data_cols[column];
            let utilization = self.utilization_of(stripe, self.phys(stripe, column));
            let available = utilization.saturating_sub(intra_offset);
            let take = available.min(remaining);
            out.extend(column_entries[intra_offset..intra_offset + take].iter().map(|&entry| entry as u8));

            remaining -= take;
            intra_offset = 0;
            column += 1;
            if column == self.n - 2 {
                stripe += 1;
                column = 0;
            }
        }
        Ok(())
    }

    fn phys(&self, s: u64, c: usize) -> usize {
        layout::phys(self.n, s, c)
    }

    fn utilization_of(&self, stripe: u64, phys_disk: usize) -> usize {
        self.utilization
            .get(&stripe)
            .map(|u| u[phys_disk])
            .unwrap_or(self.chunk_size)
    }

    fn set_utilization(&mut self, stripe: u64, phys_disk: usize, value: usize) {
        let n = self.n;
        let row = self.utilization.entry(stripe).or_insert_with(|| vec![0; n]);
        row[phys_disk] = value;
    }

    fn encode_chunk(&self, logical: &[u64]) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.chunk_size * self.entry_width);
        for i in 0..self.chunk_size {
            let entry = logical.get(i).copied().unwrap_or(0);
            out.extend(layout::encode_entry(entry, self.m, self.entry_width));
        }
        out
    }

    fn decode_chunk(&self, raw: &[u8]) -> Vec<u64> {
        (0..self.chunk_size)
            .map(|i| {
                let start = i * self.entry_width;
                layout::decode_entry(&raw[start..start + self.entry_width], self.m, self.entry_width)
            })
            .collect()
    }

    fn write_data_column(&mut self, stripe: u64, column: usize, logical: &[u64], utilized: usize) -> RaidResult<()> {
        let phys_disk = self.phys(stripe, column);
        self.persist_physical_chunk(phys_disk, stripe, logical, utilized)
    }

    pub(crate) fn persist_physical_chunk(&mut self, phys_disk: usize, stripe: u64, logical: &[u64], utilized: usize) -> RaidResult<()> {
        let encoded = self.encode_chunk(logical);
        self.array.write_chunk(phys_disk, stripe, &encoded)?;
        self.set_utilization(stripe, phys_disk, utilized);
        metrics::record_disk_op(DiskOp {
            disk_id: format!("disk{phys_disk}"),
            op: IoOpType::Write,
            bytes: encoded.len() as u64,
            latency_seconds: 0.0,
            error: false,
        });
        Ok(())
    }

    fn read_data_column(&mut self, stripe: u64, column: usize) -> RaidResult<Vec<u64>> {
        let phys_disk = self.phys(stripe, column);
        let raw = self.array.read_chunk(phys_disk, stripe)?;
        Ok(self.decode_chunk(&raw))
    }

    /// Reads every chunk of `stripe`, skipping `exclude`d physical
    /// disks, returning `(data_columns, (p, q))`. `p`/`q` are empty when
    /// their physical slot was skipped or unreadable. Triggers a single
    /// reconstruct-and-retry when `self_heal` is set and `exclude` was
    /// empty and `recovering_already` is false.
    pub(crate) fn read_stripe(
        &mut self,
        stripe: u64,
        exclude: &[usize],
        recovering_already: bool,
        self_heal: bool,
    ) -> RaidResult<(Vec<Vec<u64>>, (Vec<u64>, Vec<u64>))> {
        let d = self.n - 2;
        let mut data_cols: Vec<Vec<u64>> = vec![Vec::new(); d];
        let mut p = Vec::new();
        let mut q = Vec::new();
        let mut failed = Vec::new();

        for phys_disk in 0..self.n {
            if exclude.contains(&phys_disk) {
                continue;
            }
            match self.array.read_chunk(phys_disk, stripe) {
                Ok(raw) => {
                    let decoded = self.decode_chunk(&raw);
                    if layout::is_p(self.n, stripe, phys_disk) {
                        p = decoded;
                    } else if layout::is_q(self.n, stripe, phys_disk) {
                        q = decoded;
                    } else {
                        let column = layout::data_column_of(self.n, stripe, phys_disk)
                            .expect("non-parity disk must map to a data column");
                        data_cols[column] = decoded;
                    }
                }
                Err(_) if self_heal => failed.push(phys_disk),
                Err(e) => return Err(e),
            }
        }

        if !failed.is_empty() && self_heal {
            if exclude.is_empty() && !recovering_already {
                debug!(stripe, ?failed, "self-heal triggered during read");
                recover::recovering_disks(self, &failed)?;
                return self.read_stripe(stripe, exclude, true, self_heal);
            }
            return Err(RaidError::UnrecoverableCorruption(format!(
                "stripe {stripe} still missing disks {failed:?} after recovery"
            )));
        }

        Ok((data_cols, (p, q)))
    }
}
