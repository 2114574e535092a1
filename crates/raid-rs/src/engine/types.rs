//! Plain data types shared across the engine's internal bookkeeping.

/// A contiguous run of bytes belonging to one logical file, starting at
/// `logical_disk` (the data column, not a physical disk index) of
/// `stripe_index`. `offset` is the byte offset within that column's
/// first chunk at which the run's bytes begin; it is always `0` for a
/// freshly appended extent and only nonzero when an update reuses the
/// tail of a chunk a prior write left partially filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub stripe_index: u64,
    pub logical_disk: usize,
    pub offset: usize,
    pub length: usize,
}

/// `(current_stripe, current_column)`: the next unused data slot at the
/// append frontier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteCursor {
    pub current_stripe: u64,
    pub current_column: usize,
}
