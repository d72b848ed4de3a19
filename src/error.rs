//! Error conditions surfaced by the stores

/// Errors a store operation can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A store was constructed with zero buckets or slots
    #[error("store size must be greater than zero")]
    InvalidCapacity,

    /// A probing insert found neither the key, a free slot nor a tombstone
    #[error("table is full (capacity: {capacity})")]
    TableFull {
        /// Number of slots in the full table
        capacity: usize,
    },
}

impl StoreError {
    /// Returns true if retrying after removing entries can succeed
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::TableFull { .. })
    }
}
