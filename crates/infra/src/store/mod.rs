//! Transactional record storage for the shop.
//!
//! Rows carry a version. A [`Transaction`] records the version of every row it
//! reads, stages its writes locally and hands both to [`ShopStore::commit`],
//! which applies the writes only if none of the read rows changed meanwhile.
//! A listing also pins the membership of its kind, so a row inserted into or
//! deleted from a scanned kind conflicts too.
//! Dropping a transaction without committing discards its writes.

mod in_memory;
mod record;
mod transaction;

use thiserror::Error;

use bloomshop_core::ExpectedVersion;

pub use in_memory::InMemoryShopStore;
pub use record::{Record, RecordKind, Row, RowKey};
pub use transaction::Transaction;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A row read by the transaction changed before commit.
    #[error("concurrency conflict: {0}")]
    Conflict(String),

    /// A writer panicked while holding the table lock.
    #[error("store lock poisoned")]
    Poisoned,
}

/// A row value with its version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned {
    pub version: u64,
    pub record: Record,
}

/// Result of scanning one kind.
///
/// `stamp` is the version of the last commit that inserted or deleted a row of
/// that kind (0 if none has).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scan {
    pub stamp: u64,
    pub rows: Vec<(RowKey, Versioned)>,
}

/// Everything a transaction observed, checked at commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadSet {
    pub rows: Vec<(RowKey, ExpectedVersion)>,
    pub scans: Vec<(RecordKind, u64)>,
}

/// Staged change to one row. `None` deletes the row.
pub type Write = (RowKey, Option<Record>);

/// Storage backend seam.
///
/// Implementations must apply a commit atomically: either every write lands
/// or none does.
pub trait ShopStore: Send + Sync {
    fn read(&self, key: &RowKey) -> Result<Option<Versioned>, StoreError>;

    /// Every row of one kind, with the kind's membership stamp.
    fn scan(&self, kind: RecordKind) -> Result<Scan, StoreError>;

    /// Check every row version and scan stamp in `reads` against the current
    /// state and, if all match, apply `writes`.
    fn commit(&self, reads: &ReadSet, writes: Vec<Write>) -> Result<(), StoreError>;
}

impl<S> ShopStore for std::sync::Arc<S>
where
    S: ShopStore + ?Sized,
{
    fn read(&self, key: &RowKey) -> Result<Option<Versioned>, StoreError> {
        (**self).read(key)
    }

    fn scan(&self, kind: RecordKind) -> Result<Scan, StoreError> {
        (**self).scan(kind)
    }

    fn commit(&self, reads: &ReadSet, writes: Vec<Write>) -> Result<(), StoreError> {
        (**self).commit(reads, writes)
    }
}
