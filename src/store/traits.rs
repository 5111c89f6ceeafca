use crate::model::{ChangeRecord, SitemapRecord};
use anyhow::Result;

/// Read access to the record change history.
///
/// Slices are served under a deterministic total order: event timestamp
/// ascending (deleted over updated over created), ties broken by record
/// identifier ascending. Appends past the last page boundary therefore never
/// reshuffle earlier pages. The contract is read-committed only; concurrent
/// deletions in the index can still shift page boundaries between calls.
#[async_trait::async_trait]
pub trait ChangeStore: Send + Sync {
    /// Total number of change events.
    async fn count_changes(&self) -> Result<u64>;
    /// One slice of the ordered change list.
    async fn changes(&self, offset: u64, limit: u64) -> Result<Vec<ChangeRecord>>;
}

/// Read access to the live records, for sitemap generation. A record with any
/// delete event does not count as live.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Number of distinct live records.
    async fn count_records(&self) -> Result<u64>;
    /// One slice of the live records, ordered by identifier ascending, each
    /// carrying its most recent non-delete timestamp.
    async fn records(&self, offset: u64, limit: u64) -> Result<Vec<SitemapRecord>>;
}

/// Availability probe for monitoring.
#[async_trait::async_trait]
pub trait StatusStore: Send + Sync {
    async fn check_availability(&self) -> bool;
}

pub trait IndexStore: ChangeStore + RecordStore + StatusStore + Send + Sync {}
