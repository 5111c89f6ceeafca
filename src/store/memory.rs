use std::collections::{BTreeMap, HashSet};

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::model::{ChangeRecord, SitemapRecord};
use crate::store::traits::{ChangeStore, IndexStore, RecordStore, StatusStore};

/// In-memory index backend for tests and runs without a database. The change
/// list is kept in the served order, so slices are plain subranges.
#[derive(Debug, Default)]
pub struct MemoryStore {
    changes: RwLock<Vec<ChangeRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_change(&self, record: ChangeRecord) {
        let mut changes = self.changes.write().await;
        changes.push(record);
        changes.sort_by(|a, b| {
            a.timestamp()
                .cmp(&b.timestamp())
                .then_with(|| a.pi.cmp(&b.pi))
        });
    }

    pub async fn insert_changes(&self, records: impl IntoIterator<Item = ChangeRecord>) {
        for record in records {
            self.insert_change(record).await;
        }
    }

    async fn live_records(&self) -> Vec<SitemapRecord> {
        let changes = self.changes.read().await;
        let deleted: HashSet<&str> = changes
            .iter()
            .filter(|change| change.deleted.is_some())
            .map(|change| change.pi.as_str())
            .collect();

        // Latest non-delete timestamp per record, ordered by identifier.
        let mut latest: BTreeMap<String, Option<DateTime<Utc>>> = BTreeMap::new();
        for change in changes.iter().filter(|c| !deleted.contains(c.pi.as_str())) {
            let modified = change.updated.or(change.created);
            let entry = latest.entry(change.pi.clone()).or_insert(None);
            if modified > *entry {
                *entry = modified;
            }
        }

        latest
            .into_iter()
            .map(|(pi, last_modified)| SitemapRecord { pi, last_modified })
            .collect()
    }
}

#[async_trait::async_trait]
impl ChangeStore for MemoryStore {
    async fn count_changes(&self) -> Result<u64> {
        Ok(self.changes.read().await.len() as u64)
    }

    async fn changes(&self, offset: u64, limit: u64) -> Result<Vec<ChangeRecord>> {
        let changes = self.changes.read().await;
        Ok(changes
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryStore {
    async fn count_records(&self) -> Result<u64> {
        Ok(self.live_records().await.len() as u64)
    }

    async fn records(&self, offset: u64, limit: u64) -> Result<Vec<SitemapRecord>> {
        Ok(self
            .live_records()
            .await
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

#[async_trait::async_trait]
impl StatusStore for MemoryStore {
    async fn check_availability(&self) -> bool {
        true
    }
}

impl IndexStore for MemoryStore {}
