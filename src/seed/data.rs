use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};

use crate::model::ChangeRecord;
use crate::store::{MemoryStore, PostgresStore};

fn stamp(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 5, day, hour, 0, 0).unwrap()
}

/// Demo change log: a handful of records in various lifecycle stages, with
/// fixed timestamps so the activity pages are reproducible.
pub fn demo_changes() -> Vec<ChangeRecord> {
    vec![
        ChangeRecord {
            pi: "PPN123456789".to_string(),
            created: Some(stamp(1, 8)),
            updated: Some(stamp(3, 9)),
            deleted: None,
        },
        ChangeRecord {
            pi: "PPN223456789".to_string(),
            created: Some(stamp(1, 9)),
            updated: None,
            deleted: None,
        },
        ChangeRecord {
            pi: "urn:nbn:de:demo-4711".to_string(),
            created: Some(stamp(2, 10)),
            updated: None,
            deleted: None,
        },
        // Created, updated and finally withdrawn again.
        ChangeRecord {
            pi: "PPN334455667".to_string(),
            created: Some(stamp(2, 11)),
            updated: Some(stamp(2, 12)),
            deleted: Some(stamp(4, 6)),
        },
        ChangeRecord {
            pi: "AC01234567".to_string(),
            created: Some(stamp(3, 14)),
            updated: None,
            deleted: None,
        },
    ]
}

pub async fn load_memory(store: &MemoryStore) {
    store.insert_changes(demo_changes()).await;
}

pub async fn load_postgres(store: &PostgresStore) -> Result<()> {
    for record in demo_changes() {
        store.insert_change(&record).await?;
    }
    Ok(())
}
