use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::common::Pi;

/// JSON-LD context of every discovery document.
pub const DISCOVERY_CONTEXT: [&str; 2] = [
    "http://iiif.io/api/discovery/0/context.json",
    "https://www.w3.org/ns/activitystreams",
];

/// Lifecycle event kinds, serialized with the Activity Streams type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityType {
    Create,
    Update,
    Delete,
}

/// One lifecycle event of one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub object: Pi,
    #[serde(rename = "endTime")]
    pub end_time: DateTime<Utc>,
}

/// Collection-level view of the whole activity list: the total count plus
/// links to the first and last page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedCollection {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    pub id: String,
    #[serde(rename = "type")]
    pub collection_type: String,
    #[serde(rename = "totalItems")]
    pub total_items: u64,
    pub first: String,
    pub last: String,
}

impl OrderedCollection {
    pub fn new(id: String, total_items: u64, first: String, last: String) -> Self {
        Self {
            context: discovery_context(),
            id,
            collection_type: "OrderedCollection".to_string(),
            total_items,
            first,
            last,
        }
    }
}

/// One page of the activity list. `prev` and `next` are omitted from the JSON
/// on the first and last page respectively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedCollectionPage {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    pub id: String,
    #[serde(rename = "type")]
    pub page_type: String,
    #[serde(rename = "partOf")]
    pub part_of: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(rename = "orderedItems")]
    pub ordered_items: Vec<Activity>,
}

impl OrderedCollectionPage {
    pub fn new(
        id: String,
        part_of: String,
        prev: Option<String>,
        next: Option<String>,
        ordered_items: Vec<Activity>,
    ) -> Self {
        Self {
            context: discovery_context(),
            id,
            page_type: "OrderedCollectionPage".to_string(),
            part_of,
            prev,
            next,
            ordered_items,
        }
    }
}

fn discovery_context() -> Vec<String> {
    DISCOVERY_CONTEXT.iter().map(|s| s.to_string()).collect()
}
