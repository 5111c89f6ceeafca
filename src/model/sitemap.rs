use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::common::Pi;

/// One live record as listed for sitemap generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitemapRecord {
    pub pi: Pi,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Lifecycle of the single-flight generation task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Idle,
    Running,
    Done,
    Failed,
}

/// Snapshot of the current (or most recent) generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitemapRunState {
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Default for SitemapRunState {
    fn default() -> Self {
        Self {
            status: TaskStatus::Idle,
            run_id: None,
            started: None,
            finished: None,
            files: Vec::new(),
            error: None,
        }
    }
}

/// Body of a sitemap update request. The output path falls back to the
/// configured one when not given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SitemapUpdateRequest {
    #[serde(default)]
    pub output_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&TaskStatus::Idle).unwrap(), "\"idle\"");
        assert_eq!(
            serde_json::to_string(&TaskStatus::Running).unwrap(),
            "\"running\""
        );
        assert_eq!(serde_json::to_string(&TaskStatus::Done).unwrap(), "\"done\"");
        assert_eq!(
            serde_json::to_string(&TaskStatus::Failed).unwrap(),
            "\"failed\""
        );
    }

    #[test]
    fn test_default_run_state_is_idle_and_sparse() {
        let state = SitemapRunState::default();
        assert_eq!(state.status, TaskStatus::Idle);
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "idle" }));
    }

    #[test]
    fn test_update_request_accepts_empty_body() {
        let request: SitemapUpdateRequest = serde_json::from_str("{}").unwrap();
        assert!(request.output_path.is_none());
    }
}
