use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const KEY_INDEX: &str = "index";
pub const STATUS_OK: &str = "ok";
pub const STATUS_ERROR: &str = "error";

/// Version report for one participating service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub hash: String,
}

impl VersionInfo {
    /// Build info of this crate, baked in at compile time. The build hash is
    /// taken from the VIEWER_BUILD_HASH environment variable if the build set
    /// it.
    pub fn core() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            hash: option_env!("VIEWER_BUILD_HASH").unwrap_or("unknown").to_string(),
        }
    }

    /// Extract version fields from a reported version document. Missing
    /// fields degrade to "?" rather than failing the whole report.
    pub fn from_report(report: &serde_json::Value) -> Self {
        let field = |name: &str| {
            report
                .get(name)
                .and_then(|value| value.as_str())
                .unwrap_or("?")
                .to_string()
        };
        Self {
            version: field("version"),
            hash: field("git-revision"),
        }
    }
}

/// Availability checks plus the versions of all participating services.
/// Checks start out "ok" and are flipped to "error" as probes fail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringStatus {
    pub monitoring: BTreeMap<String, String>,
    pub versions: BTreeMap<String, VersionInfo>,
}

impl MonitoringStatus {
    pub fn new() -> Self {
        let mut monitoring = BTreeMap::new();
        monitoring.insert(KEY_INDEX.to_string(), STATUS_OK.to_string());
        Self {
            monitoring,
            versions: BTreeMap::new(),
        }
    }
}

impl Default for MonitoringStatus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_status_reports_index_ok() {
        let status = MonitoringStatus::new();
        assert_eq!(status.monitoring.get(KEY_INDEX).map(String::as_str), Some(STATUS_OK));
        assert!(status.versions.is_empty());
    }

    #[test]
    fn test_core_version_matches_crate_version() {
        let info = VersionInfo::core();
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
        assert!(!info.hash.is_empty());
    }

    #[test]
    fn test_from_report_extracts_fields() {
        let report = serde_json::json!({
            "application": "viewer-indexer",
            "version": "1.4.2",
            "git-revision": "abcdef0",
            "build-date": "2021-05-03"
        });
        let info = VersionInfo::from_report(&report);
        assert_eq!(info.version, "1.4.2");
        assert_eq!(info.hash, "abcdef0");
    }

    #[test]
    fn test_from_report_tolerates_missing_fields() {
        let report = serde_json::json!({ "application": "viewer-indexer" });
        let info = VersionInfo::from_report(&report);
        assert_eq!(info.version, "?");
        assert_eq!(info.hash, "?");
    }
}
