use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::activity::{Activity, ActivityType};
use crate::model::common::Pi;

/// One change event as read from the index. Which timestamp fields are set
/// decides the event type; delete wins over update, update over create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub pi: Pi,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    pub deleted: Option<DateTime<Utc>>,
}

impl ChangeRecord {
    pub fn activity_type(&self) -> Option<ActivityType> {
        if self.deleted.is_some() {
            Some(ActivityType::Delete)
        } else if self.updated.is_some() {
            Some(ActivityType::Update)
        } else if self.created.is_some() {
            Some(ActivityType::Create)
        } else {
            None
        }
    }

    /// Event timestamp, chosen with the same precedence as the type.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.deleted.or(self.updated).or(self.created)
    }

    /// None when no timestamp is set at all; such a record cannot be ordered
    /// or typed and is never served.
    pub fn to_activity(&self) -> Option<Activity> {
        match (self.activity_type(), self.timestamp()) {
            (Some(activity_type), Some(end_time)) => Some(Activity {
                activity_type,
                object: self.pi.clone(),
                end_time,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 5, 3, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_delete_takes_precedence_over_update_and_create() {
        let record = ChangeRecord {
            pi: "ABC123".to_string(),
            created: Some(at(1)),
            updated: Some(at(2)),
            deleted: Some(at(3)),
        };
        assert_eq!(record.activity_type(), Some(ActivityType::Delete));
        assert_eq!(record.timestamp(), Some(at(3)));
    }

    #[test]
    fn test_update_takes_precedence_over_create() {
        let record = ChangeRecord {
            pi: "ABC123".to_string(),
            created: Some(at(1)),
            updated: Some(at(2)),
            deleted: None,
        };
        assert_eq!(record.activity_type(), Some(ActivityType::Update));
        assert_eq!(record.timestamp(), Some(at(2)));
    }

    #[test]
    fn test_create_only_record() {
        let record = ChangeRecord {
            pi: "ABC123".to_string(),
            created: Some(at(1)),
            updated: None,
            deleted: None,
        };
        assert_eq!(record.activity_type(), Some(ActivityType::Create));
        assert_eq!(record.timestamp(), Some(at(1)));
    }

    #[test]
    fn test_record_without_timestamps_yields_no_activity() {
        let record = ChangeRecord {
            pi: "ABC123".to_string(),
            created: None,
            updated: None,
            deleted: None,
        };
        assert_eq!(record.activity_type(), None);
        assert_eq!(record.timestamp(), None);
        assert!(record.to_activity().is_none());
    }

    #[test]
    fn test_to_activity_maps_pi_and_timestamp() {
        let record = ChangeRecord {
            pi: "ABC123".to_string(),
            created: Some(at(1)),
            updated: Some(at(2)),
            deleted: None,
        };
        let activity = record.to_activity().unwrap();
        assert_eq!(activity.activity_type, ActivityType::Update);
        assert_eq!(activity.object, "ABC123");
        assert_eq!(activity.end_time, at(2));
    }
}
