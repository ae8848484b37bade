use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{AuditLogId, UserId};

/// Page size used by the admin audit view.
pub const AUDIT_PAGE_SIZE: u32 = 50;

/// One row of the backend's audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: AuditLogId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub username: String,
    /// CREATE, UPDATE, DELETE, ...
    pub action: String,
    pub table_name: String,
    #[serde(default)]
    pub record_id: Option<i64>,
    #[serde(default)]
    pub old_value: Option<String>,
    #[serde(default)]
    pub new_value: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default, deserialize_with = "crate::model::timestamp::deserialize_option")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuditLogPage {
    #[serde(default)]
    pub logs: Vec<AuditLog>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_pages: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuditStats {
    #[serde(default)]
    pub total_logs: u64,
    #[serde(default)]
    pub actions: BTreeMap<String, u64>,
    #[serde(default)]
    pub tables: BTreeMap<String, u64>,
    /// Events in the last 24 hours.
    #[serde(default)]
    pub recent_activity: u64,
}

/// Filters and pagination for the audit log query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditQuery {
    pub page: u32,
    pub page_size: u32,
    pub username: Option<String>,
    pub action: Option<String>,
    pub table_name: Option<String>,
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: AUDIT_PAGE_SIZE,
            username: None,
            action: None,
            table_name: None,
        }
    }
}

impl AuditQuery {
    /// Query-string pairs; empty filters are omitted.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.max(1).to_string()),
            ("page_size", self.page_size.to_string()),
        ];
        let filters = [
            ("username", &self.username),
            ("action", &self.action),
            ("table_name", &self.table_name),
        ];
        for (key, value) in filters {
            if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                pairs.push((key, value.to_string()));
            }
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_skips_blank_filters() {
        let query = AuditQuery {
            page: 0,
            username: Some("  ".to_string()),
            action: Some("DELETE".to_string()),
            ..AuditQuery::default()
        };
        let pairs = query.to_pairs();
        assert_eq!(
            pairs,
            vec![
                ("page", "1".to_string()),
                ("page_size", "50".to_string()),
                ("action", "DELETE".to_string()),
            ]
        );
    }

    #[test]
    fn page_tolerates_missing_fields() {
        let page: AuditLogPage = serde_json::from_str(
            r#"{"logs": [{"id": 7, "username": "nino", "action": "CREATE", "table_name": "words"}]}"#,
        )
        .unwrap();
        assert_eq!(page.logs.len(), 1);
        assert_eq!(page.logs[0].id.value(), 7);
        assert_eq!(page.total, 0);
    }
}
