//! Issue-tracker webhook payload.
//!
//! Parsed only after the signature over the raw body has verified.

use crate::task::{Priority, TaskRequest};
use serde::Deserialize;

/// Inbound webhook body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    /// Tracker event action (`create`, `update`, `remove`, ...)
    #[serde(default)]
    pub action: Option<String>,
    pub data: IssueData,
    /// Epoch milliseconds, inside the signed body so it cannot be swapped
    #[serde(default, alias = "timestamp")]
    pub webhook_timestamp: Option<i64>,
}

/// Issue fields carried by the webhook
#[derive(Debug, Clone, Deserialize)]
pub struct IssueData {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub priority: Option<PriorityField>,
}

/// Labels arrive either as plain strings or as `{ "name": ... }` objects
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Name(String),
    Object { name: String },
}

impl Label {
    pub fn name(&self) -> &str {
        match self {
            Label::Name(n) => n,
            Label::Object { name } => name,
        }
    }
}

/// Priority as a name (`"high"`) or the tracker's numeric scale
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PriorityField {
    Level(i64),
    Name(String),
}

impl PriorityField {
    pub fn to_priority(&self) -> Priority {
        match self {
            PriorityField::Level(level) => Priority::from_tracker_level(*level),
            PriorityField::Name(name) => name.parse().unwrap_or_default(),
        }
    }
}

impl WebhookPayload {
    pub fn from_slice(raw: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(raw)
    }

    /// Removal events carry no work to do
    pub fn is_removal(&self) -> bool {
        self.action.as_deref() == Some("remove")
    }

    /// Convert into an admission request
    pub fn to_task_request(&self) -> TaskRequest {
        TaskRequest {
            issue_id: self.data.id.clone(),
            title: self.data.title.clone(),
            description: self.data.description.clone().unwrap_or_default(),
            tags: self
                .data
                .labels
                .iter()
                .map(|l| l.name().to_string())
                .collect(),
            priority: self
                .data
                .priority
                .as_ref()
                .map(PriorityField::to_priority)
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tracker_payload() {
        let raw = br#"{
            "action": "update",
            "data": {
                "id": "ISS-42",
                "title": "Fix flaky login test",
                "description": "It fails on CI",
                "labels": [{"name": "autopilot"}, {"name": "bug"}],
                "priority": 2
            },
            "webhookTimestamp": 1760000000000
        }"#;

        let payload = WebhookPayload::from_slice(raw).unwrap();
        assert_eq!(payload.webhook_timestamp, Some(1_760_000_000_000));
        assert!(!payload.is_removal());

        let request = payload.to_task_request();
        assert_eq!(request.issue_id, "ISS-42");
        assert_eq!(request.priority, Priority::High);
        assert_eq!(request.tags, vec!["autopilot", "bug"]);
        assert_eq!(request.description, "It fails on CI");
    }

    #[test]
    fn test_parse_string_labels_and_named_priority() {
        let raw = br#"{"data": {"id": "ISS-1", "title": "t", "labels": ["a"], "priority": "urgent"}, "timestamp": 5}"#;
        let payload = WebhookPayload::from_slice(raw).unwrap();
        assert_eq!(payload.webhook_timestamp, Some(5));

        let request = payload.to_task_request();
        assert_eq!(request.priority, Priority::Urgent);
        assert_eq!(request.tags, vec!["a"]);
    }

    #[test]
    fn test_missing_optional_fields() {
        let payload = WebhookPayload::from_slice(br#"{"data": {"id": "ISS-1"}}"#).unwrap();
        assert!(payload.webhook_timestamp.is_none());
        assert_eq!(payload.to_task_request().priority, Priority::Normal);
    }

    #[test]
    fn test_removal_detected() {
        let payload =
            WebhookPayload::from_slice(br#"{"action": "remove", "data": {"id": "ISS-1"}}"#)
                .unwrap();
        assert!(payload.is_removal());
    }

    #[test]
    fn test_malformed_payload_errors() {
        assert!(WebhookPayload::from_slice(b"not json").is_err());
        assert!(WebhookPayload::from_slice(br#"{"action": "create"}"#).is_err());
    }
}
