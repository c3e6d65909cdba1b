// src/gateway/audit.rs — Audit records for gateway traffic

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::scanner::ScanResult;

#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub model: String,
    pub prompt: String,
    pub response: String,
    pub pii_detected: Vec<String>,
    pub blocked: bool,
}

impl AuditRecord {
    /// Record a refused message. Only the redacted text is kept.
    pub fn blocked(model: &str, scan: &ScanResult) -> Self {
        Self {
            timestamp: Utc::now(),
            user_id: None,
            model: model.to_string(),
            prompt: scan.redacted_text.clone(),
            response: String::new(),
            pii_detected: scan.pii_types.clone(),
            blocked: true,
        }
    }

    pub fn completed(model: &str, prompt: &str, response: &str, pii: Vec<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            user_id: None,
            model: model.to_string(),
            prompt: prompt.to_string(),
            response: response.to_string(),
            pii_detected: pii,
            blocked: false,
        }
    }

    pub fn with_user(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }
}

/// Emit one record as JSON on the audit target.
pub fn log_request(record: &AuditRecord) {
    match serde_json::to_string(record) {
        Ok(json) => tracing::info!(target: "audit", "{json}"),
        Err(e) => tracing::warn!("Failed to serialize audit record: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::scanner::PiiScanner;

    #[test]
    fn test_blocked_record_serializes() {
        let scan = PiiScanner::new().unwrap().scan("ssn 123-45-6789");
        let record = AuditRecord::blocked("deepseek-chat", &scan);
        let json: serde_json::Value = serde_json::to_value(&record).unwrap();
        assert_eq!(json["blocked"], true);
        assert_eq!(json["model"], "deepseek-chat");
        assert_eq!(json["pii_detected"][0], "ssn");
        assert_eq!(json["response"], "");
        assert!(json.get("user_id").is_none());
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_blocked_record_never_holds_matched_values() {
        let scan = PiiScanner::new()
            .unwrap()
            .scan("my ssn is 123-45-6789, card 4111 1111 1111 1111, mail a@b.io");
        let record = AuditRecord::blocked("m", &scan);
        assert_eq!(record.prompt, scan.redacted_text);

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("[REDACTED]"));
        for raw in ["123-45-6789", "4111 1111 1111 1111", "a@b.io"] {
            assert!(!json.contains(raw), "audit record leaked {raw}");
        }
    }

    #[test]
    fn test_user_id_included_when_set() {
        let record = AuditRecord::completed("m", "hi", "hello", vec![])
            .with_user(Some("u-1".into()));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["user_id"], "u-1");
        assert_eq!(json["blocked"], false);
    }
}
