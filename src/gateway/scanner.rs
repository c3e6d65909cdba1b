// src/gateway/scanner.rs — Regex PII detection and redaction

use regex::Regex;
use serde::Serialize;

pub const REDACTED: &str = "[REDACTED]";

/// Patterns applied in order. Later patterns see the output of earlier redactions.
const PATTERNS: [(&str, &str); 4] = [
    ("ssn", r"\b\d{3}-\d{2}-\d{4}\b"),
    ("email", r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b"),
    ("credit_card", r"\b\d{4}[\s-]?\d{4}[\s-]?\d{4}[\s-]?\d{4}\b"),
    ("phone", r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    pub has_pii: bool,
    pub pii_types: Vec<String>,
    pub redacted_text: String,
}

pub struct PiiScanner {
    patterns: Vec<(&'static str, Regex)>,
}

impl PiiScanner {
    pub fn new() -> Result<Self, regex::Error> {
        let patterns = PATTERNS
            .iter()
            .map(|(name, pattern)| Ok((*name, Regex::new(pattern)?)))
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { patterns })
    }

    pub fn scan(&self, text: &str) -> ScanResult {
        let mut redacted = text.to_string();
        let mut pii_types = Vec::new();

        for (name, re) in &self.patterns {
            if re.is_match(&redacted) {
                pii_types.push((*name).to_string());
                redacted = re.replace_all(&redacted, REDACTED).into_owned();
            }
        }

        ScanResult {
            has_pii: !pii_types.is_empty(),
            pii_types,
            redacted_text: redacted,
        }
    }
}
