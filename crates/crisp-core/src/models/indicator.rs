//! Indicator-of-compromise model and value classification

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{ListRecord, RecordId};

/// Artifact category of an indicator value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IocKind {
    Ip,
    Domain,
    FileHash,
    Url,
    Email,
}

impl IocKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ip => "ip",
            Self::Domain => "domain",
            Self::FileHash => "file_hash",
            Self::Url => "url",
            Self::Email => "email",
        }
    }
}

/// Sharing state of an indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorStatus {
    Active,
    Deactivated,
}

/// An indicator of compromise shared through a threat feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indicator {
    pub id: RecordId,
    /// Raw artifact value (IP, domain, hash, URL, or email)
    pub value: String,
    pub kind: IocKind,
    /// Source feed name
    #[serde(default)]
    pub feed: Option<String>,
    /// Severity score 0-100 as assigned by the source
    #[serde(default)]
    pub severity: Option<u8>,
    pub status: IndicatorStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Indicator {
    /// Build an active indicator, classifying the raw value.
    ///
    /// Fails when the value does not match any known artifact pattern.
    pub fn new(value: impl Into<String>) -> crate::Result<Self> {
        let value = value.into();
        let kind = classify_ioc(&value)
            .ok_or_else(|| crate::Error::InvalidInput(format!("unrecognized IoC value: {value}")))?;
        let now = Utc::now();
        Ok(Self {
            id: RecordId::new(),
            value,
            kind,
            feed: None,
            severity: None,
            status: IndicatorStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }
}

impl ListRecord for Indicator {
    fn record_id(&self) -> String {
        self.id.as_str()
    }

    fn search_text(&self) -> String {
        match &self.feed {
            Some(feed) => format!("{} {} {feed}", self.value, self.kind.as_str()),
            None => format!("{} {}", self.value, self.kind.as_str()),
        }
    }

    fn field(&self, key: &str) -> Option<String> {
        match key {
            "value" => Some(self.value.clone()),
            "kind" | "type" => Some(self.kind.as_str().to_string()),
            "feed" => self.feed.clone(),
            "severity" => self.severity.map(|severity| format!("{severity:03}")),
            "status" => Some(
                match self.status {
                    IndicatorStatus::Active => "active",
                    IndicatorStatus::Deactivated => "deactivated",
                }
                .to_string(),
            ),
            "created_at" => Some(self.created_at.to_rfc3339()),
            "updated_at" => Some(self.updated_at.to_rfc3339()),
            _ => None,
        }
    }
}

/// Classify a raw artifact value into an [`IocKind`].
///
/// Patterns are checked most-specific first: IPv4, email, URL, file hash
/// (MD5/SHA-1/SHA-256 hex), then bare domain. Returns `None` for values
/// matching none of them.
#[must_use]
pub fn classify_ioc(value: &str) -> Option<IocKind> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let ipv4 = Regex::new(r"^(?:(?:25[0-5]|2[0-4]\d|1?\d?\d)\.){3}(?:25[0-5]|2[0-4]\d|1?\d?\d)$")
        .expect("Invalid regex");
    if ipv4.is_match(value) {
        return Some(IocKind::Ip);
    }

    let email = Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .expect("Invalid regex");
    if email.is_match(value) {
        return Some(IocKind::Email);
    }

    if value.starts_with("http://") || value.starts_with("https://") {
        return Some(IocKind::Url);
    }

    let hash = Regex::new(r"^(?:[A-Fa-f0-9]{32}|[A-Fa-f0-9]{40}|[A-Fa-f0-9]{64})$")
        .expect("Invalid regex");
    if hash.is_match(value) {
        return Some(IocKind::FileHash);
    }

    let domain = Regex::new(r"^(?:[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}$")
        .expect("Invalid regex");
    if domain.is_match(value) {
        return Some(IocKind::Domain);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_recognizes_each_kind() {
        assert_eq!(classify_ioc("192.0.2.44"), Some(IocKind::Ip));
        assert_eq!(classify_ioc("evil.example.com"), Some(IocKind::Domain));
        assert_eq!(
            classify_ioc("d41d8cd98f00b204e9800998ecf8427e"),
            Some(IocKind::FileHash)
        );
        assert_eq!(
            classify_ioc("https://evil.example.com/payload"),
            Some(IocKind::Url)
        );
        assert_eq!(classify_ioc("phish@example.com"), Some(IocKind::Email));
    }

    #[test]
    fn classify_rejects_garbage_and_bad_octets() {
        assert_eq!(classify_ioc(""), None);
        assert_eq!(classify_ioc("not an indicator"), None);
        assert_eq!(classify_ioc("999.1.1.1"), None);
    }

    #[test]
    fn classify_accepts_sha256() {
        let sha256 = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
        assert_eq!(classify_ioc(sha256), Some(IocKind::FileHash));
    }

    #[test]
    fn new_indicator_rejects_unclassifiable_value() {
        assert!(Indicator::new("///").is_err());
        let indicator = Indicator::new("198.51.100.7").unwrap();
        assert_eq!(indicator.kind, IocKind::Ip);
        assert_eq!(indicator.status, IndicatorStatus::Active);
    }

    #[test]
    fn severity_field_is_zero_padded_for_string_sorting() {
        let mut indicator = Indicator::new("198.51.100.7").unwrap();
        indicator.severity = Some(9);
        assert_eq!(indicator.field("severity").as_deref(), Some("009"));
    }
}
