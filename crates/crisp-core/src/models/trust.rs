//! Trust relationship model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ListRecord, RecordId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustStatus {
    Pending,
    Accepted,
    Declined,
    Revoked,
}

impl TrustStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Revoked => "revoked",
        }
    }
}

/// A sharing agreement between two organizations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustRelationship {
    pub id: RecordId,
    pub source_organization: String,
    pub target_organization: String,
    /// Trust level label, e.g. `full`, `restricted`
    #[serde(default)]
    pub trust_level: Option<String>,
    pub status: TrustStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TrustRelationship {
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::new(),
            source_organization: source.into(),
            target_organization: target.into(),
            trust_level: None,
            status: TrustStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

impl ListRecord for TrustRelationship {
    fn record_id(&self) -> String {
        self.id.as_str()
    }

    fn search_text(&self) -> String {
        format!("{} {}", self.source_organization, self.target_organization)
    }

    fn field(&self, key: &str) -> Option<String> {
        match key {
            "source" => Some(self.source_organization.clone()),
            "target" => Some(self.target_organization.clone()),
            "trust_level" => self.trust_level.clone(),
            "status" => Some(self.status.as_str().to_string()),
            "created_at" => Some(self.created_at.to_rfc3339()),
            "updated_at" => Some(self.updated_at.to_rfc3339()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_relationship_starts_pending() {
        let trust = TrustRelationship::new("Acme CERT", "Contoso SOC");
        assert_eq!(trust.status, TrustStatus::Pending);
        assert!(trust.search_text().contains("Contoso SOC"));
    }
}
