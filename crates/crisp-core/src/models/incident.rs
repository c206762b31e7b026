//! SOC incident model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ListRecord, RecordId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl IncidentSeverity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    Open,
    Investigating,
    Resolved,
    Closed,
}

impl IncidentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Investigating => "investigating",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }
}

/// A SOC incident tracked through the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    pub id: RecordId,
    pub title: String,
    pub severity: IncidentSeverity,
    pub status: IncidentStatus,
    /// Assigned analyst username, if any
    #[serde(default)]
    pub assignee: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Incident {
    #[must_use]
    pub fn new(title: impl Into<String>, severity: IncidentSeverity) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::new(),
            title: title.into(),
            severity,
            status: IncidentStatus::Open,
            assignee: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl ListRecord for Incident {
    fn record_id(&self) -> String {
        self.id.as_str()
    }

    fn search_text(&self) -> String {
        match &self.assignee {
            Some(assignee) => format!("{} {assignee}", self.title),
            None => self.title.clone(),
        }
    }

    fn field(&self, key: &str) -> Option<String> {
        match key {
            "title" => Some(self.title.clone()),
            // Numeric rank so string sorting orders low < medium < high < critical
            "severity" => Some(format!("{}-{}", self.severity as u8, self.severity.as_str())),
            "status" => Some(self.status.as_str().to_string()),
            "assignee" => self.assignee.clone(),
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
    fn new_incident_starts_open() {
        let incident = Incident::new("Beaconing from build host", IncidentSeverity::High);
        assert_eq!(incident.status, IncidentStatus::Open);
    }

    #[test]
    fn severity_field_sorts_in_rank_order() {
        let low = Incident::new("a", IncidentSeverity::Low);
        let critical = Incident::new("b", IncidentSeverity::Critical);
        assert!(low.field("severity").unwrap() < critical.field("severity").unwrap());
    }
}
