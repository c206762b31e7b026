//! Data models shared by the CRISP client.
//!
//! Records mirror the REST payloads served by the CRISP backend. The sync
//! and collection layers treat them uniformly through [`ListRecord`].

mod incident;
mod indicator;
mod notification;
mod organization;
mod trust;
mod user;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use incident::{Incident, IncidentSeverity, IncidentStatus};
pub use indicator::{classify_ioc, Indicator, IndicatorStatus, IocKind};
pub use notification::Notification;
pub use organization::Organization;
pub use trust::{TrustRelationship, TrustStatus};
pub use user::User;

/// A unique record identifier, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Create a new unique record ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Resource families exposed by the backend REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Users,
    Organizations,
    Indicators,
    Incidents,
    TrustRelationships,
    Notifications,
}

impl ResourceKind {
    /// URL path segment under `/api/`, e.g. `indicators`.
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Organizations => "organizations",
            Self::Indicators => "indicators",
            Self::Incidents => "incidents",
            Self::TrustRelationships => "trust-relationships",
            Self::Notifications => "notifications",
        }
    }

    /// Key under which the update report lists this resource's latest
    /// modification timestamp, e.g. `indicators_updated`.
    #[must_use]
    pub fn report_key(self) -> String {
        format!("{}_updated", self.path_segment().replace('-', "_"))
    }

    /// Singular envelope key used by keyed response shapes, e.g. `user`.
    #[must_use]
    pub const fn singular(self) -> &'static str {
        match self {
            Self::Users => "user",
            Self::Organizations => "organization",
            Self::Indicators => "indicator",
            Self::Incidents => "incident",
            Self::TrustRelationships => "trust_relationship",
            Self::Notifications => "notification",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "users" | "user" => Ok(Self::Users),
            "organizations" | "organization" | "orgs" | "org" => Ok(Self::Organizations),
            "indicators" | "indicator" | "iocs" | "ioc" => Ok(Self::Indicators),
            "incidents" | "incident" => Ok(Self::Incidents),
            "trust-relationships" | "trust" => Ok(Self::TrustRelationships),
            "notifications" | "notification" => Ok(Self::Notifications),
            other => Err(format!("unknown resource kind: {other}")),
        }
    }
}

/// Uniform access used by the collection-view state machine.
pub trait ListRecord: Clone {
    /// Opaque identifier, stable across refreshes.
    fn record_id(&self) -> String;

    /// Text searched by the client-side search box (case-insensitive).
    fn search_text(&self) -> String;

    /// Named field lookup used for filtering and sorting.
    fn field(&self, key: &str) -> Option<String>;
}
