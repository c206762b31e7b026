//! Organization model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ListRecord, RecordId};

/// A member organization of the sharing platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: RecordId,
    pub name: String,
    /// Sector label, e.g. `finance`, `education`, `government`
    #[serde(default)]
    pub sector: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::new(),
            name: name.into(),
            sector: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

impl ListRecord for Organization {
    fn record_id(&self) -> String {
        self.id.as_str()
    }

    fn search_text(&self) -> String {
        match &self.sector {
            Some(sector) => format!("{} {sector}", self.name),
            None => self.name.clone(),
        }
    }

    fn field(&self, key: &str) -> Option<String> {
        match key {
            "name" => Some(self.name.clone()),
            "sector" => self.sector.clone(),
            "is_active" => Some(self.is_active.to_string()),
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
    fn search_text_includes_sector_when_present() {
        let mut org = Organization::new("Acme CERT");
        assert_eq!(org.search_text(), "Acme CERT");

        org.sector = Some("finance".to_string());
        assert_eq!(org.search_text(), "Acme CERT finance");
    }
}
