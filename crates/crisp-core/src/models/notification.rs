//! Notification model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ListRecord, RecordId};

/// An in-app notification delivered to the signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    /// Category label, e.g. `trust_request`, `feed_update`
    pub category: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Notification {
    #[must_use]
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::new(),
            title: title.into(),
            body: None,
            category: category.into(),
            is_read: false,
            created_at: now,
            updated_at: now,
        }
    }
}

impl ListRecord for Notification {
    fn record_id(&self) -> String {
        self.id.as_str()
    }

    fn search_text(&self) -> String {
        match &self.body {
            Some(body) => format!("{} {body} {}", self.title, self.category),
            None => format!("{} {}", self.title, self.category),
        }
    }

    fn field(&self, key: &str) -> Option<String> {
        match key {
            "title" => Some(self.title.clone()),
            "category" => Some(self.category.clone()),
            "is_read" => Some(self.is_read.to_string()),
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
    fn new_notification_starts_unread() {
        let notification = Notification::new("Trust request from Acme", "trust_request");
        assert!(!notification.is_read);
        assert!(notification.search_text().contains("trust_request"));
    }
}
