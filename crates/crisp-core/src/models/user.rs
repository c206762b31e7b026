//! User model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ListRecord, RecordId};

/// A platform user account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: RecordId,
    pub username: String,
    pub email: String,
    /// Role name as reported by the backend (e.g. `admin`, `analyst`)
    pub role: String,
    /// Owning organization id, if any
    #[serde(default)]
    pub organization_id: Option<RecordId>,
    /// Soft-disable flag toggled by deactivate/reactivate
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create an active user with the given identity fields.
    #[must_use]
    pub fn new(username: impl Into<String>, email: impl Into<String>, role: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::new(),
            username: username.into(),
            email: email.into(),
            role: role.into(),
            organization_id: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

impl ListRecord for User {
    fn record_id(&self) -> String {
        self.id.as_str()
    }

    fn search_text(&self) -> String {
        format!("{} {} {}", self.username, self.email, self.role)
    }

    fn field(&self, key: &str) -> Option<String> {
        match key {
            "username" => Some(self.username.clone()),
            "email" => Some(self.email.clone()),
            "role" => Some(self.role.clone()),
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
    fn new_user_starts_active() {
        let user = User::new("amara", "amara@example.com", "analyst");
        assert!(user.is_active);
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn search_text_covers_identity_fields() {
        let user = User::new("amara", "amara@example.com", "analyst");
        let text = user.search_text();
        assert!(text.contains("amara"));
        assert!(text.contains("amara@example.com"));
        assert!(text.contains("analyst"));
    }

    #[test]
    fn field_lookup_resolves_known_keys() {
        let user = User::new("amara", "amara@example.com", "analyst");
        assert_eq!(user.field("role").as_deref(), Some("analyst"));
        assert_eq!(user.field("is_active").as_deref(), Some("true"));
        assert_eq!(user.field("unknown"), None);
    }
}
