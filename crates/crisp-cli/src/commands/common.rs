//! Shared command plumbing: profile resolution, client construction, id
//! prefix resolution, and table formatting.

use crisp_core::api::{ApiClient, ListQuery};
use crisp_core::config::ClientConfig;
use crisp_core::models::ListRecord;
use crisp_core::session::SessionContext;
use crisp_core::{RecordId, ResourceKind};
use serde_json::Value;

use crate::auth::KeyringTokenStore;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

pub struct AppContext {
    pub profile_name: String,
    pub config: ClientConfig,
    pub session: SessionContext<KeyringTokenStore>,
    pub client: ApiClient<KeyringTokenStore>,
}

/// Resolve the profile, hydrate the session from the keychain, and build the
/// API client all commands share.
pub fn build_context(explicit_profile: Option<&str>) -> Result<AppContext, CliError> {
    let profiles = CliProfilesConfig::load()?;
    let profile_name = profiles.resolve_profile_name(explicit_profile);
    let config = profiles
        .require_profile(&profile_name)?
        .clone()
        .with_env_overrides()?;

    let store = KeyringTokenStore::new(&profile_name);
    let session = SessionContext::init(store)?;
    let client = ApiClient::new(&config, session.clone())?;

    Ok(AppContext {
        profile_name,
        config,
        session,
        client,
    })
}

/// Parse repeatable `key=value` filter flags.
pub fn parse_filters(raw: &[String]) -> Result<Vec<(String, String)>, CliError> {
    raw.iter()
        .map(|entry| {
            let (key, value) = entry
                .split_once('=')
                .ok_or_else(|| CliError::InvalidFilter(entry.clone()))?;
            let key = key.trim();
            let value = value.trim();
            if key.is_empty() || value.is_empty() {
                return Err(CliError::InvalidFilter(entry.clone()));
            }
            Ok((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Table columns shown for each resource kind.
#[must_use]
pub const fn columns_for(kind: ResourceKind) -> &'static [&'static str] {
    match kind {
        ResourceKind::Users => &["username", "email", "role", "is_active"],
        ResourceKind::Organizations => &["name", "sector", "is_active"],
        ResourceKind::Indicators => &["value", "kind", "severity", "status"],
        ResourceKind::Incidents => &["title", "severity", "status"],
        ResourceKind::TrustRelationships => &["source", "target", "status"],
        ResourceKind::Notifications => &["title", "category", "is_read"],
    }
}

/// First eight characters of a record id, enough to disambiguate in a table.
#[must_use]
pub fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

fn truncate_cell(value: &str, max_chars: usize) -> String {
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let mut truncated: String = collapsed.chars().take(max_chars.saturating_sub(3)).collect();
        truncated.push_str("...");
        truncated
    }
}

#[must_use]
pub fn format_row<T: ListRecord>(record: &T, columns: &[&str]) -> String {
    let id = short_id(&record.record_id());
    let cells = columns
        .iter()
        .map(|key| {
            let cell = record
                .field(key)
                .unwrap_or_else(|| "-".to_string());
            format!("{:<24}", truncate_cell(&cell, 24))
        })
        .collect::<Vec<_>>()
        .join("  ");
    format!("{id:<8}  {}", cells.trim_end())
}

/// Resolve a full record ID from an exact ID or a unique prefix.
///
/// Full UUIDs pass through without a lookup; prefixes are matched against the
/// listing and must be unique.
pub async fn resolve_record_id(
    client: &ApiClient<KeyringTokenStore>,
    kind: ResourceKind,
    query: &str,
) -> Result<String, CliError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(CliError::EmptyRecordId);
    }
    if trimmed.parse::<RecordId>().is_ok() {
        return Ok(trimmed.to_string());
    }

    let rows: Vec<Value> = client.list(kind, &ListQuery::default()).await?;
    let matching: Vec<String> = rows
        .iter()
        .filter_map(|row| row.get("id").and_then(Value::as_str))
        .filter(|id| id.starts_with(trimmed))
        .map(str::to_string)
        .collect();

    match matching.len() {
        0 => Err(CliError::RecordNotFound(trimmed.to_string())),
        1 => Ok(matching.into_iter().next().unwrap_or_default()),
        _ => {
            let options = matching
                .iter()
                .take(3)
                .map(|id| short_id(id))
                .collect::<Vec<_>>()
                .join(", ");
            Err(CliError::AmbiguousRecordId(format!(
                "ID prefix '{trimmed}' is ambiguous; matches: {options}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use crisp_core::models::User;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_filters_splits_on_first_equals() {
        let parsed = parse_filters(&["status=active".to_string(), "kind=ip".to_string()]).unwrap();
        assert_eq!(
            parsed,
            vec![
                ("status".to_string(), "active".to_string()),
                ("kind".to_string(), "ip".to_string()),
            ]
        );
    }

    #[test]
    fn parse_filters_rejects_malformed_entries() {
        assert!(parse_filters(&["status".to_string()]).is_err());
        assert!(parse_filters(&["=active".to_string()]).is_err());
        assert!(parse_filters(&["status=".to_string()]).is_err());
    }

    #[test]
    fn short_id_takes_eight_chars() {
        assert_eq!(short_id("0198ab12-3456-7000-8000-000000000000"), "0198ab12");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn columns_cover_every_kind_with_known_fields() {
        let user = User::new("amara", "amara@example.com", "analyst");
        for key in columns_for(ResourceKind::Users) {
            assert!(user.field(key).is_some(), "missing field {key}");
        }
    }

    #[test]
    fn format_row_pads_and_truncates() {
        let user = User::new(
            "a-username-far-longer-than-one-table-cell",
            "amara@example.com",
            "analyst",
        );
        let row = format_row(&user, columns_for(ResourceKind::Users));
        assert!(row.contains("..."));
        assert!(row.contains("amara@example.com"));
        assert!(row.starts_with(&short_id(&user.id.as_str())));
    }
}
