//! Persistent CLI profile configuration.
//!
//! Each profile is one [`ClientConfig`]; the file also remembers which
//! profile is active so most invocations need no `--profile` flag.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crisp_core::config::ClientConfig;
use serde::{Deserialize, Serialize};

use crate::error::CliError;

const CONFIG_FILE_NAME: &str = "cli-config.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliProfilesConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    #[serde(default)]
    pub active_profile: Option<String>,
    #[serde(default)]
    pub profiles: BTreeMap<String, ClientConfig>,
}

const fn default_config_version() -> u32 {
    1
}

pub fn default_config_path() -> Result<PathBuf, CliError> {
    let base = dirs::config_dir()
        .ok_or_else(|| CliError::Config("Failed to resolve CLI config directory".to_string()))?;
    Ok(base.join("crisp").join(CONFIG_FILE_NAME))
}

fn normalize_profile_name(value: Option<&str>) -> Option<String> {
    let value = value?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl CliProfilesConfig {
    pub fn load() -> Result<Self, CliError> {
        Self::load_from_path(&default_config_path()?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, CliError> {
        if !path.exists() {
            return Ok(Self {
                version: default_config_version(),
                ..Self::default()
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|error| {
            CliError::Config(format!("Failed to read config at {}: {error}", path.display()))
        })?;
        serde_json::from_str(&raw).map_err(|error| {
            CliError::Config(format!("Failed to parse config at {}: {error}", path.display()))
        })
    }

    pub fn save(&self) -> Result<PathBuf, CliError> {
        let path = default_config_path()?;
        self.save_to_path(&path)?;
        Ok(path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), CliError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                CliError::Config(format!(
                    "Failed to create config directory {}: {error}",
                    parent.display()
                ))
            })?;
        }

        let serialized = serde_json::to_string_pretty(self)?;
        std::fs::write(path, serialized).map_err(|error| {
            CliError::Config(format!("Failed to write config at {}: {error}", path.display()))
        })
    }

    /// Explicit flag wins, then `CRISP_PROFILE`, then the active profile.
    pub fn resolve_profile_name(&self, explicit: Option<&str>) -> String {
        if let Some(profile) = normalize_profile_name(explicit) {
            return profile;
        }
        if let Some(profile) =
            normalize_profile_name(std::env::var("CRISP_PROFILE").ok().as_deref())
        {
            return profile;
        }
        if let Some(profile) = normalize_profile_name(self.active_profile.as_deref()) {
            return profile;
        }
        "default".to_string()
    }

    pub fn profile(&self, name: &str) -> Option<&ClientConfig> {
        self.profiles.get(name)
    }

    pub fn require_profile(&self, name: &str) -> Result<&ClientConfig, CliError> {
        self.profile(name).ok_or_else(|| {
            CliError::Config(format!(
                "Profile '{name}' is not configured; run `crisp config init --base-url <URL>`"
            ))
        })
    }

    pub fn upsert_profile(&mut self, name: &str, config: ClientConfig) {
        self.profiles.insert(name.to_string(), config);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn temp_config_path() -> PathBuf {
        std::env::temp_dir().join(format!(
            "crisp-cli-config-test-{}.json",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map_or(0, |duration| duration.as_nanos())
        ))
    }

    #[test]
    fn config_round_trips_profiles() {
        let path = temp_config_path();

        let mut config = CliProfilesConfig {
            version: 1,
            active_profile: Some("default".to_string()),
            profiles: BTreeMap::new(),
        };
        config.upsert_profile(
            "default",
            ClientConfig::new("https://crisp.example.com").unwrap(),
        );

        config.save_to_path(&path).unwrap();
        let loaded = CliProfilesConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(
            loaded.require_profile("default").unwrap().base_url,
            "https://crisp.example.com"
        );

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_file_yields_empty_config() {
        let path = temp_config_path();
        let loaded = CliProfilesConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded.version, 1);
        assert!(loaded.profiles.is_empty());
    }

    #[test]
    fn resolve_profile_name_prefers_explicit_then_active() {
        let config = CliProfilesConfig {
            version: 1,
            active_profile: Some("work".to_string()),
            profiles: BTreeMap::new(),
        };
        assert_eq!(config.resolve_profile_name(Some("staging")), "staging");
        assert_eq!(config.resolve_profile_name(Some("  ")), "work");
        assert_eq!(config.resolve_profile_name(None), "work");

        let empty = CliProfilesConfig::default();
        assert_eq!(empty.resolve_profile_name(None), "default");
    }

    #[test]
    fn require_profile_reports_missing_name() {
        let config = CliProfilesConfig::default();
        let error = config.require_profile("ghost").unwrap_err();
        assert!(error.to_string().contains("ghost"));
    }
}
