//! `crisp config` subcommands.

use crisp_core::config::{ClientConfig, EnvelopeShape};

use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

pub struct InitOptions {
    pub base_url: Option<String>,
    pub envelope: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub items_per_page: Option<usize>,
    pub no_activate: bool,
}

fn parse_envelope(value: &str) -> Result<EnvelopeShape, CliError> {
    match value.trim().to_lowercase().as_str() {
        "bare" => Ok(EnvelopeShape::Bare),
        "data" => Ok(EnvelopeShape::Data),
        "keyed" => Ok(EnvelopeShape::Keyed),
        other => Err(CliError::Config(format!(
            "unknown envelope shape '{other}' (expected bare, data, or keyed)"
        ))),
    }
}

pub fn run_config_init(explicit_profile: Option<&str>, options: &InitOptions) -> Result<(), CliError> {
    let mut profiles = CliProfilesConfig::load()?;
    let profile_name = profiles.resolve_profile_name(explicit_profile);

    let mut config = match (profiles.profile(&profile_name), &options.base_url) {
        (Some(existing), _) => existing.clone(),
        (None, Some(base_url)) => ClientConfig::new(base_url.clone())?,
        (None, None) => {
            return Err(CliError::Config(format!(
                "Profile '{profile_name}' does not exist yet; --base-url is required"
            )))
        }
    };

    if let Some(base_url) = &options.base_url {
        config.base_url.clone_from(base_url);
    }
    if let Some(envelope) = &options.envelope {
        config.envelope = parse_envelope(envelope)?;
    }
    if let Some(interval) = options.poll_interval_secs {
        config.poll_interval_secs = interval;
    }
    if let Some(items) = options.items_per_page {
        config.items_per_page = items;
    }
    let config = config.validated()?;

    profiles.upsert_profile(&profile_name, config);
    if !options.no_activate {
        profiles.active_profile = Some(profile_name.clone());
    }
    let path = profiles.save()?;
    println!("Saved profile '{profile_name}' to {}", path.display());
    Ok(())
}

pub fn run_config_show(explicit_profile: Option<&str>) -> Result<(), CliError> {
    let profiles = CliProfilesConfig::load()?;
    let profile_name = profiles.resolve_profile_name(explicit_profile);
    let config = profiles.require_profile(&profile_name)?;
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_envelope_accepts_known_shapes() {
        assert_eq!(parse_envelope("bare").unwrap(), EnvelopeShape::Bare);
        assert_eq!(parse_envelope(" Data ").unwrap(), EnvelopeShape::Data);
        assert_eq!(parse_envelope("KEYED").unwrap(), EnvelopeShape::Keyed);
        assert!(parse_envelope("wrapped").is_err());
    }
}
