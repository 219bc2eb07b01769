//! Flag overrides on top of `hue-config` profiles.
//!
//! The single place where CLI flags, the TOML profile, and `HUE_*`
//! variables are folded into a `hue_core::BridgeConfig`.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use hue_config::{Config, Profile};
use hue_core::{BridgeConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Config file in effect: `--config` or the platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(hue_config::config_path)
}

/// Load the config file, falling back to defaults if it is missing.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(hue_config::load_config_from(&config_path(global))?)
}

pub fn save(global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    Ok(hue_config::save_config_to(cfg, &config_path(global))?)
}

pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    cfg.active_profile_name(global.profile.as_deref())
}

/// Comma-separated profile names for help text.
pub fn available_profiles(cfg: &Config) -> String {
    let mut names: Vec<_> = cfg.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}

/// Resolved connection settings plus the profile they came from.
pub struct Resolved {
    pub bridge: BridgeConfig,
    pub profile: String,
}

impl Resolved {
    /// Fail early when a command needs an application key and none is set.
    pub fn require_app_key(&self) -> Result<(), CliError> {
        if self.bridge.app_key.is_none() {
            return Err(CliError::NoCredentials {
                profile: self.profile.clone(),
            });
        }
        Ok(())
    }
}

/// Build a `BridgeConfig` from the config file, profile, and CLI overrides.
///
/// Precedence: flag / `HUE_*` variable, then profile, then `[defaults]`.
pub fn resolve(global: &GlobalOpts, cfg: &Config) -> Result<Resolved, CliError> {
    let profile_name = active_profile_name(global, cfg);

    let mut bridge = match cfg.profiles.get(&profile_name) {
        Some(profile) => apply_profile(profile, &profile_name, global, cfg)?,
        None => {
            // No profile: the bridge flag alone is enough.
            let Some(address) = global.bridge.as_deref() else {
                if global.profile.is_some() {
                    return Err(CliError::ProfileNotFound {
                        name: profile_name,
                        available: available_profiles(cfg),
                    });
                }
                return Err(CliError::NoConfig {
                    path: config_path(global).display().to_string(),
                });
            };
            let mut bridge = BridgeConfig::new(hue_config::parse_bridge_url(address)?);
            bridge.timeout = Duration::from_secs(cfg.defaults.timeout);
            if cfg.defaults.insecure {
                bridge.tls = TlsVerification::DangerAcceptInvalid;
            }
            bridge
        }
    };

    if let Some(ref key) = global.app_key {
        bridge.app_key = Some(SecretString::from(key.clone()));
    }
    if global.insecure {
        bridge.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        bridge.timeout = Duration::from_secs(secs);
    }

    Ok(Resolved {
        bridge,
        profile: profile_name,
    })
}

fn apply_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<BridgeConfig, CliError> {
    let mut bridge = hue_config::profile_to_bridge_config(profile, profile_name, &cfg.defaults)?;
    if let Some(ref address) = global.bridge {
        bridge.url = hue_config::parse_bridge_url(address)?;
    }
    Ok(bridge)
}
