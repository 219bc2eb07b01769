//! Configuration for huesync.
//!
//! TOML profiles (one per bridge), application-key resolution (env +
//! plaintext), and translation to `hue_core::BridgeConfig`. The CLI layers
//! its flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use hue_core::{BridgeConfig, TlsVerification};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no application key configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named bridge profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use: the override if given, else the
    /// configured default, else `"default"`.
    pub fn active_profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(String::from)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.into() })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named bridge profile.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Bridge address: a bare host (`192.168.1.20`) or a full URL.
    pub bridge: String,

    /// Application key (plaintext -- prefer `app_key_env`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_key: Option<String>,

    /// Environment variable name containing the application key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_key_env: Option<String>,

    /// Entertainment client key returned at pairing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_key: Option<String>,

    /// Path to a custom CA certificate (e.g. the Hue root CA).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Override timeout, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "lampctl", "huesync").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("huesync");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` (a missing file is fine) merged with `HUE_*` variables.
///
/// Nested keys use a double underscore: `HUE_DEFAULTS__TIMEOUT=5`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("HUE_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve the application key: the env var named by the profile first,
/// then the plaintext value.
pub fn resolve_app_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    if let Some(val) = profile
        .app_key_env
        .as_deref()
        .and_then(|name| std::env::var(name).ok())
    {
        return Ok(SecretString::from(val));
    }

    if let Some(ref key) = profile.app_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Parse a bridge address. Bare hosts get `https://`.
pub fn parse_bridge_url(bridge: &str) -> Result<Url, ConfigError> {
    let candidate = if bridge.contains("://") {
        bridge.to_owned()
    } else {
        format!("https://{bridge}")
    };
    candidate.parse().map_err(|_| ConfigError::Validation {
        field: "bridge".into(),
        reason: format!("invalid URL: {bridge}"),
    })
}

/// Build a `BridgeConfig` from a profile -- no CLI flag overrides.
///
/// A profile without an application key is valid (it has not been paired
/// yet); the key is simply left unset.
pub fn profile_to_bridge_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<BridgeConfig, ConfigError> {
    let url = parse_bridge_url(&profile.bridge)?;
    let app_key = resolve_app_key(profile, profile_name).ok();

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    Ok(BridgeConfig {
        url,
        app_key,
        tls,
        timeout,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    fn profile(bridge: &str) -> Profile {
        Profile {
            bridge: bridge.into(),
            ..Profile::default()
        }
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.timeout, 30);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn loads_profiles_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "home"

[defaults]
insecure = true

[profiles.home]
bridge = "192.168.1.20"
app_key = "abc"
timeout = 5
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.active_profile_name(None), "home");
        assert_eq!(cfg.active_profile_name(Some("other")), "other");

        let home = cfg.profile("home").unwrap();
        assert_eq!(home.bridge, "192.168.1.20");
        assert_eq!(home.timeout, Some(5));
        assert!(cfg.defaults.insecure);
        assert!(matches!(
            cfg.profile("nope"),
            Err(ConfigError::ProfileNotFound { .. })
        ));
    }

    #[test]
    fn save_then_load_preserves_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                app_key: Some("k".into()),
                ..profile("bridge.local")
            },
        );
        save_config_to(&cfg, &path).unwrap();

        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }

    #[test]
    fn bare_host_gets_https() {
        assert_eq!(
            parse_bridge_url("192.168.1.20").unwrap().as_str(),
            "https://192.168.1.20/"
        );
        assert_eq!(
            parse_bridge_url("http://127.0.0.1:8080").unwrap().as_str(),
            "http://127.0.0.1:8080/"
        );
        assert!(parse_bridge_url("http://").is_err());
    }

    #[test]
    fn app_key_env_wins_over_plaintext() {
        // Set by cargo for test binaries; fall back gracefully otherwise.
        let var = "CARGO_MANIFEST_DIR";
        let expected = std::env::var(var).unwrap_or_else(|_| "plain".into());
        let p = Profile {
            app_key: Some("plain".into()),
            app_key_env: Some(var.into()),
            ..profile("h")
        };
        assert_eq!(resolve_app_key(&p, "x").unwrap().expose_secret(), expected);
    }

    #[test]
    fn unset_env_falls_back_to_plaintext() {
        let p = Profile {
            app_key: Some("plain".into()),
            app_key_env: Some("HUESYNC_TEST_DEFINITELY_UNSET".into()),
            ..profile("h")
        };
        assert_eq!(resolve_app_key(&p, "x").unwrap().expose_secret(), "plain");
        assert!(matches!(
            resolve_app_key(&profile("h"), "x"),
            Err(ConfigError::NoCredentials { .. })
        ));
    }

    #[test]
    fn bridge_config_from_profile() {
        let defaults = Defaults::default();

        let unpaired = profile_to_bridge_config(&profile("h"), "p", &defaults).unwrap();
        assert!(unpaired.app_key.is_none());
        assert_eq!(unpaired.tls, TlsVerification::SystemDefaults);
        assert_eq!(unpaired.timeout, Duration::from_secs(30));

        let p = Profile {
            app_key: Some("k".into()),
            ca_cert: Some(PathBuf::from("/etc/hue-ca.pem")),
            timeout: Some(3),
            ..profile("h")
        };
        let cfg = profile_to_bridge_config(&p, "p", &defaults).unwrap();
        assert_eq!(cfg.app_key.unwrap().expose_secret(), "k");
        assert_eq!(cfg.tls, TlsVerification::CustomCa(PathBuf::from("/etc/hue-ca.pem")));
        assert_eq!(cfg.timeout, Duration::from_secs(3));

        let insecure = Defaults {
            insecure: true,
            ..Defaults::default()
        };
        let cfg = profile_to_bridge_config(&p, "p", &insecure).unwrap();
        assert_eq!(cfg.tls, TlsVerification::DangerAcceptInvalid);
    }
}
