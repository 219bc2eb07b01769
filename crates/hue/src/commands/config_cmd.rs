//! Config subcommand handlers.

use hue_config::{Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "********";

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(config::load(global)?);
            let out = output::render_single(
                global.output,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_else(|e| format!("{c:#?}\n# {e}")),
                |c| c.active_profile_name(None),
            )?;
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load(global)?;
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();

            set_key(profile, &key, value)?;

            config::save(global, &cfg)?;
            if !global.quiet {
                eprintln!("✓ Set {key} on profile '{profile_name}'");
            }
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load(global)?;
            let default = cfg.active_profile_name(None);
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: hue config set bridge <address>");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if *name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load(global)?;

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save(global, &cfg)?;
            if !global.quiet {
                eprintln!("✓ Default profile set to '{name}'");
            }
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path(global).display());
            Ok(())
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn set_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "bridge" => {
            hue_config::parse_bridge_url(&value)?;
            profile.bridge = value;
        }
        "app_key" | "app-key" => profile.app_key = Some(value),
        "app_key_env" | "app-key-env" => profile.app_key_env = Some(value),
        "client_key" | "client-key" => profile.client_key = Some(value),
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        "insecure" => {
            profile.insecure = Some(value.parse().map_err(|_| CliError::Validation {
                field: "insecure".into(),
                reason: "must be 'true' or 'false'".into(),
            })?);
        }
        "timeout" => {
            profile.timeout = Some(value.parse().map_err(|_| CliError::Validation {
                field: "timeout".into(),
                reason: "must be a number (seconds)".into(),
            })?);
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: bridge, app_key, \
                     app_key_env, client_key, ca_cert, insecure, timeout"
                ),
            });
        }
    }
    Ok(())
}

/// Copy of `cfg` with stored keys masked.
fn redacted(mut cfg: Config) -> Config {
    for profile in cfg.profiles.values_mut() {
        for secret in [&mut profile.app_key, &mut profile.client_key] {
            if secret.is_some() {
                *secret = Some(REDACTED.into());
            }
        }
    }
    cfg
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn set_key_validates_values() {
        let mut p = Profile::default();
        set_key(&mut p, "bridge", "192.168.1.20".into()).unwrap();
        set_key(&mut p, "timeout", "7".into()).unwrap();
        set_key(&mut p, "insecure", "true".into()).unwrap();
        assert_eq!(p.bridge, "192.168.1.20");
        assert_eq!(p.timeout, Some(7));
        assert_eq!(p.insecure, Some(true));

        assert!(set_key(&mut p, "timeout", "soon".into()).is_err());
        assert!(set_key(&mut p, "colour", "red".into()).is_err());
    }

    #[test]
    fn show_masks_keys() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "home".into(),
            Profile {
                bridge: "h".into(),
                app_key: Some("secret".into()),
                ..Profile::default()
            },
        );
        let shown = redacted(cfg);
        let home = &shown.profiles["home"];
        assert_eq!(home.app_key.as_deref(), Some(REDACTED));
        assert_eq!(home.client_key, None);
    }
}
