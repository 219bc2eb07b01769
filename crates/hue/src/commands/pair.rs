//! Pairing: trade a link-button press for an application key.

use secrecy::ExposeSecret;
use tracing::info;

use hue_config::Profile;

use crate::cli::{GlobalOpts, PairArgs};
use crate::config::{self, Resolved};
use crate::error::CliError;
use crate::output;

pub async fn handle(resolved: &Resolved, args: PairArgs, global: &GlobalOpts) -> Result<(), CliError> {
    // Registration is unauthenticated; never send a stale key along.
    let mut bridge = resolved.bridge.clone();
    bridge.app_key = None;
    let client = bridge.client()?;

    let creds = client.register(&args.device_type).await?;
    info!(device_type = %args.device_type, "paired with bridge");

    if args.save {
        let mut cfg = config::load(global)?;
        let profile = cfg
            .profiles
            .entry(resolved.profile.clone())
            .or_insert_with(Profile::default);
        if global.bridge.is_some() || profile.bridge.is_empty() {
            profile.bridge = bridge.url.to_string();
        }
        profile.app_key = Some(creds.app_key.expose_secret().to_owned());
        profile.client_key = creds
            .client_key
            .as_ref()
            .map(|k| k.expose_secret().to_owned());
        config::save(global, &cfg)?;
        if !global.quiet {
            eprintln!("✓ Application key saved to profile '{}'", resolved.profile);
        }
    }

    // The key itself goes to stdout so it can be captured by scripts.
    output::print_output(creds.app_key.expose_secret(), global.quiet);
    Ok(())
}
