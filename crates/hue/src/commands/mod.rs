//! Command dispatch: bridges CLI args -> hue-core -> output formatting.

pub mod config_cmd;
pub mod emulate;
pub mod pair;
pub mod resources;
pub mod update;
pub mod util;
pub mod watch;

use hue_api::BridgeClient;

use crate::cli::{Command, GlobalOpts};
use crate::config::Resolved;
use crate::error::CliError;

/// Dispatch a bridge-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    // Pairing is the one bridge command that works without a key.
    if let Command::Pair(args) = cmd {
        return pair::handle(resolved, args, global).await;
    }

    resolved.require_app_key()?;
    let client: BridgeClient = resolved.bridge.client()?;

    let result = match cmd {
        Command::Resources(args) => resources::handle(&client, args, global).await,
        Command::Update(args) => update::handle(&client, args, global).await,
        Command::Watch(args) => watch::handle(&client, args, global).await,
        // Handled before a bridge is resolved.
        Command::Pair(_) | Command::Emulate(_) | Command::Config(_) | Command::Completions(_) => {
            Ok(())
        }
    };

    // A rejected key gets named after the profile it came from.
    result.map_err(|err| match err {
        CliError::Forbidden { .. } => CliError::Forbidden {
            profile: resolved.profile.clone(),
        },
        other => other,
    })
}
