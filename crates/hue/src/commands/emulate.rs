//! Serve a fake bridge until interrupted.

use hue_bridgetest::{FakeBridge, USERNAME};
use hue_core::Resource;
use tracing::info;

use crate::cli::{EmulateArgs, GlobalOpts};
use crate::commands::util;
use crate::error::CliError;

pub async fn handle(args: EmulateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let seed: Vec<Resource> = match args.seed {
        Some(ref path) => util::read_json_file(path, "seed")?,
        None => Vec::new(),
    };

    let bridge = FakeBridge::bind(args.listen).await?;
    for resource in seed {
        bridge.add_resource(resource);
    }
    if args.press_button {
        bridge.press_button();
    }

    if !global.quiet {
        eprintln!("Fake bridge listening on {}", bridge.url());
        eprintln!("  Resources:       {}", bridge.resources().len());
        eprintln!("  Application key: {USERNAME}");
        eprintln!("  Press Ctrl-C to stop.");
    }

    tokio::signal::ctrl_c().await?;
    info!("stopping fake bridge");
    bridge.shutdown().await;
    Ok(())
}
