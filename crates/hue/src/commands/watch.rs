//! Follow the event stream and print resources as they change.

use std::collections::HashMap;

use hue_api::BridgeClient;
use hue_core::{CoreError, Resource, Watcher};
use tracing::{debug, info};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::commands::resources::filter_by_type;
use crate::error::CliError;
use crate::output::{self, ResourceRow};

pub async fn handle(
    client: &BridgeClient,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let watcher = Watcher::connect(client).await?;
    let mut changes = watcher.changes();

    let mut previous = index(watcher.snapshot());
    if args.initial {
        let initial = filter_by_type(previous.values().cloned().collect(), args.rtype.as_deref());
        let out = output::render_list(
            global.output,
            &initial,
            |r| ResourceRow::from(r),
            |r| r.id.clone(),
        )?;
        output::print_output(&out, global.quiet);
    }

    let mut printed = 0_u64;
    let result = loop {
        if args.count.is_some_and(|limit| printed >= limit) {
            break Ok(());
        }

        let revision = tokio::select! {
            r = changes.next() => r,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break Ok(());
            }
        };
        let revision = match revision {
            Ok(rev) => rev,
            Err(CoreError::WatcherClosed) => break Err(CliError::StreamClosed),
            Err(e) => break Err(e.into()),
        };
        debug!(revision, "mirror changed");

        let current = index(watcher.snapshot());
        for resource in changed(&previous, &current, args.rtype.as_deref()) {
            if args.count.is_some_and(|limit| printed >= limit) {
                break;
            }
            output::print_output(&output::render_event(global.output, resource)?, global.quiet);
            printed += 1;
        }
        previous = current;
    };

    watcher.close().await;
    result
}

fn index(snapshot: Vec<Resource>) -> HashMap<String, Resource> {
    snapshot.into_iter().map(|r| (r.id.clone(), r)).collect()
}

/// Resources in `current` that differ from `previous`, ordered by id.
fn changed<'a>(
    previous: &HashMap<String, Resource>,
    current: &'a HashMap<String, Resource>,
    rtype: Option<&str>,
) -> Vec<&'a Resource> {
    let mut out: Vec<_> = current
        .values()
        .filter(|r| rtype.is_none_or(|t| r.resource_type == t))
        .filter(|r| previous.get(&r.id) != Some(*r))
        .collect();
    out.sort_by(|a, b| a.id.cmp(&b.id));
    out
}
