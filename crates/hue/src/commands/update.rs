//! Partial update of one resource.

use hue_api::model::{Color, ColorXy, Dimming, Dynamics, Metadata, On, ResourceRef};
use hue_api::BridgeClient;
use hue_core::Resource;
use tabled::Tabled;

use crate::cli::{GlobalOpts, UpdateArgs};
use crate::commands::util;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct RefRow {
    #[tabled(rename = "ID")]
    rid: String,
    #[tabled(rename = "Type")]
    rtype: String,
}

impl From<&ResourceRef> for RefRow {
    fn from(r: &ResourceRef) -> Self {
        Self {
            rid: r.rid.clone(),
            rtype: r.rtype.clone(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &BridgeClient,
    args: UpdateArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let patch = match args.from_file {
        Some(ref path) => util::read_json_file(path, "from-file")?,
        None => patch_from_flags(&args),
    };
    if patch == Resource::default() {
        return Err(CliError::Validation {
            field: "update".into(),
            reason: "nothing to change; pass --on, --off, --brightness, --xy, --transition, \
                     --name or --from-file"
                .into(),
        });
    }

    let updated = client.update(&args.rtype, &args.id, &patch).await?;
    let out = output::render_list(
        global.output,
        &updated,
        |r| RefRow::from(r),
        |r| r.rid.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Sparse resource carrying only the groups named on the command line.
pub fn patch_from_flags(args: &UpdateArgs) -> Resource {
    let on = match (args.on, args.off) {
        (true, _) => Some(On { on: true }),
        (false, true) => Some(On { on: false }),
        (false, false) => None,
    };
    Resource {
        on,
        dimming: args.brightness.map(|brightness| Dimming { brightness }),
        color: args.xy.map(|(x, y)| Color {
            xy: Some(ColorXy { x, y }),
        }),
        dynamics: args.transition.map(|duration| Dynamics { duration }),
        metadata: args.name.clone().map(|name| Metadata { name }),
        ..Resource::default()
    }
}
