//! Resource command handlers.

use hue_api::BridgeClient;
use hue_core::Resource;

use crate::cli::{GlobalOpts, ResourcesArgs, ResourcesCommand};
use crate::error::CliError;
use crate::output::{self, ResourceRow};

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &BridgeClient,
    args: ResourcesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ResourcesCommand::List { rtype } => {
            let all = client.resources().await?;
            let snap = filter_by_type(all, rtype.as_deref());
            let out = output::render_list(
                global.output,
                &snap,
                |r| ResourceRow::from(r),
                |r| r.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ResourcesCommand::Get { id } => {
            let resource = client
                .resources()
                .await?
                .into_iter()
                .find(|r| r.id == id)
                .ok_or(CliError::NotFound { identifier: id })?;
            let out = output::render_single(
                global.output,
                &resource,
                output::resource_detail,
                |r| r.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

/// Keep resources of `rtype` (all when `None`), ordered by id.
pub fn filter_by_type(resources: Vec<Resource>, rtype: Option<&str>) -> Vec<Resource> {
    let mut out: Vec<_> = resources
        .into_iter()
        .filter(|r| rtype.is_none_or(|t| r.resource_type == t))
        .collect();
    out.sort_by(|a, b| a.id.cmp(&b.id));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_and_sorts() {
        let all = vec![
            Resource::new("b", "light"),
            Resource::new("z", "zone"),
            Resource::new("a", "light"),
        ];
        let ids = |v: Vec<Resource>| v.into_iter().map(|r| r.id).collect::<Vec<_>>();

        assert_eq!(ids(filter_by_type(all.clone(), Some("light"))), vec!["a", "b"]);
        assert_eq!(ids(filter_by_type(all, None)), vec!["a", "b", "z"]);
    }
}
