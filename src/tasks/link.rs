//! Link every claimed target to its source.
use anyhow::Result;

use super::{Context, Phase, Task, TaskResult, link_resources};
use crate::projection::Projection;
use crate::resources::symlink::SymlinkResource;

/// One resource per claimed target, in target order.
pub(super) fn claimed_resources(projection: &Projection) -> Vec<SymlinkResource> {
    projection
        .claimed()
        .into_iter()
        .map(|(target, source)| SymlinkResource::new(source, target))
        .collect()
}

/// Create the relative link for every claimed target.
#[derive(Debug)]
pub struct LinkTargets;

impl Task for LinkTargets {
    fn name(&self) -> &'static str {
        "Link targets"
    }

    fn phase(&self) -> Phase {
        Phase::Link
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let resources = claimed_resources(&ctx.projection);
        ctx.log.debug(&format!("{} targets claimed", resources.len()));
        let report = link_resources(ctx, resources)?;
        let stats = report.stats;
        ctx.record(report);
        Ok(stats.finish(ctx))
    }
}
