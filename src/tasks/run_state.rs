//! Persist the claimed targets so the next run can remove stale links.
use anyhow::Result;

use super::{Context, Phase, Task, TaskResult};
use crate::state::RunState;

/// Write the run state file after a live run.
#[derive(Debug)]
pub struct RecordRunState;

impl Task for RecordRunState {
    fn name(&self) -> &'static str {
        "Record run state"
    }

    fn phase(&self) -> Phase {
        Phase::Link
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.config.state_file.is_some()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let Some(path) = &ctx.config.state_file else {
            return Ok(TaskResult::Skipped("no state file configured".to_string()));
        };

        if ctx.dry_run {
            ctx.log.dry_run(&format!(
                "would record {} links in {}",
                ctx.projection.len(),
                path.display()
            ));
            return Ok(TaskResult::DryRun);
        }

        let state = RunState::from_projection(&ctx.projection);
        if let Err(e) = state.save(path) {
            ctx.log.warn(&format!("{e:#}"));
            return Ok(TaskResult::Skipped(
                "run state could not be written".to_string(),
            ));
        }
        ctx.log.info(&format!(
            "recorded {} links in {}",
            state.links.len(),
            path.display()
        ));
        Ok(TaskResult::Ok)
    }
}
