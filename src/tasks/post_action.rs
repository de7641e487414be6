//! Best-effort external command after linking (e.g. `hyprctl reload`).
use anyhow::Result;

use super::{Context, Phase, Task, TaskResult};
use crate::error::PostActionError;

/// Run the configured post-action. Never fails the run: a missing program,
/// a spawn error, or a non-zero exit is reported as a warning.
#[derive(Debug)]
pub struct RunPostAction;

impl Task for RunPostAction {
    fn name(&self) -> &'static str {
        "Run post-action"
    }

    fn phase(&self) -> Phase {
        Phase::PostAction
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.config.post_action.is_some()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let Some(action) = &ctx.config.post_action else {
            return Ok(TaskResult::Skipped("no post-action configured".to_string()));
        };
        let program = action.program.as_str();
        let command_line = std::iter::once(program)
            .chain(action.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");

        if ctx.dry_run {
            ctx.log.dry_run(&format!("would run {command_line}"));
            return Ok(TaskResult::DryRun);
        }

        if !ctx.executor.which(program) {
            let err = PostActionError::NotFound {
                program: program.to_string(),
            };
            ctx.log.warn(&err.to_string());
            return Ok(TaskResult::Skipped(format!("{program} not found")));
        }

        let args: Vec<&str> = action.args.iter().map(String::as_str).collect();
        let err = match ctx.executor.run_unchecked(program, &args) {
            Ok(result) if result.success => {
                ctx.log.info(&format!("ran {command_line}"));
                return Ok(TaskResult::Ok);
            }
            Ok(result) => PostActionError::Failed {
                program: program.to_string(),
                code: result.code,
                stderr: result.stderr.trim().to_string(),
            },
            Err(e) => PostActionError::Spawn {
                program: program.to_string(),
                message: format!("{e:#}"),
            },
        };
        ctx.log.warn(&err.to_string());
        Ok(TaskResult::Skipped(format!("{program} did not succeed")))
    }
}
