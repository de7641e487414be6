//! Named tasks that drive the clean, link, and post-action phases.
pub mod clean;
pub mod link;
pub mod post_action;
mod processing;
pub mod run_state;

pub use processing::{
    Action, Context, LinkDecision, RunReport, TaskResult, TaskStats, clean_resources,
    link_resources, remove_stale,
};

use anyhow::Result;

use crate::logging::TaskStatus;

/// States of a reconciliation run, in order.
///
/// `Failed` is reachable only from `Init` and `Validate`; once targets are
/// being touched, per-target problems are warnings and the run ends `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    /// Load configuration and resolve roots.
    Init,
    /// Compute target sets and check for collisions.
    Validate,
    /// Remove stale links and clear occupied targets.
    Clean,
    /// Create links and record the run state.
    Link,
    /// Run the external post-action.
    PostAction,
    /// Finished, possibly with per-target warnings.
    Done,
    /// Aborted before any mutation.
    Failed,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Init => "init",
            Self::Validate => "validate",
            Self::Clean => "clean",
            Self::Link => "link",
            Self::PostAction => "post-action",
            Self::Done => "done",
            Self::Failed => "failed",
        })
    }
}

/// A named, executable task.
pub trait Task: Send + Sync {
    /// Human-readable task name.
    fn name(&self) -> &str;

    /// The run phase this task belongs to.
    fn phase(&self) -> Phase;

    /// Whether this task applies to the current configuration.
    fn should_run(&self, ctx: &Context) -> bool;

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if the task as a whole cannot complete. Failures of
    /// individual targets are logged and counted instead.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// Tasks run by `link`, in order: clean, link, record state, post-action.
#[must_use]
pub fn all_link_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(clean::CleanTargets),
        Box::new(link::LinkTargets),
        Box::new(run_state::RecordRunState),
        Box::new(post_action::RunPostAction),
    ]
}

/// Tasks run by `check`: the plan only, never the side effects.
#[must_use]
pub fn all_check_tasks() -> Vec<Box<dyn Task>> {
    vec![Box::new(clean::CleanTargets), Box::new(link::LinkTargets)]
}

/// Execute a task, recording the result in the logger.
pub fn execute(task: &dyn Task, ctx: &Context) {
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping task: {} (not applicable)", task.name()));
        ctx.log
            .record_task(task.name(), TaskStatus::NotApplicable, None);
        return;
    }

    ctx.log.stage(task.name());

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_task(task.name(), TaskStatus::Ok, None);
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log
                .record_task(task.name(), TaskStatus::Skipped, Some(&reason));
        }
        Ok(TaskResult::DryRun) => {
            ctx.log.record_task(task.name(), TaskStatus::DryRun, None);
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e:#}", task.name()));
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&format!("{e:#}")));
        }
    }
}

/// Shared helpers for task unit tests.
#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub mod test_helpers {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use crate::config::{Config, DEFAULT_SKIP, SourceRoot};
    use crate::exec::{Executor, MockExecutor};
    use crate::logging::Log;
    use crate::logging::test_helpers::CaptureLog;
    use crate::projection::Projection;
    use crate::resources::symlink::SymlinkResource;
    use crate::state::RunState;

    use super::Context;

    /// A temporary home directory with a `dots` namespace root inside it.
    #[derive(Debug)]
    pub struct TestTree {
        _dir: tempfile::TempDir,
        /// Canonical home directory, used as the target root.
        pub home: PathBuf,
        /// Namespace root inside `home`.
        pub dots: PathBuf,
    }

    impl TestTree {
        /// Create the tree with an empty `dots` directory.
        pub fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let home = dunce::canonicalize(dir.path()).unwrap().join("home");
            let dots = home.join("dots");
            std::fs::create_dir_all(&dots).unwrap();
            Self {
                _dir: dir,
                home,
                dots,
            }
        }

        /// Write a source file (relative to `dots`) with its path as content.
        pub fn write(&self, rel: &str) -> PathBuf {
            let path = self.dots.join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, rel).unwrap();
            path
        }

        /// A resource linking `target_rel` under home to `source_rel` under
        /// dots, creating the source file.
        pub fn resource(&self, source_rel: &str, target_rel: &str) -> SymlinkResource {
            let source = self.write(source_rel);
            SymlinkResource::new(source, self.home.join(target_rel))
        }

        /// Absolute path of `rel` under home.
        pub fn target(&self, rel: impl AsRef<Path>) -> PathBuf {
            self.home.join(rel)
        }
    }

    /// Context over the tree's current contents with a mock executor that
    /// accepts no calls.
    pub fn make_context(tree: &TestTree, dry_run: bool) -> (Context, Arc<CaptureLog>) {
        make_context_with(tree, dry_run, RunState::default(), MockExecutor::new())
    }

    /// Context with an explicit previous run state and executor.
    pub fn make_context_with(
        tree: &TestTree,
        dry_run: bool,
        previous: RunState,
        executor: impl Executor + 'static,
    ) -> (Context, Arc<CaptureLog>) {
        let config = Config::new(
            &tree.home,
            vec![SourceRoot::namespace(&tree.dots)],
            DEFAULT_SKIP,
        )
        .unwrap();
        let projection = Projection::compute(&tree.home, &config.roots, &config.skip).unwrap();
        let log = Arc::new(CaptureLog::default());
        let ctx = Context::new(
            Arc::new(config),
            Arc::new(projection),
            Arc::new(previous),
            Arc::clone(&log) as Arc<dyn Log>,
            Arc::new(executor),
        )
        .with_dry_run(dry_run)
        .with_parallel(false);
        (ctx, log)
    }
}
