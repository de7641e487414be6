//! Drive a run through its phases.
//!
//! `Init` resolves the target and roots, `Validate` computes every target set
//! and rejects collisions. Only then does any task touch the filesystem, so a
//! failure in either phase leaves everything as it was.
use std::sync::Arc;

use anyhow::Result;

use crate::config::Config;
use crate::exec::Executor;
use crate::logging::Log;
use crate::projection::Projection;
use crate::state::RunState;
use crate::tasks::{self, Context, Phase, RunReport, Task};

/// Sequences the phases of one `link` or `check` run.
pub struct Orchestrator {
    config: Arc<Config>,
    log: Arc<dyn Log>,
    executor: Arc<dyn Executor>,
    dry_run: bool,
    parallel: bool,
    phase: Phase,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("target", &self.config.target)
            .field("dry_run", &self.dry_run)
            .field("parallel", &self.parallel)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Create an orchestrator in the `Init` phase.
    #[must_use]
    pub fn new(config: Config, log: Arc<dyn Log>, executor: Arc<dyn Executor>) -> Self {
        Self {
            config: Arc::new(config),
            log,
            executor,
            dry_run: false,
            parallel: true,
            phase: Phase::Init,
        }
    }

    /// Set dry-run mode.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set parallel processing.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// The phase reached so far.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// The full run: clean, link, record state, post-action.
    ///
    /// # Errors
    ///
    /// Returns the configuration error that stopped `Init` or `Validate`.
    /// Nothing has been modified in that case.
    pub fn run(&mut self) -> Result<RunReport> {
        self.execute(&tasks::all_link_tasks())
    }

    /// Plan only: `Init`, `Validate`, then a dry run of clean and link.
    /// Never writes the run state and never runs the post-action.
    ///
    /// # Errors
    ///
    /// Returns the configuration error that stopped `Init` or `Validate`.
    pub fn check(&mut self) -> Result<RunReport> {
        self.dry_run = true;
        self.execute(&tasks::all_check_tasks())
    }

    fn execute(&mut self, tasks: &[Box<dyn Task>]) -> Result<RunReport> {
        let ctx = self.prepare()?;
        for task in tasks {
            if task.phase() != self.phase {
                self.enter(task.phase());
            }
            tasks::execute(task.as_ref(), &ctx);
        }
        self.enter(Phase::Done);
        Ok(ctx.into_report())
    }

    /// Run `Init` and `Validate`, producing the context for the mutating
    /// phases.
    ///
    /// # Errors
    ///
    /// Returns an error if the target root or a required source root is
    /// missing, a root cannot be walked, or targets collide.
    pub fn prepare(&mut self) -> Result<Context> {
        self.try_prepare().inspect_err(|_| self.enter(Phase::Failed))
    }

    fn try_prepare(&mut self) -> Result<Context> {
        self.enter(Phase::Init);
        let target = self.config.resolve_target()?;
        let roots = self.config.resolve_roots(&target, self.log.as_ref())?;
        self.log.debug(&format!("target: {}", target.display()));

        self.enter(Phase::Validate);
        self.log.stage("Validating targets");
        let projection = Projection::compute(&target, &roots, &self.config.skip)?;
        projection.validate()?;
        self.log.info(&format!(
            "{} targets from {} roots",
            projection.len(),
            roots.len()
        ));

        let previous = self.load_previous();
        Ok(Context::new(
            Arc::clone(&self.config),
            Arc::new(projection),
            Arc::new(previous),
            Arc::clone(&self.log),
            Arc::clone(&self.executor),
        )
        .with_dry_run(self.dry_run)
        .with_parallel(self.parallel))
    }

    /// The previous run's record; unreadable state only disables stale
    /// cleanup for this run.
    fn load_previous(&self) -> RunState {
        let Some(path) = &self.config.state_file else {
            return RunState::default();
        };
        RunState::load(path).unwrap_or_else(|e| {
            self.log
                .warn(&format!("ignoring run state {}: {e:#}", path.display()));
            RunState::default()
        })
    }

    fn enter(&mut self, phase: Phase) {
        if phase != self.phase {
            self.log.debug(&format!("phase: {} -> {phase}", self.phase));
        }
        self.phase = phase;
    }
}
