//! Shared execution context for tasks.
use std::sync::{Arc, Mutex};

use crate::config::Config;
use crate::exec::Executor;
use crate::logging::Log;
use crate::projection::Projection;
use crate::state::RunState;

use super::RunReport;

/// Shared context for task execution.
///
/// Everything except the accumulated report is immutable for the run; the
/// projection has already passed collision validation when a context exists.
pub struct Context {
    /// Loaded configuration.
    pub config: Arc<Config>,
    /// Validated projection of every live root.
    pub projection: Arc<Projection>,
    /// Links recorded by the previous live run.
    pub previous: Arc<RunState>,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
    /// Whether to process targets in parallel using Rayon.
    pub parallel: bool,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    report: Mutex<RunReport>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &"<Config>")
            .field("target", &self.projection.target)
            .field("previous_links", &self.previous.links.len())
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("parallel", &self.parallel)
            .field("executor", &"<dyn Executor>")
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Creates a new context for task execution.
    #[must_use]
    pub fn new(
        config: Arc<Config>,
        projection: Arc<Projection>,
        previous: Arc<RunState>,
        log: Arc<dyn Log>,
        executor: Arc<dyn Executor>,
    ) -> Self {
        Self {
            config,
            projection,
            previous,
            log,
            dry_run: false,
            parallel: true,
            executor,
            report: Mutex::new(RunReport::default()),
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

    /// Merge a task's report into the run report.
    pub fn record(&self, report: RunReport) {
        *self
            .report
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) += report;
    }

    /// Take the accumulated run report, sorted.
    #[must_use]
    pub fn into_report(self) -> RunReport {
        let mut report = self
            .report
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        report.sort();
        report
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tasks::test_helpers::{TestTree, make_context};
    use std::path::PathBuf;

    #[test]
    fn record_merges_reports() {
        let tree = TestTree::new();
        let (ctx, _log) = make_context(&tree, false);
        let mut a = RunReport::default();
        a.removed.push(PathBuf::from("/b"));
        let mut b = RunReport::default();
        b.removed.push(PathBuf::from("/a"));
        ctx.record(a);
        ctx.record(b);
        let report = ctx.into_report();
        assert_eq!(report.removed, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
    }

    #[test]
    fn debug_format_includes_key_fields() {
        let tree = TestTree::new();
        let (ctx, _log) = make_context(&tree, true);
        let debug = format!("{ctx:?}");
        assert!(debug.contains("Context"));
        assert!(debug.contains("dry_run: true"));
    }
}
