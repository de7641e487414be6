//! Generic per-target processing loop: check state, decide, apply, collect stats.
//!
//! - [`apply`] — single-target processing (`link_single`, `clean_single`, `remove_stale`)
//! - [`context`] — shared execution context for tasks
//! - [`parallel`] — Rayon-based fan-out over targets

mod apply;
pub mod context;
mod parallel;

pub use context::Context;

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::resources::symlink::SymlinkResource;
use crate::state::LinkRecord;

/// Result of a single task execution.
///
/// # Examples
///
/// ```
/// use dotlink::tasks::TaskResult;
///
/// let ok = TaskResult::Ok;
/// let skipped = TaskResult::Skipped("hyprctl not found".into());
/// let dry = TaskResult::DryRun;
///
/// assert!(matches!(ok, TaskResult::Ok));
/// assert!(matches!(skipped, TaskResult::Skipped(_)));
/// assert!(matches!(dry, TaskResult::DryRun));
/// ```
#[derive(Debug, Clone)]
pub enum TaskResult {
    /// Task completed successfully.
    Ok,
    /// Task was skipped (e.g., the post-action program is missing).
    Skipped(String),
    /// Task ran in dry-run mode.
    DryRun,
}

/// Counters for batch tasks that process many targets.
///
/// # Examples
///
/// ```
/// use dotlink::tasks::TaskStats;
///
/// let stats = TaskStats { changed: 3, already_ok: 10, ..TaskStats::default() };
/// assert_eq!(stats.summary(false), "3 changed, 10 already ok");
/// assert_eq!(stats.summary(true), "3 would change, 10 already ok");
///
/// let stats = TaskStats { changed: 1, already_ok: 2, skipped: 0, failed: 1 };
/// assert_eq!(stats.summary(false), "1 changed, 2 already ok, 1 failed");
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    /// Number of targets changed (or that would change in a dry run).
    pub changed: u32,
    /// Number of targets already in the correct state.
    pub already_ok: u32,
    /// Number of targets deliberately left alone.
    pub skipped: u32,
    /// Number of targets whose removal or link creation failed.
    pub failed: u32,
}

impl TaskStats {
    /// Create a new empty stats counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Format the summary string (e.g. "3 changed, 10 already ok, 1 failed").
    #[must_use]
    pub fn summary(&self, dry_run: bool) -> String {
        let verb = if dry_run { "would change" } else { "changed" };
        let mut out = format!("{} {verb}, {} already ok", self.changed, self.already_ok);
        if self.skipped > 0 {
            out.push_str(&format!(", {} skipped", self.skipped));
        }
        if self.failed > 0 {
            out.push_str(&format!(", {} failed", self.failed));
        }
        out
    }

    /// Log the summary and return the appropriate `TaskResult`.
    #[must_use]
    pub fn finish(self, ctx: &Context) -> TaskResult {
        ctx.log.info(&self.summary(ctx.dry_run));
        if ctx.dry_run {
            TaskResult::DryRun
        } else {
            TaskResult::Ok
        }
    }
}

impl std::ops::AddAssign for TaskStats {
    fn add_assign(&mut self, other: Self) {
        self.changed += other.changed;
        self.already_ok += other.already_ok;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// What the reconciler does (or would do) at one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// The target was cleared and a fresh link created.
    RemoveAndLink,
    /// The target already held the correct link.
    AlreadyCorrect,
    /// Dry run: the target would be cleared and linked.
    WouldRemoveAndLink,
}

impl Action {
    /// `true` unless the target was already correct.
    #[must_use]
    pub const fn is_change(self) -> bool {
        !matches!(self, Self::AlreadyCorrect)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::RemoveAndLink => "link",
            Self::AlreadyCorrect => "ok",
            Self::WouldRemoveAndLink => "would link",
        })
    }
}

/// One reconciliation decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkDecision {
    /// Absolute target path.
    pub target: PathBuf,
    /// Absolute source path.
    pub source: PathBuf,
    /// Chosen action.
    pub action: Action,
}

/// Everything a run did (or would do), accumulated across tasks.
#[derive(Debug, Default, Clone)]
pub struct RunReport {
    /// Link decisions, sorted by target.
    pub decisions: Vec<LinkDecision>,
    /// Entries removed by the clean phase, sorted.
    pub removed: Vec<PathBuf>,
    /// Targets whose removal or link creation failed, sorted.
    pub failed: Vec<PathBuf>,
    /// Aggregate counters.
    pub stats: TaskStats,
}

impl RunReport {
    /// Decisions that change the filesystem.
    pub fn changes(&self) -> impl Iterator<Item = &LinkDecision> {
        self.decisions.iter().filter(|d| d.action.is_change())
    }

    /// Per-target totals: each target counted once, whatever the phases did.
    #[must_use]
    pub fn totals(&self) -> TaskStats {
        let changed = self.changes().count();
        TaskStats {
            changed: u32::try_from(changed).unwrap_or(u32::MAX),
            already_ok: u32::try_from(self.decisions.len() - changed).unwrap_or(u32::MAX),
            skipped: 0,
            failed: u32::try_from(self.failed.len()).unwrap_or(u32::MAX),
        }
    }

    /// One line per removal and per link decision, with paths shown relative
    /// to `root` where possible.
    #[must_use]
    pub fn render(&self, root: &Path) -> String {
        let show = |p: &Path| p.strip_prefix(root).unwrap_or(p).display().to_string();
        let mut lines = Vec::with_capacity(self.removed.len() + self.decisions.len());
        for path in &self.removed {
            lines.push(format!("remove {}", show(path)));
        }
        for d in &self.decisions {
            lines.push(format!(
                "{} {} -> {}",
                d.action,
                show(&d.target),
                show(&d.source)
            ));
        }
        for path in &self.failed {
            lines.push(format!("failed {}", show(path)));
        }
        lines.join("\n")
    }

    fn sort(&mut self) {
        self.decisions.sort_by(|a, b| a.target.cmp(&b.target));
        self.removed.sort();
        self.removed.dedup();
        self.failed.sort();
        self.failed.dedup();
    }
}

impl std::ops::AddAssign for RunReport {
    fn add_assign(&mut self, other: Self) {
        self.decisions.extend(other.decisions);
        self.removed.extend(other.removed);
        self.failed.extend(other.failed);
        self.stats += other.stats;
    }
}

/// Link every resource, returning the sorted report for this batch.
///
/// Each target is handled entirely on one worker: state check, decision,
/// then removal and link creation.
///
/// # Errors
///
/// Returns an error only if the worker pool itself fails; per-target
/// failures are logged and counted.
pub fn link_resources(ctx: &Context, resources: Vec<SymlinkResource>) -> Result<RunReport> {
    let mut report = parallel::collect(ctx, resources, |r| apply::link_single(ctx, &r))?;
    report.sort();
    Ok(report)
}

/// Clear every target that is occupied by something other than its link.
///
/// # Errors
///
/// Returns an error only if the worker pool itself fails.
pub fn clean_resources(ctx: &Context, resources: Vec<SymlinkResource>) -> Result<RunReport> {
    let mut report = parallel::collect(ctx, resources, |r| apply::clean_single(ctx, &r))?;
    report.sort();
    Ok(report)
}

/// Remove links recorded by a previous run that nothing claims any more.
///
/// # Errors
///
/// Returns an error only if the worker pool itself fails.
pub fn remove_stale(ctx: &Context, records: Vec<LinkRecord>) -> Result<RunReport> {
    let mut report = parallel::collect(ctx, records, |record| {
        apply::remove_stale(
            ctx,
            &SymlinkResource::new(record.source, record.target),
        )
    })?;
    report.sort();
    Ok(report)
}
