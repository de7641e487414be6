//! The [`Logger`] handed to commands and tasks.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::{DRY_RUN_TARGET, STAGE_TARGET};
use super::types::{Log, TaskEntry, TaskStatus};
use super::utils::log_file_path;

/// Logger for one `dotlink` invocation.
///
/// Messages go through `tracing`, so the console and the per-command log file
/// (`$XDG_CACHE_HOME/dotlink/<command>.log`) see the same events. Task
/// outcomes are kept in memory until [`print_summary`](Self::print_summary).
#[derive(Debug)]
pub struct Logger {
    tasks: Mutex<Vec<TaskEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Logger for `command`; the log file itself is opened by
    /// [`init_subscriber`](super::subscriber::init_subscriber).
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    /// Path of the log file, if the cache directory is usable.
    #[cfg(test)]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Snapshot of the recorded tasks.
    #[cfg(test)]
    pub(crate) fn task_entries(&self) -> Vec<TaskEntry> {
        self.tasks.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Error that ends the run.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Problem with one target or with the post-action; the run goes on.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Header for a phase of the run, e.g. `Validating targets`.
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Progress worth showing by default.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Per-target detail. Shown with `--verbose`, always kept in the log file.
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// What a dry run would have changed.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Remember how a task ended.
    pub fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.push(TaskEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Number of tasks recorded as [`TaskStatus::Failed`].
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.tasks.lock().map_or(0, |tasks| {
            tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Failed)
                .count()
        })
    }

    /// Log one line per recorded task, then the totals and the log file path.
    pub fn print_summary(&self) {
        let Some(lines) = self.summary_lines() else {
            return;
        };
        self.stage("Summary");
        for line in lines {
            self.info(&line);
        }
        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }

    /// Summary body, or `None` when no task was recorded.
    fn summary_lines(&self) -> Option<Vec<String>> {
        let tasks = self.tasks.lock().ok()?.clone();
        if tasks.is_empty() {
            return None;
        }

        let mut lines = Vec::with_capacity(tasks.len() + 1);
        let mut counts = [0usize; 5];
        for task in &tasks {
            let (slot, icon, color) = match task.status {
                TaskStatus::Ok => (0, "✓", "\x1b[32m"),
                TaskStatus::DryRun => (1, "~", "\x1b[37m"),
                TaskStatus::Skipped => (2, "○", "\x1b[33m"),
                TaskStatus::NotApplicable => (3, "·", "\x1b[2m"),
                TaskStatus::Failed => (4, "✗", "\x1b[31m"),
            };
            if let Some(n) = counts.get_mut(slot) {
                *n += 1;
            }
            let detail = task
                .message
                .as_deref()
                .map_or_else(String::new, |m| format!(" ({m})"));
            lines.push(format!("{color}{icon} {}{detail}\x1b[0m", task.name));
        }

        let totals: Vec<String> = ["ok", "dry run", "skipped", "n/a", "failed"]
            .iter()
            .zip(counts)
            .filter(|(_, n)| *n > 0)
            .map(|(label, n)| format!("{n} {label}"))
            .collect();
        lines.push(format!("{} tasks: {}", tasks.len(), totals.join(", ")));
        Some(lines)
    }
}

impl Log for Logger {
    fn stage(&self, msg: &str) {
        self.stage(msg);
    }

    fn info(&self, msg: &str) {
        self.info(msg);
    }

    fn debug(&self, msg: &str) {
        self.debug(msg);
    }

    fn warn(&self, msg: &str) {
        self.warn(msg);
    }

    fn error(&self, msg: &str) {
        self.error(msg);
    }

    fn dry_run(&self, msg: &str) {
        self.dry_run(msg);
    }

    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        self.record_task(name, status, message);
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::isolated_logger;
    use std::fs;

    #[test]
    fn logger_new() {
        let (log, _tmp, _guard) = isolated_logger();
        assert!(log.task_entries().is_empty(), "expected empty task list");
    }

    #[test]
    fn record_task_with_message() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record_task("run post-action", TaskStatus::Skipped, Some("not found"));
        let tasks = log.task_entries();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "run post-action");
        assert_eq!(tasks[0].message, Some("not found".to_string()));
    }

    #[test]
    fn failure_count_returns_correct_count() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record_task("a", TaskStatus::Ok, None);
        log.record_task("b", TaskStatus::Failed, Some("error 1"));
        log.record_task("c", TaskStatus::Failed, Some("error 2"));
        log.record_task("d", TaskStatus::Skipped, None);
        assert_eq!(log.failure_count(), 2);
    }

    #[test]
    fn summary_lists_tasks_and_nonzero_totals() {
        let (log, _tmp, _guard) = isolated_logger();
        assert!(log.summary_lines().is_none());

        log.record_task("Clean targets", TaskStatus::Ok, None);
        log.record_task("Link targets", TaskStatus::Ok, None);
        log.record_task("Run post-action", TaskStatus::Skipped, Some("hyprctl not found"));

        let lines = log.summary_lines().unwrap();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].contains("○ Run post-action (hyprctl not found)"));
        assert_eq!(lines[3], "3 tasks: 2 ok, 1 skipped");
    }

    #[test]
    fn log_trait_delegates_to_logger() {
        let (log, _tmp, _guard) = isolated_logger();
        let log_ref: &dyn Log = &log;
        log_ref.record_task("via-trait", TaskStatus::Ok, None);
        assert_eq!(log.task_entries().len(), 1);
    }

    #[test]
    fn debug_always_written_to_file() {
        let (log, _tmp, _guard) = isolated_logger();
        let marker = format!("debug-marker-{}", std::process::id());
        log.debug(&marker);
        let path = log.log_path().expect("log path should exist");
        let contents = fs::read_to_string(path).unwrap();
        assert!(
            contents.contains(&marker),
            "debug messages should always appear in the log file"
        );
    }

    #[test]
    fn warn_written_to_file_with_tag() {
        let (log, _tmp, _guard) = isolated_logger();
        let marker = format!("warn-marker-{}", std::process::id());
        log.warn(&marker);
        let contents = fs::read_to_string(log.log_path().expect("log path")).unwrap();
        assert!(contents.contains("[warn]"));
        assert!(contents.contains(&marker));
    }

    #[test]
    fn stage_written_to_file_with_arrow() {
        let (log, _tmp, _guard) = isolated_logger();
        let marker = format!("stage-marker-{}", std::process::id());
        log.stage(&marker);
        let contents = fs::read_to_string(log.log_path().expect("log path")).unwrap();
        assert!(contents.contains("==>"));
        assert!(contents.contains(&marker));
    }

    #[test]
    fn dry_run_written_to_file() {
        let (log, _tmp, _guard) = isolated_logger();
        let marker = format!("dryrun-marker-{}", std::process::id());
        log.dry_run(&marker);
        let contents = fs::read_to_string(log.log_path().expect("log path")).unwrap();
        assert!(contents.contains("[dry run]"));
        assert!(contents.contains(&marker));
    }
}
