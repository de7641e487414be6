// Shared helpers for integration tests.
//
// Provides a temporary home directory next to a dotfiles repository and a
// fluent builder so each integration test can set up an isolated
// environment without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code, clippy::expect_used, clippy::unwrap_used)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use dotlink::commands::Orchestrator;
use dotlink::config::Config;
use dotlink::exec::{ExecResult, Executor};
use dotlink::logging::{Log, TaskStatus};

/// Run-state location inside the temporary home, so tests never depend on
/// `XDG_STATE_HOME`.
pub const STATE_FILE: &str = "~/.local/state/dotlink/state.json";

/// An isolated home and repository backed by a [`tempfile::TempDir`].
///
/// Both paths are canonical so link values are stable across platforms that
/// put temp directories behind a symlink.
pub struct TestEnv {
    _dir: tempfile::TempDir,
    /// Target root.
    pub home: PathBuf,
    /// Directory holding the source roots and the config file.
    pub repo: PathBuf,
}

impl TestEnv {
    /// Create empty `home/` and `repo/` directories.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let base = dunce::canonicalize(dir.path()).expect("canonicalize temp dir");
        let home = base.join("home");
        let repo = base.join("repo");
        std::fs::create_dir_all(&home).expect("create home");
        std::fs::create_dir_all(&repo).expect("create repo");
        Self {
            _dir: dir,
            home,
            repo,
        }
    }

    /// Write a source file at `repo/<rel>` whose content is its own path.
    pub fn with_source(self, rel: &str) -> Self {
        self.write_source(rel);
        self
    }

    /// Write a source file at `repo/<rel>`.
    pub fn write_source(&self, rel: &str) -> PathBuf {
        let path = self.repo.join(rel);
        std::fs::create_dir_all(path.parent().expect("source parent")).expect("create parent");
        std::fs::write(&path, rel).expect("write source");
        path
    }

    /// Write a regular file at `home/<rel>`.
    pub fn write_home(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.home.join(rel);
        std::fs::create_dir_all(path.parent().expect("home parent")).expect("create parent");
        std::fs::write(&path, content).expect("write home file");
        path
    }

    /// Write `repo/dotlink.toml` and load it. `body` must not set
    /// `state_file`; it is pinned to [`STATE_FILE`].
    pub fn config(&self, body: &str) -> Config {
        let path = self.repo.join("dotlink.toml");
        std::fs::write(&path, format!("state_file = \"{STATE_FILE}\"\n{body}"))
            .expect("write config");
        Config::load(&path, &self.home).expect("load config")
    }

    /// Absolute path of the run-state file.
    pub fn state_file(&self) -> PathBuf {
        self.home.join(".local/state/dotlink/state.json")
    }

    /// Orchestrator over `config` with a capturing log and a stub executor.
    pub fn orchestrator(&self, config: Config, dry_run: bool) -> (Orchestrator, Arc<CaptureLog>) {
        self.orchestrator_with(config, dry_run, Arc::new(StubExecutor::default()))
    }

    /// Orchestrator with an explicit executor.
    pub fn orchestrator_with(
        &self,
        config: Config,
        dry_run: bool,
        executor: Arc<StubExecutor>,
    ) -> (Orchestrator, Arc<CaptureLog>) {
        let log = Arc::new(CaptureLog::default());
        let orchestrator = Orchestrator::new(config, Arc::clone(&log) as Arc<dyn Log>, executor)
            .with_dry_run(dry_run);
        (orchestrator, log)
    }

    /// Stored value of the link at `home/<rel>`, if it is a link.
    pub fn link(&self, rel: &str) -> Option<PathBuf> {
        std::fs::read_link(self.home.join(rel)).ok()
    }

    /// Every entry under home, one per line, sorted: `dir/`, `file`, or
    /// `link -> value`. The run-state directory is left out.
    pub fn tree(&self) -> String {
        let mut lines = Vec::new();
        for entry in walkdir::WalkDir::new(&self.home)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.file_name() != ".local")
        {
            let entry = entry.expect("walk home");
            let rel = entry
                .path()
                .strip_prefix(&self.home)
                .expect("under home")
                .display()
                .to_string();
            let ft = entry.file_type();
            if ft.is_symlink() {
                let value = std::fs::read_link(entry.path()).expect("read link");
                lines.push(format!("{rel} -> {}", value.display()));
            } else if ft.is_dir() {
                lines.push(format!("{rel}/"));
            } else {
                lines.push(rel);
            }
        }
        lines.join("\n")
    }
}

/// In-memory [`Log`] that records every message as `"<level>: <msg>"`.
#[derive(Debug, Default)]
pub struct CaptureLog {
    pub lines: Mutex<Vec<String>>,
    pub tasks: Mutex<Vec<(String, TaskStatus)>>,
}

impl CaptureLog {
    fn push(&self, level: &str, msg: &str) {
        self.lines.lock().unwrap().push(format!("{level}: {msg}"));
    }

    /// `true` if any captured line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().unwrap().iter().any(|l| l.contains(needle))
    }

    /// Status recorded for the task called `name`.
    pub fn task_status(&self, name: &str) -> Option<TaskStatus> {
        self.tasks
            .lock()
            .unwrap()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| *s)
    }
}

impl Log for CaptureLog {
    fn stage(&self, msg: &str) {
        self.push("stage", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn dry_run(&self, msg: &str) {
        self.push("dry_run", msg);
    }
    fn record_task(&self, name: &str, status: TaskStatus, _message: Option<&str>) {
        self.tasks.lock().unwrap().push((name.to_string(), status));
    }
}

/// [`Executor`] that records invocations instead of spawning processes.
#[derive(Debug, Default)]
pub struct StubExecutor {
    /// Programs reported as present on `PATH`.
    pub available: Vec<String>,
    /// Exit code returned by every run.
    pub exit_code: i32,
    /// Command lines run so far.
    pub calls: Mutex<Vec<String>>,
}

impl StubExecutor {
    /// A stub on which `program` is available and exits with `exit_code`.
    pub fn with_program(program: &str, exit_code: i32) -> Self {
        Self {
            available: vec![program.to_string()],
            exit_code,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Command lines run so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Executor for StubExecutor {
    fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        let mut line = vec![program];
        line.extend_from_slice(args);
        self.calls.lock().unwrap().push(line.join(" "));
        Ok(ExecResult {
            stdout: String::new(),
            stderr: if self.exit_code == 0 {
                String::new()
            } else {
                "stub failure".to_string()
            },
            success: self.exit_code == 0,
            code: Some(self.exit_code),
        })
    }

    fn which(&self, program: &str) -> bool {
        self.available.iter().any(|p| p == program)
    }
}

/// Assert that `path` is absent (not even a dangling link).
pub fn assert_absent(path: &Path) {
    assert!(
        path.symlink_metadata().is_err(),
        "expected {} to be absent",
        path.display()
    );
}
