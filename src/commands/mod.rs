//! Subcommands and the setup they share.
pub mod check;
pub mod link;
pub mod orchestrator;
pub mod version;

pub use orchestrator::Orchestrator;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::config::toml_loader::default_config_file;
use crate::error::ConfigError;
use crate::exec::SystemExecutor;
use crate::logging::{Log, Logger};
use crate::tasks::RunReport;

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_ENV: &str = "DOTLINK_CONFIG";

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates home resolution and configuration loading so that each
/// command does not have to repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Home directory used for `~` expansion and the default target.
    pub home: PathBuf,
    /// Config file that was loaded, or would have been if it existed.
    pub config_path: PathBuf,
    /// Loaded configuration.
    pub config: Config,
}

impl CommandSetup {
    /// Resolve the home directory, locate the config file, and load it.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined or the
    /// configuration fails to parse.
    pub fn init(global: &GlobalOpts, log: &dyn Log) -> Result<Self> {
        let home = home_dir()?;
        let env_config = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let config_path = resolve_config_path(
            global.config.as_deref().or(env_config.as_deref()),
            &home,
        );

        log.stage("Loading configuration");
        if config_path.exists() {
            log.debug(&format!("config: {}", config_path.display()));
        } else {
            log.info(&format!(
                "no config at {}, using defaults",
                config_path.display()
            ));
        }
        let config = Config::load(&config_path, &home)?;
        log.info(&format!(
            "loaded {} roots, {} skip patterns",
            config.roots.len(),
            config.skip.len()
        ));

        // Validate configuration and display warnings
        let warnings = config.validate();
        if !warnings.is_empty() {
            log.warn(&format!(
                "found {} configuration warning(s):",
                warnings.len()
            ));
            for warning in &warnings {
                log.warn(&format!(
                    "  {} [{}]: {}",
                    warning.source, warning.item, warning.message
                ));
            }
        }

        Ok(Self {
            home,
            config_path,
            config,
        })
    }

    /// Build an orchestrator for this configuration with the system executor.
    #[must_use]
    pub fn orchestrator(self, global: &GlobalOpts, log: &Arc<Logger>) -> Orchestrator {
        Orchestrator::new(
            self.config,
            Arc::clone(log) as Arc<dyn Log>,
            Arc::new(SystemExecutor),
        )
        .with_dry_run(global.dry_run)
        .with_parallel(global.parallel)
    }
}

/// The user's home directory from `HOME` (or `USERPROFILE` on Windows).
///
/// # Errors
///
/// Returns [`ConfigError::NoHome`] if neither variable is set.
pub fn home_dir() -> Result<PathBuf, ConfigError> {
    std::env::var_os("HOME")
        .or_else(|| {
            if cfg!(windows) {
                std::env::var_os("USERPROFILE")
            } else {
                None
            }
        })
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
        .ok_or(ConfigError::NoHome)
}

/// Pick the config file: an explicit path wins, else the default location
/// under the XDG config directory.
#[must_use]
pub fn resolve_config_path(explicit: Option<&Path>, home: &Path) -> PathBuf {
    explicit.map_or_else(|| default_config_file(home), Path::to_path_buf)
}

/// Log the per-target totals and the task summary, then bail if any task
/// failed.
///
/// # Errors
///
/// Returns an error if one or more tasks recorded a failure.
pub fn finish(report: &RunReport, dry_run: bool, log: &Logger) -> Result<()> {
    log.info(&report.totals().summary(dry_run));
    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} task(s) failed");
    }
    Ok(())
}
