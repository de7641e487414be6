//! Command-line interface definition.
use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the dotfiles symlink reconciler.
#[derive(Parser, Debug)]
#[command(
    name = "dotlink",
    about = "Declarative symlink reconciler for dotfiles",
    version
)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Config file (default: $DOTLINK_CONFIG, then ~/.config/dotlink/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<std::path::PathBuf>,

    /// Disable parallel processing of targets (parallel is enabled by default)
    #[arg(long = "no-parallel", global = true, action = clap::ArgAction::SetFalse)]
    pub parallel: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Clean and link every source root into the target root
    Link,
    /// Validate the configuration and show what `link` would do
    Check,
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Check => "check",
            Self::Version => "version",
        }
    }
}
