//! `dotlink` binary entry point.
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use dotlink::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();

    if matches!(args.command, cli::Command::Version) {
        commands::version::run();
        return Ok(());
    }

    logging::init_subscriber(args.verbose, args.command.name());
    let log = Arc::new(logging::Logger::new(args.command.name()));

    // No rollback on interrupt: a re-run converges to the same end state.
    if let Err(e) = ctrlc::set_handler(|| {
        tracing::error!("interrupted");
        std::process::exit(130);
    }) {
        log.warn(&format!("cannot install interrupt handler: {e}"));
    }

    match args.command {
        cli::Command::Link => commands::link::run(&args.global, &log),
        cli::Command::Check => commands::check::run(&args.global, &log),
        cli::Command::Version => Ok(()),
    }
}
