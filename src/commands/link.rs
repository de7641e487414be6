//! Link command implementation.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::GlobalOpts;
use crate::logging::Logger;

/// Run the link command: clean, link, record state, post-action.
///
/// # Errors
///
/// Returns an error if configuration loading or validation fails, or a task
/// fails as a whole. Per-target failures are reported in the summary only.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = super::CommandSetup::init(global, log.as_ref())?;
    let mut orchestrator = setup.orchestrator(global, log);
    let report = orchestrator.run()?;
    super::finish(&report, global.dry_run, log)
}
