//! Check command implementation.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::GlobalOpts;
use crate::logging::Logger;

/// Run the check command: validate and print the plan without touching the
/// filesystem.
///
/// # Errors
///
/// Returns an error if configuration loading or validation fails.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = super::CommandSetup::init(global, log.as_ref())?;
    let target = setup.config.target.clone();
    let mut orchestrator = setup.orchestrator(global, log);
    let report = orchestrator.check()?;

    log.stage("Plan");
    let plan = report.render(&dunce::canonicalize(&target).unwrap_or(target));
    if plan.is_empty() {
        log.info("nothing to link");
    }
    for line in plan.lines() {
        log.info(line);
    }
    super::finish(&report, true, log)
}
