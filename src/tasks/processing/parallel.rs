//! Rayon-based parallel target processing.

use std::sync::Mutex;

use anyhow::Result;
use rayon::prelude::*;

use super::RunReport;
use super::context::Context;

/// Run `work` on every item and accumulate the per-item reports.
///
/// With `ctx.parallel` the items run concurrently on the global Rayon pool;
/// the shared report is locked only for the brief merge after each item.
/// Otherwise items run in order on the calling thread.
pub(super) fn collect<T: Send>(
    ctx: &Context,
    items: Vec<T>,
    work: impl Fn(T) -> RunReport + Sync + Send,
) -> Result<RunReport> {
    if !ctx.parallel {
        let mut report = RunReport::default();
        for item in items {
            report += work(item);
        }
        return Ok(report);
    }

    let report = Mutex::new(RunReport::default());
    items.into_par_iter().try_for_each(|item| -> Result<()> {
        let delta = work(item);
        *report
            .lock()
            .map_err(|e| anyhow::anyhow!("report mutex poisoned: {e}"))? += delta;
        Ok(())
    })?;
    Ok(report
        .into_inner()
        .unwrap_or_else(std::sync::PoisonError::into_inner))
}
