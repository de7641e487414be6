//! Single-target processing: check state, decide, then clear and link.

use super::context::Context;
use super::{Action, LinkDecision, RunReport};
use crate::resources::symlink::SymlinkResource;
use crate::resources::{Applicable, Resource, ResourceChange, ResourceState};

/// Reconcile one target, returning its contribution to the report.
pub(super) fn link_single(ctx: &Context, resource: &SymlinkResource) -> RunReport {
    let desc = resource.description();
    let mut out = RunReport::default();

    let state = match resource.current_state() {
        Ok(state) => state,
        Err(e) => {
            ctx.log.warn(&format!("cannot inspect {desc}: {e}"));
            out.fail(resource);
            return out;
        }
    };

    let action = match state {
        ResourceState::Correct => {
            ctx.log.debug(&format!("ok: {desc}"));
            out.stats.already_ok += 1;
            Action::AlreadyCorrect
        }
        ResourceState::Invalid { reason } => {
            ctx.log.warn(&format!("skipping {desc}: {reason}"));
            out.fail(resource);
            return out;
        }
        ResourceState::Missing | ResourceState::Incorrect { .. } if ctx.dry_run => {
            let msg = if let ResourceState::Incorrect { current } = &state {
                format!("would link {desc} (currently {current})")
            } else {
                format!("would link {desc}")
            };
            ctx.log.dry_run(&msg);
            out.stats.changed += 1;
            Action::WouldRemoveAndLink
        }
        ResourceState::Missing | ResourceState::Incorrect { .. } => match resource.apply() {
            Ok(_) => {
                ctx.log.debug(&format!("linked {desc}"));
                out.stats.changed += 1;
                Action::RemoveAndLink
            }
            Err(e) => {
                ctx.log.warn(&format!("{e}"));
                out.fail(resource);
                return out;
            }
        },
    };

    out.decisions.push(LinkDecision {
        target: resource.target.clone(),
        source: resource.source.clone(),
        action,
    });
    out
}

/// Clear a current target unless it already holds the correct link.
pub(super) fn clean_single(ctx: &Context, resource: &SymlinkResource) -> RunReport {
    let target = resource.target.display();
    let mut out = RunReport::default();

    match resource.current_state() {
        Ok(ResourceState::Incorrect { current }) => {
            if ctx.dry_run {
                ctx.log
                    .dry_run(&format!("would remove {target} ({current})"));
                out.stats.changed += 1;
                out.removed.push(resource.target.clone());
                return out;
            }
            match crate::resources::helpers::fs::remove_entry(&resource.target) {
                Ok(_) => {
                    ctx.log.debug(&format!("removed {target} ({current})"));
                    out.stats.changed += 1;
                    out.removed.push(resource.target.clone());
                }
                Err(e) => {
                    ctx.log.warn(&format!("failed to remove {target}: {e}"));
                    out.fail(resource);
                }
            }
        }
        Ok(ResourceState::Correct) => out.stats.already_ok += 1,
        Ok(ResourceState::Missing | ResourceState::Invalid { .. }) => {}
        Err(e) => {
            ctx.log.warn(&format!("cannot inspect {target}: {e}"));
            out.fail(resource);
        }
    }
    out
}

/// Remove a link left behind by a previous run if it still points where that
/// run put it.
pub(super) fn remove_stale(ctx: &Context, resource: &SymlinkResource) -> RunReport {
    let target = resource.target.display();
    let mut out = RunReport::default();

    if ctx.dry_run {
        if resource.links_to_source() {
            ctx.log.dry_run(&format!("would remove stale link {target}"));
            out.stats.changed += 1;
            out.removed.push(resource.target.clone());
        }
        return out;
    }

    match resource.remove() {
        Ok(ResourceChange::Applied) => {
            ctx.log.info(&format!("removed stale link {target}"));
            out.stats.changed += 1;
            out.removed.push(resource.target.clone());
        }
        Ok(ResourceChange::AlreadyCorrect) => {}
        Ok(ResourceChange::Skipped { reason }) => {
            ctx.log.debug(&format!("leaving {target}: {reason}"));
            out.stats.skipped += 1;
        }
        Err(e) => {
            ctx.log.warn(&format!("{e}"));
            out.fail(resource);
        }
    }
    out
}

impl RunReport {
    fn fail(&mut self, resource: &SymlinkResource) {
        self.stats.failed += 1;
        self.failed.push(resource.target.clone());
    }
}
