//! Clear stale links and anything occupying a claimed target.
use anyhow::Result;

use super::link::claimed_resources;
use super::{Context, Phase, Task, TaskResult, clean_resources, remove_stale};
use crate::state::LinkRecord;

/// Remove links left by the previous run that are no longer claimed, then
/// clear every claimed target that does not already hold its link.
#[derive(Debug)]
pub struct CleanTargets;

impl Task for CleanTargets {
    fn name(&self) -> &'static str {
        "Clean targets"
    }

    fn phase(&self) -> Phase {
        Phase::Clean
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let claimed = ctx.projection.claimed();
        let stale: Vec<LinkRecord> = ctx.previous.stale(&claimed).cloned().collect();
        if !stale.is_empty() {
            ctx.log
                .debug(&format!("{} stale links from the previous run", stale.len()));
        }

        let mut report = remove_stale(ctx, stale)?;
        report += clean_resources(ctx, claimed_resources(&ctx.projection))?;

        let stats = report.stats;
        ctx.record(report);
        Ok(stats.finish(ctx))
    }
}

#[cfg(all(test, unix))]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::exec::MockExecutor;
    use crate::resources::Applicable;
    use crate::state::RunState;
    use crate::tasks::test_helpers::{TestTree, make_context, make_context_with};
    use std::collections::BTreeMap;
    use std::fs;

    #[test]
    fn clears_occupied_targets() {
        let tree = TestTree::new();
        tree.write("zshrc");
        fs::write(tree.target(".zshrc"), "local").unwrap();
        let (ctx, _log) = make_context(&tree, false);

        CleanTargets.run(&ctx).unwrap();
        assert!(tree.target(".zshrc").symlink_metadata().is_err());
        assert_eq!(ctx.into_report().removed, vec![tree.target(".zshrc")]);
    }

    #[test]
    fn leaves_correct_links() {
        let tree = TestTree::new();
        tree.resource("zshrc", ".zshrc").apply().ok();
        let (ctx, log) = make_context(&tree, false);

        CleanTargets.run(&ctx).unwrap();
        assert!(tree.target(".zshrc").symlink_metadata().is_ok());
        assert!(log.contains("0 changed, 1 already ok"));
    }

    #[test]
    fn removes_stale_links_from_previous_run() {
        let tree = TestTree::new();
        let old = tree.resource("old", ".old");
        old.apply().ok();
        fs::remove_file(&old.source).unwrap();
        let previous = RunState::from_links(BTreeMap::from([(
            old.target.clone(),
            old.source.clone(),
        )]));
        let (ctx, _log) = make_context_with(&tree, false, previous, MockExecutor::new());

        CleanTargets.run(&ctx).unwrap();
        assert!(old.target.symlink_metadata().is_err());
        assert_eq!(ctx.into_report().removed, vec![old.target]);
    }

    #[test]
    fn keeps_stale_entry_replaced_by_user() {
        let tree = TestTree::new();
        let target = tree.target(".old");
        fs::write(&target, "mine now").unwrap();
        let previous = RunState::from_links(BTreeMap::from([(
            target.clone(),
            tree.dots.join("old"),
        )]));
        let (ctx, _log) = make_context_with(&tree, false, previous, MockExecutor::new());

        CleanTargets.run(&ctx).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "mine now");
    }

    #[test]
    fn dry_run_touches_nothing() {
        let tree = TestTree::new();
        tree.write("zshrc");
        fs::write(tree.target(".zshrc"), "local").unwrap();
        let (ctx, log) = make_context(&tree, true);

        assert!(matches!(CleanTargets.run(&ctx).unwrap(), TaskResult::DryRun));
        assert_eq!(fs::read_to_string(tree.target(".zshrc")).unwrap(), "local");
        assert!(log.contains("would remove"));
    }
}
