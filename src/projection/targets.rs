//! Walk a namespace root and collect the target paths it claims.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use walkdir::WalkDir;

use super::{SkipPatterns, transform};

/// Target-relative path mapped to the absolute source file it links to.
///
/// Ordered so that iteration, logging, and collision reports are stable.
pub type TargetSet = BTreeMap<PathBuf, PathBuf>;

/// Enumerate the regular files under `root` and project each one.
///
/// Symlinks inside the source tree are followed for walking purposes but only
/// regular files produce entries, so empty directories are never claimed.
/// Directories whose name matches a skip pattern are pruned without being
/// descended into. Broken symlinks and filesystem loops are ignored.
///
/// # Errors
///
/// Returns an error if a directory under `root` cannot be read.
pub fn compute_targets(root: &Path, dot_prefix: bool, skip: &SkipPatterns) -> Result<TargetSet> {
    let mut targets = TargetSet::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !skip.is_skipped(e.file_name()));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.loop_ancestor().is_some() => continue,
            Err(e)
                if e.io_error()
                    .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound) =>
            {
                continue;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("walking {}", root.display()));
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let rel = entry
            .path()
            .strip_prefix(root)
            .with_context(|| format!("{} is outside {}", entry.path().display(), root.display()))?;

        if let Some(target) = transform(rel, dot_prefix, skip) {
            targets.insert(target, entry.path().to_path_buf());
        }
    }

    Ok(targets)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, rel).unwrap();
    }

    fn skip() -> SkipPatterns {
        SkipPatterns::new(&["*.git*"]).unwrap()
    }

    fn keys(targets: &TargetSet) -> Vec<String> {
        targets.keys().map(|p| p.display().to_string()).collect()
    }

    #[test]
    fn files_are_projected_with_dot_prefix() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "zshrc");
        write(dir.path(), "bin/tool");
        write(dir.path(), ".config/nvim/init.lua");

        let targets = compute_targets(dir.path(), true, &skip()).unwrap();
        assert_eq!(
            keys(&targets),
            vec![".bin/tool", ".config/nvim/init.lua", ".zshrc"]
        );
        assert_eq!(
            targets.get(Path::new(".zshrc")),
            Some(&dir.path().join("zshrc"))
        );
    }

    #[test]
    fn skipped_directories_are_pruned() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "project/.git/HEAD");
        write(dir.path(), "project/readme");
        write(dir.path(), ".git/config");

        let targets = compute_targets(dir.path(), true, &skip()).unwrap();
        assert_eq!(keys(&targets), vec![".project/readme"]);
    }

    #[test]
    fn empty_directories_are_not_claimed() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("empty/nested")).unwrap();

        let targets = compute_targets(dir.path(), true, &skip()).unwrap();
        assert!(targets.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directories_are_walked() {
        let dir = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        write(outside.path(), "theme.conf");
        std::os::unix::fs::symlink(outside.path(), dir.path().join("theme")).unwrap();

        let targets = compute_targets(dir.path(), true, &skip()).unwrap();
        assert_eq!(keys(&targets), vec![".theme/theme.conf"]);
        assert_eq!(
            targets.get(Path::new(".theme/theme.conf")),
            Some(&dir.path().join("theme/theme.conf"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn broken_symlinks_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "zshrc");
        std::os::unix::fs::symlink("/nonexistent/target", dir.path().join("dangling")).unwrap();

        let targets = compute_targets(dir.path(), true, &skip()).unwrap();
        assert_eq!(keys(&targets), vec![".zshrc"]);
    }

    #[test]
    fn identical_trees_produce_identical_sets() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        for root in [a.path(), b.path()] {
            write(root, "x/y/z");
            write(root, "w");
        }
        let ta = compute_targets(a.path(), true, &skip()).unwrap();
        let tb = compute_targets(b.path(), true, &skip()).unwrap();
        assert_eq!(keys(&ta), keys(&tb));
    }
}
