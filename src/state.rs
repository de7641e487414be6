//! Record of the links created by the previous live run.
//!
//! The record is what lets a run notice that a source file has been deleted:
//! its target is no longer claimed, but it is still listed here.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};

use crate::projection::Projection;

/// Current on-disk format version.
pub const STATE_VERSION: u32 = 1;

/// One link created by a previous run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Absolute target path.
    pub target: PathBuf,
    /// Absolute source path the link resolved to.
    pub source: PathBuf,
}

/// Persisted run state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    /// Format version.
    pub version: u32,
    /// Links created by the run, sorted by target.
    pub links: Vec<LinkRecord>,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            links: Vec::new(),
        }
    }
}

impl RunState {
    /// Build the state describing every link a projection claims.
    #[must_use]
    pub fn from_projection(projection: &Projection) -> Self {
        Self::from_links(projection.claimed())
    }

    /// Build the state from absolute `target -> source` pairs.
    #[must_use]
    pub fn from_links(links: BTreeMap<PathBuf, PathBuf>) -> Self {
        Self {
            version: STATE_VERSION,
            links: links
                .into_iter()
                .map(|(target, source)| LinkRecord { target, source })
                .collect(),
        }
    }

    /// Read the state file.
    ///
    /// A missing file is an empty state.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// was written by an unknown format version.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading run state: {}", path.display()))?;
        let state: Self = serde_json::from_str(&content)
            .with_context(|| format!("parsing run state: {}", path.display()))?;
        anyhow::ensure!(
            state.version == STATE_VERSION,
            "unsupported run state version {} in {}",
            state.version,
            path.display()
        );
        Ok(state)
    }

    /// Write the state file atomically (temp file + rename).
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create parent: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("serializing run state")?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json + "\n")
            .with_context(|| format!("writing run state: {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("rename {} to {}", tmp.display(), path.display()))?;
        Ok(())
    }

    /// Records whose target is not in `claimed`.
    pub fn stale<'a>(
        &'a self,
        claimed: &'a BTreeMap<PathBuf, PathBuf>,
    ) -> impl Iterator<Item = &'a LinkRecord> + 'a {
        self.links
            .iter()
            .filter(move |record| !claimed.contains_key(&record.target))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn sample() -> RunState {
        let mut links = BTreeMap::new();
        links.insert(
            PathBuf::from("/home/u/.zshrc"),
            PathBuf::from("/home/u/dots/zshrc"),
        );
        links.insert(
            PathBuf::from("/home/u/.bashrc"),
            PathBuf::from("/home/u/dots/bashrc"),
        );
        RunState::from_links(links)
    }

    #[test]
    fn missing_file_is_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let state = RunState::load(&dir.path().join("state.json")).unwrap();
        assert!(state.links.is_empty());
        assert_eq!(state.version, STATE_VERSION);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/state.json");
        let state = sample();
        state.save(&path).unwrap();
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(RunState::load(&path).unwrap(), state);
    }

    #[test]
    fn links_are_sorted_by_target() {
        let state = sample();
        assert_eq!(state.links[0].target, PathBuf::from("/home/u/.bashrc"));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = RunState::load(&path).unwrap_err();
        assert!(err.to_string().contains("parsing run state"));
    }

    #[test]
    fn unknown_version_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, r#"{"version": 99, "links": []}"#).unwrap();
        assert!(RunState::load(&path).is_err());
    }

    #[test]
    fn stale_excludes_claimed_targets() {
        let state = sample();
        let mut claimed = BTreeMap::new();
        claimed.insert(
            PathBuf::from("/home/u/.zshrc"),
            PathBuf::from("/home/u/dots/zshrc"),
        );
        let stale: Vec<_> = state.stale(&claimed).collect();
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].target, PathBuf::from("/home/u/.bashrc"));
    }
}
