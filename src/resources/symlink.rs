//! Symlink resource.
use anyhow::Result;
use std::path::{Path, PathBuf};

use super::helpers::fs::{
    ensure_parent_dir, is_absent, relative_path, remove_entry, symlinked_ancestor,
};
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::error::ReconcileError;

/// A relative symlink at `target` pointing to `source`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymlinkResource {
    /// The source file/directory (what the symlink points to).
    pub source: PathBuf,
    /// The target path (where the symlink will be created).
    pub target: PathBuf,
}

impl SymlinkResource {
    /// Create a new symlink resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }

    /// The value stored in the link: `source` relative to the target's parent.
    #[must_use]
    pub fn link_value(&self) -> PathBuf {
        let parent = self.target.parent().unwrap_or_else(|| Path::new("/"));
        relative_path(parent, &self.source)
    }

    /// Whether `target` is a symlink that resolves lexically to `source`,
    /// whether stored relative or absolute.
    ///
    /// Always `false` when an ancestor of `target` is a symlink: the entry
    /// found there belongs to whatever tree that link points into.
    #[must_use]
    pub fn links_to_source(&self) -> bool {
        if symlinked_ancestor(&self.target).is_some() {
            return false;
        }
        let Ok(stored) = std::fs::read_link(&self.target) else {
            return false;
        };
        let resolved = if stored.is_absolute() {
            stored
        } else {
            self.target
                .parent()
                .unwrap_or_else(|| Path::new("/"))
                .join(stored)
        };
        relative_path(&resolved, &self.source) == Path::new(".")
    }
}

impl Applicable for SymlinkResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.target.display(), self.link_value().display())
    }

    /// Replace whatever occupies the target with the link.
    fn apply(&self) -> Result<ResourceChange> {
        if let Some(ancestor) = symlinked_ancestor(&self.target) {
            return Err(ReconcileError::SymlinkedAncestor {
                path: self.target.clone(),
                ancestor,
            }
            .into());
        }

        remove_entry(&self.target).map_err(|source| ReconcileError::Removal {
            path: self.target.clone(),
            source,
        })?;

        ensure_parent_dir(&self.target)
            .and_then(|()| create_symlink(&self.link_value(), &self.source, &self.target))
            .map_err(|source| ReconcileError::Link {
                path: self.target.clone(),
                source,
            })?;

        Ok(ResourceChange::Applied)
    }

    /// Remove the link if it still points at `source`; anything else at the
    /// target is left alone.
    fn remove(&self) -> Result<ResourceChange> {
        if self.target.symlink_metadata().is_err() {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        if !self.links_to_source() {
            return Ok(ResourceChange::Skipped {
                reason: "no longer a link to the recorded source".to_string(),
            });
        }
        remove_entry(&self.target).map_err(|source| ReconcileError::Removal {
            path: self.target.clone(),
            source,
        })?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for SymlinkResource {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.source.exists() {
            return Ok(ResourceState::Invalid {
                reason: format!("source does not exist: {}", self.source.display()),
            });
        }

        if let Some(ancestor) = symlinked_ancestor(&self.target) {
            return Ok(ResourceState::Invalid {
                reason: format!("parent {} is a symlink", ancestor.display()),
            });
        }

        let meta = match std::fs::symlink_metadata(&self.target) {
            Ok(meta) => meta,
            Err(e) if is_absent(&e) => return Ok(ResourceState::Missing),
            Err(e) => return Err(e.into()),
        };

        if meta.file_type().is_symlink() {
            let stored = std::fs::read_link(&self.target)?;
            return Ok(if stored == self.link_value() {
                ResourceState::Correct
            } else {
                ResourceState::Incorrect {
                    current: format!("points to {}", stored.display()),
                }
            });
        }

        Ok(ResourceState::Incorrect {
            current: if meta.is_dir() {
                "target is a directory".to_string()
            } else {
                "target is a regular file".to_string()
            },
        })
    }
}

/// Create a symlink at `link` storing `value`; `source` is the absolute path
/// it resolves to.
#[cfg(unix)]
fn create_symlink(value: &Path, _source: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(value, link)
}

/// Create a symlink at `link` storing `value`; `source` is the absolute path
/// it resolves to, used to pick a file or directory link.
#[cfg(windows)]
fn create_symlink(value: &Path, source: &Path, link: &Path) -> std::io::Result<()> {
    if source.is_dir() {
        std::os::windows::fs::symlink_dir(value, link)
    } else {
        std::os::windows::fs::symlink_file(value, link)
    }
}
