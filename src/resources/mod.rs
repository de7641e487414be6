//! Idempotent resource primitives (check + apply pattern).
//!
//! The reconciler only manages one kind of resource, a relative symlink, but
//! keeps the inspection and mutation halves behind traits so the task layer
//! decides what to do from [`ResourceState`] alone.
pub mod helpers;
pub mod symlink;

use anyhow::Result;

/// A resource that can be described, applied, and removed.
pub trait Applicable {
    /// Human-readable description, e.g. `/home/u/.zshrc -> dots/zshrc`.
    fn description(&self) -> String;

    /// Make the resource exist in its desired state, replacing whatever
    /// occupies its location.
    ///
    /// # Errors
    ///
    /// Returns an error if the existing entry cannot be removed or the new
    /// one cannot be created.
    fn apply(&self) -> Result<ResourceChange>;

    /// Undo a previous [`apply`](Self::apply), leaving anything that is no
    /// longer ours untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is ours but cannot be removed.
    fn remove(&self) -> Result<ResourceChange>;
}

/// Observed state of a resource.
///
/// # Examples
///
/// ```
/// use dotlink::resources::ResourceState;
///
/// let wrong = ResourceState::Incorrect { current: "points to /other/path".into() };
/// assert!(wrong.needs_change());
/// assert!(ResourceState::Missing.needs_change());
/// assert!(!ResourceState::Correct.needs_change());
/// assert!(!ResourceState::Invalid { reason: "source does not exist".into() }.needs_change());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Nothing exists at the location.
    Missing,
    /// The location already holds exactly the desired entry.
    Correct,
    /// Something else occupies the location.
    Incorrect {
        /// What is there now.
        current: String,
    },
    /// The resource cannot be applied (e.g., the source has disappeared).
    Invalid {
        /// Why it cannot be applied.
        reason: String,
    },
}

impl ResourceState {
    /// `true` when applying would change the filesystem.
    #[must_use]
    pub const fn needs_change(&self) -> bool {
        matches!(self, Self::Missing | Self::Incorrect { .. })
    }
}

/// Result of applying or removing a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// The filesystem was changed.
    Applied,
    /// Nothing to do.
    AlreadyCorrect,
    /// Deliberately left alone (e.g., a stale entry the user has since
    /// replaced).
    Skipped {
        /// Why it was left alone.
        reason: String,
    },
}

/// A resource that can inspect its own state.
pub trait Resource: Applicable {
    /// Inspect the resource's location without modifying anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the location cannot be inspected for a reason
    /// other than it not existing.
    fn current_state(&self) -> Result<ResourceState>;
}
