//! Domain-specific error types for the reconciler.
//!
//! Internal modules return typed errors built with [`thiserror`]; command
//! handlers at the CLI boundary convert them to [`anyhow::Error`] via `?`.
//!
//! ```text
//! ConfigError      fatal, raised before any mutation
//! ReconcileError   per target, logged and skipped
//! PostActionError  always non-fatal
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Errors detected while loading configuration or validating the projection.
///
/// Every variant is fatal and is raised before the target filesystem is
/// touched.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A source root marked as required does not exist.
    #[error("required source root does not exist: {}", .path.display())]
    MissingRoot {
        /// Configured path of the root.
        path: PathBuf,
    },

    /// The target root does not exist or is not a directory.
    #[error("target root is not a directory: {}", .path.display())]
    MissingTarget {
        /// Configured target path.
        path: PathBuf,
    },

    /// Two namespace roots claim the same target paths, or one claims a file
    /// where the other needs a directory.
    #[error(
        "overlapping targets between {} and {}: {}",
        .first.display(),
        .second.display(),
        join_paths(.paths)
    )]
    Overlap {
        /// First root of the pair.
        first: PathBuf,
        /// Second root of the pair.
        second: PathBuf,
        /// Target paths claimed by both, sorted.
        paths: Vec<PathBuf>,
    },

    /// A unit root's destination conflicts with another claim.
    #[error("unit root {} linked at {} conflicts with {}", .root.display(), .destination.display(), .other)]
    UnitOverlap {
        /// Unit root being linked.
        root: PathBuf,
        /// Absolute destination of the unit link.
        destination: PathBuf,
        /// Description of the conflicting claim.
        other: String,
    },

    /// A unit destination would replace the target root or one of its ancestors.
    #[error("unit destination {} would replace the target root", .destination.display())]
    UnsafeDestination {
        /// Offending destination.
        destination: PathBuf,
    },

    /// A skip pattern is not a valid glob.
    #[error("invalid skip pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The raw pattern string.
        pattern: String,
        /// Parser message.
        message: String,
    },

    /// The configuration file could not be parsed.
    #[error("invalid configuration in {file}: {message}")]
    InvalidSyntax {
        /// Path of the file.
        file: String,
        /// Parser message.
        message: String,
    },

    /// An I/O error occurred while reading the configuration.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Neither `HOME` nor an explicit target was available.
    #[error("cannot determine home directory: HOME is not set")]
    NoHome,
}

/// Errors that arise while reconciling a single target path.
///
/// These are recovered locally: the target is skipped and the run continues.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Clearing whatever occupied the target failed.
    #[error("failed to remove {}: {source}", .path.display())]
    Removal {
        /// Target path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Creating the parent directory or the symlink failed.
    #[error("failed to link {}: {source}", .path.display())]
    Link {
        /// Target path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A parent of the target is a symlink, so the target path resolves
    /// outside the target tree.
    #[error("refusing to touch {}: parent {} is a symlink", .path.display(), .ancestor.display())]
    SymlinkedAncestor {
        /// Target path.
        path: PathBuf,
        /// Outermost symlinked ancestor.
        ancestor: PathBuf,
    },
}

/// Errors from the best-effort post-link hook.
#[derive(Error, Debug)]
pub enum PostActionError {
    /// The executable is not on `PATH`.
    #[error("{program} not found, skipping post-action")]
    NotFound {
        /// Program name.
        program: String,
    },

    /// The executable ran but exited unsuccessfully.
    #[error("{program} failed (exit {}): {stderr}", .code.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    Failed {
        /// Program name.
        program: String,
        /// Exit code, `None` when terminated by a signal.
        code: Option<i32>,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// The executable could not be spawned.
    #[error("failed to execute {program}: {message}")]
    Spawn {
        /// Program name.
        program: String,
        /// Underlying error message.
        message: String,
    },
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
