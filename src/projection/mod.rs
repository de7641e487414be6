//! Projection of source roots onto the target namespace.
//!
//! - [`transform`] — map a source-relative path to a target-relative path
//! - [`targets`] — walk a namespace root and collect the paths it claims
//! - [`collision`] — reject overlapping claims before anything is mutated
pub mod collision;
pub mod targets;

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Component, Path, PathBuf};

use anyhow::Result;
use glob::Pattern;

use crate::config::{RootMode, SourceRoot};
use crate::error::ConfigError;

pub use targets::{TargetSet, compute_targets};

/// Compiled set of skip globs, matched against bare path segments.
///
/// # Examples
///
/// ```
/// use dotlink::projection::SkipPatterns;
/// use std::ffi::OsStr;
///
/// let skip = SkipPatterns::new(&["*.git*", "__pycache__"]).unwrap();
/// assert!(skip.is_skipped(OsStr::new(".git")));
/// assert!(skip.is_skipped(OsStr::new(".gitignore")));
/// assert!(!skip.is_skipped(OsStr::new("zshrc")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SkipPatterns {
    patterns: Vec<Pattern>,
}

impl SkipPatterns {
    /// Compile every pattern.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] for the first pattern that is
    /// not a valid glob.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|raw| {
                let raw = raw.as_ref();
                Pattern::new(raw).map_err(|e| ConfigError::InvalidPattern {
                    pattern: raw.to_string(),
                    message: e.msg.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Number of compiled patterns.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.patterns.len()
    }

    /// `true` when no patterns are configured.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether a single path segment matches any pattern.
    #[must_use]
    pub fn is_skipped(&self, segment: &OsStr) -> bool {
        let segment = segment.to_string_lossy();
        self.patterns.iter().any(|p| p.matches(&segment))
    }

    /// Whether any segment of `rel` matches any pattern.
    #[must_use]
    pub fn matches_any_segment(&self, rel: &Path) -> bool {
        rel.components().any(|c| match c {
            Component::Normal(segment) => self.is_skipped(segment),
            _ => false,
        })
    }
}

/// Map a path relative to a source root onto a path relative to the target
/// root.
///
/// Returns `None` when any segment is skipped or the path has no segments.
/// With `dot_prefix`, a leading `.` is added to the first segment unless it
/// already has one; deeper segments are never changed.
///
/// # Examples
///
/// ```
/// use dotlink::projection::{SkipPatterns, transform};
/// use std::path::{Path, PathBuf};
///
/// let skip = SkipPatterns::new(&["*.git*"]).unwrap();
/// assert_eq!(
///     transform(Path::new("bin/tool"), true, &skip),
///     Some(PathBuf::from(".bin/tool"))
/// );
/// assert_eq!(
///     transform(Path::new(".config/app/init"), true, &skip),
///     Some(PathBuf::from(".config/app/init"))
/// );
/// assert_eq!(transform(Path::new("project/.git/HEAD"), true, &skip), None);
/// ```
#[must_use]
pub fn transform(rel: &Path, dot_prefix: bool, skip: &SkipPatterns) -> Option<PathBuf> {
    if skip.matches_any_segment(rel) {
        return None;
    }

    let segments: Vec<&OsStr> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(segment) => Some(segment),
            _ => None,
        })
        .collect();

    let (first, rest) = segments.split_first()?;
    let mut out = if dot_prefix && !first.to_string_lossy().starts_with('.') {
        let mut dotted = OsString::from(".");
        dotted.push(first);
        PathBuf::from(dotted)
    } else {
        PathBuf::from(first)
    };
    out.extend(rest);
    Some(out)
}

/// Target paths claimed by one namespace root.
#[derive(Debug, Clone)]
pub struct NamespaceProjection {
    /// Canonical path of the source root.
    pub root: PathBuf,
    /// Claimed target-relative paths mapped to their source files.
    pub targets: TargetSet,
}

/// A unit root linked as a single entry.
#[derive(Debug, Clone)]
pub struct UnitProjection {
    /// Canonical path of the source root.
    pub root: PathBuf,
    /// Absolute path of the link.
    pub destination: PathBuf,
}

/// Everything a run intends to own under the target root.
#[derive(Debug, Clone)]
pub struct Projection {
    /// Absolute target root.
    pub target: PathBuf,
    /// One entry per namespace root, in configuration order.
    pub namespaces: Vec<NamespaceProjection>,
    /// One entry per unit root, in configuration order.
    pub units: Vec<UnitProjection>,
}

impl Projection {
    /// Walk every resolved root and collect its claims.
    ///
    /// # Errors
    ///
    /// Returns an error if a namespace root cannot be walked.
    pub fn compute(target: &Path, roots: &[SourceRoot], skip: &SkipPatterns) -> Result<Self> {
        let mut namespaces = Vec::new();
        let mut units = Vec::new();
        for root in roots {
            match &root.mode {
                RootMode::Namespace => namespaces.push(NamespaceProjection {
                    root: root.path.clone(),
                    targets: compute_targets(&root.path, true, skip)?,
                }),
                RootMode::Unit { destination } => units.push(UnitProjection {
                    root: root.path.clone(),
                    destination: destination.clone(),
                }),
            }
        }
        Ok(Self {
            target: target.to_path_buf(),
            namespaces,
            units,
        })
    }

    /// Run every collision check; see [`collision`].
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        collision::check_overlap(&self.namespaces)?;
        collision::check_units(&self.target, &self.namespaces, &self.units)
    }

    /// Every claimed absolute target mapped to its absolute source.
    #[must_use]
    pub fn claimed(&self) -> BTreeMap<PathBuf, PathBuf> {
        let mut out = BTreeMap::new();
        for ns in &self.namespaces {
            for (rel, source) in &ns.targets {
                out.insert(self.target.join(rel), source.clone());
            }
        }
        for unit in &self.units {
            out.insert(unit.destination.clone(), unit.root.clone());
        }
        out
    }

    /// Total number of claimed targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.namespaces.iter().map(|n| n.targets.len()).sum::<usize>() + self.units.len()
    }

    /// `true` when nothing is claimed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
