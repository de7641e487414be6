//! Configuration: source roots, target root, skip patterns, post-action.
//!
//! The file is TOML, deserialized once at startup into an immutable
//! [`Config`] that is passed by reference into the run.
pub mod toml_loader;
pub mod validation;

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::logging::Log;
use crate::projection::SkipPatterns;

/// Skip patterns used when the config file does not set `skip`.
pub const DEFAULT_SKIP: &[&str] = &["*.git*", ".DS_Store", "__pycache__"];

/// How a source root is projected onto the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootMode {
    /// Every file is linked individually with a dot-prefixed first segment.
    Namespace,
    /// The whole root is linked once at `destination` (absolute).
    Unit {
        /// Absolute path of the link.
        destination: PathBuf,
    },
}

/// A source tree participating in the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRoot {
    /// Path of the source directory.
    pub path: PathBuf,
    /// Projection mode.
    pub mode: RootMode,
    /// Whether absence of the root aborts the run.
    pub required: bool,
}

impl SourceRoot {
    /// A required namespace root.
    #[must_use]
    pub fn namespace(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode: RootMode::Namespace,
            required: true,
        }
    }

    /// A required unit root linked at `destination`.
    #[must_use]
    pub fn unit(path: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode: RootMode::Unit {
                destination: destination.into(),
            },
            required: true,
        }
    }

    /// Mark the root as optional.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// `true` for namespace roots.
    #[must_use]
    pub const fn is_namespace(&self) -> bool {
        matches!(self.mode, RootMode::Namespace)
    }
}

/// External command run after linking.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostAction {
    /// Program name or path.
    pub program: String,
    /// Arguments passed to the program.
    #[serde(default)]
    pub args: Vec<String>,
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Absolute target root (usually `$HOME`).
    pub target: PathBuf,
    /// Source roots in configuration order.
    pub roots: Vec<SourceRoot>,
    /// Raw skip patterns as written in the config.
    pub skip_patterns: Vec<String>,
    /// Compiled skip patterns.
    pub skip: SkipPatterns,
    /// Where the record of the previous run is kept; `None` disables stale
    /// cleanup.
    pub state_file: Option<PathBuf>,
    /// Optional command run after linking.
    pub post_action: Option<PostAction>,
}

/// On-disk shape of the config file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    target: Option<String>,
    skip: Option<Vec<String>>,
    state_file: Option<String>,
    #[serde(default)]
    roots: Vec<RawRoot>,
    post_action: Option<PostAction>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRoot {
    path: String,
    #[serde(default = "default_required")]
    required: bool,
    destination: Option<String>,
}

const fn default_required() -> bool {
    true
}

impl Config {
    /// Build a configuration directly from resolved values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] if a skip pattern is not a
    /// valid glob.
    pub fn new<S: AsRef<str>>(
        target: impl Into<PathBuf>,
        roots: Vec<SourceRoot>,
        skip: &[S],
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            target: target.into(),
            roots,
            skip_patterns: skip.iter().map(|s| s.as_ref().to_string()).collect(),
            skip: SkipPatterns::new(skip)?,
            state_file: None,
            post_action: None,
        })
    }

    /// Set the run-state file.
    #[must_use]
    pub fn with_state_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_file = Some(path.into());
        self
    }

    /// Set the post-action.
    #[must_use]
    pub fn with_post_action(mut self, action: PostAction) -> Self {
        self.post_action = Some(action);
        self
    }

    /// Load configuration from a TOML file.
    ///
    /// `~` expands to `home`. Relative root paths are resolved against the
    /// directory containing the file; relative unit destinations against the
    /// target root.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a skip
    /// pattern is invalid.
    pub fn load(path: &Path, home: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml_loader::load_config(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_raw(raw, base, home)
    }

    /// Parse configuration from a TOML string, resolving relative root paths
    /// against `base`.
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be parsed or a skip pattern is
    /// invalid.
    pub fn from_toml_str(content: &str, base: &Path, home: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml_loader::parse_config(content, "<inline>")?;
        Self::from_raw(raw, base, home)
    }

    fn from_raw(raw: RawConfig, base: &Path, home: &Path) -> Result<Self, ConfigError> {
        let target = raw
            .target
            .as_deref()
            .map_or_else(|| home.to_path_buf(), |t| toml_loader::expand_home(t, home));

        let roots = raw
            .roots
            .into_iter()
            .map(|r| {
                let path = base.join(toml_loader::expand_home(&r.path, home));
                let mode = r.destination.map_or(RootMode::Namespace, |dest| RootMode::Unit {
                    destination: target.join(toml_loader::expand_home(&dest, home)),
                });
                SourceRoot {
                    path,
                    mode,
                    required: r.required,
                }
            })
            .collect();

        let skip_patterns = raw
            .skip
            .unwrap_or_else(|| DEFAULT_SKIP.iter().map(ToString::to_string).collect());
        let skip = SkipPatterns::new(&skip_patterns)?;

        let state_file = Some(raw.state_file.map_or_else(
            || toml_loader::default_state_file(home),
            |s| toml_loader::expand_home(&s, home),
        ));

        Ok(Self {
            target,
            roots,
            skip_patterns,
            skip,
            state_file,
            post_action: raw.post_action,
        })
    }

    /// Resolve the target root to its canonical form.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingTarget`] if the target is not a directory.
    pub fn resolve_target(&self) -> Result<PathBuf, ConfigError> {
        if !self.target.is_dir() {
            return Err(ConfigError::MissingTarget {
                path: self.target.clone(),
            });
        }
        dunce::canonicalize(&self.target).map_err(|_| ConfigError::MissingTarget {
            path: self.target.clone(),
        })
    }

    /// Check every root for existence and canonicalize the ones present.
    ///
    /// Optional roots that do not exist are logged and dropped; a missing
    /// required root is an error. Unit destinations under the configured
    /// target are rebased onto `target`, the canonical target root.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRoot`] for the first required root that
    /// is not a directory.
    pub fn resolve_roots(
        &self,
        target: &Path,
        log: &dyn Log,
    ) -> Result<Vec<SourceRoot>, ConfigError> {
        let mut resolved = Vec::with_capacity(self.roots.len());
        for root in &self.roots {
            let canonical = if root.path.is_dir() {
                dunce::canonicalize(&root.path).ok()
            } else {
                None
            };
            match canonical {
                Some(path) => {
                    log.debug(&format!("root: {}", path.display()));
                    let mode = match &root.mode {
                        RootMode::Namespace => RootMode::Namespace,
                        RootMode::Unit { destination } => RootMode::Unit {
                            destination: destination
                                .strip_prefix(&self.target)
                                .map_or_else(|_| destination.clone(), |rel| target.join(rel)),
                        },
                    };
                    resolved.push(SourceRoot {
                        path,
                        mode,
                        required: root.required,
                    });
                }
                None if root.required => {
                    return Err(ConfigError::MissingRoot {
                        path: root.path.clone(),
                    });
                }
                None => {
                    log.info(&format!(
                        "optional root {} does not exist, skipping",
                        root.path.display()
                    ));
                }
            }
        }
        Ok(resolved)
    }
}
