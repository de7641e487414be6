//! Non-fatal configuration checks.
//!
//! Problems that make a run impossible are [`ConfigError`](crate::error::ConfigError)s;
//! this module only reports suspicious settings that still allow a run.
use std::collections::HashSet;

use super::Config;

/// A validation warning detected during configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The configuration section (e.g., "roots", "skip").
    pub source: String,
    /// The specific item that triggered the warning.
    pub item: String,
    /// Human-readable warning message.
    pub message: String,
}

impl ValidationWarning {
    /// Build a warning.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        item: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            item: item.into(),
            message: message.into(),
        }
    }
}

impl Config {
    /// Check the configuration for suspicious but non-fatal settings.
    #[must_use]
    pub fn validate(&self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if self.roots.is_empty() {
            warnings.push(ValidationWarning::new(
                "roots",
                "",
                "no source roots configured, nothing will be linked",
            ));
        }

        let mut seen = HashSet::new();
        for root in &self.roots {
            let item = root.path.display().to_string();
            if !seen.insert(&root.path) {
                warnings.push(ValidationWarning::new(
                    "roots",
                    &item,
                    "root is listed more than once",
                ));
            }
            if root.path == self.target {
                warnings.push(ValidationWarning::new(
                    "roots",
                    &item,
                    "root is the target directory itself",
                ));
            }
        }

        for pattern in &self.skip_patterns {
            if pattern.trim().is_empty() {
                warnings.push(ValidationWarning::new(
                    "skip",
                    pattern,
                    "empty skip pattern matches nothing",
                ));
            } else if pattern.contains('/') {
                warnings.push(ValidationWarning::new(
                    "skip",
                    pattern,
                    "skip patterns match single path segments; '/' never matches",
                ));
            }
        }

        if let Some(action) = &self.post_action
            && action.program.trim().is_empty()
        {
            warnings.push(ValidationWarning::new(
                "post_action",
                "program",
                "post_action program is empty",
            ));
        }

        warnings
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_SKIP, PostAction, SourceRoot};

    #[test]
    fn clean_config_has_no_warnings() {
        let config = Config::new(
            "/home/u",
            vec![SourceRoot::namespace("/home/u/dots")],
            DEFAULT_SKIP,
        )
        .unwrap();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn duplicate_root_warns() {
        let config = Config::new(
            "/home/u",
            vec![
                SourceRoot::namespace("/home/u/dots"),
                SourceRoot::namespace("/home/u/dots"),
            ],
            DEFAULT_SKIP,
        )
        .unwrap();
        let warnings = config.validate();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("more than once"));
    }

    #[test]
    fn root_equal_to_target_warns() {
        let config =
            Config::new("/home/u", vec![SourceRoot::namespace("/home/u")], DEFAULT_SKIP).unwrap();
        assert!(
            config
                .validate()
                .iter()
                .any(|w| w.message.contains("target directory"))
        );
    }

    #[test]
    fn suspicious_skip_patterns_warn() {
        let config = Config::new(
            "/home/u",
            vec![SourceRoot::namespace("/home/u/dots")],
            &["", "a/b"],
        )
        .unwrap();
        let warnings = config.validate();
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.source == "skip"));
    }

    #[test]
    fn empty_post_action_warns() {
        let config = Config::new(
            "/home/u",
            vec![SourceRoot::namespace("/home/u/dots")],
            DEFAULT_SKIP,
        )
        .unwrap()
        .with_post_action(PostAction {
            program: " ".to_string(),
            args: vec![],
        });
        assert_eq!(config.validate()[0].source, "post_action");
    }

    #[test]
    fn no_roots_warns() {
        let config = Config::new("/home/u", vec![], DEFAULT_SKIP).unwrap();
        assert_eq!(config.validate().len(), 1);
    }
}
