//! TOML configuration file parsing and path expansion.
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Load and deserialize a TOML file.
///
/// A missing file deserializes as empty TOML so that every field falls back
/// to its default.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file exists but cannot be read, or
/// [`ConfigError::InvalidSyntax`] if it cannot be parsed.
pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let display = path.display().to_string();
    if !path.exists() {
        return parse_config("", &display);
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: display.clone(),
        source,
    })?;

    parse_config(&content, &display)
}

/// Deserialize TOML content, labelling errors with `file`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidSyntax`] if the content cannot be parsed.
pub fn parse_config<T: DeserializeOwned>(content: &str, file: &str) -> Result<T, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::InvalidSyntax {
        file: file.to_string(),
        message: e.message().to_string(),
    })
}

/// Expand a leading `~` to `home`.
#[must_use]
pub fn expand_home(raw: &str, home: &Path) -> PathBuf {
    if raw == "~" {
        return home.to_path_buf();
    }
    raw.strip_prefix("~/")
        .map_or_else(|| PathBuf::from(raw), |rest| home.join(rest))
}

/// Default location of the run-state file.
///
/// Honors `XDG_STATE_HOME`, falling back to `~/.local/state`.
#[must_use]
pub fn default_state_file(home: &Path) -> PathBuf {
    std::env::var_os("XDG_STATE_HOME")
        .filter(|v| !v.is_empty())
        .map_or_else(|| home.join(".local").join("state"), PathBuf::from)
        .join("dotlink")
        .join("state.json")
}

/// Default location of the configuration file.
///
/// Honors `XDG_CONFIG_HOME`, falling back to `~/.config`.
#[must_use]
pub fn default_config_file(home: &Path) -> PathBuf {
    std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map_or_else(|| home.join(".config"), PathBuf::from)
        .join("dotlink")
        .join("config.toml")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Default)]
    struct Sample {
        #[serde(default)]
        name: String,
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let sample: Sample = load_config(&dir.path().join("absent.toml")).unwrap();
        assert!(sample.name.is_empty());
    }

    #[test]
    fn parse_error_names_file() {
        let err = parse_config::<Sample>("name = ", "conf.toml").unwrap_err();
        assert!(err.to_string().contains("conf.toml"));
    }

    #[test]
    fn tilde_expands() {
        let home = Path::new("/home/u");
        assert_eq!(expand_home("~", home), PathBuf::from("/home/u"));
        assert_eq!(expand_home("~/dots", home), PathBuf::from("/home/u/dots"));
        assert_eq!(expand_home("/abs", home), PathBuf::from("/abs"));
        assert_eq!(expand_home("rel/~", home), PathBuf::from("rel/~"));
    }
}
