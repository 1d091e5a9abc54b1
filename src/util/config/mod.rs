//! clasp configuration
//!
//! Every field has a default, so an empty file (or no file at all) gives the
//! stock limits.
//!
//! # Lookup order
//!
//! ```text
//! 1. --config <path>
//! 2. ./clasp.toml
//! 3. $XDG_CONFIG_HOME/clasp/config.toml
//! 4. $HOME/.config/clasp/config.toml
//! 5. Default values
//! ```
//!
//! # Example
//!
//! ```toml
//! [limits]
//! scope_depth = 128
//!
//! [log]
//! level = "debug"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::logger::LogLevel;

/// Project-level configuration file name
pub const CONFIG_FILE: &str = "clasp.toml";

const MIB: usize = 1 << 20;

/// Configuration of one compilation session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SessionConfig {
    pub limits: Limits,
    pub log: LogConfig,
}

/// Capacities and ceilings of the session tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Initial slots of the name set
    pub name_set_capacity: usize,
    /// Initial slots of each class set
    pub class_set_capacity: usize,
    /// Bytes the name region may grow to
    pub name_bytes_ceiling: usize,
    /// Records the class table may hold
    pub class_info_ceiling: usize,
    /// Bytes of string literal data
    pub statics_ceiling: usize,
    /// Nesting depth of brackets in the tokenizer
    pub scope_depth: usize,
    /// Pending operators and open scopes in the parser
    pub operator_depth: usize,
    /// Token slots reserved up front
    pub token_capacity: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            name_set_capacity: 256,
            class_set_capacity: 64,
            name_bytes_ceiling: 16 * MIB,
            class_info_ceiling: 16 * MIB,
            statics_ceiling: 128 * MIB,
            scope_depth: 64,
            operator_depth: 512,
            token_capacity: 4096,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
    /// Colored diagnostics
    pub color: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            color: true,
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Get the user config directory
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config).join("clasp"));
    }

    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home).join(".config").join("clasp"));
    }

    if let Ok(appdata) = std::env::var("APPDATA") {
        return Some(PathBuf::from(appdata).join("clasp"));
    }

    None
}

impl SessionConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Files checked by [`SessionConfig::discover`], in order
    pub fn candidates() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = config_dir() {
            paths.push(dir.join("config.toml"));
        }
        paths
    }

    /// Load the first existing candidate, or the defaults
    pub fn discover() -> Result<Self, ConfigError> {
        match Self::candidates().into_iter().find(|path| path.is_file()) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(SessionConfig::from_toml_str("").unwrap(), SessionConfig::default());
    }

    #[test]
    fn test_partial_tables_keep_defaults() {
        let config = SessionConfig::from_toml_str(
            r#"
            [limits]
            scope_depth = 8

            [log]
            level = "trace"
            "#,
        )
        .unwrap();
        assert_eq!(config.limits.scope_depth, 8);
        assert_eq!(config.limits.operator_depth, 512);
        assert_eq!(config.log.level, LogLevel::Trace);
        assert!(config.log.color);
    }

    #[test]
    fn test_invalid_config() {
        let err = SessionConfig::from_toml_str("[limits]\nscope_depth = \"deep\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[limits]\ntoken_capacity = 16").unwrap();
        let config = SessionConfig::load(file.path()).unwrap();
        assert_eq!(config.limits.token_capacity, 16);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SessionConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("absent.toml"));
    }
}
