//! CLI configuration.
//!
//! ```toml
//! [output]
//! pretty = true
//!
//! [builder]
//! strict = false
//! ```
//!
//! Lookup order: an explicit path, `$FINDOPTS_CONFIG`, `./findopts.toml`,
//! then `findopts/config.toml` in the user config directory.

use crate::error::{QueryError, QueryResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "FINDOPTS_CONFIG";

/// Config file name looked up in the working directory.
pub const CONFIG_FILE: &str = "findopts.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub builder: BuilderConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print the JSON document.
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Reject operator calls made before any `where(field)`.
    pub strict: bool,
}

impl Config {
    /// Load configuration from the first location that applies.
    ///
    /// An explicit path or `$FINDOPTS_CONFIG` must exist. The default
    /// locations are optional; when none exists the defaults are used.
    pub fn load(explicit: Option<&Path>) -> QueryResult<Self> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        Self::load_with(explicit, from_env.as_deref())
    }

    fn load_with(explicit: Option<&Path>, from_env: Option<&Path>) -> QueryResult<Self> {
        if let Some(path) = explicit.or(from_env) {
            return Self::from_file(path);
        }

        for path in default_locations() {
            if path.is_file() {
                return Self::from_file(&path);
            }
        }

        debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> QueryResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| QueryError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let config = Self::from_toml(&content)
            .map_err(|e| QueryError::Config(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> QueryResult<Self> {
        toml::from_str(content).map_err(|e| QueryError::Config(e.to_string()))
    }
}

fn default_locations() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("findopts").join("config.toml"));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("findopts-{}-{}", std::process::id(), name));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.output.pretty);
        assert!(!config.builder.strict);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml("[builder]\nstrict = true\n").unwrap();
        assert!(config.builder.strict);
        assert!(config.output.pretty);

        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_malformed_toml() {
        let err = Config::from_toml("[output]\npretty = \"yes\"").unwrap_err();
        assert!(matches!(err, QueryError::Config(_)));
    }

    #[test]
    fn test_explicit_path_wins_over_env() {
        let explicit = temp_file("explicit.toml", "[output]\npretty = false\n");
        let env = temp_file("env.toml", "[builder]\nstrict = true\n");

        let config = Config::load_with(Some(&explicit), Some(&env)).unwrap();
        assert!(!config.output.pretty);
        assert!(!config.builder.strict);

        let config = Config::load_with(None, Some(&env)).unwrap();
        assert!(config.builder.strict);

        fs::remove_file(explicit).ok();
        fs::remove_file(env).ok();
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let missing = std::env::temp_dir().join("findopts-does-not-exist.toml");
        let err = Config::load_with(Some(&missing), None).unwrap_err();
        assert!(matches!(err, QueryError::Config(_)));
    }
}
