//! Project configuration for response contract checks

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::deprecation::{Deprecation, DeprecationSink};

/// Project configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// OpenAPI / Swagger document used when `--spec` is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<PathBuf>,

    /// Default strictness for responses that do not set `strict`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,

    /// Deprecated: old name of `strict`
    #[serde(default, rename = "strict_schema", skip_serializing_if = "Option::is_none")]
    pub legacy_strict: Option<bool>,
}

impl Config {
    /// Load config from file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        }
    }

    /// Load from default location (.respcontract.toml)
    ///
    /// # Errors
    ///
    /// Returns error if a candidate file exists but cannot be read or parsed
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load_from_dir(Path::new("."))
    }

    /// Load the first config candidate found in `dir`, or defaults.
    ///
    /// # Errors
    ///
    /// Returns error if a candidate file exists but cannot be read or parsed
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let candidates = [".respcontract.toml", ".respcontract.json", "respcontract.toml"];

        for name in candidates {
            let path = dir.join(name);
            if path.exists() {
                return Self::load(&path);
            }
        }

        // No config file, return default
        Ok(Self::default())
    }

    /// Global default strictness.
    ///
    /// `strict` wins; the deprecated `strict_schema` is honored with a
    /// notice; otherwise responses are validated leniently.
    pub fn default_strict(&self, sink: &dyn DeprecationSink) -> bool {
        if let Some(strict) = self.strict {
            return strict;
        }
        if let Some(legacy) = self.legacy_strict {
            sink.deprecated(&Deprecation::LegacyConfigKey {
                key: "strict_schema",
                replacement: "strict",
            });
            return legacy;
        }
        false
    }

    /// Create example config file
    #[must_use]
    pub fn example() -> &'static str {
        r#"# respcontract configuration

# OpenAPI / Swagger document (local file path)
spec = "openapi.yaml"

# Reject undeclared body properties and require every declared one,
# unless a response sets `strict` itself
strict = false
"#
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
}
