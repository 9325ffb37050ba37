//! Pipeline configuration, read from a YAML file.
//!
//! ```yaml
//! content_dir: content
//! output_dir: build/pages
//! public_dir: build/public/assets
//! public_url_prefix: /assets
//! extension: typ
//! report_title: Course content
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::diagnostics::{Failure, SchemaViolation, ViolationKind};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {}: {source}", .config_path.display())]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {}: {source}", .config_path.display())]
    ConfigParseError {
        config_path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Invalid config file at {}: {} problem(s)", .config_path.display(), .violations.len())]
    ConfigInvalid {
        config_path: PathBuf,
        violations: Vec<SchemaViolation>,
    },
}

impl From<ConfigError> for Failure {
    fn from(error: ConfigError) -> Self {
        match error {
            ConfigError::ConfigReadError { source, .. } => Failure::Io(source),
            ConfigError::ConfigParseError { source, .. } => Failure::Yaml(source),
            ConfigError::ConfigInvalid { violations, .. } => Failure::Schema(violations),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub content_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Where `#image` files are copied to.
    pub public_dir: PathBuf,
    /// URL under which `public_dir` is served.
    pub public_url_prefix: String,
    /// Extension of page sources, without the dot.
    pub extension: String,
    pub report_title: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("content"),
            output_dir: PathBuf::from("build/pages"),
            public_dir: PathBuf::from("build/public/assets"),
            public_url_prefix: "/assets".to_string(),
            extension: "typ".to_string(),
            report_title: "Content issues".to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config_path = config_path.as_ref();
        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;
        let config = Self::from_yaml(&content).map_err(|source| ConfigError::ConfigParseError {
            config_path: config_path.to_path_buf(),
            source,
        })?;

        let violations = config.validate();
        if !violations.is_empty() {
            return Err(ConfigError::ConfigInvalid {
                config_path: config_path.to_path_buf(),
                violations,
            });
        }
        Ok(config)
    }

    /// Parses YAML; an empty document yields the defaults.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Checks values serde cannot.
    pub fn validate(&self) -> Vec<SchemaViolation> {
        let mut violations = Vec::new();
        let extension = self.extension.trim();
        if extension.is_empty() || extension.starts_with('.') || extension.contains('/') {
            violations.push(SchemaViolation::new(
                ["extension"],
                ViolationKind::Custom {
                    message: format!(
                        "Extension '{}' must be a bare name such as 'typ'",
                        self.extension
                    ),
                },
            ));
        }
        if !self.public_url_prefix.starts_with('/') && !self.public_url_prefix.contains("://") {
            violations.push(SchemaViolation::new(
                ["public_url_prefix"],
                ViolationKind::Custom {
                    message: "The public URL prefix must start with '/' or be an absolute URL"
                        .to_string(),
                },
            ));
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let config = PipelineConfig::from_yaml("extension: md\n").unwrap();
        assert_eq!(config.extension, "md");
        assert_eq!(config.public_url_prefix, "/assets");
        assert_eq!(PipelineConfig::from_yaml("").unwrap(), PipelineConfig::default());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(PipelineConfig::from_yaml("extention: md\n").is_err());
    }

    #[test]
    fn validation_flags_bad_values() {
        let config = PipelineConfig {
            extension: ".typ".into(),
            public_url_prefix: "assets".into(),
            ..PipelineConfig::default()
        };
        let paths: Vec<_> = config.validate().into_iter().map(|v| v.path).collect();
        assert_eq!(paths.len(), 2);
        assert!(PipelineConfig::default().validate().is_empty());
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = PipelineConfig::load_from_path(dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigReadError { .. }));
    }
}
