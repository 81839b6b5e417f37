//! Project Configuration (bindery.toml)
//!
//! Handles project-level configuration stored in `bindery.toml` at the project root.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Project configuration from bindery.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Runtime invocation settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<RuntimeConfig>,
}

/// `[runtime]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Maximum number of nested invocations, bound hops included
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_call_depth: Option<usize>,

    /// Reject calls whose final argument count differs from a native's declared arity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enforce_arity: Option<bool>,
}

impl ProjectConfig {
    /// Load project configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config = Self::parse(&content).map_err(|e| match e {
            ConfigError::TomlParseError { error, .. } => ConfigError::TomlParseError {
                file: path.to_path_buf(),
                error,
            },
            other => other,
        })?;
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn parse(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::TomlParseError {
            file: Default::default(),
            error: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the project configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(depth) = self.runtime.as_ref().and_then(|r| r.max_call_depth) {
            validate_call_depth(depth)?;
        }
        Ok(())
    }

    /// Configured call depth, if any
    pub fn max_call_depth(&self) -> Option<usize> {
        self.runtime.as_ref().and_then(|r| r.max_call_depth)
    }

    /// Configured arity enforcement, if any
    pub fn enforce_arity(&self) -> Option<bool> {
        self.runtime.as_ref().and_then(|r| r.enforce_arity)
    }

    /// Mutable access to the `[runtime]` section, creating it when absent
    pub fn runtime_mut(&mut self) -> &mut RuntimeConfig {
        self.runtime.get_or_insert_with(RuntimeConfig::default)
    }
}

pub(crate) fn validate_call_depth(depth: usize) -> ConfigResult<()> {
    if depth == 0 {
        return Err(ConfigError::InvalidValue {
            field: "runtime.max_call_depth".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}
