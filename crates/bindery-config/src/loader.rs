//! Configuration Loader
//!
//! Handles loading configuration and applying environment overrides with proper precedence.

use crate::project::{validate_call_depth, ProjectConfig};
use crate::{ConfigError, ConfigResult, CONFIG_FILE_NAME, DEFAULT_MAX_CALL_DEPTH};
use std::env;
use std::path::{Path, PathBuf};

/// Configuration loader
///
/// Loads configuration and merges it with proper precedence:
/// 1. Built-in defaults - lowest priority
/// 2. Project config (./bindery.toml) - overrides defaults
/// 3. Environment variables (BINDERY_*) - overrides project
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Skip BINDERY_* overrides (used by embedders that want file-only config)
    ignore_env: bool,
}

/// Merged configuration result
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,

    /// Project root directory (where bindery.toml was found)
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { ignore_env: false }
    }

    /// Create a loader that does not consult the environment
    pub fn without_env() -> Self {
        Self { ignore_env: true }
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find bindery.toml. A missing file is not
    /// an error; defaults apply.
    pub fn load_from_directory(&self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project_config) = self.find_project_config(start_dir)?;
        let project_config = self.apply_env_overrides(project_config)?;

        Ok(Config {
            project: project_config,
            project_root,
        })
    }

    /// Load configuration from a specific project config file
    pub fn load_from_file(&self, config_path: &Path) -> ConfigResult<Config> {
        let project_config = ProjectConfig::load_from_file(config_path)?;
        let project_config = self.apply_env_overrides(project_config)?;

        Ok(Config {
            project: project_config,
            project_root: config_path.parent().map(|p| p.to_path_buf()),
        })
    }

    /// Find project configuration by walking up directory tree
    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, ProjectConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);

            if config_path.exists() {
                let project_config = ProjectConfig::load_from_file(&config_path)?;
                return Ok((Some(current), project_config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, ProjectConfig::default())),
            }
        }
    }

    /// Apply environment variable overrides to project config
    ///
    /// Environment variables follow the pattern: BINDERY_<KEY>
    /// Example: BINDERY_ENFORCE_ARITY=true
    fn apply_env_overrides(&self, mut config: ProjectConfig) -> ConfigResult<ProjectConfig> {
        if self.ignore_env {
            return Ok(config);
        }

        if let Ok(depth) = env::var("BINDERY_MAX_CALL_DEPTH") {
            let depth: usize = depth.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "BINDERY_MAX_CALL_DEPTH".to_string(),
                reason: format!("expected a positive integer, got '{}'", depth),
            })?;
            validate_call_depth(depth)?;
            config.runtime_mut().max_call_depth = Some(depth);
        }

        if let Ok(enforce) = env::var("BINDERY_ENFORCE_ARITY") {
            let enforce = matches!(enforce.to_lowercase().as_str(), "true" | "1" | "yes");
            config.runtime_mut().enforce_arity = Some(enforce);
        }

        Ok(config)
    }
}

impl Config {
    /// Effective call depth (project/env > default)
    pub fn max_call_depth(&self) -> usize {
        self.project
            .max_call_depth()
            .unwrap_or(DEFAULT_MAX_CALL_DEPTH)
    }

    /// Effective arity enforcement (project/env > off)
    pub fn enforce_arity(&self) -> bool {
        self.project.enforce_arity().unwrap_or(false)
    }

    /// Get the project root directory
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Check if a bindery.toml was found
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }
}
