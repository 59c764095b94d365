//! Layered defaults for the bootstrap commands
//!
//! Precedence, lowest first: built-in defaults, `.api-bootstrapper.yaml` in
//! the project directory, `API_BOOTSTRAPPER_*` environment variables. CLI
//! flags are applied on top by the caller.

use crate::error::{BootstrapError, Result};
use crate::manager::ManagerChoice;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = ".api-bootstrapper.yaml";
pub const PYTHON_ENV: &str = "API_BOOTSTRAPPER_PYTHON";
pub const MANAGER_ENV: &str = "API_BOOTSTRAPPER_MANAGER";

/// Python version used when nothing else asks for one
pub const DEFAULT_PYTHON_VERSION: &str = "3.12.12";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapConfig {
    pub python: String,
    pub manager: ManagerChoice,
    pub install: bool,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            python: DEFAULT_PYTHON_VERSION.to_string(),
            manager: ManagerChoice::default(),
            install: true,
        }
    }
}

/// On-disk form; every field optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    python: Option<String>,
    manager: Option<ManagerChoice>,
    install: Option<bool>,
}

impl BootstrapConfig {
    /// Resolve the configuration for `project_root` from file and process environment
    pub fn load(project_root: &Path) -> Result<Self> {
        Self::load_with_env(project_root, |key| std::env::var(key).ok())
    }

    pub fn load_with_env<F>(project_root: &Path, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let path = config_path(project_root);
        if path.is_file() {
            let file = read_config_file(&path)?;
            tracing::debug!(path = %path.display(), "loaded config file");
            if let Some(python) = file.python {
                config.python = python;
            }
            if let Some(manager) = file.manager {
                config.manager = manager;
            }
            if let Some(install) = file.install {
                config.install = install;
            }
        }

        if let Some(python) = env(PYTHON_ENV).filter(|v| !v.trim().is_empty()) {
            config.python = python.trim().to_string();
        }
        if let Some(manager) = env(MANAGER_ENV).filter(|v| !v.trim().is_empty()) {
            config.manager = manager.parse().map_err(|_| {
                BootstrapError::ConfigValue(format!(
                    "{MANAGER_ENV}='{manager}' is not one of pyenv, uv"
                ))
            })?;
        }

        Ok(config)
    }

    /// Apply explicit command-line values on top
    pub fn with_overrides(
        mut self,
        python: Option<String>,
        manager: Option<ManagerChoice>,
        install: Option<bool>,
    ) -> Self {
        if let Some(python) = python {
            self.python = python;
        }
        if let Some(manager) = manager {
            self.manager = manager;
        }
        if let Some(install) = install {
            self.install = install;
        }
        self
    }
}

pub fn config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_FILE)
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let content = crate::project::files::read_text(path)?;
    if content.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str(&content).map_err(|source| BootstrapError::Config {
        path: path.to_path_buf(),
        source,
    })
}
