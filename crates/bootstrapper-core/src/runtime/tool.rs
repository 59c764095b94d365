//! Host tool probing
//!
//! Provides a reusable abstraction for checking whether a backend's own CLI
//! (pyenv, poetry, uv) is available before any workflow step touches it.

use crate::error::BootstrapError;
use crate::runtime::command::{CommandRunner, CommandSpec};
use std::sync::Arc;

/// Configuration for a CLI tool
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Name of the tool binary (e.g., "pyenv")
    pub name: &'static str,
    /// Display name for user-facing messages
    pub display_name: &'static str,
    /// URL to the installation instructions
    pub docs_url: &'static str,
}

/// Checks a CLI tool through a [`CommandRunner`]
#[derive(Clone)]
pub struct ToolManager {
    config: ToolConfig,
    runner: Arc<dyn CommandRunner>,
}

impl ToolManager {
    pub fn new(config: ToolConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    fn version_command(&self) -> CommandSpec {
        CommandSpec::new(self.config.name, ["--version"])
    }

    /// Check if the tool answers `--version`; any failure means "not installed"
    pub fn is_installed(&self) -> bool {
        match self.runner.run(&self.version_command()) {
            Ok(output) => output.success(),
            Err(e) => {
                tracing::debug!(tool = self.config.name, error = %e, "tool probe failed");
                false
            }
        }
    }

    /// Get the installed tool version (if available)
    pub fn get_version(&self) -> Option<String> {
        self.runner
            .run(&self.version_command())
            .ok()
            .filter(|output| output.success())
            .map(|output| output.stdout.trim().to_string())
    }

    /// The error reported when this tool is required but absent
    pub fn missing(&self) -> BootstrapError {
        BootstrapError::MissingPrerequisite {
            tool: self.config.display_name.to_string(),
            hint: format!(
                "Install {} first ({}).",
                self.config.display_name, self.config.docs_url
            ),
        }
    }
}

pub fn pyenv_tool(runner: Arc<dyn CommandRunner>) -> ToolManager {
    ToolManager::new(
        ToolConfig {
            name: "pyenv",
            display_name: "pyenv",
            docs_url: "https://github.com/pyenv/pyenv#installation",
        },
        runner,
    )
}

pub fn poetry_tool(runner: Arc<dyn CommandRunner>) -> ToolManager {
    ToolManager::new(
        ToolConfig {
            name: "poetry",
            display_name: "Poetry",
            docs_url: "https://python-poetry.org/docs/#installation",
        },
        runner,
    )
}

pub fn uv_tool(runner: Arc<dyn CommandRunner>) -> ToolManager {
    ToolManager::new(
        ToolConfig {
            name: "uv",
            display_name: "uv",
            docs_url: "https://docs.astral.sh/uv/getting-started/installation/",
        },
        runner,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::testing::FakeRunner;

    #[test]
    fn test_installed_when_version_succeeds() {
        let runner = FakeRunner::new().respond("pyenv --version", "pyenv 2.4.0\n");
        let tool = pyenv_tool(runner.clone());

        assert!(tool.is_installed());
        assert_eq!(tool.get_version().as_deref(), Some("pyenv 2.4.0"));
        assert_eq!(runner.calls()[0], "pyenv --version");
    }

    #[test]
    fn test_not_installed_when_spawn_fails() {
        let runner = FakeRunner::new();
        let tool = uv_tool(runner);

        assert!(!tool.is_installed());
        assert!(tool.get_version().is_none());
    }

    #[test]
    fn test_not_installed_on_non_zero_exit() {
        let runner = FakeRunner::new().fail("poetry --version", 127, "command not found");
        assert!(!poetry_tool(runner).is_installed());
    }

    #[test]
    fn test_missing_error_names_tool() {
        let tool = pyenv_tool(FakeRunner::new());
        let message = tool.missing().to_string();
        assert!(message.starts_with("pyenv not found in PATH"));
        assert!(message.contains("Install pyenv first"));
    }
}
