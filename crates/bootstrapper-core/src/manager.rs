//! Backend selection

use crate::deps::{DependencyBackend, PoetryBackend, UvDependencyBackend};
use crate::environment::EnvironmentBootstrapper;
use crate::error::BootstrapError;
use crate::logger::Logger;
use crate::project::manifest::manifest_path;
use crate::project::VsCodeWriter;
use crate::python::{PyenvBackend, PythonBackend, UvPythonBackend};
use crate::runtime::tool::{self, ToolManager};
use crate::runtime::CommandRunner;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// Which toolchain manages the interpreter and the dependencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ManagerChoice {
    /// pyenv for the interpreter, Poetry for dependencies
    #[default]
    Pyenv,
    /// uv for both
    Uv,
}

impl ManagerChoice {
    pub const ALL: [ManagerChoice; 2] = [ManagerChoice::Pyenv, ManagerChoice::Uv];

    pub fn as_str(&self) -> &'static str {
        match self {
            ManagerChoice::Pyenv => "pyenv",
            ManagerChoice::Uv => "uv",
        }
    }

    /// Description shown in interactive selection
    pub fn label(&self) -> &'static str {
        match self {
            ManagerChoice::Pyenv => "pyenv + Poetry",
            ManagerChoice::Uv => "uv",
        }
    }

    /// CLI that runs project commands (`<tool> run ...`)
    pub fn run_tool(&self) -> &'static str {
        match self {
            ManagerChoice::Pyenv => "poetry",
            ManagerChoice::Uv => "uv",
        }
    }

    /// Guess the manager from an existing manifest; Poetry when unsure
    pub fn detect(project_root: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(manifest_path(project_root)) else {
            return ManagerChoice::Pyenv;
        };
        let has_header = |header: &str| content.lines().any(|l| l.trim() == header);

        if has_header("[tool.poetry]") || has_header("[tool.poetry.dependencies]") {
            ManagerChoice::Pyenv
        } else if has_header("[project]") {
            ManagerChoice::Uv
        } else {
            ManagerChoice::Pyenv
        }
    }

    /// Host tools this choice needs, interpreter manager first
    pub fn tools(&self, runner: Arc<dyn CommandRunner>) -> Vec<ToolManager> {
        match self {
            ManagerChoice::Pyenv => vec![
                tool::pyenv_tool(runner.clone()),
                tool::poetry_tool(runner),
            ],
            ManagerChoice::Uv => vec![tool::uv_tool(runner)],
        }
    }

    pub fn python_backend(&self, runner: Arc<dyn CommandRunner>) -> Box<dyn PythonBackend> {
        match self {
            ManagerChoice::Pyenv => Box::new(PyenvBackend::new(runner)),
            ManagerChoice::Uv => Box::new(UvPythonBackend::new(runner)),
        }
    }

    pub fn dependency_backend(&self, runner: Arc<dyn CommandRunner>) -> Box<dyn DependencyBackend> {
        match self {
            ManagerChoice::Pyenv => Box::new(PoetryBackend::new(runner)),
            ManagerChoice::Uv => Box::new(UvDependencyBackend::new(runner)),
        }
    }

    /// Wire the orchestrator with this choice's backends and the VSCode writer
    pub fn bootstrapper(
        &self,
        runner: Arc<dyn CommandRunner>,
        logger: Box<dyn Logger>,
    ) -> EnvironmentBootstrapper {
        EnvironmentBootstrapper::new(
            self.python_backend(runner.clone()),
            self.dependency_backend(runner.clone()),
            Box::new(VsCodeWriter),
            logger,
            runner,
        )
    }
}

impl fmt::Display for ManagerChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ManagerChoice {
    type Err = BootstrapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pyenv" | "poetry" => Ok(ManagerChoice::Pyenv),
            "uv" => Ok(ManagerChoice::Uv),
            other => Err(BootstrapError::ConfigValue(format!(
                "unknown manager '{other}' (expected pyenv or uv)"
            ))),
        }
    }
}
