//! Dependency management through Poetry

use super::DependencyBackend;
use crate::error::{BootstrapError, Result};
use crate::project::manifest::ManifestDialect;
use crate::runtime::command::{CommandRunner, CommandSpec};
use crate::runtime::tool::{self, ToolManager};
use std::path::Path;
use std::sync::Arc;

const BASE_PACKAGES: &[&str] = &["pip", "setuptools", "wheel", "poetry"];

pub struct PoetryBackend {
    runner: Arc<dyn CommandRunner>,
    tool: ToolManager,
}

impl PoetryBackend {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            tool: tool::poetry_tool(runner.clone()),
            runner,
        }
    }

    fn poetry<const N: usize>(project_root: &Path, args: [&str; N]) -> CommandSpec {
        CommandSpec::new("poetry", args).in_dir(project_root)
    }
}

impl DependencyBackend for PoetryBackend {
    fn name(&self) -> &'static str {
        "poetry"
    }

    fn is_installed(&self) -> bool {
        self.tool.is_installed()
    }

    fn missing(&self) -> BootstrapError {
        self.tool.missing()
    }

    fn manifest_dialect(&self) -> ManifestDialect {
        ManifestDialect::POETRY
    }

    fn base_packages(&self) -> &'static [&'static str] {
        BASE_PACKAGES
    }

    fn configure_venv_placement(&self, project_root: &Path) -> Result<()> {
        self.runner.run_checked(&Self::poetry(
            project_root,
            ["config", "virtualenvs.in-project", "true", "--local"],
        ))?;
        Ok(())
    }

    fn bind_interpreter(&self, project_root: &Path, interpreter: &Path) -> Result<()> {
        let interpreter = interpreter.display().to_string();
        self.runner.run_checked(&Self::poetry(
            project_root,
            ["env", "use", interpreter.as_str()],
        ))?;
        Ok(())
    }

    fn ensure_venv_exists(&self, project_root: &Path) -> Result<()> {
        if self.resolve_venv_path(project_root).is_dir() {
            return Ok(());
        }
        // Poetry has no create-only command; a root-less install creates the venv
        self.runner
            .run_checked(&Self::poetry(project_root, ["install", "--no-root"]))?;
        Ok(())
    }

    fn install_declared_dependencies(&self, project_root: &Path) -> Result<()> {
        self.runner
            .run_checked(&Self::poetry(project_root, ["install"]))?;
        Ok(())
    }
}
