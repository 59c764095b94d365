//! Dependency management through uv

use super::DependencyBackend;
use crate::error::{BootstrapError, Result};
use crate::project::manifest::ManifestDialect;
use crate::runtime::command::{CommandRunner, CommandSpec};
use crate::runtime::tool::{self, ToolManager};
use std::path::Path;
use std::sync::Arc;

pub struct UvDependencyBackend {
    runner: Arc<dyn CommandRunner>,
    tool: ToolManager,
}

impl UvDependencyBackend {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            tool: tool::uv_tool(runner.clone()),
            runner,
        }
    }
}

impl DependencyBackend for UvDependencyBackend {
    fn name(&self) -> &'static str {
        "uv"
    }

    fn is_installed(&self) -> bool {
        self.tool.is_installed()
    }

    fn missing(&self) -> BootstrapError {
        self.tool.missing()
    }

    fn manifest_dialect(&self) -> ManifestDialect {
        ManifestDialect::PEP621
    }

    fn base_packages(&self) -> &'static [&'static str] {
        &[]
    }

    fn configure_venv_placement(&self, _project_root: &Path) -> Result<()> {
        // uv always creates an in-project .venv
        Ok(())
    }

    fn bind_interpreter(&self, project_root: &Path, interpreter: &Path) -> Result<()> {
        let interpreter = interpreter.display().to_string();
        self.runner.run_checked(
            &CommandSpec::new("uv", ["venv", "--python", interpreter.as_str()])
                .in_dir(project_root),
        )?;
        Ok(())
    }

    fn ensure_venv_exists(&self, project_root: &Path) -> Result<()> {
        if self.resolve_venv_path(project_root).is_dir() {
            return Ok(());
        }
        self.runner
            .run_checked(&CommandSpec::new("uv", ["venv"]).in_dir(project_root))?;
        Ok(())
    }

    fn install_declared_dependencies(&self, project_root: &Path) -> Result<()> {
        self.ensure_venv_exists(project_root)?;
        self.runner.run_checked(
            &CommandSpec::new("uv", ["sync", "--all-groups"]).in_dir(project_root),
        )?;
        Ok(())
    }
}
