//! Interpreter management through pyenv

use super::{PythonBackend, PythonVersion};
use crate::error::{BootstrapError, Result};
use crate::runtime::command::{CommandRunner, CommandSpec};
use crate::runtime::tool::{self, ToolManager};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct PyenvBackend {
    runner: Arc<dyn CommandRunner>,
    tool: ToolManager,
}

impl PyenvBackend {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            tool: tool::pyenv_tool(runner.clone()),
            runner,
        }
    }

    /// Versions pyenv has already built
    pub fn installed_versions(&self) -> Result<BTreeSet<String>> {
        let output = self
            .runner
            .run_checked(&CommandSpec::new("pyenv", ["versions", "--bare"]))?;
        Ok(output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

impl PythonBackend for PyenvBackend {
    fn name(&self) -> &'static str {
        "pyenv"
    }

    fn is_installed(&self) -> bool {
        self.tool.is_installed()
    }

    fn missing(&self) -> BootstrapError {
        self.tool.missing()
    }

    fn ensure_version_available(&self, version: &PythonVersion) -> Result<()> {
        if self.installed_versions()?.contains(version.as_str()) {
            tracing::debug!(%version, "pyenv already has version");
            return Ok(());
        }
        self.runner.run_checked(&CommandSpec::new(
            "pyenv",
            ["install", "-s", version.as_str()],
        ))?;
        Ok(())
    }

    fn pin_locally(&self, project_root: &Path, version: &PythonVersion) -> Result<()> {
        self.runner.run_checked(
            &CommandSpec::new("pyenv", ["local", version.as_str()]).in_dir(project_root),
        )?;
        Ok(())
    }

    fn resolve_interpreter_path(&self, version: &PythonVersion) -> Result<PathBuf> {
        let output = self
            .runner
            .run_checked(&CommandSpec::new("pyenv", ["prefix", version.as_str()]))?;
        let prefix = PathBuf::from(output.stdout.trim());
        Ok(interpreter_in_prefix(&prefix))
    }

    fn install_base_packages(&self, version: &PythonVersion, packages: &[&str]) -> Result<()> {
        if packages.is_empty() {
            return Ok(());
        }
        let python = self.resolve_interpreter_path(version)?;
        let mut args = vec!["-m", "pip", "install", "--upgrade"];
        args.extend_from_slice(packages);
        self.runner
            .run_checked(&CommandSpec::new(python.display().to_string(), args))?;
        Ok(())
    }
}

fn interpreter_in_prefix(prefix: &Path) -> PathBuf {
    if cfg!(windows) {
        prefix.join("python.exe")
    } else {
        prefix.join("bin").join("python")
    }
}
