//! Interpreter management through `uv python`

use super::{PythonBackend, PythonVersion};
use crate::error::{BootstrapError, Result};
use crate::runtime::command::{CommandRunner, CommandSpec};
use crate::runtime::tool::{self, ToolManager};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct UvPythonBackend {
    runner: Arc<dyn CommandRunner>,
    tool: ToolManager,
}

impl UvPythonBackend {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            tool: tool::uv_tool(runner.clone()),
            runner,
        }
    }

    fn find(version: &PythonVersion) -> CommandSpec {
        CommandSpec::new("uv", ["python", "find", version.as_str()])
    }
}

impl PythonBackend for UvPythonBackend {
    fn name(&self) -> &'static str {
        "uv"
    }

    fn is_installed(&self) -> bool {
        self.tool.is_installed()
    }

    fn missing(&self) -> BootstrapError {
        self.tool.missing()
    }

    fn ensure_version_available(&self, version: &PythonVersion) -> Result<()> {
        if self.runner.run(&Self::find(version))?.success() {
            tracing::debug!(%version, "uv already finds version");
            return Ok(());
        }
        self.runner.run_checked(&CommandSpec::new(
            "uv",
            ["python", "install", version.as_str()],
        ))?;
        Ok(())
    }

    fn pin_locally(&self, project_root: &Path, version: &PythonVersion) -> Result<()> {
        self.runner.run_checked(
            &CommandSpec::new("uv", ["python", "pin", version.as_str()]).in_dir(project_root),
        )?;
        Ok(())
    }

    fn resolve_interpreter_path(&self, version: &PythonVersion) -> Result<PathBuf> {
        let output = self.runner.run_checked(&Self::find(version))?;
        Ok(PathBuf::from(output.stdout.trim()))
    }

    fn install_base_packages(&self, version: &PythonVersion, packages: &[&str]) -> Result<()> {
        // uv manages its own tooling
        tracing::debug!(%version, ?packages, "skipping base packages under uv");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::testing::FakeRunner;
    use tempfile::TempDir;

    fn version(v: &str) -> PythonVersion {
        v.parse().unwrap()
    }

    #[test]
    fn test_skips_install_when_found() {
        let runner = FakeRunner::new().respond("uv python find 3.12.3", "/opt/py/bin/python3\n");
        let backend = UvPythonBackend::new(runner.clone());

        backend.ensure_version_available(&version("3.12.3")).unwrap();
        assert_eq!(runner.calls(), vec!["uv python find 3.12.3"]);
    }

    #[test]
    fn test_installs_when_not_found() {
        let runner = FakeRunner::new()
            .fail("uv python find 3.13.1", 2, "No interpreter found")
            .respond("uv python install 3.13.1", "");
        let backend = UvPythonBackend::new(runner.clone());

        backend.ensure_version_available(&version("3.13.1")).unwrap();
        assert_eq!(runner.calls()[1], "uv python install 3.13.1");
    }

    #[test]
    fn test_install_failure_is_operational_error() {
        let runner = FakeRunner::new()
            .fail("uv python find 3.13.1", 2, "No interpreter found")
            .fail("uv python install 3.13.1", 1, "network unreachable");
        let backend = UvPythonBackend::new(runner);

        let err = backend
            .ensure_version_available(&version("3.13.1"))
            .unwrap_err();
        assert!(err.to_string().contains("network unreachable"));
    }

    #[test]
    fn test_pin_runs_in_project_dir() {
        let dir = TempDir::new().unwrap();
        let runner = FakeRunner::new().respond("uv python pin 3.12", "");
        let backend = UvPythonBackend::new(runner.clone());

        backend.pin_locally(dir.path(), &version("3.12")).unwrap();
        assert_eq!(runner.specs()[0].cwd.as_deref(), Some(dir.path()));
    }

    #[test]
    fn test_resolve_and_base_packages() {
        let runner = FakeRunner::new().respond("uv python find 3.12.3", "/opt/py/bin/python3\n");
        let backend = UvPythonBackend::new(runner.clone());

        let path = backend.resolve_interpreter_path(&version("3.12.3")).unwrap();
        assert_eq!(path, PathBuf::from("/opt/py/bin/python3"));

        backend
            .install_base_packages(&version("3.12.3"), &["pip", "poetry"])
            .unwrap();
        assert_eq!(runner.calls().len(), 1);
    }
}
