//! Environment bootstrap orchestration
//!
//! [`EnvironmentBootstrapper::bootstrap`] reconciles a project directory with
//! a requested interpreter version. Readiness is derived from disk and from
//! the venv's own interpreter once per call; a ready project returns without
//! running a single mutating command, anything else goes through the full,
//! fixed-order setup sequence.

use crate::deps::DependencyBackend;
use crate::error::{BootstrapError, Result, StageContext};
use crate::logger::Logger;
use crate::project::editor::EditorConfigWriter;
use crate::project::files;
use crate::project::manifest::{self, manifest_path};
use crate::python::{self, PythonBackend, PythonVersion};
use crate::runtime::check::check_interpreter;
use crate::runtime::command::CommandRunner;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What the project looks like after a bootstrap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentSetupResult {
    pub python_version: String,
    pub python_path: PathBuf,
    pub venv_path: Option<PathBuf>,
    pub venv_python: Option<PathBuf>,
    pub editor_config_path: PathBuf,
    pub has_dependency_project: bool,
}

/// Outcome of the readiness check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    NotReady(String),
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready)
    }
}

pub struct EnvironmentBootstrapper {
    python: Box<dyn PythonBackend>,
    deps: Box<dyn DependencyBackend>,
    editor: Box<dyn EditorConfigWriter>,
    logger: Box<dyn Logger>,
    runner: Arc<dyn CommandRunner>,
}

impl EnvironmentBootstrapper {
    /// `runner` is only used to probe the venv interpreter during the readiness check
    pub fn new(
        python: Box<dyn PythonBackend>,
        deps: Box<dyn DependencyBackend>,
        editor: Box<dyn EditorConfigWriter>,
        logger: Box<dyn Logger>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            python,
            deps,
            editor,
            logger,
            runner,
        }
    }

    /// Bring `project_root` to a ready environment for `requested_version`
    pub fn bootstrap(
        &self,
        project_root: &Path,
        requested_version: &str,
        install_dependencies: bool,
    ) -> Result<EnvironmentSetupResult> {
        files::ensure_dir(project_root)?;
        let project_root = &std::path::absolute(project_root)
            .map_err(|e| BootstrapError::io(project_root, e))?;

        let version: PythonVersion = requested_version.parse()?;
        self.validate_requirements()?;

        match self.check_readiness(project_root, &version) {
            Readiness::Ready => {
                self.logger.info("environment already configured");
                return self.existing_environment(project_root, &version);
            }
            Readiness::NotReady(reason) => {
                tracing::debug!(%reason, "running full setup");
            }
        }

        let python_path = self.setup_python(project_root, &version)?;
        self.install_base_tooling(&version)?;
        self.ensure_manifest(project_root, &version)?;
        self.setup_dependencies(project_root, &version, python_path, install_dependencies)
    }

    fn validate_requirements(&self) -> Result<()> {
        if !self.python.is_installed() {
            return Err(self.python.missing());
        }
        if !self.deps.is_installed() {
            return Err(self.deps.missing());
        }
        Ok(())
    }

    /// Decide whether setup can be skipped. Never fails: any doubt means "not ready".
    pub fn check_readiness(&self, project_root: &Path, version: &PythonVersion) -> Readiness {
        let not_ready = |reason: String| Readiness::NotReady(reason);

        if !self.deps.resolve_venv_path(project_root).is_dir() {
            return not_ready("virtual environment missing".to_string());
        }
        if !manifest_path(project_root).is_file() {
            return not_ready(format!("{} missing", manifest::MANIFEST_FILE));
        }
        match python::read_pinned_version(project_root) {
            Ok(pinned) if pinned == version.as_str() => {}
            Ok(pinned) => {
                return not_ready(format!("pinned {pinned}, requested {version}"));
            }
            Err(e) => {
                return not_ready(format!("{}: {e}", python::VERSION_PIN_FILE));
            }
        }

        let venv_python = self.deps.resolve_venv_interpreter_path(project_root);
        match check_interpreter(self.runner.as_ref(), &venv_python).version {
            Some(reported) if version.same_series(&reported) => Readiness::Ready,
            Some(reported) => not_ready(format!("venv runs Python {reported}")),
            None => not_ready("venv interpreter did not report a version".to_string()),
        }
    }

    fn existing_environment(
        &self,
        project_root: &Path,
        version: &PythonVersion,
    ) -> Result<EnvironmentSetupResult> {
        let python_path = self
            .python
            .resolve_interpreter_path(version)
            .stage("resolve interpreter")?;

        self.logger.success("environment ready");

        Ok(EnvironmentSetupResult {
            python_version: version.to_string(),
            python_path,
            venv_path: Some(self.deps.resolve_venv_path(project_root)),
            venv_python: Some(self.deps.resolve_venv_interpreter_path(project_root)),
            editor_config_path: self.editor.settings_path(project_root),
            has_dependency_project: true,
        })
    }

    fn setup_python(&self, project_root: &Path, version: &PythonVersion) -> Result<PathBuf> {
        let backend = self.python.name();

        self.logger
            .info(&format!("{backend} ensure python {version}"));
        self.python
            .ensure_version_available(version)
            .stage("ensure python version")?;

        self.logger.info(&format!(
            "{backend} set local {version} in {}",
            project_root.display()
        ));
        self.python
            .pin_locally(project_root, version)
            .stage("pin python version")?;

        let python_path = self
            .python
            .resolve_interpreter_path(version)
            .stage("resolve interpreter")?;
        self.logger
            .success(&format!("python {}", python_path.display()));

        Ok(python_path)
    }

    fn install_base_tooling(&self, version: &PythonVersion) -> Result<()> {
        let packages = self.deps.base_packages();
        if packages.is_empty() {
            return Ok(());
        }

        self.logger.info(&format!("installing {}", packages.join(", ")));
        self.python
            .install_base_packages(version, packages)
            .stage("install base tooling")?;
        self.logger.success("python dependencies installed");
        Ok(())
    }

    fn ensure_manifest(&self, project_root: &Path, version: &PythonVersion) -> Result<()> {
        let path = manifest_path(project_root);
        let dialect = self.deps.manifest_dialect();

        if !path.exists() {
            self.logger
                .info(&format!("creating minimal {}", manifest::MANIFEST_FILE));
            manifest::create_minimal_manifest(project_root, version, dialect, None)
                .stage("create manifest")?;
            self.logger.success(&format!("created {}", path.display()));
            return Ok(());
        }

        let applied = manifest::update_python_constraint(&path, version, dialect)
            .stage("update python constraint")?;
        if let Some(constraint) = applied {
            self.logger
                .info(&format!("updated python constraint to {constraint}"));
            let lock = project_root.join(dialect.lock_file);
            if files::remove_if_exists(&lock).stage("remove stale lock file")? {
                self.logger
                    .warning(&format!("removed stale {}", dialect.lock_file));
            }
        }
        Ok(())
    }

    fn setup_dependencies(
        &self,
        project_root: &Path,
        version: &PythonVersion,
        python_path: PathBuf,
        install_dependencies: bool,
    ) -> Result<EnvironmentSetupResult> {
        let backend = self.deps.name();

        self.logger
            .info(&format!("{backend} configure in-project venv (.venv)"));
        self.deps
            .configure_venv_placement(project_root)
            .stage("configure venv placement")?;

        self.logger.info(&format!("{backend} use python"));
        self.deps
            .bind_interpreter(project_root, &python_path)
            .stage("bind interpreter")?;

        if !self.deps.resolve_venv_path(project_root).is_dir() {
            self.logger.info(&format!("{backend} create venv"));
            self.deps
                .ensure_venv_exists(project_root)
                .stage("create venv")?;
        }

        if install_dependencies {
            self.logger
                .info(&format!("{backend} install dependencies"));
            self.deps
                .install_declared_dependencies(project_root)
                .stage("install dependencies")?;
        }

        let venv_path = self.deps.resolve_venv_path(project_root);
        let venv_python = self.deps.resolve_venv_interpreter_path(project_root);
        self.logger.success(&format!("venv {}", venv_path.display()));

        let editor_config_path = self
            .editor
            .write_config(project_root, &venv_python)
            .stage("write editor config")?;
        self.logger
            .success(&format!("vscode wrote {}", editor_config_path.display()));

        Ok(EnvironmentSetupResult {
            python_version: version.to_string(),
            python_path,
            venv_path: Some(venv_path),
            venv_python: Some(venv_python),
            editor_config_path,
            has_dependency_project: true,
        })
    }
}
