//! Dependency manager and virtual environment backends
//!
//! Backends disagree on side effects: `poetry env use` creates the venv,
//! `uv venv --python` recreates it. Callers must probe the venv directory
//! rather than assume either outcome after [`DependencyBackend::bind_interpreter`].

pub mod poetry;
pub mod uv;

use crate::error::{BootstrapError, Result};
use crate::project::manifest::ManifestDialect;
use std::path::{Path, PathBuf};

pub use poetry::PoetryBackend;
pub use uv::UvDependencyBackend;

/// Directory name of the in-project virtual environment
pub const VENV_DIR: &str = ".venv";

/// Capability set of a dependency manager
pub trait DependencyBackend {
    /// Human-readable backend name used in log lines
    fn name(&self) -> &'static str;

    /// Whether the backend's CLI is usable on this host. Never fails.
    fn is_installed(&self) -> bool;

    /// Error reported when [`DependencyBackend::is_installed`] is false
    fn missing(&self) -> BootstrapError {
        BootstrapError::MissingPrerequisite {
            tool: self.name().to_string(),
            hint: format!("Install {} first.", self.name()),
        }
    }

    /// Manifest dialect used when the project has no manifest yet
    fn manifest_dialect(&self) -> ManifestDialect;

    /// Packages the interpreter needs before this backend can run
    fn base_packages(&self) -> &'static [&'static str];

    /// Make the venv live inside the project directory
    fn configure_venv_placement(&self, project_root: &Path) -> Result<()>;

    /// Associate the project with `interpreter`; may create the venv
    fn bind_interpreter(&self, project_root: &Path, interpreter: &Path) -> Result<()>;

    /// Create the venv if it does not exist, without installing dependencies
    fn ensure_venv_exists(&self, project_root: &Path) -> Result<()>;

    /// Install every dependency group, dev groups included
    fn install_declared_dependencies(&self, project_root: &Path) -> Result<()>;

    fn resolve_venv_path(&self, project_root: &Path) -> PathBuf {
        venv_path(project_root)
    }

    fn resolve_venv_interpreter_path(&self, project_root: &Path) -> PathBuf {
        venv_interpreter(&self.resolve_venv_path(project_root))
    }
}

/// `<root>/.venv`
pub fn venv_path(project_root: &Path) -> PathBuf {
    project_root.join(VENV_DIR)
}

/// Interpreter inside a venv: `Scripts/python.exe` on Windows, `bin/python` elsewhere
pub fn venv_interpreter(venv: &Path) -> PathBuf {
    if cfg!(windows) {
        venv.join("Scripts").join("python.exe")
    } else {
        venv.join("bin").join("python")
    }
}
