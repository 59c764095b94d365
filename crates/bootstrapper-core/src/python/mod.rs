//! Python interpreter version backends
//!
//! A backend makes a specific interpreter version available on the host,
//! pins it to a project directory and resolves where its binary lives.

pub mod pyenv;
pub mod uv;
pub mod version;

use crate::error::{BootstrapError, Result};
use std::path::{Path, PathBuf};

pub use pyenv::PyenvBackend;
pub use uv::UvPythonBackend;
pub use version::PythonVersion;

/// Name of the per-project version marker written by both backends
pub const VERSION_PIN_FILE: &str = ".python-version";

/// Capability set of an interpreter version manager
pub trait PythonBackend {
    /// Human-readable backend name used in log lines
    fn name(&self) -> &'static str;

    /// Whether the backend's CLI is usable on this host. Never fails.
    fn is_installed(&self) -> bool;

    /// Error reported when [`PythonBackend::is_installed`] is false
    fn missing(&self) -> BootstrapError {
        BootstrapError::MissingPrerequisite {
            tool: self.name().to_string(),
            hint: format!("Install {} first.", self.name()),
        }
    }

    /// Install `version` unless it is already present
    fn ensure_version_available(&self, version: &PythonVersion) -> Result<()>;

    /// Record `version` as the project's interpreter (writes the pin file)
    fn pin_locally(&self, project_root: &Path, version: &PythonVersion) -> Result<()>;

    /// Absolute path of the interpreter binary for `version`
    fn resolve_interpreter_path(&self, version: &PythonVersion) -> Result<PathBuf>;

    /// Install packages into that interpreter; a no-op for self-managing tools
    fn install_base_packages(&self, version: &PythonVersion, packages: &[&str]) -> Result<()>;
}

/// Read the pinned version from the project's marker file, trimmed
pub fn read_pinned_version(project_root: &Path) -> std::io::Result<String> {
    std::fs::read_to_string(project_root.join(VERSION_PIN_FILE)).map(|s| s.trim().to_string())
}
