//! Bootstrapper Core - Python project environment setup
//!
//! This library brings a project directory to a ready development state: a
//! pinned interpreter, an in-project virtual environment, a `pyproject.toml`
//! with a matching Python constraint, VSCode settings and an optional
//! pre-commit pipeline. It is used by the `api-bootstrapper` binary.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Command execution, tool probing, backends for
//!   pyenv, Poetry and uv, project file helpers
//! - **Layer 2: Workflow Orchestration** - [`EnvironmentBootstrapper`] and
//!   [`PreCommitConfigurator`], wired by [`ManagerChoice`]
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based flows (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based command flows and logger
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use bootstrapper_core::{ManagerChoice, SystemRunner, TracingLogger};
//! use std::sync::Arc;
//!
//! let runner = Arc::new(SystemRunner::new());
//! let bootstrapper = ManagerChoice::Uv.bootstrapper(runner, Box::new(TracingLogger));
//! let result = bootstrapper.bootstrap(Path::new("my-api"), "3.12.12", true)?;
//! println!("{}", result.python_path.display());
//! ```

pub mod config;
pub mod deps;
pub mod environment;
pub mod error;
pub mod hooks;
pub mod logger;
pub mod manager;
pub mod project;
pub mod python;
pub mod runtime;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use config::{BootstrapConfig, DEFAULT_PYTHON_VERSION};
pub use environment::{EnvironmentBootstrapper, EnvironmentSetupResult, Readiness};
pub use error::{BootstrapError, ErrorKind};
pub use hooks::{PreCommitConfigurator, PreCommitSetup};
pub use logger::{Logger, TracingLogger};
pub use manager::ManagerChoice;
pub use runtime::{CommandRunner, SystemRunner};

#[cfg(feature = "tui")]
pub use tui::{run_add_pre_commit, run_bootstrap, run_init};
