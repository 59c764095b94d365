//! CLI prompts using cliclack (Charm-style inline prompts)
//!
//! This module is optional and only available when the `tui` feature is enabled.

#[cfg(feature = "tui")]
mod logger;
#[cfg(feature = "tui")]
mod prompts;

#[cfg(feature = "tui")]
pub use logger::ConsoleLogger;
#[cfg(feature = "tui")]
pub use prompts::{run_add_pre_commit, run_bootstrap, run_init, BootstrapArgs, PreCommitArgs};
