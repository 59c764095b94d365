//! External process plumbing
//!
//! This module provides:
//! - A blocking command executor with environment sanitization
//! - Host tool probing for pyenv, poetry and uv
//! - Interpreter version probing

pub mod check;
pub mod command;
pub mod tool;

#[cfg(test)]
pub(crate) mod testing;

pub use check::{check_interpreter, RuntimeInfo};
pub use command::{CommandOutput, CommandRunner, CommandSpec, SystemRunner};
pub use tool::ToolManager;
