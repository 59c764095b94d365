//! Files the bootstrapper owns inside a target project
//!
//! This module provides:
//! - Filesystem helpers with an overwrite guard
//! - `pyproject.toml` creation and Python constraint patching
//! - VSCode settings merging

pub mod editor;
pub mod files;
pub mod manifest;

pub use editor::{EditorConfigWriter, VsCodeWriter};
pub use manifest::{create_minimal_manifest, update_python_constraint, ManifestDialect};
