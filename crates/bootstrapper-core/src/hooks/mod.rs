//! Commit hook pipeline
//!
//! Generates `.pre-commit-config.yaml` with ruff and commitizen hooks, adds
//! the tools to the project's dev dependencies and installs the git hooks.

pub mod precommit;

pub use precommit::{PreCommitConfigurator, PreCommitSetup, PRE_COMMIT_CONFIG};
