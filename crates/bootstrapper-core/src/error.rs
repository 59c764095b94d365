//! Error taxonomy for environment bootstrapping

use std::path::PathBuf;
use thiserror::Error;

/// Broad classification used by callers to decide how to report a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input or a missing host prerequisite; nothing was mutated
    Validation,
    /// An external command or filesystem operation failed mid-workflow
    Operational,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("{tool} not found in PATH. {hint}")]
    MissingPrerequisite { tool: String, hint: String },

    #[error("Invalid Python version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    #[error("Command failed: {command}\nExit code: {}\n{stderr}", describe_exit(.code))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File already exists: {}", .path.display())]
    FileExists { path: PathBuf },

    #[error("Invalid configuration in {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid configuration: {0}")]
    ConfigValue(String),

    #[error("Cannot update `{key} = {value}`: expected a quoted string or an inline table with a `version` field")]
    UnsupportedConstraint { key: String, value: String },

    #[error("{stage} failed: {source}")]
    Stage {
        stage: &'static str,
        #[source]
        source: Box<BootstrapError>,
    },
}

impl BootstrapError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingPrerequisite { .. }
            | Self::InvalidVersion { .. }
            | Self::Config { .. }
            | Self::ConfigValue(_) => ErrorKind::Validation,
            Self::Stage { source, .. } => source.kind(),
            _ => ErrorKind::Operational,
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    code.map_or_else(|| "terminated by signal".to_string(), |c| c.to_string())
}

pub type Result<T, E = BootstrapError> = std::result::Result<T, E>;

/// Attach the name of the workflow step to a backend failure
pub(crate) trait StageContext<T> {
    fn stage(self, stage: &'static str) -> Result<T>;
}

impl<T> StageContext<T> for Result<T> {
    fn stage(self, stage: &'static str) -> Result<T> {
        self.map_err(|source| BootstrapError::Stage {
            stage,
            source: Box::new(source),
        })
    }
}
