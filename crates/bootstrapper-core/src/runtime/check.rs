//! Interpreter detection

use crate::python::version::parse_reported_version;
use crate::runtime::command::{CommandRunner, CommandSpec};
use semver::Version;
use std::path::Path;

/// Interpreter detection result
#[derive(Debug, Clone)]
pub struct RuntimeInfo {
    pub name: String,
    pub version: Option<Version>,
    pub available: bool,
}

impl RuntimeInfo {
    fn unavailable(name: String) -> Self {
        Self {
            name,
            version: None,
            available: false,
        }
    }
}

/// Ask an interpreter binary for its version.
///
/// Never fails: a missing binary, a crash or unparseable output all come
/// back as an unavailable runtime.
pub fn check_interpreter(runner: &dyn CommandRunner, python: &Path) -> RuntimeInfo {
    let name = python.display().to_string();
    if !python.exists() {
        return RuntimeInfo::unavailable(name);
    }

    let spec = CommandSpec::new(name.clone(), ["--version"]);
    match runner.run(&spec) {
        Ok(out) if out.success() => {
            // Python 2 printed its version on stderr
            let text = if out.stdout.trim().is_empty() {
                &out.stderr
            } else {
                &out.stdout
            };
            match parse_reported_version(text) {
                Some(version) => RuntimeInfo {
                    name,
                    version: Some(version),
                    available: true,
                },
                None => RuntimeInfo::unavailable(name),
            }
        }
        Ok(out) => {
            tracing::debug!(python = %name, code = ?out.code, "interpreter probe exited non-zero");
            RuntimeInfo::unavailable(name)
        }
        Err(e) => {
            tracing::debug!(python = %name, error = %e, "interpreter probe failed");
            RuntimeInfo::unavailable(name)
        }
    }
}
