//! External command execution
//!
//! Every backend talks to its tool through [`CommandRunner`], so the
//! orchestration logic can be exercised without spawning pyenv, poetry or uv.
//! [`SystemRunner`] is the production implementation: it blocks until the
//! child exits and never lets the invoking process's interpreter context
//! (an activated venv, a `PYTHONPATH`, a pinned `PYENV_VERSION`) leak into
//! the child.

use crate::error::{BootstrapError, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Variables that select or alter a Python interpreter
const INTERPRETER_VARS: &[&str] = &[
    "VIRTUAL_ENV",
    "PYTHONPATH",
    "PYTHONHOME",
    "PYTHONSTARTUP",
    "PYENV_VERSION",
    "POETRY_ACTIVE",
    "UV_PYTHON",
    "CONDA_PREFIX",
    "CONDA_DEFAULT_ENV",
    "__PYVENV_LAUNCHER__",
];

/// A single external command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
        }
    }

    /// Run the command from inside `dir`
    pub fn in_dir(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    /// The command line as a single display string
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal
    pub code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs external commands on behalf of the backends
pub trait CommandRunner {
    /// Run the command and capture its output, whatever the exit status.
    ///
    /// Only a failure to spawn the process is an error here.
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;

    /// Run the command and turn a non-zero exit into [`BootstrapError::CommandFailed`]
    fn run_checked(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let output = self.run(spec)?;
        if output.success() {
            Ok(output)
        } else {
            Err(BootstrapError::CommandFailed {
                command: spec.display(),
                code: output.code,
                stderr: output.stderr.trim().to_string(),
            })
        }
    }
}

/// Blocking runner backed by [`std::process::Command`]
#[derive(Debug, Clone)]
pub struct SystemRunner {
    env: Vec<(OsString, OsString)>,
}

impl SystemRunner {
    /// Create a runner whose children see a sanitized copy of the current environment
    pub fn new() -> Self {
        Self {
            env: sanitized_env(std::env::vars_os()),
        }
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        tracing::debug!(command = %spec.display(), cwd = ?spec.cwd, "spawning");

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        cmd.env_clear();
        cmd.envs(self.env.iter().map(|(k, v)| (k, v)));
        if let Some(cwd) = &spec.cwd {
            cmd.current_dir(cwd);
        }

        let output = cmd.output().map_err(|source| BootstrapError::Spawn {
            command: spec.display(),
            source,
        })?;

        let result = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            code: output.status.code(),
        };
        tracing::debug!(command = %spec.display(), code = ?result.code, "finished");
        Ok(result)
    }
}

/// Build the environment handed to every child process.
///
/// Interpreter-selecting variables are dropped, and `PATH` loses any entry
/// that lives inside the currently active virtual environment.
pub fn sanitized_env<I>(vars: I) -> Vec<(OsString, OsString)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let vars: Vec<(OsString, OsString)> = vars.into_iter().collect();
    let active_venv = vars
        .iter()
        .find(|(k, _)| k == "VIRTUAL_ENV")
        .map(|(_, v)| PathBuf::from(v));

    vars.into_iter()
        .filter(|(k, _)| {
            let keep = !INTERPRETER_VARS.iter().any(|name| k == name);
            if !keep {
                tracing::debug!(var = ?k, "dropping interpreter variable");
            }
            keep
        })
        .map(|(k, v)| {
            if k == "PATH" {
                if let Some(venv) = &active_venv {
                    return (k, strip_path_entries(&v, venv));
                }
            }
            (k, v)
        })
        .collect()
}

fn strip_path_entries(path: &OsString, venv: &Path) -> OsString {
    let kept: Vec<PathBuf> = std::env::split_paths(path)
        .filter(|entry| !entry.starts_with(venv))
        .collect();
    std::env::join_paths(kept).unwrap_or_else(|_| path.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(OsString, OsString)> {
        pairs
            .iter()
            .map(|(k, v)| (OsString::from(k), OsString::from(v)))
            .collect()
    }

    fn lookup<'a>(env: &'a [(OsString, OsString)], key: &str) -> Option<&'a OsString> {
        env.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    #[test]
    fn test_interpreter_variables_are_dropped() {
        let env = sanitized_env(vars(&[
            ("HOME", "/home/dev"),
            ("VIRTUAL_ENV", "/work/other/.venv"),
            ("PYTHONPATH", "/work/other/src"),
            ("PYENV_VERSION", "3.9.1"),
            ("UV_PYTHON", "3.8"),
        ]));

        assert_eq!(lookup(&env, "HOME").unwrap(), "/home/dev");
        assert!(lookup(&env, "VIRTUAL_ENV").is_none());
        assert!(lookup(&env, "PYTHONPATH").is_none());
        assert!(lookup(&env, "PYENV_VERSION").is_none());
        assert!(lookup(&env, "UV_PYTHON").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_active_venv_removed_from_path() {
        let env = sanitized_env(vars(&[
            ("VIRTUAL_ENV", "/work/other/.venv"),
            ("PATH", "/work/other/.venv/bin:/usr/local/bin:/usr/bin"),
        ]));

        assert_eq!(lookup(&env, "PATH").unwrap(), "/usr/local/bin:/usr/bin");
    }

    #[cfg(unix)]
    #[test]
    fn test_path_untouched_without_active_venv() {
        let env = sanitized_env(vars(&[("PATH", "/opt/bin:/usr/bin")]));
        assert_eq!(lookup(&env, "PATH").unwrap(), "/opt/bin:/usr/bin");
    }

    #[test]
    fn test_spec_display_joins_arguments() {
        let spec = CommandSpec::new("pyenv", ["install", "-s", "3.12.3"]);
        assert_eq!(spec.display(), "pyenv install -s 3.12.3");
        assert!(spec.cwd.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_captures_output() {
        let runner = SystemRunner::new();
        let output = runner
            .run(&CommandSpec::new("echo", ["hello"]))
            .unwrap();
        assert!(output.success());
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_checked_reports_non_zero_exit() {
        let runner = SystemRunner::new();
        let err = runner
            .run_checked(&CommandSpec::new("sh", ["-c", "echo nope >&2; exit 3"]))
            .unwrap_err();
        match err {
            BootstrapError::CommandFailed { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "nope");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let runner = SystemRunner::new();
        let err = runner
            .run(&CommandSpec::new("definitely-not-a-real-tool-7f3a", ["--version"]))
            .unwrap_err();
        assert!(matches!(err, BootstrapError::Spawn { .. }));
    }
}
