//! Scripted command runner for backend tests

use super::command::{CommandOutput, CommandRunner, CommandSpec};
use crate::error::{BootstrapError, Result};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Records every command and answers from a script keyed by command line.
///
/// Unscripted commands fail to spawn, unless the runner is permissive, in
/// which case they succeed with empty output. A command scripted several
/// times answers in order and then repeats its last answer.
#[derive(Default)]
pub struct FakeRunner {
    permissive: bool,
    script: Mutex<HashMap<String, VecDeque<CommandOutput>>>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl FakeRunner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn permissive() -> Arc<Self> {
        Arc::new(Self {
            permissive: true,
            ..Self::default()
        })
    }

    fn push(self: Arc<Self>, command: &str, output: CommandOutput) -> Arc<Self> {
        self.script
            .lock()
            .unwrap()
            .entry(command.to_string())
            .or_default()
            .push_back(output);
        self
    }

    pub fn respond(self: Arc<Self>, command: &str, stdout: &str) -> Arc<Self> {
        self.push(
            command,
            CommandOutput {
                stdout: stdout.to_string(),
                stderr: String::new(),
                code: Some(0),
            },
        )
    }

    pub fn fail(self: Arc<Self>, command: &str, code: i32, stderr: &str) -> Arc<Self> {
        self.push(
            command,
            CommandOutput {
                stdout: String::new(),
                stderr: stderr.to_string(),
                code: Some(code),
            },
        )
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(CommandSpec::display).collect()
    }

    pub fn specs(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push(spec.clone());
        let line = spec.display();

        let mut script = self.script.lock().unwrap();
        match script.get_mut(&line) {
            Some(queue) if queue.len() > 1 => Ok(queue.pop_front().unwrap()),
            Some(queue) if !queue.is_empty() => Ok(queue[0].clone()),
            _ if self.permissive => Ok(CommandOutput {
                code: Some(0),
                ..CommandOutput::default()
            }),
            _ => Err(BootstrapError::Spawn {
                command: line,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not scripted"),
            }),
        }
    }
}
