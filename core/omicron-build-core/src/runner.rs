//! Build instruction execution.

use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus};

use serde::{Deserialize, Serialize};

/// Exit information for one executed instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionOutcome {
    pub command: String,
    /// `None` when the process was terminated by a signal.
    pub status_code: Option<i32>,
    pub success: bool,
}

impl InstructionOutcome {
    pub fn from_status(command: &str, status: ExitStatus) -> Self {
        Self {
            command: command.to_string(),
            status_code: status.code(),
            success: status.success(),
        }
    }
}

/// What a non-zero instruction status does to the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InstructionPolicy {
    /// Record the status and move on silently.
    Ignore,
    /// Record the status and log a warning.
    #[default]
    Warn,
    /// Abort the run on the first failing instruction.
    Strict,
}

/// Trait for executing manifest instructions (shell, recording fake, etc.).
pub trait InstructionRunner {
    /// Run `command` with `dir` as the child's working directory and wait for it.
    fn run(&mut self, command: &str, dir: &Path) -> io::Result<InstructionOutcome>;
}

/// Runs instructions through the platform shell, inheriting stdio.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner;

impl ShellRunner {
    pub fn new() -> Self {
        Self
    }

    fn command_for(instruction: &str) -> Command {
        let (shell, flag) = if cfg!(windows) { ("cmd", "/C") } else { ("sh", "-c") };
        let mut cmd = Command::new(shell);
        cmd.arg(flag).arg(instruction);
        cmd
    }
}

impl InstructionRunner for ShellRunner {
    fn run(&mut self, command: &str, dir: &Path) -> io::Result<InstructionOutcome> {
        let status = Self::command_for(command).current_dir(dir).status()?;
        Ok(InstructionOutcome::from_status(command, status))
    }
}
