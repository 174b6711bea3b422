//! Step execution through real child processes

use std::env;
use std::path::{Path, PathBuf};

use super::StepExecutor;
use crate::error::{GauntletError, Result};
use crate::process::{self, ChildExit};
use crate::step::{FailurePolicy, Step, StepOutcome};

/// Runs each step as a child process with inherited stdio
#[derive(Debug, Default)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl StepExecutor for ProcessExecutor {
    fn execute(&mut self, step: &Step) -> Result<StepOutcome> {
        abort_if_interrupted()?;

        let program = resolve_program(&step.command.program, &step.working_dir)?;
        let mut cmd = process::command(&program, &step.command.args, &step.working_dir);

        let bounded = matches!(step.policy, FailurePolicy::TolerateTimeout(_));
        let mut child = process::spawn(&mut cmd, bounded).map_err(|source| GauntletError::Spawn {
            step: step.label.clone(),
            source,
        })?;
        tracing::debug!(step = %step.label, pid = child.id(), "spawned");

        let waited = match step.policy {
            FailurePolicy::Fatal => child.wait().map(ChildExit::Exited),
            FailurePolicy::TolerateTimeout(timeout) => child.wait_with_timeout(timeout),
        };
        drop(child);

        // An interrupted run stops here whatever the child made of the signal
        abort_if_interrupted()?;

        let exit = waited.map_err(|source| GauntletError::Wait {
            step: step.label.clone(),
            source,
        })?;

        Ok(match exit {
            ChildExit::Exited(status) if status.success() => StepOutcome::Success,
            ChildExit::Exited(status) => StepOutcome::Failed {
                code: process::exit_code_of(status),
            },
            ChildExit::TimedOut => StepOutcome::TimedOut,
        })
    }
}

fn abort_if_interrupted() -> Result<()> {
    match process::interrupted() {
        Some(signal) => Err(GauntletError::Interrupted { signal }),
        None => Ok(()),
    }
}

/// Locate `program` on PATH, or relative to `working_dir` when it is a path
fn resolve_program(program: &str, working_dir: &Path) -> Result<PathBuf> {
    which::which_in(program, env::var_os("PATH"), working_dir).map_err(|_| {
        GauntletError::ToolMissing {
            program: program.to_string(),
        }
    })
}
