//! Sequential plan execution
//!
//! Steps run one after another. A step that fails aborts the run at once;
//! nothing after it is started and no further failures are collected. A run
//! step that outlives its configured timeout counts as a success.

mod executor;

pub use executor::ProcessExecutor;

use std::time::{Duration, Instant};

use crate::error::{GauntletError, Result};
use crate::step::{Phase, Step, StepOutcome};

/// Executes a single step and reports how it ended
///
/// Implementations block until the step's process has exited or, for
/// timeout-bounded steps, has been terminated.
pub trait StepExecutor {
    fn execute(&mut self, step: &Step) -> Result<StepOutcome>;
}

/// Record of one finished step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub label: String,
    pub phase: Phase,
    pub outcome: StepOutcome,
    pub elapsed: Duration,
}

/// Everything that ran in a successful run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub records: Vec<StepRecord>,
}

impl RunSummary {
    pub fn step_count(&self) -> usize {
        self.records.len()
    }

    /// Steps that were still running at their timeout
    pub fn timed_out_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.outcome == StepOutcome::TimedOut)
            .count()
    }

    pub fn total_duration(&self) -> Duration {
        self.records.iter().map(|r| r.elapsed).sum()
    }
}

pub struct TaskRunner<E> {
    executor: E,
}

impl<E: StepExecutor> TaskRunner<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Run every step of `plan` in order
    ///
    /// Returns the first fatal error; on success every step has a record.
    pub fn run(&mut self, plan: &[Step]) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for (index, step) in plan.iter().enumerate() {
            tracing::info!(
                step = %step.label,
                phase = %step.phase,
                command = %step.command,
                "[{}/{}] starting step",
                index + 1,
                plan.len()
            );

            let start = Instant::now();
            let outcome = self.executor.execute(step)?;
            let elapsed = start.elapsed();
            let elapsed_ms = elapsed.as_millis() as u64;

            match (outcome, step.policy.timeout()) {
                (StepOutcome::Success, _) => {
                    tracing::debug!(step = %step.label, elapsed_ms, "step succeeded");
                }
                (StepOutcome::TimedOut, Some(timeout)) => {
                    tracing::info!(
                        step = %step.label,
                        timeout_secs = timeout.as_secs_f64(),
                        "still running at timeout, accepted"
                    );
                }
                (StepOutcome::TimedOut, None) => {
                    // Only timeout-bounded steps may end this way
                    tracing::info!(step = %step.label, "unexpected timeout on unbounded step");
                    return Err(GauntletError::StepFailed {
                        step: step.label.clone(),
                        code: 1,
                    });
                }
                (StepOutcome::Failed { code }, _) => {
                    tracing::info!(step = %step.label, code, elapsed_ms, "step failed");
                    return Err(GauntletError::StepFailed {
                        step: step.label.clone(),
                        code,
                    });
                }
            }

            summary.records.push(StepRecord {
                label: step.label.clone(),
                phase: step.phase,
                outcome,
                elapsed,
            });
        }

        tracing::info!(
            steps = summary.step_count(),
            timed_out = summary.timed_out_count(),
            elapsed_secs = summary.total_duration().as_secs_f64(),
            "all steps passed"
        );
        Ok(summary)
    }

    pub fn into_executor(self) -> E {
        self.executor
    }
}
