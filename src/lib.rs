pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod process;
pub mod report;
pub mod runner;
pub mod step;

pub use config::{GauntletConfig, TimeoutTable};
pub use error::{GauntletError, Result};
pub use pipeline::build_plan;
pub use runner::{ProcessExecutor, RunSummary, StepExecutor, StepRecord, TaskRunner};
pub use step::{CommandSpec, FailurePolicy, Phase, Profile, Step, StepOutcome};
