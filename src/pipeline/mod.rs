//! Plan assembly
//!
//! The plan is the complete ordered list of steps for one run: the
//! cleanliness check, the toolchain checks, then every discovered example
//! built and smoke-run under each profile. It is assembled before anything
//! executes so it can be printed with `--dry-run`.

mod cleanliness;
mod examples;
mod toolchain;

pub use cleanliness::cleanliness_steps;
pub use examples::{discover_examples, example_steps};
pub use toolchain::toolchain_steps;

use crate::config::GauntletConfig;
use crate::error::Result;
use crate::step::Step;

/// Assemble the full plan for `config`
pub fn build_plan(config: &GauntletConfig) -> Result<Vec<Step>> {
    // discovered up front so --dry-run can list them
    let examples = discover_examples(&config.examples_path(), &config.example_extension)?;
    tracing::debug!(count = examples.len(), "discovered examples");

    let mut plan = cleanliness_steps(config);
    plan.extend(toolchain_steps(config));
    plan.extend(example_steps(config, &examples));
    Ok(plan)
}
