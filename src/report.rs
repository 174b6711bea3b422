//! Plan listing for `--dry-run`
//!
//! A real run prints nothing of its own; tool output goes straight to the
//! terminal and step progress is logged through `tracing`.

use colored::Colorize;

use crate::step::Step;

/// Print the plan without running it
pub fn print_plan(plan: &[Step]) {
    println!("{}", format!("Plan: {} steps", plan.len()).bold());
    for (index, step) in plan.iter().enumerate() {
        println!(
            "{:>4}. {:<12} {} {}",
            index + 1,
            step.phase.to_string(),
            step.command,
            format!("[{}]", step.policy).dimmed()
        );
    }
}
