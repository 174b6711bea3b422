//! Example discovery and the build/run smoke steps for each example

use std::path::Path;

use crate::config::GauntletConfig;
use crate::error::{GauntletError, Result};
use crate::step::{CommandSpec, FailurePolicy, Phase, Profile, Step};

/// Example names under `dir`, sorted
///
/// An example is a file `<dir>/<name>.<extension>`; its name is the file
/// stem. A missing directory simply has no examples.
pub fn discover_examples(dir: &Path, extension: &str) -> Result<Vec<String>> {
    let escaped_dir = glob::Pattern::escape(&dir.to_string_lossy());
    let pattern = format!("{escaped_dir}/*.{extension}");

    let entries = glob::glob(&pattern).map_err(|e| GauntletError::Discovery {
        pattern: pattern.clone(),
        message: e.to_string(),
    })?;

    let mut names = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => names.push(stem.to_string()),
                None => {
                    tracing::warn!(path = %path.display(), "skipping example with non UTF-8 name")
                }
            },
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "skipping unreadable example path"),
        }
    }

    names.sort();
    names.dedup();
    Ok(names)
}

/// Build then run each example, debug before release
pub fn example_steps(config: &GauntletConfig, examples: &[String]) -> Vec<Step> {
    let mut steps = Vec::with_capacity(examples.len() * Profile::ALL.len() * 2);

    for name in examples {
        let policy = match config.timeouts.get(name) {
            Some(timeout) => FailurePolicy::TolerateTimeout(timeout),
            None => FailurePolicy::Fatal,
        };

        for profile in Profile::ALL {
            let cargo_example = |verb: &str| {
                CommandSpec::new(config.cargo.as_str(), [verb, "--example", name.as_str()])
                    .with_args(profile.cargo_args().iter().copied())
            };

            steps.push(Step::new(
                format!("build {name} ({profile})"),
                Phase::Examples,
                cargo_example("build"),
                &config.root,
            ));
            steps.push(
                Step::new(
                    format!("run {name} ({profile})"),
                    Phase::Examples,
                    cargo_example("run"),
                    &config.root,
                )
                .with_policy(policy),
            );
        }
    }

    steps
}
