//! Containerised lint over every version-controlled file

use crate::config::GauntletConfig;
use crate::step::{CommandSpec, Phase, Step};

pub fn cleanliness_steps(config: &GauntletConfig) -> Vec<Step> {
    let volume = format!("{}:{}", config.root.display(), config.container_workdir);
    let command = CommandSpec::new(
        config.container_runtime.as_str(),
        [
            "run",
            "--entrypoint",
            "sh",
            "--rm",
            "--volume",
            volume.as_str(),
            config.container_image.as_str(),
            "-c",
            config.cleanliness_command.as_str(),
        ],
    );

    vec![Step::new("cleanliness", Phase::Cleanliness, command, &config.root)]
}
