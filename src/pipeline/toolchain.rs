//! Formatting, lint, compile and test checks through rustup and cargo

use crate::config::GauntletConfig;
use crate::step::{CommandSpec, Phase, Step};

pub fn toolchain_steps(config: &GauntletConfig) -> Vec<Step> {
    let rustup = |args: &[&str]| CommandSpec::new(config.rustup.as_str(), args.iter().copied());
    let cargo = |args: &[&str]| CommandSpec::new(config.cargo.as_str(), args.iter().copied());

    let clippy = cargo(&["clippy", "--all-features", "--all-targets", "--"])
        .with_args(
            config
                .allowed_lints
                .iter()
                .flat_map(|lint| ["--allow", lint.as_str()]),
        )
        .with_args(["--deny", "warnings"]);

    [
        ("install rustfmt", rustup(&["component", "add", "rustfmt"])),
        ("fmt", cargo(&["fmt", "--all", "--", "--check"])),
        ("install clippy", rustup(&["component", "add", "clippy"])),
        ("clippy", clippy),
        ("check", cargo(&["check"])),
        ("test", cargo(&["test"])),
    ]
    .into_iter()
    .map(|(label, command)| Step::new(label, Phase::Toolchain, command, &config.root))
    .collect()
}
