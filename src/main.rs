use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use gauntlet::{build_plan, logging, process, report};
use gauntlet::{GauntletConfig, GauntletError, ProcessExecutor, TaskRunner};
use std::env;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gauntlet")]
#[command(
    about = "Run the CI gate: cleanliness lint, toolchain checks, example smoke runs",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Project root (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Config file (defaults to gauntlet.toml in the project root, if present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the steps that would run and exit
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = execute(cli) {
        eprintln!("{} {e:#}", "error:".red().bold());
        let code = e
            .downcast_ref::<GauntletError>()
            .map_or(1, GauntletError::exit_code);
        std::process::exit(code);
    }
}

fn execute(cli: Cli) -> Result<()> {
    let root = match cli.root {
        Some(root) => root,
        None => env::current_dir().context("Failed to determine current directory")?,
    };
    let root = root
        .canonicalize()
        .with_context(|| format!("Project root not found: {}", root.display()))?;

    let config = GauntletConfig::load(root, cli.config.as_deref())?;
    let plan = build_plan(&config)?;

    if cli.dry_run {
        report::print_plan(&plan);
        return Ok(());
    }

    process::install_signal_relay().context("Failed to install signal handlers")?;

    TaskRunner::new(ProcessExecutor::new()).run(&plan)?;
    Ok(())
}
