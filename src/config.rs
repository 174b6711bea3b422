//! Runner configuration
//!
//! Built-in defaults describe the stock pipeline. An optional `gauntlet.toml`
//! in the project root (or passed with `--config`) overrides individual
//! values. The example timeout table is assembled once here and never
//! mutated afterwards.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{GauntletError, Result};

/// File name looked up in the project root when no `--config` is given
pub const CONFIG_FILE_NAME: &str = "gauntlet.toml";

pub const DEFAULT_CONTAINER_RUNTIME: &str = "podman";
pub const DEFAULT_CONTAINER_IMAGE: &str = "evolutics/travel-kit:0.8.0";
pub const DEFAULT_CONTAINER_WORKDIR: &str = "/workdir";
pub const DEFAULT_CLEANLINESS_COMMAND: &str = "git ls-files -z | xargs -0 travel-kit check --";
pub const DEFAULT_EXAMPLES_DIR: &str = "examples";
pub const DEFAULT_EXAMPLE_EXTENSION: &str = "rs";

/// Lints allowed on top of `--deny warnings` during the clippy step
pub const DEFAULT_ALLOWED_LINTS: &[&str] = &["clippy::needless_doctest_main"];

/// Examples that serve forever; a short run proves they start without crashing
pub const DEFAULT_EXAMPLE_TIMEOUTS: &[(&str, u64)] = &[
    ("library_actix_web", 2),
    ("library_rocket", 2),
    ("library_tide", 2),
    ("library_warp", 2),
    ("showcase", 2),
];

/// Immutable mapping from example name to its smoke-run timeout
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeoutTable {
    entries: BTreeMap<String, Duration>,
}

impl TimeoutTable {
    /// Build a table from `(name, seconds)` pairs; later pairs win
    pub fn from_secs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, u64)>,
    {
        let entries = pairs
            .into_iter()
            .map(|(name, secs)| (name.to_string(), Duration::from_secs(secs)))
            .collect();
        Self { entries }
    }

    /// The table shipped with gauntlet
    pub fn builtin() -> Self {
        Self::from_secs(DEFAULT_EXAMPLE_TIMEOUTS.iter().copied())
    }

    /// Timeout for `example`, or `None` when it must run to completion
    pub fn get(&self, example: &str) -> Option<Duration> {
        self.entries.get(example).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn merged_with(mut self, overrides: &BTreeMap<String, u64>) -> Self {
        for (name, secs) in overrides {
            self.entries.insert(name.clone(), Duration::from_secs(*secs));
        }
        self
    }
}

/// Resolved configuration for one run
#[derive(Debug, Clone)]
pub struct GauntletConfig {
    /// Project root; every step runs here
    pub root: PathBuf,
    pub container_runtime: String,
    pub container_image: String,
    /// Mount point of the working tree inside the container
    pub container_workdir: String,
    /// Shell command run inside the container
    pub cleanliness_command: String,
    pub rustup: String,
    pub cargo: String,
    /// Examples directory, relative to `root`
    pub examples_dir: PathBuf,
    pub example_extension: String,
    pub allowed_lints: Vec<String>,
    pub timeouts: TimeoutTable,
}

impl GauntletConfig {
    /// Built-in configuration rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            container_runtime: DEFAULT_CONTAINER_RUNTIME.to_string(),
            container_image: DEFAULT_CONTAINER_IMAGE.to_string(),
            container_workdir: DEFAULT_CONTAINER_WORKDIR.to_string(),
            cleanliness_command: DEFAULT_CLEANLINESS_COMMAND.to_string(),
            rustup: "rustup".to_string(),
            cargo: "cargo".to_string(),
            examples_dir: PathBuf::from(DEFAULT_EXAMPLES_DIR),
            example_extension: DEFAULT_EXAMPLE_EXTENSION.to_string(),
            allowed_lints: DEFAULT_ALLOWED_LINTS
                .iter()
                .map(|lint| lint.to_string())
                .collect(),
            timeouts: TimeoutTable::builtin(),
        }
    }

    /// Load configuration for `root`
    ///
    /// An explicit `config_path` must exist. Without one, `gauntlet.toml` in
    /// the root is used when present and the built-in defaults otherwise.
    pub fn load(root: impl Into<PathBuf>, config_path: Option<&Path>) -> Result<Self> {
        let config = Self::new(root);

        let path = match config_path {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = config.root.join(CONFIG_FILE_NAME);
                if !candidate.exists() {
                    tracing::debug!("no {CONFIG_FILE_NAME} found, using built-in defaults");
                    return Ok(config);
                }
                candidate
            }
        };

        let content = fs::read_to_string(&path).map_err(|source| GauntletError::ConfigRead {
            path: path.clone(),
            source,
        })?;
        let file = parse_config_file(&content).map_err(|message| GauntletError::Config {
            path: path.clone(),
            message,
        })?;

        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config.merge(file))
    }

    /// Apply file values over the current ones
    fn merge(self, file: ConfigFile) -> Self {
        Self {
            root: self.root,
            container_runtime: file.container_runtime.unwrap_or(self.container_runtime),
            container_image: file.container_image.unwrap_or(self.container_image),
            container_workdir: file.container_workdir.unwrap_or(self.container_workdir),
            cleanliness_command: file.cleanliness_command.unwrap_or(self.cleanliness_command),
            rustup: file.rustup.unwrap_or(self.rustup),
            cargo: file.cargo.unwrap_or(self.cargo),
            examples_dir: file.examples_dir.unwrap_or(self.examples_dir),
            example_extension: file.example_extension.unwrap_or(self.example_extension),
            allowed_lints: file.allowed_lints.unwrap_or(self.allowed_lints),
            timeouts: self.timeouts.merged_with(&file.example_timeouts),
        }
    }

    /// Absolute (or root-relative) path of the examples directory
    pub fn examples_path(&self) -> PathBuf {
        self.root.join(&self.examples_dir)
    }
}

/// On-disk shape of `gauntlet.toml`
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    container_runtime: Option<String>,
    container_image: Option<String>,
    container_workdir: Option<String>,
    cleanliness_command: Option<String>,
    rustup: Option<String>,
    cargo: Option<String>,
    examples_dir: Option<PathBuf>,
    example_extension: Option<String>,
    allowed_lints: Option<Vec<String>>,
    example_timeouts: BTreeMap<String, u64>,
}

fn parse_config_file(content: &str) -> std::result::Result<ConfigFile, String> {
    toml::from_str(content).map_err(|e| e.to_string())
}
