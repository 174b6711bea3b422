//! Steps: the ordered units of work the runner executes

use shell_escape::escape;
use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Named group of consecutive steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Cleanliness,
    Toolchain,
    Examples,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Cleanliness => write!(f, "cleanliness"),
            Phase::Toolchain => write!(f, "toolchain"),
            Phase::Examples => write!(f, "examples"),
        }
    }
}

/// Cargo build profile an example is built and run under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Debug,
    Release,
}

impl Profile {
    /// Profiles every example goes through, in order
    pub const ALL: [Profile; 2] = [Profile::Debug, Profile::Release];

    /// Extra cargo arguments selecting this profile
    pub fn cargo_args(self) -> &'static [&'static str] {
        match self {
            Profile::Debug => &[],
            Profile::Release => &["--release"],
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Debug => write!(f, "debug"),
            Profile::Release => write!(f, "release"),
        }
    }
}

/// Program plus arguments, executed directly without a shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Append arguments
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", escape(Cow::Borrowed(self.program.as_str())))?;
        for arg in &self.args {
            write!(f, " {}", escape(Cow::Borrowed(arg.as_str())))?;
        }
        Ok(())
    }
}

/// What a step's termination means for the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Wait for exit; a non-zero exit aborts the run
    Fatal,
    /// Wait at most this long; still running afterwards counts as success
    TolerateTimeout(Duration),
}

impl FailurePolicy {
    pub fn timeout(&self) -> Option<Duration> {
        match self {
            FailurePolicy::Fatal => None,
            FailurePolicy::TolerateTimeout(timeout) => Some(*timeout),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Fatal => write!(f, "fatal"),
            FailurePolicy::TolerateTimeout(timeout) => {
                write!(f, "timeout {}s accepted", timeout.as_secs_f64())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Short human-readable name, e.g. `clippy` or `run showcase (release)`
    pub label: String,
    pub phase: Phase,
    pub command: CommandSpec,
    pub working_dir: PathBuf,
    pub policy: FailurePolicy,
}

impl Step {
    pub fn new(
        label: impl Into<String>,
        phase: Phase,
        command: CommandSpec,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            label: label.into(),
            phase,
            command,
            working_dir: working_dir.into(),
            policy: FailurePolicy::Fatal,
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// How a step ended
///
/// `Success` and `TimedOut` let the run continue; `Failed` aborts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Success,
    TimedOut,
    Failed { code: i32 },
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, StepOutcome::Failed { .. })
    }
}
