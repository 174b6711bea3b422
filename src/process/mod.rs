//! Child process control
//!
//! Steps run with inherited stdio so tool output reaches the terminal
//! unchanged. Timeout-bounded children lead their own process group so the
//! whole tree (`cargo run` and the example binary it spawned) can be killed
//! when the timeout elapses.
//!
//! `SIGINT`, `SIGTERM` and `SIGHUP` sent to the runner are recorded and
//! relayed to the step child that is running, if any. The step is then
//! reaped normally and the caller checks [`interrupted`] to abort the run.

use nix::errno::Errno;
use nix::libc;
use nix::sys::signal::{kill, killpg, sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::unistd::Pid;
use std::io;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Signals relayed to the running step
pub const RELAYED_SIGNALS: [Signal; 3] = [Signal::SIGINT, Signal::SIGTERM, Signal::SIGHUP];

/// Last relayed signal received, 0 if none
static RECEIVED_SIGNAL: AtomicI32 = AtomicI32::new(0);

/// `kill(2)` target of the running step: its pid, or the negated process
/// group id for group leaders. 0 when no step is running.
static SIGNAL_TARGET: AtomicI32 = AtomicI32::new(0);

/// How a waited-on child ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildExit {
    Exited(ExitStatus),
    TimedOut,
}

/// Exit code to report for a finished child
///
/// Children killed by a signal map to `128 + signal`, as shells report them.
pub fn exit_code_of(status: ExitStatus) -> i32 {
    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => 1,
    }
}

/// Build a command with inherited stdio, running in `working_dir`
pub fn command(program: &Path, args: &[String], working_dir: &Path) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(working_dir)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    cmd
}

/// A running step child, registered as the target of relayed signals
/// until dropped
#[derive(Debug)]
pub struct StepChild {
    child: Child,
    own_group: bool,
}

/// Spawn `cmd`, optionally as the leader of a new process group
///
/// Children that may be killed on timeout must lead their own group. A
/// signal that arrived before the child was registered is relayed to it
/// right away.
pub fn spawn(cmd: &mut Command, own_group: bool) -> io::Result<StepChild> {
    if own_group {
        cmd.process_group(0);
    }
    let child = cmd.spawn()?;
    let step_child = StepChild { child, own_group };
    step_child.register();
    Ok(step_child)
}

impl StepChild {
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    fn signal_target(&self) -> i32 {
        let pid = i32::try_from(self.child.id()).unwrap_or(0);
        if self.own_group {
            -pid
        } else {
            pid
        }
    }

    fn register(&self) {
        let target = self.signal_target();
        if target == 0 {
            return;
        }
        SIGNAL_TARGET.store(target, Ordering::SeqCst);

        // The handler may have run before the store and found no target
        if let Some(signal) = interrupted() {
            let _ = kill(Pid::from_raw(target), signal);
        }
    }

    /// Wait for the child to exit
    pub fn wait(&mut self) -> io::Result<ExitStatus> {
        self.child.wait()
    }

    /// Wait at most `timeout`
    ///
    /// On timeout the child (its whole group, when it leads one) receives
    /// `SIGKILL` and is reaped before returning, so nothing outlives the
    /// step.
    pub fn wait_with_timeout(&mut self, timeout: Duration) -> io::Result<ChildExit> {
        match self.child.wait_timeout(timeout)? {
            Some(status) => Ok(ChildExit::Exited(status)),
            None => {
                self.kill_tree();
                Ok(ChildExit::TimedOut)
            }
        }
    }

    fn kill_tree(&mut self) {
        let pgid = -self.signal_target();
        if self.own_group && pgid > 0 {
            match killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
                Ok(()) | Err(Errno::ESRCH) => {}
                Err(e) => {
                    tracing::warn!(pgid, error = %e, "killpg failed, killing leader only");
                    let _ = self.child.kill();
                }
            }
        } else {
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }
}

impl Drop for StepChild {
    fn drop(&mut self) {
        let _ = SIGNAL_TARGET.compare_exchange(
            self.signal_target(),
            0,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }
}

/// The relayed signal received so far, if any
pub fn interrupted() -> Option<Signal> {
    Signal::try_from(RECEIVED_SIGNAL.load(Ordering::SeqCst)).ok()
}

extern "C" fn relay_signal(signal: libc::c_int) {
    RECEIVED_SIGNAL.store(signal, Ordering::SeqCst);

    let target = SIGNAL_TARGET.load(Ordering::SeqCst);
    if target != 0 {
        if let Ok(signal) = Signal::try_from(signal) {
            let _ = kill(Pid::from_raw(target), signal);
        }
    }
}

/// Install the handler relaying [`RELAYED_SIGNALS`] to the running step
///
/// A child in its own group does not see the terminal's signal, and a
/// signal sent to the runner's pid alone reaches no child at all, so the
/// handler forwards the same signal to the step child. The runner keeps
/// going until that child has been reaped.
pub fn install_signal_relay() -> nix::Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(relay_signal),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    for signal in RELAYED_SIGNALS {
        // SAFETY: the handler only touches atomics and calls kill(2), both
        // async-signal-safe
        unsafe { sigaction(signal, &action) }?;
    }
    Ok(())
}
