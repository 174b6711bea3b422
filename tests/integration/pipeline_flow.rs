//! End-to-end runs of the full plan through real child processes

use gauntlet::{build_plan, GauntletError, ProcessExecutor, StepOutcome, TaskRunner};
use serial_test::serial;
use std::thread;
use std::time::{Duration, Instant};

use super::helpers::{example_calls, preamble, FakeProject};

#[test]
#[serial]
fn test_quick_example_and_long_running_example() {
    let project = FakeProject::new(&["beta", "alpha"]).unwrap();
    project
        .write_tool("cargo", "case \"$*\" in\n  \"run --example beta\"*) exec sleep 30 ;;\nesac")
        .unwrap();
    let config = project.config(&[("beta", 1)]);

    let plan = build_plan(&config).unwrap();
    let start = Instant::now();
    let summary = TaskRunner::new(ProcessExecutor::new()).run(&plan).unwrap();

    // beta runs forever and is cut off after 1s in each profile
    assert!(start.elapsed() < Duration::from_secs(20));
    assert_eq!(summary.step_count(), 7 + 8);
    assert_eq!(summary.timed_out_count(), 2);

    let timed_out: Vec<&str> = summary
        .records
        .iter()
        .filter(|r| r.outcome == StepOutcome::TimedOut)
        .map(|r| r.label.as_str())
        .collect();
    assert_eq!(timed_out, vec!["run beta (debug)", "run beta (release)"]);

    let mut expected = preamble(project.root());
    expected.extend(example_calls("alpha"));
    expected.extend(example_calls("beta"));
    assert_eq!(project.calls(), expected);
}

#[test]
#[serial]
fn test_unlisted_example_failing_aborts_run() {
    let project = FakeProject::new(&["alpha", "broken", "zeta"]).unwrap();
    project
        .write_tool("cargo", "case \"$*\" in\n  \"run --example broken\"*) exit 9 ;;\nesac")
        .unwrap();
    let config = project.config(&[]);

    let plan = build_plan(&config).unwrap();
    let err = TaskRunner::new(ProcessExecutor::new())
        .run(&plan)
        .unwrap_err();

    assert!(matches!(
        err,
        GauntletError::StepFailed { ref step, code: 9 } if step == "run broken (debug)"
    ));
    assert_eq!(err.exit_code(), 9);

    let calls = project.calls();
    assert_eq!(calls.last().unwrap(), "cargo run --example broken");
    assert!(!calls.iter().any(|c| c.contains("zeta")));
    assert!(!calls.iter().any(|c| c == "cargo build --example broken --release"));
}

#[test]
#[serial]
fn test_example_build_failure_aborts_before_running_it() {
    let project = FakeProject::new(&["alpha", "broken", "zeta"]).unwrap();
    project
        .write_tool("cargo", "case \"$*\" in\n  \"build --example broken\"*) exit 101 ;;\nesac")
        .unwrap();
    let config = project.config(&[]);

    let plan = build_plan(&config).unwrap();
    let err = TaskRunner::new(ProcessExecutor::new())
        .run(&plan)
        .unwrap_err();

    assert!(matches!(
        err,
        GauntletError::StepFailed { ref step, code: 101 } if step == "build broken (debug)"
    ));

    let mut expected = preamble(project.root());
    expected.extend(example_calls("alpha"));
    expected.push("cargo build --example broken".to_string());
    assert_eq!(project.calls(), expected);
}

#[test]
#[serial]
fn test_listed_example_failing_before_timeout_is_failure() {
    let project = FakeProject::new(&["server"]).unwrap();
    project
        .write_tool("cargo", "case \"$*\" in\n  \"run --example server\"*) exit 3 ;;\nesac")
        .unwrap();
    let config = project.config(&[("server", 10)]);

    let plan = build_plan(&config).unwrap();
    let start = Instant::now();
    let err = TaskRunner::new(ProcessExecutor::new())
        .run(&plan)
        .unwrap_err();

    assert_eq!(err.exit_code(), 3);
    assert!(start.elapsed() < Duration::from_secs(10));
}

#[test]
#[serial]
fn test_timed_out_example_tree_is_killed() {
    let project = FakeProject::new(&["server"]).unwrap();
    let marker = project.root().join("late-marker");
    project
        .write_tool(
            "cargo",
            &format!(
                "case \"$*\" in\n  \"run --example server\"*) (sleep 2; touch '{}') & wait ;;\nesac",
                marker.display()
            ),
        )
        .unwrap();
    let config = project.config(&[("server", 1)]);

    let plan = build_plan(&config).unwrap();
    TaskRunner::new(ProcessExecutor::new()).run(&plan).unwrap();

    // The background subshell belonged to the killed group and never gets to write
    thread::sleep(Duration::from_secs(3));
    assert!(!marker.exists());
}

#[test]
#[serial]
fn test_format_failure_stops_before_lint() {
    let project = FakeProject::new(&["alpha"]).unwrap();
    project
        .write_tool("cargo", "case \"$1\" in\n  fmt) exit 1 ;;\nesac")
        .unwrap();

    let plan = build_plan(&project.config(&[])).unwrap();
    let err = TaskRunner::new(ProcessExecutor::new())
        .run(&plan)
        .unwrap_err();

    assert!(matches!(err, GauntletError::StepFailed { ref step, code: 1 } if step == "fmt"));
    assert_eq!(project.calls(), preamble(project.root())[..3].to_vec());
}

#[test]
#[serial]
fn test_cleanliness_failure_stops_everything() {
    let project = FakeProject::new(&["alpha"]).unwrap();
    project.write_tool("podman", "exit 2").unwrap();

    let plan = build_plan(&project.config(&[])).unwrap();
    let err = TaskRunner::new(ProcessExecutor::new())
        .run(&plan)
        .unwrap_err();

    assert_eq!(err.exit_code(), 2);
    assert_eq!(project.calls().len(), 1);
    assert!(project.calls()[0].starts_with("podman run --entrypoint sh"));
}

#[test]
#[serial]
fn test_missing_tool_is_reported() {
    let project = FakeProject::new(&[]).unwrap();
    let mut config = project.config(&[]);
    config.rustup = project.bin_dir().join("absent-rustup").display().to_string();

    let plan = build_plan(&config).unwrap();
    let err = TaskRunner::new(ProcessExecutor::new())
        .run(&plan)
        .unwrap_err();

    assert!(matches!(err, GauntletError::ToolMissing { .. }));
    assert_eq!(err.exit_code(), 1);
    // only the container step ran
    assert_eq!(project.calls().len(), 1);
}
