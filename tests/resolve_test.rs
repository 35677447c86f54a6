mod common;

use runtask_watch::classify::classify;
use runtask_watch::error::PollError;
use runtask_watch::resolve::{first_blocking_failure, resolve};
use runtask_watch::types::{TaskRecord, Verdict};

use common::record;

fn verdict_for(records: &[TaskRecord]) -> Verdict {
    resolve(records, &classify(records))
}

// --- Verdict rules ---

#[test]
fn all_passed_is_passed() {
    let records = vec![
        record("a", "passed", "mandatory"),
        record("b", "passed", "advisory"),
    ];
    assert_eq!(verdict_for(&records), Verdict::Passed);
}

#[test]
fn empty_stage_is_passed() {
    assert_eq!(verdict_for(&[]), Verdict::Passed);
}

#[test]
fn advisory_failure_only_passes_with_advisory_failures() {
    let records = vec![
        record("lint", "failed", "advisory"),
        record("cost", "passed", "mandatory"),
    ];
    assert_eq!(verdict_for(&records), Verdict::PassedWithAdvisoryFailures);
}

#[test]
fn mandatory_failure_fails_naming_the_task() {
    let records = vec![record("sentinel", "failed", "mandatory")];
    assert_eq!(
        verdict_for(&records),
        Verdict::Failed {
            task: "sentinel".to_string()
        }
    );
}

#[test]
fn first_mandatory_failure_in_stage_order_wins() {
    let records = vec![
        record("alpha", "passed", "mandatory"),
        record("zulu", "errored", "mandatory"),
        record("bravo", "failed", "advisory"),
        record("alpha-2", "failed", "mandatory"),
    ];
    assert_eq!(
        verdict_for(&records),
        Verdict::Failed {
            task: "zulu".to_string()
        }
    );
}

#[test]
fn mandatory_failure_outranks_earlier_advisory_failure() {
    let records = vec![
        record("advice", "failed", "advisory"),
        record("gate", "unreachable", "mandatory"),
    ];
    assert_eq!(
        verdict_for(&records),
        Verdict::Failed {
            task: "gate".to_string()
        }
    );
}

#[test]
fn passed_mandatory_task_never_blocks() {
    let records = vec![record("gate", "passed", "mandatory")];
    assert_eq!(first_blocking_failure(&records), None);
}

// --- Error surfacing ---

#[test]
fn failed_verdict_becomes_mandatory_task_error() {
    let err = Verdict::Failed {
        task: "sentinel".to_string(),
    }
    .into_result()
    .unwrap_err();

    assert!(matches!(err, PollError::MandatoryTaskFailed { ref task } if task == "sentinel"));
    assert_eq!(
        err.to_string(),
        "the run failed because the run task, sentinel, is required to succeed"
    );
}

#[test]
fn passing_verdicts_are_ok() {
    assert_eq!(Verdict::Passed.into_result().unwrap(), Verdict::Passed);
    assert_eq!(
        Verdict::PassedWithAdvisoryFailures.into_result().unwrap(),
        Verdict::PassedWithAdvisoryFailures
    );
}

#[test]
fn verdict_labels() {
    assert_eq!(Verdict::Passed.label(), "Passed");
    assert_eq!(
        Verdict::PassedWithAdvisoryFailures.label(),
        "Passed with advisory failures"
    );
    assert_eq!(
        Verdict::Failed {
            task: "x".to_string()
        }
        .label(),
        "Failed"
    );
}
