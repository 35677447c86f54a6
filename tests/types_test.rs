use runtask_watch::types::*;

// --- TaskStatus ---

#[test]
fn known_status_literals_parse() {
    assert_eq!(TaskStatus::from("pending"), TaskStatus::Pending);
    assert_eq!(TaskStatus::from("running"), TaskStatus::Running);
    assert_eq!(TaskStatus::from("passed"), TaskStatus::Passed);
    assert_eq!(TaskStatus::from("failed"), TaskStatus::Failed);
    assert_eq!(TaskStatus::from("errored"), TaskStatus::Errored);
    assert_eq!(TaskStatus::from("canceled"), TaskStatus::Canceled);
    assert_eq!(TaskStatus::from("unreachable"), TaskStatus::Unreachable);
}

#[test]
fn unknown_status_keeps_literal_and_is_failure() {
    let status = TaskStatus::from("timed_out");
    assert_eq!(status, TaskStatus::Other("timed_out".to_string()));
    assert_eq!(status.to_string(), "timed_out");
    assert!(status.is_failure());
    assert!(!status.is_pending());
}

#[test]
fn status_literals_are_case_sensitive() {
    assert!(TaskStatus::from("Passed").is_failure());
}

#[test]
fn pending_and_passed_are_not_failures() {
    assert!(!TaskStatus::Pending.is_failure());
    assert!(!TaskStatus::Running.is_failure());
    assert!(!TaskStatus::Passed.is_failure());
    assert!(TaskStatus::Canceled.is_failure());
}

#[test]
fn status_deserializes_from_string() {
    let status: TaskStatus = serde_json::from_str("\"running\"").unwrap();
    assert_eq!(status, TaskStatus::Running);
}

// --- EnforcementLevel ---

#[test]
fn enforcement_level_parse_and_default() {
    assert_eq!(EnforcementLevel::default(), EnforcementLevel::Advisory);
    assert_eq!(EnforcementLevel::from("mandatory"), EnforcementLevel::Mandatory);
    assert!(EnforcementLevel::from("mandatory").is_mandatory());
    assert!(!EnforcementLevel::from("soft").is_mandatory());
    assert_eq!(EnforcementLevel::from("soft").to_string(), "soft");
}

// --- TaskRecord ---

#[test]
fn blocking_failure_needs_failure_and_mandatory() {
    assert!(TaskRecord::new("a", "failed", "mandatory").is_blocking_failure());
    assert!(!TaskRecord::new("a", "failed", "advisory").is_blocking_failure());
    assert!(!TaskRecord::new("a", "running", "mandatory").is_blocking_failure());
    assert!(!TaskRecord::new("a", "passed", "mandatory").is_blocking_failure());
}

#[test]
fn with_message_sets_message() {
    let record = TaskRecord::new("a", "passed", "advisory").with_message("hi\nthere");
    assert_eq!(record.message, "hi\nthere");
}
