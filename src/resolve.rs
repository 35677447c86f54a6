use crate::types::{Summary, TaskRecord, Verdict};

/// Derive the verdict for a stage in which no task is pending.
///
/// This is a pure function. The blocking task is the first record, in stage
/// order, that failed with a mandatory enforcement level; later mandatory
/// failures are not named even though they also block.
///
/// Rules:
/// - any mandatory failure → `Failed { task }`
/// - advisory failures only → `PassedWithAdvisoryFailures`
/// - no failures → `Passed`
pub fn resolve(records: &[TaskRecord], summary: &Summary) -> Verdict {
    debug_assert!(
        summary.is_terminal(),
        "resolve called with {} pending tasks",
        summary.pending
    );

    if let Some(blocking) = first_blocking_failure(records) {
        return Verdict::Failed {
            task: blocking.name.clone(),
        };
    }

    if summary.failed > summary.failed_mandatory {
        Verdict::PassedWithAdvisoryFailures
    } else {
        Verdict::Passed
    }
}

/// First mandatory failure in stage order.
pub fn first_blocking_failure(records: &[TaskRecord]) -> Option<&TaskRecord> {
    records.iter().find(|r| r.is_blocking_failure())
}
