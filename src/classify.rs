use crate::types::{Summary, TaskRecord};

/// Count a stage snapshot's records by status.
///
/// - `pending` / `running` → pending
/// - `passed` → passed
/// - anything else → failed, and failed_mandatory when the task is mandatory
///
/// Pure and order-independent; each record lands in exactly one bucket.
pub fn classify(records: &[TaskRecord]) -> Summary {
    records.iter().fold(Summary::default(), |mut summary, record| {
        if record.status.is_pending() {
            summary.pending += 1;
        } else if record.status.is_failure() {
            summary.failed += 1;
            if record.enforcement_level.is_mandatory() {
                summary.failed_mandatory += 1;
            }
        } else {
            summary.passed += 1;
        }
        summary
    })
}
