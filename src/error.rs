use std::path::PathBuf;

use crate::context::CancelReason;

/// Errors produced by a stage fetcher.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid task stage document: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed task stage: {0}")]
    Malformed(String),

    #[error("request aborted: {0}")]
    Aborted(CancelReason),

    // Mock only
    #[error("no more scripted stage snapshots")]
    Exhausted,
}

/// Outcome errors of a polling run.
///
/// Categories:
/// - Fetch: the remote read failed; never retried
/// - Stopped / Canceled: the run context fired while waiting
/// - MandatoryTaskFailed: the stage finished and a blocking task failed
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("failed to retrieve task stage {stage_id}: {source}")]
    Fetch {
        stage_id: String,
        #[source]
        source: FetchError,
    },

    #[error("polling stopped: graceful stop requested")]
    Stopped,

    #[error("polling canceled: parent operation canceled")]
    Canceled,

    #[error("the run failed because the run task, {task}, is required to succeed")]
    MandatoryTaskFailed { task: String },
}

impl PollError {
    /// Returns true if polling ended because the run context fired.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, PollError::Stopped | PollError::Canceled)
    }

    /// Name of the blocking task, when the stage itself failed.
    pub fn failed_task(&self) -> Option<&str> {
        match self {
            PollError::MandatoryTaskFailed { task } => Some(task),
            _ => None,
        }
    }
}

impl From<CancelReason> for PollError {
    fn from(reason: CancelReason) -> Self {
        match reason {
            CancelReason::Stop => PollError::Stopped,
            CancelReason::Cancel => PollError::Canceled,
        }
    }
}
