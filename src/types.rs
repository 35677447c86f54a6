use serde::Deserialize;

// --- Enums ---

/// Status of a single run task as reported by the remote system.
///
/// The remote side may introduce new literals over time; anything not
/// recognised lands in `Other` and is treated as a failure.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(from = "String")]
pub enum TaskStatus {
    Pending,
    Running,
    Passed,
    Failed,
    Errored,
    Canceled,
    Unreachable,
    Other(String),
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Passed => "passed",
            TaskStatus::Failed => "failed",
            TaskStatus::Errored => "errored",
            TaskStatus::Canceled => "canceled",
            TaskStatus::Unreachable => "unreachable",
            TaskStatus::Other(raw) => raw,
        }
    }

    /// True while the task has not reached a terminal state.
    pub fn is_pending(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::Running)
    }

    /// Every terminal status other than `passed` counts as a failure.
    pub fn is_failure(&self) -> bool {
        !self.is_pending() && *self != TaskStatus::Passed
    }
}

impl From<&str> for TaskStatus {
    fn from(s: &str) -> Self {
        match s {
            "pending" => TaskStatus::Pending,
            "running" => TaskStatus::Running,
            "passed" => TaskStatus::Passed,
            "failed" => TaskStatus::Failed,
            "errored" => TaskStatus::Errored,
            "canceled" => TaskStatus::Canceled,
            "unreachable" => TaskStatus::Unreachable,
            other => TaskStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for TaskStatus {
    fn from(s: String) -> Self {
        TaskStatus::from(s.as_str())
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-task enforcement policy. Only `Mandatory` failures block the run.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(from = "String")]
pub enum EnforcementLevel {
    #[default]
    Advisory,
    Mandatory,
    Other(String),
}

impl EnforcementLevel {
    pub fn as_str(&self) -> &str {
        match self {
            EnforcementLevel::Advisory => "advisory",
            EnforcementLevel::Mandatory => "mandatory",
            EnforcementLevel::Other(raw) => raw,
        }
    }

    pub fn is_mandatory(&self) -> bool {
        *self == EnforcementLevel::Mandatory
    }
}

impl From<&str> for EnforcementLevel {
    fn from(s: &str) -> Self {
        match s {
            "advisory" => EnforcementLevel::Advisory,
            "mandatory" => EnforcementLevel::Mandatory,
            other => EnforcementLevel::Other(other.to_string()),
        }
    }
}

impl From<String> for EnforcementLevel {
    fn from(s: String) -> Self {
        EnforcementLevel::from(s.as_str())
    }
}

impl std::fmt::Display for EnforcementLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// --- Snapshots ---

/// One remote task's observed state at a point in time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskRecord {
    pub name: String,
    pub status: TaskStatus,
    pub enforcement_level: EnforcementLevel,
    pub message: String,
}

impl TaskRecord {
    pub fn new(
        name: &str,
        status: impl Into<TaskStatus>,
        enforcement_level: impl Into<EnforcementLevel>,
    ) -> Self {
        Self {
            name: name.to_string(),
            status: status.into(),
            enforcement_level: enforcement_level.into(),
            message: String::new(),
        }
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.message = message.to_string();
        self
    }

    /// A terminal failure whose enforcement level blocks the run.
    pub fn is_blocking_failure(&self) -> bool {
        self.status.is_failure() && self.enforcement_level.is_mandatory()
    }
}

/// A fetched stage snapshot. Record order is the order tasks are reported in.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Stage {
    pub id: String,
    pub records: Vec<TaskRecord>,
}

/// Counts derived from one stage snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Summary {
    pub pending: usize,
    pub passed: usize,
    pub failed: usize,
    pub failed_mandatory: usize,
}

impl Summary {
    pub fn total(&self) -> usize {
        self.pending + self.passed + self.failed
    }

    pub fn is_terminal(&self) -> bool {
        self.pending == 0
    }
}

/// Aggregate outcome of a stage once no task is pending.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    PassedWithAdvisoryFailures,
    /// Names the first mandatory failure in stage order.
    Failed { task: String },
}

impl Verdict {
    pub fn is_passed(&self) -> bool {
        !matches!(self, Verdict::Failed { .. })
    }

    /// Text used on the overall-result line.
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Passed => "Passed",
            Verdict::PassedWithAdvisoryFailures => "Passed with advisory failures",
            Verdict::Failed { .. } => "Failed",
        }
    }

    /// Surfaces a blocking failure as an error for the enclosing run.
    pub fn into_result(self) -> Result<Verdict, crate::error::PollError> {
        match self {
            Verdict::Failed { task } => Err(crate::error::PollError::MandatoryTaskFailed { task }),
            other => Ok(other),
        }
    }
}
