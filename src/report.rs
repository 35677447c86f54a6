use std::io::Write;
use std::time::Duration;

use colored::Colorize;
use tokio::time::Instant;

use crate::types::{Summary, TaskRecord, Verdict};

/// Horizontal rule printed around a report block.
const RULE: &str = "------------------------------------------------------------------------";

/// Prefix for lines inside a report block.
const GUTTER: &str = "│ ";

/// Width of the pending message field. The variable spacing allows up to 99
/// tasks (two digits) in each of the three counters:
///
/// ```text
/// 13 tasks still pending, 0 passed, 0 failed ...
/// 13 tasks still pending, 0 passed, 0 failed ...   (8s elapsed)
/// 13 tasks still pending, 0 passed, 0 failed ...   (19s elapsed)
/// ```
pub const PENDING_LINE_WIDTH: usize = " tasks still pending,  passed,  failed ... ".len() + 3 * 2;

/// Severity tag applied to a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Success,
    Failure,
    Muted,
    Strong,
}

/// Ordered, best-effort output sink for polling progress.
///
/// Every method is a no-op when the reporter has no sink. Write errors are
/// logged and otherwise ignored; they never change a polling outcome.
pub struct Reporter {
    title: String,
    sink: Option<Box<dyn Write + Send>>,
    color: bool,
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("title", &self.title)
            .field("has_sink", &self.sink.is_some())
            .field("color", &self.color)
            .finish()
    }
}

impl Reporter {
    pub fn new(title: &str, sink: impl Write + Send + 'static, color: bool) -> Self {
        Self {
            title: title.to_string(),
            sink: Some(Box::new(sink)),
            color,
        }
    }

    /// A reporter that drops everything.
    pub fn silent(title: &str) -> Self {
        Self {
            title: title.to_string(),
            sink: None,
            color: false,
        }
    }

    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Opening banner with the block title.
    pub fn begin(&mut self) {
        let title = self.paint(&format!("{}:", self.title), Tone::Strong);
        self.emit(&format!("\n{}\n\n{}\n", RULE, title));
    }

    pub fn end(&mut self) {
        self.emit(&format!("\n{}\n", RULE));
    }

    /// A line inside the block.
    pub fn line(&mut self, text: &str) {
        self.line_tone(text, Tone::Plain);
    }

    pub fn line_tone(&mut self, text: &str, tone: Tone) {
        let painted = self.paint(text, tone);
        self.emit(&format!("{}{}", GUTTER, painted));
    }

    /// First pending line, printed without an elapsed suffix.
    pub fn pending(&mut self, message: &str) {
        self.emit(message);
    }

    /// Pending line padded to `width` and followed by the time since `since`.
    pub fn pending_elapsed(&mut self, since: Instant, message: &str, width: usize) {
        if !self.has_sink() {
            return;
        }
        let elapsed = format_elapsed(since.elapsed());
        let suffix = self.paint(&format!("({} elapsed)", elapsed), Tone::Muted);
        self.emit(&format!("{:<width$}{}", message, suffix, width = width));
    }

    /// Title line plus message lines for one finished task.
    pub fn task_result(&mut self, record: &TaskRecord) {
        if !self.has_sink() {
            return;
        }
        let status = capitalize(record.status.as_str());
        let (label, tone) = if record.status.is_failure() {
            let level = capitalize(record.enforcement_level.as_str());
            (format!("{} ({})", status, level), Tone::Failure)
        } else {
            (status, Tone::Success)
        };
        let title = format!("{} ⸺   {}", record.name, self.paint(&label, tone));
        self.line(&title);

        for message_line in record.message.split('\n') {
            self.line_tone(message_line, Tone::Muted);
        }
    }

    /// Completion header, per-task details in stage order and the overall result.
    pub fn final_report(&mut self, records: &[TaskRecord], summary: &Summary, verdict: &Verdict) {
        if !self.has_sink() {
            return;
        }
        self.emit(&format!(
            "All tasks completed! {} passed, {} failed",
            summary.passed, summary.failed
        ));
        for record in records {
            self.task_result(record);
        }
        self.line("");
        let tone = if verdict.is_passed() {
            Tone::Success
        } else {
            Tone::Failure
        };
        let overall = self.paint(verdict.label(), tone);
        self.line(&format!("Overall Result: {}", overall));
    }

    fn paint(&self, text: &str, tone: Tone) -> String {
        if !self.color {
            return text.to_string();
        }
        match tone {
            Tone::Plain => text.to_string(),
            Tone::Success => text.green().to_string(),
            Tone::Failure => text.red().to_string(),
            Tone::Muted => text.dimmed().to_string(),
            Tone::Strong => text.bold().to_string(),
        }
    }

    fn emit(&mut self, text: &str) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        if let Err(e) = writeln!(sink, "{}", text).and_then(|_| sink.flush()) {
            tracing::debug!(error = %e, "report write failed");
        }
    }
}

/// Pending-line message for a summary.
pub fn pending_message(summary: &Summary) -> String {
    format!(
        "{} tasks still pending, {} passed, {} failed ... ",
        summary.pending, summary.passed, summary.failed
    )
}

/// Whole-second duration in the compact `1h2m3s` form.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
