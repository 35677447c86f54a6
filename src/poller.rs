use tokio::time::Instant;

use crate::backoff::Backoff;
use crate::classify::classify;
use crate::context::RunContext;
use crate::error::PollError;
use crate::fetch::StageFetcher;
use crate::report::{pending_message, Reporter, PENDING_LINE_WIDTH};
use crate::resolve::resolve;
use crate::types::Verdict;

/// Pending lines after the first are only printed every this many polls.
const PENDING_REPORT_EVERY: u32 = 4;

/// Polls a stage until every run task has finished, then resolves the verdict.
pub struct StagePoller<F: StageFetcher> {
    fetcher: F,
    backoff: Backoff,
    reporter: Reporter,
}

impl<F: StageFetcher> StagePoller<F> {
    pub fn new(fetcher: F, backoff: Backoff, reporter: Reporter) -> Self {
        Self {
            fetcher,
            backoff,
            reporter,
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    /// Poll `stage_id` until no task is pending.
    ///
    /// Each iteration waits for the backoff delay, fetches a fresh snapshot,
    /// classifies it and either keeps waiting or reports and returns:
    /// - `Ok(Passed | PassedWithAdvisoryFailures)` when nothing blocks
    /// - `Err(MandatoryTaskFailed)` naming the first blocking task
    /// - `Err(Fetch)` on the first failed read, without retrying
    /// - `Err(Stopped | Canceled)` when `ctx` fires during a wait
    pub async fn poll(&mut self, stage_id: &str, ctx: &RunContext) -> Result<Verdict, PollError> {
        let started = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            let delay = self.backoff.delay(attempt);
            tracing::debug!(
                stage_id,
                attempt,
                delay_ms = delay.as_millis() as u64,
                "waiting before polling task stage"
            );

            tokio::select! {
                biased;
                reason = ctx.cancelled() => {
                    tracing::warn!(stage_id, attempt, %reason, "task stage polling interrupted");
                    return Err(reason.into());
                }
                _ = tokio::time::sleep(delay) => {}
            }

            if attempt == 0 {
                self.reporter.begin();
            }

            // Any fetch failure ends polling, including a fetcher aborted by `ctx`
            let stage = self
                .fetcher
                .fetch(stage_id, ctx)
                .await
                .map_err(|source| PollError::Fetch {
                    stage_id: stage_id.to_string(),
                    source,
                })?;

            let summary = classify(&stage.records);
            tracing::debug!(
                stage_id,
                attempt,
                pending = summary.pending,
                passed = summary.passed,
                failed = summary.failed,
                failed_mandatory = summary.failed_mandatory,
                "task stage polled"
            );

            if !summary.is_terminal() {
                if attempt % PENDING_REPORT_EVERY == 0 {
                    let message = pending_message(&summary);
                    if attempt == 0 {
                        self.reporter.pending(&message);
                    } else {
                        self.reporter
                            .pending_elapsed(started, &message, PENDING_LINE_WIDTH);
                    }
                }
                attempt = attempt.saturating_add(1);
                continue;
            }

            let verdict = resolve(&stage.records, &summary);
            self.reporter
                .final_report(&stage.records, &summary, &verdict);
            self.reporter.end();

            tracing::info!(
                stage_id,
                polls = attempt.saturating_add(1),
                verdict = verdict.label(),
                "task stage completed"
            );
            return verdict.into_result();
        }
    }
}
