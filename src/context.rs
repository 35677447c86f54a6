use std::sync::{Arc, OnceLock};

use tokio_util::sync::CancellationToken;

/// Why a run context fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CancelReason {
    /// Graceful external stop was requested.
    Stop,
    /// The parent operation was canceled.
    Cancel,
}

impl std::fmt::Display for CancelReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CancelReason::Stop => write!(f, "stop requested"),
            CancelReason::Cancel => write!(f, "canceled"),
        }
    }
}

/// Cancellation context shared between the poller, fetchers and signal handlers.
///
/// Wraps a single `CancellationToken` and records the reason it fired.
/// The first reason recorded wins; later calls only re-cancel the token.
#[derive(Clone, Debug, Default)]
pub struct RunContext {
    token: CancellationToken,
    reason: Arc<OnceLock<CancelReason>>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a graceful stop.
    pub fn stop(&self) {
        self.fire(CancelReason::Stop);
    }

    /// Cancel the parent operation.
    pub fn cancel(&self) {
        self.fire(CancelReason::Cancel);
    }

    fn fire(&self, reason: CancelReason) {
        let _ = self.reason.set(reason);
        self.token.cancel();
    }

    pub fn reason(&self) -> Option<CancelReason> {
        if self.token.is_cancelled() {
            self.reason.get().copied()
        } else {
            None
        }
    }

    pub fn is_done(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the context fires, yielding the winning reason.
    pub async fn cancelled(&self) -> CancelReason {
        self.token.cancelled().await;
        // The reason is always set before the token is cancelled.
        self.reason.get().copied().unwrap_or(CancelReason::Cancel)
    }
}

/// Exit code used when a second signal forces the process down.
pub const FORCED_EXIT_CODE: i32 = 130;

/// What the signal thread does with an incoming SIGINT/SIGTERM.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignalAction {
    /// Stop polling at the next wait.
    Stop,
    /// The context already fired; exit immediately.
    ForceExit,
}

/// The first signal stops gracefully, any later one forces an exit.
pub fn signal_action(ctx: &RunContext) -> SignalAction {
    if ctx.is_done() {
        SignalAction::ForceExit
    } else {
        SignalAction::Stop
    }
}

/// Install SIGINT/SIGTERM handlers driving `ctx`.
///
/// The first signal requests a graceful stop. A further signal exits the
/// process with `FORCED_EXIT_CODE`, covering a fetch that never returns.
/// Runs on a dedicated thread for the lifetime of the process.
pub fn install_signal_handlers(ctx: RunContext) -> Result<(), String> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM])
        .map_err(|e| format!("Failed to register signal handlers: {}", e))?;

    std::thread::Builder::new()
        .name("runtask-watch-signals".to_string())
        .spawn(move || {
            for signal in signals.forever() {
                match signal_action(&ctx) {
                    SignalAction::Stop => {
                        tracing::warn!(signal, "signal received, stopping after current wait");
                        ctx.stop();
                    }
                    SignalAction::ForceExit => {
                        tracing::warn!(signal, "second signal received, exiting");
                        std::process::exit(FORCED_EXIT_CODE);
                    }
                }
            }
        })
        .map_err(|e| format!("Failed to spawn signal thread: {}", e))?;

    Ok(())
}
