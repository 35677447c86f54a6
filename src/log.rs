use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Env var overriding `--log-level` with a full tracing filter directive.
pub const LOG_ENV: &str = "RUNTASK_WATCH_LOG";

/// Parse a `--log-level` value into a tracing level.
///
/// Accepts `off` as well, which maps to `None` and silences diagnostics.
pub fn parse_log_level(s: &str) -> Result<Option<Level>, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "off" => Ok(None),
        "error" => Ok(Some(Level::ERROR)),
        "warn" | "warning" => Ok(Some(Level::WARN)),
        "info" => Ok(Some(Level::INFO)),
        "debug" => Ok(Some(Level::DEBUG)),
        "trace" => Ok(Some(Level::TRACE)),
        _ => Err(format!(
            "Unknown log level '{}' (use off, error, warn, info, debug or trace)",
            s
        )),
    }
}

/// Default directive for a parsed level, as understood by `EnvFilter`.
pub fn level_directive(level: Option<Level>) -> String {
    match level {
        Some(level) => level.to_string().to_ascii_lowercase(),
        None => "off".to_string(),
    }
}

/// Filter directive: `RUNTASK_WATCH_LOG`, then `RUST_LOG`, then `level`.
pub fn filter_directive(level: Option<Level>) -> String {
    std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| level_directive(level))
}

/// Install the global stderr subscriber. Call once at startup.
pub fn init(level: Option<Level>) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter_directive(level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
