pub mod backoff;
pub mod classify;
pub mod config;
pub mod context;
pub mod error;
pub mod fetch;
pub mod log;
pub mod poller;
pub mod report;
pub mod resolve;
pub mod types;
