#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use runtask_watch::report::Reporter;
use runtask_watch::types::{Stage, TaskRecord};

/// Stage ID used across tests.
pub const STAGE_ID: &str = "ts-test";

/// In-memory report sink that stays readable after the reporter takes ownership.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Creates an uncolored reporter writing into a fresh buffer.
pub fn capture_reporter() -> (Reporter, SharedBuffer) {
    let buffer = SharedBuffer::new();
    (Reporter::new("Run tasks", buffer.clone(), false), buffer)
}

/// Creates a `TaskRecord` with an empty message.
pub fn record(name: &str, status: &str, level: &str) -> TaskRecord {
    TaskRecord::new(name, status, level)
}

/// Creates a stage snapshot with `STAGE_ID`.
pub fn stage(records: Vec<TaskRecord>) -> Stage {
    Stage {
        id: STAGE_ID.to_string(),
        records,
    }
}

/// A stage where every named task has the same status and level.
pub fn uniform_stage(names: &[&str], status: &str, level: &str) -> Stage {
    stage(names.iter().map(|n| record(n, status, level)).collect())
}

/// Returns the path to a specific fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}
