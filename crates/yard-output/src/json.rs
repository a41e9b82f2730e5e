//! JSON event-log backend.
//!
//! # File format
//!
//! ```json
//! {
//!   "generatedAt": 1760000000000,
//!   "summary": { "entities": 3, "instructions": 2, "completedInstructions": 2,
//!                "eventsProcessed": 6, "finalClock": 186666, "stopReason": "QUEUE_EMPTY" },
//!   "events": [
//!     { "seq": 0, "timestamp": 17916, "type": "IT_ARRIVAL", "entityId": "IT01",
//!       "instructionId": "T1", "targetPosition": "Q1" }
//!   ]
//! }
//! ```
//!
//! `generatedAt` is wall-clock Unix time in milliseconds; all other times are
//! simulated milliseconds.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use yard_core::Event;
use yard_sim::RunSummary;

use crate::writer::EventLogWriter;
use crate::{EventRecord, OutputError, OutputResult};

/// A persisted event log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLog {
    pub generated_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary:      Option<RunSummary>,
    pub events:       Vec<EventRecord>,
}

impl EventLog {
    /// A log stamped with the current wall-clock time.
    pub fn now(events: Vec<EventRecord>, summary: Option<RunSummary>) -> Self {
        Self { generated_at: unix_millis(), summary, events }
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Buffers rows in memory and writes one JSON document on
/// [`finish`](EventLogWriter::finish).
pub struct JsonLogWriter {
    path:     PathBuf,
    events:   Vec<EventRecord>,
    summary:  Option<RunSummary>,
    finished: bool,
}

impl JsonLogWriter {
    /// Target `path`; its parent directory must exist.  The file is created
    /// on `finish`.
    pub fn new(path: &Path) -> Self {
        Self { path: path.to_path_buf(), events: Vec::new(), summary: None, finished: false }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventLogWriter for JsonLogWriter {
    fn write_events(&mut self, rows: &[EventRecord]) -> OutputResult<()> {
        self.events.extend_from_slice(rows);
        Ok(())
    }

    fn write_summary(&mut self, summary: &RunSummary) -> OutputResult<()> {
        self.summary = Some(summary.clone());
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        let log = EventLog::now(std::mem::take(&mut self.events), self.summary.take());
        write_log(&self.path, &log)
    }
}

fn write_log(path: &Path, log: &EventLog) -> OutputResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, log)
        .map_err(|source| OutputError::Json { path: path.to_path_buf(), source })?;
    out.flush()?;
    tracing::info!(path = %path.display(), events = log.events.len(), "event log written");
    Ok(())
}

/// Write a finished run's event log in one call.
pub fn write_event_log(path: &Path, events: &[Event], summary: Option<&RunSummary>) -> OutputResult<()> {
    let log = EventLog::now(EventRecord::from_log(events), summary.cloned());
    write_log(path, &log)
}

/// Read a log written by [`JsonLogWriter`] or [`write_event_log`].
pub fn read_event_log(path: &Path) -> OutputResult<EventLog> {
    let file = File::open(path)?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|source| OutputError::Json { path: path.to_path_buf(), source })
}
