//! The `EventLogWriter` trait implemented by all backend writers.

use yard_sim::RunSummary;

use crate::{EventRecord, OutputResult};

/// Trait implemented by the JSON, CSV and SQLite writers.
///
/// Driven by [`EventLogObserver`][crate::EventLogObserver], which stores
/// errors instead of returning them.
pub trait EventLogWriter {
    /// Write a batch of event rows.
    fn write_events(&mut self, rows: &[EventRecord]) -> OutputResult<()>;

    /// Write the end-of-run totals.
    fn write_summary(&mut self, summary: &RunSummary) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
