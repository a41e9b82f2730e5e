//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `events.csv`
//! - `run_summary.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use yard_sim::RunSummary;

use crate::writer::EventLogWriter;
use crate::{EventRecord, OutputResult};

/// Writes the event log and run totals to two CSV files.
pub struct CsvWriter {
    events:   Writer<File>,
    summary:  Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut events = Writer::from_path(dir.join("events.csv"))?;
        events.write_record(["seq", "timestamp_ms", "type", "entity_id", "instruction_id", "target_position"])?;

        let mut summary = Writer::from_path(dir.join("run_summary.csv"))?;
        summary.write_record([
            "entities",
            "instructions",
            "completed_instructions",
            "events_processed",
            "final_clock_ms",
            "stop_reason",
        ])?;

        Ok(Self { events, summary, finished: false })
    }
}

impl EventLogWriter for CsvWriter {
    fn write_events(&mut self, rows: &[EventRecord]) -> OutputResult<()> {
        for row in rows {
            self.events.write_record([
                row.seq.to_string().as_str(),
                row.timestamp.as_millis().to_string().as_str(),
                row.kind.as_str(),
                row.entity_id.as_str(),
                row.instruction_id.as_str(),
                row.target_position.as_ref().map_or("", |n| n.as_str()),
            ])?;
        }
        Ok(())
    }

    fn write_summary(&mut self, s: &RunSummary) -> OutputResult<()> {
        self.summary.write_record(&[
            s.entities.to_string(),
            s.instructions.to_string(),
            s.completed_instructions.to_string(),
            s.events_processed.to_string(),
            s.final_clock.as_millis().to_string(),
            s.stop_reason.as_str().to_owned(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.events.flush()?;
        self.summary.flush()?;
        Ok(())
    }
}
