//! `yard-output` — event-log persistence and offline analysis for the
//! container-yard simulator.
//!
//! Writers are driven by [`EventLogObserver`], which implements
//! `yard_sim::SimObserver`:
//!
//! | Feature   | Backend  | Files created                     |
//! |-----------|----------|-----------------------------------|
//! | *(none)*  | JSON     | the given file                    |
//! | *(none)*  | CSV      | `events.csv`, `run_summary.csv`   |
//! | `sqlite`  | SQLite   | `events.db`                       |
//!
//! A finished log can be read back with [`read_event_log`] and handed to a
//! [`MetricsAnalyzer`] (default [`ThroughputAnalyzer`]) or a [`Validator`]
//! (default [`LogValidator`]).
//!
//! # Usage
//!
//! ```rust,ignore
//! use yard_output::{EventLogObserver, JsonLogWriter};
//!
//! let mut obs = EventLogObserver::new(JsonLogWriter::new(Path::new("events.json")));
//! sim.start(&mut obs)?;
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod analysis;
pub mod csv;
pub mod error;
pub mod json;
pub mod observer;
pub mod record;
pub mod validate;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use analysis::{Kpi, MetricsAnalyzer, ThroughputAnalyzer, ThroughputReport};
pub use self::csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use json::{read_event_log, write_event_log, EventLog, JsonLogWriter};
pub use observer::EventLogObserver;
pub use record::EventRecord;
pub use validate::{is_clean, Diagnostic, LogValidator, Severity, Validator};
pub use writer::EventLogWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
