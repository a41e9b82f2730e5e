//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `events.db` file in the configured output directory with
//! two tables: `events` and `run_summary`.

use std::path::Path;

use rusqlite::Connection;

use yard_sim::RunSummary;

use crate::writer::EventLogWriter;
use crate::{EventRecord, OutputResult};

/// Writes the event log to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `events.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("events.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS events (
                 seq             INTEGER PRIMARY KEY,
                 timestamp_ms    INTEGER NOT NULL,
                 type            TEXT    NOT NULL,
                 entity_id       TEXT    NOT NULL,
                 instruction_id  TEXT    NOT NULL,
                 target_position TEXT
             );
             CREATE TABLE IF NOT EXISTS run_summary (
                 entities               INTEGER NOT NULL,
                 instructions           INTEGER NOT NULL,
                 completed_instructions INTEGER NOT NULL,
                 events_processed       INTEGER NOT NULL,
                 final_clock_ms         INTEGER NOT NULL,
                 stop_reason            TEXT    NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl EventLogWriter for SqliteWriter {
    fn write_events(&mut self, rows: &[EventRecord]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO events \
                 (seq, timestamp_ms, type, entity_id, instruction_id, target_position) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.seq as i64,
                    row.timestamp.as_millis() as i64,
                    row.kind.as_str(),
                    row.entity_id.as_str(),
                    row.instruction_id.as_str(),
                    row.target_position.as_ref().map(|n| n.as_str()),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_summary(&mut self, s: &RunSummary) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO run_summary \
             (entities, instructions, completed_instructions, events_processed, final_clock_ms, stop_reason) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                s.entities as i64,
                s.instructions as i64,
                s.completed_instructions as i64,
                s.events_processed as i64,
                s.final_clock.as_millis() as i64,
                s.stop_reason.as_str(),
            ],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn
            .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
