//! Integration tests for yard-output.

#[cfg(test)]
mod helpers {
    use yard_core::{EquipmentKind, EventKind, SimConfig, SimTime};
    use yard_fleet::{Entity, Instruction, InstructionKind};
    use yard_sim::{RunSummary, Sim, SimBuilder, StopReason};
    use yard_timing::KinematicTimeModel;
    use yard_topology::{BfsRoutePlanner, NodeType, YardMapBuilder};

    use crate::EventRecord;

    pub fn tmp() -> tempfile::TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    pub fn rec(seq: u64, t: u64, kind: EventKind, entity: &str, instruction: &str, target: Option<&str>) -> EventRecord {
        EventRecord {
            seq,
            timestamp:       SimTime(t),
            kind,
            entity_id:       entity.into(),
            instruction_id:  instruction.into(),
            target_position: target.map(Into::into),
        }
    }

    /// Arrival then the two completions of one quay job.
    pub fn quay_job() -> Vec<EventRecord> {
        vec![
            rec(0, 17_916, EventKind::ItArrival, "IT01", "T1", Some("Q1")),
            rec(1, 111_249, EventKind::ItExecutionComplete, "IT01", "T1", None),
            rec(2, 111_249, EventKind::QcExecutionComplete, "QC01", "T1", None),
        ]
    }

    pub fn summary() -> RunSummary {
        RunSummary {
            entities:               2,
            instructions:           1,
            completed_instructions: 1,
            events_processed:       3,
            final_clock:            SimTime(111_249),
            stop_reason:            StopReason::QueueEmpty,
        }
    }

    /// A quay crane and a truck that meet once on `Q1`.
    pub fn small_sim() -> Sim<BfsRoutePlanner, KinematicTimeModel> {
        let mut b = YardMapBuilder::new("output-test");
        b.add_node("Q1", NodeType::Quay, 0.0, 0.0);
        b.add_node("R1", NodeType::Road, 50.0, 0.0);
        b.add_node("P1", NodeType::Parking, 50.0, 20.0);
        b.add_segment("S1", "Q1", "R1", 50.0);
        b.add_segment("S3", "R1", "P1", 20.0);
        let map = b.build().unwrap();

        let job = Instruction::new("T1", InstructionKind::UnloadFromShip, "Q1", "Q1")
            .with_target(EquipmentKind::Qc, "QC01")
            .with_target(EquipmentKind::It, "IT01");
        SimBuilder::new(SimConfig::with_duration(3_600_000), BfsRoutePlanner, KinematicTimeModel::default())
            .map(map)
            .entities([
                Entity::with_defaults("QC01", EquipmentKind::Qc, "Q1"),
                Entity::with_defaults("IT01", EquipmentKind::It, "P1"),
            ])
            .instruction(job)
            .build()
            .unwrap()
    }
}

// ── JSON ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod json_tests {
    use std::fs;

    use yard_core::EventKind;

    use super::helpers::{quay_job, summary, tmp};
    use crate::writer::EventLogWriter;
    use crate::{read_event_log, write_event_log, JsonLogWriter, OutputError};

    #[test]
    fn writer_round_trip() {
        let dir = tmp();
        let path = dir.path().join("events.json");
        let mut w = JsonLogWriter::new(&path);
        w.write_events(&quay_job()[..2]).unwrap();
        w.write_events(&quay_job()[2..]).unwrap();
        w.write_summary(&summary()).unwrap();
        w.finish().unwrap();

        let log = read_event_log(&path).unwrap();
        assert_eq!(log.events, quay_job());
        assert_eq!(log.summary, Some(summary()));
        assert!(log.generated_at > 0);
    }

    #[test]
    fn finish_idempotent() {
        let dir = tmp();
        let path = dir.path().join("events.json");
        let mut w = JsonLogWriter::new(&path);
        w.write_events(&quay_job()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap(); // second call must not truncate the log
        assert_eq!(read_event_log(&path).unwrap().events.len(), 3);
    }

    #[test]
    fn field_names_match_log_format() {
        let dir = tmp();
        let path = dir.path().join("events.json");
        let events: Vec<_> = quay_job().iter().map(|r| r.to_event()).collect();
        write_event_log(&path, &events, None).unwrap();

        let doc: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(doc.get("generatedAt").is_some());
        assert!(doc.get("summary").is_none());
        let first = &doc["events"][0];
        assert_eq!(first["type"], "IT_ARRIVAL");
        assert_eq!(first["entityId"], "IT01");
        assert_eq!(first["instructionId"], "T1");
        assert_eq!(first["targetPosition"], "Q1");
        assert_eq!(first["timestamp"], 17_916);
        assert!(doc["events"][1].get("targetPosition").is_none());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tmp();
        let path = dir.path().join("out").join("run1").join("events.json");
        let events: Vec<_> = quay_job().iter().map(|r| r.to_event()).collect();
        write_event_log(&path, &events, Some(&summary())).unwrap();
        assert_eq!(read_event_log(&path).unwrap().events.len(), 3);
    }

    #[test]
    fn unknown_type_reads_as_unrecognized() {
        let dir = tmp();
        let path = dir.path().join("foreign.json");
        fs::write(&path, r#"{ "generatedAt": 1, "events": [
            { "seq": 0, "timestamp": 5, "type": "RTG_ARRIVAL", "entityId": "X", "instructionId": "Y" }
        ] }"#).unwrap();
        let log = read_event_log(&path).unwrap();
        assert_eq!(log.events[0].kind, EventKind::Unrecognized);
    }

    #[test]
    fn read_errors() {
        let dir = tmp();
        assert!(matches!(read_event_log(&dir.path().join("missing.json")), Err(OutputError::Io(_))));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(read_event_log(&bad), Err(OutputError::Json { .. })));
    }
}

// ── CSV ───────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod csv_tests {
    use super::helpers::{quay_job, summary, tmp};
    use crate::csv::CsvWriter;
    use crate::writer::EventLogWriter;

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("events.csv").exists());
        assert!(dir.path().join("run_summary.csv").exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("events.csv")).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers, ["seq", "timestamp_ms", "type", "entity_id", "instruction_id", "target_position"]);

        let mut rdr2 = csv::Reader::from_path(dir.path().join("run_summary.csv")).unwrap();
        let headers2: Vec<_> = rdr2.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers2.len(), 6);
        assert_eq!(headers2[5], "stop_reason");
    }

    #[test]
    fn csv_event_rows() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_events(&quay_job()).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("events.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][1], "17916");
        assert_eq!(&rows[0][2], "IT_ARRIVAL");
        assert_eq!(&rows[0][5], "Q1");
        assert_eq!(&rows[2][3], "QC01");
        assert_eq!(&rows[2][5], ""); // completions carry no target
    }

    #[test]
    fn csv_summary_row() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_summary(&summary()).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("run_summary.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][4], "111249");
        assert_eq!(&rows[0][5], "QUEUE_EMPTY");
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use super::helpers::{small_sim, tmp};
    use crate::{
        is_clean, read_event_log, CsvWriter, EventLogObserver, JsonLogWriter, LogValidator,
        ThroughputAnalyzer, Validator,
    };

    #[test]
    fn csv_rows_match_processed_events() {
        let mut sim = small_sim();
        let dir = tmp();
        let mut obs = EventLogObserver::with_batch_size(CsvWriter::new(dir.path()).unwrap(), 2);
        let summary = sim.start(&mut obs).unwrap();
        assert!(obs.take_error().is_none(), "no write errors expected");

        let mut rdr = csv::Reader::from_path(dir.path().join("events.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len() as u64, summary.events_processed);
        let seqs: Vec<String> = rows.iter().map(|r| r[0].to_owned()).collect();
        assert_eq!(seqs, ["0", "1", "2"]);
    }

    #[test]
    fn json_log_of_a_run_is_valid() {
        let mut sim = small_sim();
        let dir = tmp();
        let path = dir.path().join("run.json");
        let mut obs = EventLogObserver::new(JsonLogWriter::new(&path));
        let summary = sim.start(&mut obs).unwrap();
        assert!(obs.take_error().is_none());

        let log = read_event_log(&path).unwrap();
        assert_eq!(log.summary.as_ref(), Some(&summary));
        assert_eq!(log.events.len(), sim.event_log().len());
        for (record, event) in log.events.iter().zip(sim.event_log()) {
            assert_eq!(&record.to_event(), event);
        }

        let diagnostics = LogValidator.validate(&log.events);
        assert!(is_clean(&diagnostics), "{diagnostics:?}");

        let report = ThroughputAnalyzer.report(&log.events);
        assert_eq!(report.arrivals, 1);
        assert_eq!(report.instructions_done, 1);
        assert_eq!(report.makespan_ms, summary.final_clock.as_millis());
    }
}

// ── Analysis ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod analysis_tests {
    use yard_core::{EquipmentKind, EventKind};

    use super::helpers::{quay_job, rec};
    use crate::{MetricsAnalyzer, ThroughputAnalyzer};

    #[test]
    fn counts_per_kind() {
        let report = ThroughputAnalyzer.report(&quay_job());
        assert_eq!(report.completions[&EquipmentKind::Qc], 1);
        assert_eq!(report.completions[&EquipmentKind::It], 1);
        assert_eq!(report.completions[&EquipmentKind::Yc], 0);
        assert_eq!(report.arrivals, 1);
        assert_eq!(report.instructions_done, 1);
        assert_eq!(report.makespan_ms, 111_249);
    }

    #[test]
    fn events_per_hour() {
        let events = vec![
            rec(0, 600_000, EventKind::ItArrival, "IT01", "M1", Some("Q1")),
            rec(1, 900_000, EventKind::ItExecutionComplete, "IT02", "W1", None),
            rec(2, 1_200_000, EventKind::YcArrival, "YC01", "M2", Some("B1")),
            rec(3, 1_800_000, EventKind::YcExecutionComplete, "YC01", "T4", None),
        ];
        let report = ThroughputAnalyzer.report(&events);
        assert_eq!(report.instructions_done, 2);
        assert!((report.events_per_hour - 8.0).abs() < 1e-9);
    }

    #[test]
    fn empty_log() {
        let report = ThroughputAnalyzer.report(&[]);
        assert_eq!(report.makespan_ms, 0);
        assert_eq!(report.events_per_hour, 0.0);
        assert_eq!(report.completions.values().sum::<usize>(), 0);
    }

    #[test]
    fn kpis_are_named() {
        let kpis = ThroughputAnalyzer.analyze(&quay_job());
        let names: Vec<&str> = kpis.iter().map(|k| k.name.as_str()).collect();
        assert!(names.contains(&"QC completions"));
        assert!(names.contains(&"makespan (s)"));
        let makespan = kpis.iter().find(|k| k.name == "makespan (s)").unwrap();
        assert!((makespan.value - 111.249).abs() < 1e-9);
        assert_eq!(makespan.to_string(), "makespan (s): 111.249");
    }
}

// ── Validation ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod validate_tests {
    use yard_core::EventKind;

    use super::helpers::{quay_job, rec};
    use crate::{is_clean, LogValidator, Severity, Validator};

    #[test]
    fn clean_log() {
        assert!(LogValidator.validate(&quay_job()).is_empty());
    }

    #[test]
    fn timestamp_regression() {
        let mut events = quay_job();
        events[2].timestamp = yard_core::SimTime(100);
        let diags = LogValidator.validate(&events);
        assert!(!is_clean(&diags));
        assert!(diags.iter().any(|d| d.seq == Some(2) && d.message.contains("earlier")));
    }

    #[test]
    fn arrival_without_target() {
        let events = vec![rec(0, 10, EventKind::QcArrival, "QC01", "T1", None)];
        let diags = LogValidator.validate(&events);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Error);
    }

    #[test]
    fn completion_before_arrival() {
        let events = vec![
            rec(0, 10, EventKind::ItExecutionComplete, "IT01", "T1", None),
            rec(1, 20, EventKind::ItArrival, "IT01", "T1", Some("Q1")),
        ];
        let diags = LogValidator.validate(&events);
        assert!(diags.iter().any(|d| d.seq == Some(0) && d.severity == Severity::Error));
    }

    #[test]
    fn unrecognised_and_renumbered_are_warnings() {
        let events = vec![
            rec(0, 10, EventKind::Unrecognized, "X", "Y", None),
            rec(7, 20, EventKind::ItExecutionComplete, "IT01", "W1", None),
        ];
        let diags = LogValidator.validate(&events);
        assert_eq!(diags.len(), 2);
        assert!(diags.iter().all(|d| d.severity == Severity::Warning));
        assert!(is_clean(&diags));
        assert!(diags[1].to_string().starts_with("warning at event #7"));
    }
}

// ── SQLite tests ──────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use super::helpers::{quay_job, summary, tmp};
    use crate::sqlite::SqliteWriter;
    use crate::writer::EventLogWriter;

    #[test]
    fn sqlite_db_created() {
        let dir = tmp();
        let _w = SqliteWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("events.db").exists());
    }

    #[test]
    fn sqlite_event_count_and_null_target() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_events(&quay_job()).unwrap();
        w.write_summary(&summary()).unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("events.db")).unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM events", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 3);
        let nulls: i64 = conn
            .query_row("SELECT COUNT(*) FROM events WHERE target_position IS NULL", [], |r| r.get(0))
            .unwrap();
        assert_eq!(nulls, 2);
        let reason: String = conn
            .query_row("SELECT stop_reason FROM run_summary", [], |r| r.get(0))
            .unwrap();
        assert_eq!(reason, "QUEUE_EMPTY");
    }
}
