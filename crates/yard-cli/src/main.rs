//! yard-sim — run a container-yard scenario from a JSON configuration.
//!
//! ```text
//! yard-sim <config.json> [output-dir]
//! ```
//!
//! The configuration names the map, entity and task files (relative to the
//! configuration file).  After the run the event log is written to
//! `eventLogFile` if set, and to `events.csv` / `run_summary.csv` in
//! `output-dir` if given (plus `events.db` with the `sqlite` feature).  KPIs
//! and log diagnostics are printed to stdout.

mod logging;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};

use yard_core::{EquipmentKind, SimConfig};
use yard_output::{
    is_clean, write_event_log, CsvWriter, EventLogObserver, EventRecord, LogValidator, MetricsAnalyzer,
    ThroughputAnalyzer, Validator,
};
use yard_sim::{NoopObserver, RunSummary, SimBuilder};

const USAGE: &str = "usage: yard-sim <config.json> [output-dir]";

fn main() -> Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let Some(config_path) = args.next().map(PathBuf::from) else {
        bail!(USAGE);
    };
    let output_dir = args.next().map(PathBuf::from);

    let config = SimConfig::from_json_path(&config_path)
        .with_context(|| format!("reading configuration {}", config_path.display()))?;
    let event_log_file = config.event_log_file.clone();

    println!("=== yard-sim ===");
    println!("Config: {}  |  Seed: {}  |  Duration: {} ms", config_path.display(), config.seed, config.duration_ms);

    // 1. Load the scenario.
    let mut sim = SimBuilder::from_config(config)
        .context("loading scenario")?
        .build()
        .context("building simulation")?;
    println!("Map: {} nodes, {} segments", sim.map.node_count(), sim.map.segment_count());
    println!(
        "Fleet: {} QC, {} YC, {} IT",
        sim.entities.count_of_kind(EquipmentKind::Qc),
        sim.entities.count_of_kind(EquipmentKind::Yc),
        sim.entities.count_of_kind(EquipmentKind::It),
    );
    println!("Instructions: {}", sim.instructions.len());
    println!();

    // 2. Run.
    let t0 = Instant::now();
    let summary = match &output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
            let mut obs = EventLogObserver::new(CsvWriter::new(dir)?);
            let summary = sim.start(&mut obs)?;
            if let Some(e) = obs.take_error() {
                eprintln!("output error: {e}");
            }
            summary
        }
        None => sim.start(&mut NoopObserver)?,
    };
    let elapsed = t0.elapsed();

    // 3. Persist.
    if let Some(path) = &event_log_file {
        write_event_log(path, sim.event_log(), Some(&summary))
            .with_context(|| format!("writing event log {}", path.display()))?;
        println!("Event log: {}", path.display());
    }
    #[cfg(feature = "sqlite")]
    {
        if let Some(dir) = &output_dir {
            write_sqlite(dir, sim.event_log(), &summary)?;
        }
    }

    // 4. Report.
    print_summary(&summary, elapsed.as_secs_f64())?;

    let records = EventRecord::from_log(sim.event_log());
    let analyzers: Vec<Box<dyn MetricsAnalyzer>> = vec![Box::new(ThroughputAnalyzer)];
    for analyzer in &analyzers {
        println!("KPIs ({})", analyzer.name());
        for kpi in analyzer.analyze(&records) {
            println!("  {kpi}");
        }
    }
    println!();

    let validators: Vec<Box<dyn Validator>> = vec![Box::new(LogValidator)];
    for validator in &validators {
        let diagnostics = validator.validate(&records);
        println!("Validation ({}): {} finding(s)", validator.name(), diagnostics.len());
        for d in &diagnostics {
            println!("  {d}");
        }
        if !is_clean(&diagnostics) {
            tracing::warn!(validator = validator.name(), "event log failed validation");
        }
    }
    println!();

    // 5. Final entity states.
    println!("{:<10} {:<4} {:<10} {:<12} {:<12}", "Entity", "Kind", "Status", "Position", "Instruction");
    println!("{}", "-".repeat(52));
    for e in sim.entities.iter() {
        println!(
            "{:<10} {:<4} {:<10} {:<12} {:<12}",
            e.id,
            e.kind,
            e.status().as_str(),
            e.position,
            e.current_instruction().map_or("-", |i| i.as_str()),
        );
    }

    Ok(())
}

fn print_summary(summary: &RunSummary, wall_secs: f64) -> Result<()> {
    println!("Simulation finished in {wall_secs:.3} s ({:?})", summary.stop_reason);
    println!("{}", serde_json::to_string_pretty(summary)?);
    println!();
    Ok(())
}

#[cfg(feature = "sqlite")]
fn write_sqlite(dir: &std::path::Path, events: &[yard_core::Event], summary: &RunSummary) -> Result<()> {
    use yard_output::{EventLogWriter, SqliteWriter};

    let mut w = SqliteWriter::new(dir)?;
    w.write_events(&EventRecord::from_log(events))?;
    w.write_summary(summary)?;
    w.finish()?;
    println!("SQLite log: {}", dir.join("events.db").display());
    Ok(())
}
