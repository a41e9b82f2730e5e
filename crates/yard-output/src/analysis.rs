//! KPI extraction from an event log.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use yard_core::{EquipmentKind, InstructionId};

use crate::EventRecord;

/// One named figure.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Kpi {
    pub name:  String,
    pub value: f64,
}

impl Kpi {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self { name: name.into(), value }
    }
}

impl fmt::Display for Kpi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.fract() == 0.0 {
            write!(f, "{}: {}", self.name, self.value)
        } else {
            write!(f, "{}: {:.3}", self.name, self.value)
        }
    }
}

/// Pluggable offline analysis of a finished run.
pub trait MetricsAnalyzer {
    fn name(&self) -> &str;

    fn analyze(&self, events: &[EventRecord]) -> Vec<Kpi>;
}

/// Event counts and rates.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThroughputReport {
    /// Execution-complete events per equipment kind.
    pub completions:       BTreeMap<EquipmentKind, usize>,
    pub arrivals:          usize,
    /// Distinct instructions with at least one completion event.
    pub instructions_done: usize,
    /// Timestamp of the last event.
    pub makespan_ms:       u64,
    /// Events per simulated hour; zero for an empty or instantaneous log.
    pub events_per_hour:   f64,
}

/// Default analyzer: completions, arrivals, makespan and event rate.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThroughputAnalyzer;

impl ThroughputAnalyzer {
    pub fn report(&self, events: &[EventRecord]) -> ThroughputReport {
        let mut report = ThroughputReport::default();
        let mut done: BTreeSet<&InstructionId> = BTreeSet::new();

        for kind in EquipmentKind::ALL {
            report.completions.insert(kind, 0);
        }
        for e in events {
            if e.kind.is_arrival() {
                report.arrivals += 1;
            } else if e.kind.is_completion() {
                if let Some(kind) = e.kind.equipment() {
                    *report.completions.entry(kind).or_default() += 1;
                }
                done.insert(&e.instruction_id);
            }
            report.makespan_ms = report.makespan_ms.max(e.timestamp.as_millis());
        }
        report.instructions_done = done.len();
        if report.makespan_ms > 0 {
            let hours = report.makespan_ms as f64 / 3_600_000.0;
            report.events_per_hour = events.len() as f64 / hours;
        }
        report
    }
}

impl MetricsAnalyzer for ThroughputAnalyzer {
    fn name(&self) -> &str {
        "throughput"
    }

    fn analyze(&self, events: &[EventRecord]) -> Vec<Kpi> {
        let r = self.report(events);
        let mut kpis: Vec<Kpi> = r
            .completions
            .iter()
            .map(|(kind, n)| Kpi::new(format!("{kind} completions"), *n as f64))
            .collect();
        kpis.push(Kpi::new("arrivals", r.arrivals as f64));
        kpis.push(Kpi::new("instructions done", r.instructions_done as f64));
        kpis.push(Kpi::new("makespan (s)", r.makespan_ms as f64 / 1000.0));
        kpis.push(Kpi::new("events per hour", r.events_per_hour));
        kpis
    }
}
