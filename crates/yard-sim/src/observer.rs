//! Simulation observer trait for progress reporting and data collection.

use serde::{Deserialize, Serialize};

use yard_core::{Event, SimTime};
use yard_fleet::{EntityStore, InstructionBook};

/// Why [`Sim::start`][crate::Sim::start] returned.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StopReason {
    /// No events left.
    QueueEmpty,
    /// The clock reached `durationMs`.
    DurationReached,
    /// `maxEvents` events were processed.
    MaxEvents,
    /// [`SimControl::stop`][crate::SimControl::stop] was called.
    Stopped,
}

impl StopReason {
    pub fn as_str(self) -> &'static str {
        match self {
            StopReason::QueueEmpty      => "QUEUE_EMPTY",
            StopReason::DurationReached => "DURATION_REACHED",
            StopReason::MaxEvents       => "MAX_EVENTS",
            StopReason::Stopped         => "STOPPED",
        }
    }
}

/// Totals reported when a run ends.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub entities:               usize,
    pub instructions:           usize,
    pub completed_instructions: usize,
    pub events_processed:       u64,
    pub final_clock:            SimTime,
    pub stop_reason:            StopReason,
}

/// Callbacks invoked by [`Sim::start`][crate::Sim::start].
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
pub trait SimObserver {
    /// Called once before the first event of a run is processed.
    fn on_start(&mut self, _now: SimTime, _entities: &EntityStore) {}

    /// Called after each event has been handled, with the state it left.
    fn on_event(&mut self, _event: &Event, _entities: &EntityStore, _instructions: &InstructionBook) {}

    /// Called once when the loop exits normally.
    fn on_sim_end(&mut self, _summary: &RunSummary) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
