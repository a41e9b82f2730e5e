//! Simulation events.
//!
//! An [`Event`] is created by the scheduler as a side effect of handling
//! another event, ordered by timestamp in the engine's queue, and consumed
//! exactly once.  The same struct is what the engine appends to its event
//! log, so it serialises to the log row format
//! `{timestamp, type, entityId, instructionId, targetPosition?}`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::equipment::EquipmentKind;
use crate::{EntityId, InstructionId, NodeId, SimTime};

/// What happened.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    QcExecutionComplete,
    YcExecutionComplete,
    ItExecutionComplete,
    QcArrival,
    YcArrival,
    ItArrival,
    /// Any type name this build does not know (e.g. from a foreign log file).
    /// The engine logs and skips these.
    #[serde(other)]
    Unrecognized,
}

impl EventKind {
    /// Execution-complete event for `kind`.
    pub fn completion(kind: EquipmentKind) -> Self {
        match kind {
            EquipmentKind::Qc => EventKind::QcExecutionComplete,
            EquipmentKind::Yc => EventKind::YcExecutionComplete,
            EquipmentKind::It => EventKind::ItExecutionComplete,
        }
    }

    /// Arrival event for `kind`.
    pub fn arrival(kind: EquipmentKind) -> Self {
        match kind {
            EquipmentKind::Qc => EventKind::QcArrival,
            EquipmentKind::Yc => EventKind::YcArrival,
            EquipmentKind::It => EventKind::ItArrival,
        }
    }

    /// The equipment kind this event is addressed to.
    pub fn equipment(self) -> Option<EquipmentKind> {
        match self {
            EventKind::QcExecutionComplete | EventKind::QcArrival => Some(EquipmentKind::Qc),
            EventKind::YcExecutionComplete | EventKind::YcArrival => Some(EquipmentKind::Yc),
            EventKind::ItExecutionComplete | EventKind::ItArrival => Some(EquipmentKind::It),
            EventKind::Unrecognized => None,
        }
    }

    #[inline]
    pub fn is_arrival(self) -> bool {
        matches!(self, EventKind::QcArrival | EventKind::YcArrival | EventKind::ItArrival)
    }

    #[inline]
    pub fn is_completion(self) -> bool {
        matches!(
            self,
            EventKind::QcExecutionComplete
                | EventKind::YcExecutionComplete
                | EventKind::ItExecutionComplete
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::QcExecutionComplete => "QC_EXECUTION_COMPLETE",
            EventKind::YcExecutionComplete => "YC_EXECUTION_COMPLETE",
            EventKind::ItExecutionComplete => "IT_EXECUTION_COMPLETE",
            EventKind::QcArrival           => "QC_ARRIVAL",
            EventKind::YcArrival           => "YC_ARRIVAL",
            EventKind::ItArrival           => "IT_ARRIVAL",
            EventKind::Unrecognized        => "UNRECOGNIZED",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A timestamped occurrence addressed to one entity and one instruction.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub timestamp: SimTime,

    #[serde(rename = "type")]
    pub kind: EventKind,

    pub entity_id: EntityId,

    pub instruction_id: InstructionId,

    /// Destination node; set on arrival events only.
    #[serde(default, rename = "targetPosition", skip_serializing_if = "Option::is_none")]
    pub target: Option<NodeId>,
}

impl Event {
    /// An execution-complete event for an entity of `kind`.
    pub fn completion(
        timestamp:   SimTime,
        kind:        EquipmentKind,
        entity:      EntityId,
        instruction: InstructionId,
    ) -> Self {
        Self {
            timestamp,
            kind: EventKind::completion(kind),
            entity_id: entity,
            instruction_id: instruction,
            target: None,
        }
    }

    /// An arrival event at `target` for an entity of `kind`.
    pub fn arrival(
        timestamp:   SimTime,
        kind:        EquipmentKind,
        entity:      EntityId,
        instruction: InstructionId,
        target:      NodeId,
    ) -> Self {
        Self {
            timestamp,
            kind: EventKind::arrival(kind),
            entity_id: entity,
            instruction_id: instruction,
            target: Some(target),
        }
    }
}
