//! Plain data row types written by output backends.

use serde::{Deserialize, Serialize};

use yard_core::{EntityId, Event, EventKind, InstructionId, NodeId, SimTime};

/// One processed event, numbered in processing order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Zero-based position in the event log.
    pub seq:             u64,
    pub timestamp:       SimTime,
    #[serde(rename = "type")]
    pub kind:            EventKind,
    pub entity_id:       EntityId,
    pub instruction_id:  InstructionId,
    /// Set on arrival events only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_position: Option<NodeId>,
}

impl EventRecord {
    pub fn from_event(seq: u64, event: &Event) -> Self {
        Self {
            seq,
            timestamp:       event.timestamp,
            kind:            event.kind,
            entity_id:       event.entity_id.clone(),
            instruction_id:  event.instruction_id.clone(),
            target_position: event.target.clone(),
        }
    }

    /// Number a whole event log.
    pub fn from_log(events: &[Event]) -> Vec<Self> {
        events
            .iter()
            .enumerate()
            .map(|(i, e)| Self::from_event(i as u64, e))
            .collect()
    }

    pub fn to_event(&self) -> Event {
        Event {
            timestamp:      self.timestamp,
            kind:           self.kind,
            entity_id:      self.entity_id.clone(),
            instruction_id: self.instruction_id.clone(),
            target:         self.target_position.clone(),
        }
    }
}
