//! Transport instructions.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use yard_core::{EntityId, EquipmentKind, InstructionId, NodeId, SimTime};

/// What an instruction asks the equipment to do.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstructionKind {
    LoadToShip,
    UnloadFromShip,
    YardToYard,
    /// Stay in place for `parameters.durationMs`.
    Wait,
    /// Drive to `destination`; no partner involved.
    Move,
}

impl InstructionKind {
    /// Instructions one entity carries out on its own, without a rendezvous.
    #[inline]
    pub fn is_solo(self) -> bool {
        matches!(self, InstructionKind::Wait | InstructionKind::Move)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InstructionKind::LoadToShip     => "LOAD_TO_SHIP",
            InstructionKind::UnloadFromShip => "UNLOAD_FROM_SHIP",
            InstructionKind::YardToYard     => "YARD_TO_YARD",
            InstructionKind::Wait           => "WAIT",
            InstructionKind::Move           => "MOVE",
        }
    }
}

impl fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of an instruction.  Ordered: a status only ever moves forward.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstructionStatus {
    #[default]
    Pending,
    Assigned,
    InProgress,
    Completed,
}

/// A unit of work binding an origin, a destination and the equipment
/// required to move one container between them.
#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    pub id:                   InstructionId,
    pub kind:                 InstructionKind,
    pub origin:               NodeId,
    pub destination:          NodeId,
    pub container_id:         Option<String>,
    pub container_weight_t:   Option<f64>,
    pub target_qc:            Option<EntityId>,
    pub target_yc:            Option<EntityId>,
    pub target_it:            Option<EntityId>,
    /// Higher is more urgent.
    pub priority:             i32,
    /// Filled in by the dispatch policy, not fixed at creation.
    pub expected_duration_ms: Option<u64>,
    pub generate_time:        SimTime,
    /// Policy-specific values (lift height, target tier, wait duration, …).
    pub parameters:           BTreeMap<String, serde_json::Value>,

    status: InstructionStatus,
}

impl Instruction {
    /// A pending, unbound instruction with priority 0.
    pub fn new(
        id:          impl Into<InstructionId>,
        kind:        InstructionKind,
        origin:      impl Into<NodeId>,
        destination: impl Into<NodeId>,
    ) -> Self {
        Self {
            id:                   id.into(),
            kind,
            origin:               origin.into(),
            destination:          destination.into(),
            container_id:         None,
            container_weight_t:   None,
            target_qc:            None,
            target_yc:            None,
            target_it:            None,
            priority:             0,
            expected_duration_ms: None,
            generate_time:        SimTime::ZERO,
            parameters:           BTreeMap::new(),
            status:               InstructionStatus::Pending,
        }
    }

    // ── Fluent setters ────────────────────────────────────────────────────

    pub fn with_target(mut self, kind: EquipmentKind, entity: impl Into<EntityId>) -> Self {
        *self.target_slot(kind) = Some(entity.into());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_container(mut self, id: impl Into<String>, weight_t: f64) -> Self {
        self.container_id = Some(id.into());
        self.container_weight_t = Some(weight_t);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn generated_at(mut self, time: SimTime) -> Self {
        self.generate_time = time;
        self
    }

    // ── Targets ───────────────────────────────────────────────────────────

    /// The bound entity of `kind`, if any.
    pub fn target(&self, kind: EquipmentKind) -> Option<&EntityId> {
        match kind {
            EquipmentKind::Qc => self.target_qc.as_ref(),
            EquipmentKind::Yc => self.target_yc.as_ref(),
            EquipmentKind::It => self.target_it.as_ref(),
        }
    }

    fn target_slot(&mut self, kind: EquipmentKind) -> &mut Option<EntityId> {
        match kind {
            EquipmentKind::Qc => &mut self.target_qc,
            EquipmentKind::Yc => &mut self.target_yc,
            EquipmentKind::It => &mut self.target_it,
        }
    }

    /// Kinds with a bound target, in `QC, YC, IT` order.
    pub fn bound_kinds(&self) -> impl Iterator<Item = EquipmentKind> + '_ {
        EquipmentKind::ALL.into_iter().filter(move |&k| self.target(k).is_some())
    }

    /// `true` if `entity` is bound to this instruction as its `kind` target.
    pub fn is_bound_to(&self, kind: EquipmentKind, entity: &EntityId) -> bool {
        self.target(kind) == Some(entity)
    }

    // ── Status ────────────────────────────────────────────────────────────

    #[inline]
    pub fn status(&self) -> InstructionStatus {
        self.status
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.status == InstructionStatus::Completed
    }

    /// Move the status forward to `status`.  Returns `false` (and changes
    /// nothing) if that would go backwards.
    pub fn advance(&mut self, status: InstructionStatus) -> bool {
        if status < self.status {
            return false;
        }
        self.status = status;
        true
    }

    // ── Parameters ────────────────────────────────────────────────────────

    pub fn param_f64(&self, key: &str) -> Option<f64> {
        self.parameters.get(key).and_then(serde_json::Value::as_f64)
    }
}
