//! Equipment entities: quay cranes, yard cranes and internal trucks.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use yard_core::{EntityId, EquipmentKind, InstructionId, KinematicProfile, NodeId};

use crate::{FleetError, FleetResult};

// ── EntityStatus ──────────────────────────────────────────────────────────────

/// Lifecycle state of an entity.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityStatus {
    /// No instruction held.
    #[default]
    Idle,
    /// Travelling towards the node the current instruction needs.
    Moving,
    /// Working the current instruction together with its partner.
    Executing,
    /// At the right node, holding an instruction, partner not there yet.
    Waiting,
}

impl EntityStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityStatus::Idle      => "IDLE",
            EntityStatus::Moving    => "MOVING",
            EntityStatus::Executing => "EXECUTING",
            EntityStatus::Waiting   => "WAITING",
        }
    }
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── EquipmentSpec ─────────────────────────────────────────────────────────────

/// Kind-specific attributes.  The variant always agrees with the entity's
/// [`EquipmentKind`].
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum EquipmentSpec {
    Qc { lift_weight_t: f64, spreader_width_ft: f64 },
    Yc { lift_weight_t: f64, gantry_speed: f64 },
    It { load_weight_t: f64 },
}

impl EquipmentSpec {
    /// Built-in attributes for each kind.
    pub const fn default_for(kind: EquipmentKind) -> Self {
        match kind {
            EquipmentKind::Qc => EquipmentSpec::Qc { lift_weight_t: 65.0, spreader_width_ft: 40.0 },
            EquipmentKind::Yc => EquipmentSpec::Yc { lift_weight_t: 40.0, gantry_speed: 2.0 },
            EquipmentKind::It => EquipmentSpec::It { load_weight_t: 60.0 },
        }
    }

    pub fn kind(&self) -> EquipmentKind {
        match self {
            EquipmentSpec::Qc { .. } => EquipmentKind::Qc,
            EquipmentSpec::Yc { .. } => EquipmentKind::Yc,
            EquipmentSpec::It { .. } => EquipmentKind::It,
        }
    }

    /// Maximum load in tonnes (lift weight for cranes, load weight for trucks).
    pub fn capacity_t(&self) -> f64 {
        match *self {
            EquipmentSpec::Qc { lift_weight_t, .. } => lift_weight_t,
            EquipmentSpec::Yc { lift_weight_t, .. } => lift_weight_t,
            EquipmentSpec::It { load_weight_t }     => load_weight_t,
        }
    }
}

// ── ProfileTable ──────────────────────────────────────────────────────────────

/// Per-kind kinematic defaults with optional configuration overrides.
#[derive(Clone, Debug, Default)]
pub struct ProfileTable {
    overrides: BTreeMap<EquipmentKind, KinematicProfile>,
}

impl ProfileTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the overrides from `SimConfig::profiles`.
    pub fn with_overrides(overrides: BTreeMap<EquipmentKind, KinematicProfile>) -> Self {
        Self { overrides }
    }

    pub fn set(&mut self, kind: EquipmentKind, profile: KinematicProfile) {
        self.overrides.insert(kind, profile);
    }

    pub fn get(&self, kind: EquipmentKind) -> KinematicProfile {
        self.overrides
            .get(&kind)
            .copied()
            .unwrap_or_else(|| KinematicProfile::default_for(kind))
    }
}

// ── Entity ────────────────────────────────────────────────────────────────────

/// One piece of equipment.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub id:       EntityId,
    pub kind:     EquipmentKind,
    /// Node the entity is at (or departed from while `Moving`).
    pub position: NodeId,
    pub profile:  KinematicProfile,
    pub spec:     EquipmentSpec,

    status:              EntityStatus,
    current_instruction: Option<InstructionId>,
    load_t:              f64,
}

impl Entity {
    /// An idle entity with explicit kinematics and attributes.
    pub fn new(id: impl Into<EntityId>, position: impl Into<NodeId>, profile: KinematicProfile, spec: EquipmentSpec) -> Self {
        Self {
            id: id.into(),
            kind: spec.kind(),
            position: position.into(),
            profile,
            spec,
            status: EntityStatus::Idle,
            current_instruction: None,
            load_t: 0.0,
        }
    }

    /// An idle entity with the profile from `table` and default attributes.
    pub fn from_table(
        id:       impl Into<EntityId>,
        kind:     EquipmentKind,
        position: impl Into<NodeId>,
        table:    &ProfileTable,
    ) -> Self {
        Self::new(id, position, table.get(kind), EquipmentSpec::default_for(kind))
    }

    /// An idle entity with built-in defaults for `kind`.
    pub fn with_defaults(id: impl Into<EntityId>, kind: EquipmentKind, position: impl Into<NodeId>) -> Self {
        Self::from_table(id, kind, position, &ProfileTable::new())
    }

    // ── State ─────────────────────────────────────────────────────────────

    #[inline]
    pub fn status(&self) -> EntityStatus {
        self.status
    }

    #[inline]
    pub fn current_instruction(&self) -> Option<&InstructionId> {
        self.current_instruction.as_ref()
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.status == EntityStatus::Idle
    }

    /// `true` if the entity holds `instruction`.
    pub fn holds(&self, instruction: &InstructionId) -> bool {
        self.current_instruction.as_ref() == Some(instruction)
    }

    /// Take on `instruction` in the given (non-idle) status.
    ///
    /// Replaces whatever instruction was held before.  Passing
    /// `EntityStatus::Idle` releases instead, so the idle invariant holds.
    pub fn begin(&mut self, instruction: InstructionId, status: EntityStatus) {
        if status == EntityStatus::Idle {
            self.release();
            return;
        }
        self.current_instruction = Some(instruction);
        self.status = status;
    }

    /// Change status while keeping the held instruction.  Ignored when the
    /// entity holds nothing; `Idle` releases the instruction.
    pub fn set_status(&mut self, status: EntityStatus) {
        if status == EntityStatus::Idle {
            self.release();
        } else if self.current_instruction.is_some() {
            self.status = status;
        }
    }

    /// Drop the held instruction and go idle.  Returns what was held.
    pub fn release(&mut self) -> Option<InstructionId> {
        self.status = EntityStatus::Idle;
        self.current_instruction.take()
    }

    /// `current_instruction == None` iff `status == Idle`.
    pub fn is_consistent(&self) -> bool {
        self.current_instruction.is_none() == (self.status == EntityStatus::Idle)
    }

    // ── Load ──────────────────────────────────────────────────────────────

    #[inline]
    pub fn capacity_t(&self) -> f64 {
        self.spec.capacity_t()
    }

    #[inline]
    pub fn load_t(&self) -> f64 {
        self.load_t
    }

    /// Set the carried load.
    ///
    /// # Errors
    ///
    /// [`FleetError::OverCapacity`] if `weight_t` exceeds the capacity; the
    /// current load is left unchanged.
    pub fn set_load(&mut self, weight_t: f64) -> FleetResult<()> {
        if !weight_t.is_finite() || weight_t < 0.0 || weight_t > self.capacity_t() {
            return Err(FleetError::OverCapacity {
                entity:   self.id.clone(),
                load:     weight_t,
                capacity: self.capacity_t(),
            });
        }
        self.load_t = weight_t;
        Ok(())
    }

    pub fn unload(&mut self) {
        self.load_t = 0.0;
    }
}
