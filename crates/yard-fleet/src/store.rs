//! Ordered stores for entities and instructions.
//!
//! Both are `BTreeMap`s keyed by id so that every iteration (initial
//! dispatch, reporting) runs in a deterministic order.

use std::collections::BTreeMap;

use yard_core::{EntityId, EquipmentKind, InstructionId};

use crate::{Entity, FleetError, FleetResult, Instruction};

// ── EntityStore ───────────────────────────────────────────────────────────────

/// All entities of a run, ordered by id.
#[derive(Clone, Debug, Default)]
pub struct EntityStore {
    inner: BTreeMap<EntityId, Entity>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `entity`.  Ids must be unique.
    pub fn insert(&mut self, entity: Entity) -> FleetResult<()> {
        if self.inner.contains_key(&entity.id) {
            return Err(FleetError::DuplicateEntity(entity.id));
        }
        self.inner.insert(entity.id.clone(), entity);
        Ok(())
    }

    #[inline]
    pub fn get(&self, id: &EntityId) -> Option<&Entity> {
        self.inner.get(id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: &EntityId) -> Option<&mut Entity> {
        self.inner.get_mut(id)
    }

    /// The entity `id`, only if it is of `kind`.
    pub fn get_kind(&self, id: &EntityId, kind: EquipmentKind) -> Option<&Entity> {
        self.inner.get(id).filter(|e| e.kind == kind)
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.inner.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Entities in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.inner.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &EntityId> + '_ {
        self.inner.keys()
    }

    /// Ids of entities of `kind`, ascending.
    pub fn ids_of_kind(&self, kind: EquipmentKind) -> Vec<EntityId> {
        self.inner
            .values()
            .filter(|e| e.kind == kind)
            .map(|e| e.id.clone())
            .collect()
    }

    pub fn count_of_kind(&self, kind: EquipmentKind) -> usize {
        self.inner.values().filter(|e| e.kind == kind).count()
    }
}

// ── InstructionBook ───────────────────────────────────────────────────────────

/// All instructions submitted to a run, ordered by id.  Completed
/// instructions stay in the book for reporting.
#[derive(Clone, Debug, Default)]
pub struct InstructionBook {
    inner: BTreeMap<InstructionId, Instruction>,
}

impl InstructionBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `instruction`.  Ids must be unique.
    pub fn insert(&mut self, instruction: Instruction) -> FleetResult<()> {
        if self.inner.contains_key(&instruction.id) {
            return Err(FleetError::DuplicateInstruction(instruction.id));
        }
        self.inner.insert(instruction.id.clone(), instruction);
        Ok(())
    }

    #[inline]
    pub fn get(&self, id: &InstructionId) -> Option<&Instruction> {
        self.inner.get(id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: &InstructionId) -> Option<&mut Instruction> {
        self.inner.get_mut(id)
    }

    pub fn contains(&self, id: &InstructionId) -> bool {
        self.inner.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instruction> + '_ {
        self.inner.values()
    }

    pub fn completed_count(&self) -> usize {
        self.inner.values().filter(|i| i.is_completed()).count()
    }
}
