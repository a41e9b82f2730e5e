//! Instruction assignment.
//!
//! # Queues
//!
//! The [`DecisionModule`] keeps one queue per [`QueueBucket`]: one per
//! equipment kind plus an `Unbound` bucket for instructions nobody is bound
//! to.  An instruction bound to a crane and a truck sits in both kind queues
//! and is handed out at most once per kind.
//!
//! Each queue is ordered by descending priority, ties by arrival order.  The
//! arrival sequence number is assigned on submission and kept for life, so
//! a requeued instruction goes back to exactly where it would have been.
//!
//! # Assigned sets
//!
//! Handing out an instruction moves it from the kind queue into that kind's
//! assigned set, keyed by instruction id.  The set maps each id to exactly
//! one entity, so an instruction can never be held by two entities of the
//! same kind.  Releasing removes the entry and does not re-enqueue.

use yard_core::{EntityId, EquipmentKind, InstructionId};
use yard_fleet::{Entity, Instruction};

use crate::Map;

// ── QueueBucket ───────────────────────────────────────────────────────────────

/// Which queue an instruction is filed under.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum QueueBucket {
    Kind(EquipmentKind),
    Unbound,
}

impl QueueBucket {
    fn index(self) -> usize {
        match self {
            QueueBucket::Kind(EquipmentKind::Qc) => 0,
            QueueBucket::Kind(EquipmentKind::Yc) => 1,
            QueueBucket::Kind(EquipmentKind::It) => 2,
            QueueBucket::Unbound                 => 3,
        }
    }
}

const BUCKETS: usize = 4;

// ── TaskDispatcher trait ──────────────────────────────────────────────────────

/// Pluggable assignment policy used by the scheduler.
///
/// [`DecisionModule`] is the default.  An implementation must never hand the
/// same instruction to two entities of one kind at the same time.
pub trait TaskDispatcher {
    /// Register a new instruction.
    fn submit(&mut self, instruction: &Instruction);

    /// Next instruction for `entity`, now recorded as assigned to it.
    fn assign(&mut self, entity: &Entity) -> Option<InstructionId>;

    /// Assign `instruction` to `entity` directly, if it is still queued for
    /// it.  Returns `false` when it is not available.
    fn claim(&mut self, kind: EquipmentKind, instruction: &InstructionId, entity: &EntityId) -> bool;

    /// Drop the `kind` assignment of `instruction`.
    fn complete(&mut self, kind: EquipmentKind, instruction: &InstructionId);

    /// Put an assigned instruction back in its queue.  Returns `false` if it
    /// was not assigned.
    fn requeue(&mut self, kind: EquipmentKind, instruction: &InstructionId) -> bool;

    /// Drop every queued copy of `instruction` so it is never handed out
    /// again.  Live assignments are left alone.
    fn retire(&mut self, instruction: &InstructionId);

    /// Instructions still waiting in the `kind` queue.
    fn queued(&self, kind: EquipmentKind) -> usize;
}

// ── DecisionModule ────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
struct Entry {
    id:       InstructionId,
    priority: i32,
    seq:      u64,
    target:   Option<EntityId>,
}

impl Entry {
    /// Queue order: higher priority first, then earlier arrival.
    fn goes_before(&self, other: &Entry) -> bool {
        self.priority > other.priority
            || (self.priority == other.priority && self.seq < other.seq)
    }
}

/// Default [`TaskDispatcher`]: bound-target matching over priority queues.
#[derive(Debug, Default)]
pub struct DecisionModule {
    queues:   [Vec<Entry>; BUCKETS],
    assigned: [Map<InstructionId, EntityId>; 3],
    /// `(priority, seq)` of every submitted instruction.
    meta:     Map<InstructionId, (i32, u64)>,
    next_seq: u64,
}

impl DecisionModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// File `instruction` under every kind it is bound to, or under
    /// `Unbound`.  Resubmitting a known id is ignored.
    pub fn add_instruction(&mut self, instruction: &Instruction) {
        if self.meta.contains_key(&instruction.id) {
            tracing::warn!(instruction = %instruction.id, "instruction submitted twice; ignored");
            return;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.meta.insert(instruction.id.clone(), (instruction.priority, seq));

        let mut bound = false;
        for kind in instruction.bound_kinds() {
            bound = true;
            self.enqueue(QueueBucket::Kind(kind), Entry {
                id:       instruction.id.clone(),
                priority: instruction.priority,
                seq,
                target:   instruction.target(kind).cloned(),
            });
        }
        if !bound {
            self.enqueue(QueueBucket::Unbound, Entry {
                id:       instruction.id.clone(),
                priority: instruction.priority,
                seq,
                target:   None,
            });
        }
        tracing::debug!(instruction = %instruction.id, priority = instruction.priority, "instruction queued");
    }

    /// The highest-priority instruction bound to `entity` that is not
    /// already assigned.  It leaves the queue and joins the assigned set.
    pub fn get_next_instruction(&mut self, entity: &Entity) -> Option<InstructionId> {
        let kind = entity.kind;
        let k = kind_index(kind);
        let queue = &mut self.queues[QueueBucket::Kind(kind).index()];
        let assigned = &self.assigned[k];

        let pos = queue.iter().position(|e| {
            !assigned.contains_key(&e.id) && e.target.as_ref() == Some(&entity.id)
        })?;
        let entry = queue.remove(pos);
        self.assigned[k].insert(entry.id.clone(), entity.id.clone());
        tracing::debug!(entity = %entity.id, instruction = %entry.id, "instruction assigned");
        Some(entry.id)
    }

    /// Drop `instruction` from the `kind` assigned set.
    pub fn release_instruction(&mut self, kind: EquipmentKind, instruction: &InstructionId) {
        self.assigned[kind_index(kind)].remove(instruction);
    }

    /// Assign a specific queued instruction to `entity`.
    pub fn claim(&mut self, kind: EquipmentKind, instruction: &InstructionId, entity: &EntityId) -> bool {
        let k = kind_index(kind);
        if self.assigned[k].contains_key(instruction) {
            return false;
        }
        let queue = &mut self.queues[QueueBucket::Kind(kind).index()];
        let Some(pos) = queue
            .iter()
            .position(|e| &e.id == instruction && e.target.as_ref() == Some(entity))
        else {
            return false;
        };
        queue.remove(pos);
        self.assigned[k].insert(instruction.clone(), entity.clone());
        true
    }

    /// Return an assigned instruction to the `kind` queue at its original
    /// position.
    pub fn requeue(&mut self, kind: EquipmentKind, instruction: &InstructionId) -> bool {
        let Some(entity) = self.assigned[kind_index(kind)].remove(instruction) else {
            return false;
        };
        let Some(&(priority, seq)) = self.meta.get(instruction) else {
            return false;
        };
        self.enqueue(QueueBucket::Kind(kind), Entry {
            id: instruction.clone(),
            priority,
            seq,
            target: Some(entity),
        });
        true
    }

    /// Remove `instruction` from every queue.  Assigned sets are untouched.
    pub fn retire(&mut self, instruction: &InstructionId) {
        for queue in &mut self.queues {
            queue.retain(|e| &e.id != instruction);
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Entity of `kind` currently assigned `instruction`.
    pub fn holder(&self, kind: EquipmentKind, instruction: &InstructionId) -> Option<&EntityId> {
        self.assigned[kind_index(kind)].get(instruction)
    }

    pub fn is_assigned(&self, kind: EquipmentKind, instruction: &InstructionId) -> bool {
        self.assigned[kind_index(kind)].contains_key(instruction)
    }

    pub fn assigned_count(&self, kind: EquipmentKind) -> usize {
        self.assigned[kind_index(kind)].len()
    }

    pub fn queue_len(&self, bucket: QueueBucket) -> usize {
        self.queues[bucket.index()].len()
    }

    /// Queued ids in `bucket`, in hand-out order.
    pub fn queued_ids(&self, bucket: QueueBucket) -> impl Iterator<Item = &InstructionId> + '_ {
        self.queues[bucket.index()].iter().map(|e| &e.id)
    }

    /// Instructions no entity is bound to.  They are never handed out by
    /// [`get_next_instruction`](Self::get_next_instruction).
    pub fn unbound(&self) -> impl Iterator<Item = &InstructionId> + '_ {
        self.queued_ids(QueueBucket::Unbound)
    }

    fn enqueue(&mut self, bucket: QueueBucket, entry: Entry) {
        let queue = &mut self.queues[bucket.index()];
        let pos = queue.partition_point(|e| e.goes_before(&entry));
        queue.insert(pos, entry);
    }
}

fn kind_index(kind: EquipmentKind) -> usize {
    match kind {
        EquipmentKind::Qc => 0,
        EquipmentKind::Yc => 1,
        EquipmentKind::It => 2,
    }
}

impl TaskDispatcher for DecisionModule {
    fn submit(&mut self, instruction: &Instruction) {
        self.add_instruction(instruction);
    }

    fn assign(&mut self, entity: &Entity) -> Option<InstructionId> {
        self.get_next_instruction(entity)
    }

    fn claim(&mut self, kind: EquipmentKind, instruction: &InstructionId, entity: &EntityId) -> bool {
        DecisionModule::claim(self, kind, instruction, entity)
    }

    fn complete(&mut self, kind: EquipmentKind, instruction: &InstructionId) {
        self.release_instruction(kind, instruction);
    }

    fn requeue(&mut self, kind: EquipmentKind, instruction: &InstructionId) -> bool {
        DecisionModule::requeue(self, kind, instruction)
    }

    fn retire(&mut self, instruction: &InstructionId) {
        DecisionModule::retire(self, instruction);
    }

    fn queued(&self, kind: EquipmentKind) -> usize {
        self.queue_len(QueueBucket::Kind(kind))
    }
}
