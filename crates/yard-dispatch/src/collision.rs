//! What to do when a path reservation fails.

use yard_core::{EntityId, SegmentId, SimTime};
use yard_fleet::{Entity, Instruction, InstructionKind};

/// Everything a policy may look at when a reservation conflicts.
pub struct ConflictContext<'a> {
    pub now:     SimTime,
    /// The entity whose move was refused.
    pub entity:  &'a Entity,
    /// The instruction it was about to move for.
    pub blocked: &'a Instruction,
    pub segment: &'a SegmentId,
    pub holder:  &'a EntityId,
}

/// A policy's answer.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    /// Requeue the blocked instruction and run `wait` first.  `wait` must be
    /// bound to the blocked entity.
    Backoff { wait: Instruction },
    /// Requeue the blocked instruction and leave the entity idle.
    Abandon,
}

/// Pluggable conflict resolution.
pub trait CollisionPolicy {
    fn resolve(&mut self, ctx: &ConflictContext<'_>) -> Resolution;
}

/// Back off with a high-priority WAIT, then retry.
///
/// The WAIT stays where the entity is, lasts `backoff_ms` (at least 1 ms, so
/// the retry happens at a later time) and outranks the blocked instruction by
/// `priority_boost`.
#[derive(Clone, Debug)]
pub struct BackoffPolicy {
    pub backoff_ms:     u64,
    pub priority_boost: i32,
    issued:             u64,
}

impl BackoffPolicy {
    pub const DEFAULT_PRIORITY_BOOST: i32 = 100;

    pub fn new(backoff_ms: u64) -> Self {
        Self { backoff_ms, priority_boost: Self::DEFAULT_PRIORITY_BOOST, issued: 0 }
    }

    pub fn with_priority_boost(mut self, boost: i32) -> Self {
        self.priority_boost = boost;
        self
    }

    /// Number of WAIT instructions issued so far.
    pub fn issued(&self) -> u64 {
        self.issued
    }
}

impl CollisionPolicy for BackoffPolicy {
    fn resolve(&mut self, ctx: &ConflictContext<'_>) -> Resolution {
        self.issued += 1;
        let id = format!("{}-BACKOFF-{}", ctx.blocked.id, self.issued);
        let wait = Instruction::new(id, InstructionKind::Wait, ctx.entity.position.clone(), ctx.entity.position.clone())
            .with_target(ctx.entity.kind, ctx.entity.id.clone())
            .with_priority(ctx.blocked.priority.saturating_add(self.priority_boost))
            .with_param("durationMs", self.backoff_ms.max(1))
            .generated_at(ctx.now);
        tracing::debug!(
            entity  = %ctx.entity.id,
            blocked = %ctx.blocked.id,
            segment = %ctx.segment,
            holder  = %ctx.holder,
            wait    = %wait.id,
            "backing off"
        );
        Resolution::Backoff { wait }
    }
}
