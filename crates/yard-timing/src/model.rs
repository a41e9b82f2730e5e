//! The pluggable time-estimation seam.

use std::fmt;

use yard_core::SimTime;
use yard_fleet::{Entity, Instruction};
use yard_topology::Route;

/// What an entity is doing while it is `Executing`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum OperationKind {
    /// A crane moving one container between truck and ship or stack.
    Lift,
    /// A truck standing under a crane for the handover.
    Occupation,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperationKind::Lift       => "lift",
            OperationKind::Occupation => "occupation",
        })
    }
}

/// Duration estimates consumed by the scheduler.
///
/// Implementations must be deterministic: the same inputs always give the
/// same duration, otherwise runs are not reproducible.
pub trait TimeModel {
    /// Time for `entity` to travel `distance_m` metres from standstill to
    /// standstill.
    fn movement_time(&self, entity: &Entity, distance_m: f64) -> SimTime;

    /// Time for `entity` to perform `op` for `instruction`.  Instruction
    /// parameters (lift height, target tier, …) refine the estimate when
    /// present.
    fn execution_time(&self, entity: &Entity, op: OperationKind, instruction: Option<&Instruction>) -> SimTime;

    /// Time to drive `route`.  Zero for an empty route.
    fn route_time(&self, entity: &Entity, route: &Route) -> SimTime {
        if route.is_empty() {
            return SimTime::ZERO;
        }
        self.movement_time(entity, route.length_m)
    }
}
