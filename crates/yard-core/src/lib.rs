//! `yard-core` — foundational types for the container-yard simulator.
//!
//! Every other `yard-*` crate depends on this one.  It has no `yard-*`
//! dependencies and only a handful of external ones (`serde`, `serde_json`,
//! `rand`, `thiserror`).
//!
//! # What lives here
//!
//! | Module        | Contents                                               |
//! |---------------|--------------------------------------------------------|
//! | [`ids`]       | `NodeId`, `SegmentId`, `EntityId`, `InstructionId`     |
//! | [`time`]      | `SimTime` (milliseconds), `SimConfig`                  |
//! | [`equipment`] | `EquipmentKind`, `KinematicProfile`                    |
//! | [`event`]     | `Event`, `EventKind`                                   |
//! | [`rng`]       | `SimRng` (seeded, reproducible)                        |
//! | [`error`]     | `YardError`, `YardResult`                              |

pub mod equipment;
pub mod error;
pub mod event;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{YardError, YardResult};
pub use equipment::{EquipmentKind, KinematicProfile};
pub use event::{Event, EventKind};
pub use ids::{EntityId, InstructionId, NodeId, SegmentId};
pub use rng::SimRng;
pub use time::{SimConfig, SimTime};
