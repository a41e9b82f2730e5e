//! `yard-fleet` — equipment and instruction state for the yard simulator.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                        |
//! |-----------------|-----------------------------------------------------------------|
//! | [`entity`]      | `Entity`, `EntityStatus`, `EquipmentSpec`, `ProfileTable`        |
//! | [`instruction`] | `Instruction`, `InstructionKind`, `InstructionStatus`            |
//! | [`store`]       | `EntityStore`, `InstructionBook` (ordered by id)                 |
//! | [`loader`]      | `load_entities_json`, `load_tasks_json` and reader variants      |
//! | [`error`]       | `FleetError`, `FleetResult<T>`                                   |
//!
//! Entities are created once at setup and mutated only by the scheduler.  The
//! invariant `current_instruction().is_none() == (status() == Idle)` is kept
//! by construction: the only way to hold an instruction is
//! [`Entity::begin`], and the only way back to `Idle` is [`Entity::release`].

pub mod entity;
pub mod error;
pub mod instruction;
pub mod loader;
pub mod store;

#[cfg(test)]
mod tests;

pub use entity::{Entity, EntityStatus, EquipmentSpec, ProfileTable};
pub use error::{FleetError, FleetResult};
pub use instruction::{Instruction, InstructionKind, InstructionStatus};
pub use loader::{load_entities_json, load_entities_reader, load_tasks_json, load_tasks_reader};
pub use store::{EntityStore, InstructionBook};
