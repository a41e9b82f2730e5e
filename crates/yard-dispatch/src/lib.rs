//! `yard-dispatch` — who does what, and who may drive where.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                        |
//! |---------------|-----------------------------------------------------------------|
//! | [`decision`]  | `DecisionModule` (per-kind priority queues), `TaskDispatcher`    |
//! | [`occupancy`] | `OccupancyEngine`, all-or-nothing segment reservation           |
//! | [`collision`] | `CollisionPolicy` trait, `BackoffPolicy`                         |
//! | [`generator`] | `TaskGenerator` trait, `RandomTaskGenerator`, `GeneratorContext` |
//! | [`error`]     | `DispatchError`, `DispatchResult<T>`                             |
//!
//! # Feature flags
//!
//! - `fx-hash`: use `rustc_hash::FxHashMap` for the occupancy table and the
//!   assigned sets instead of the standard SipHash map.

pub mod collision;
pub mod decision;
pub mod error;
pub mod generator;
pub mod occupancy;


pub use collision::{BackoffPolicy, CollisionPolicy, ConflictContext, Resolution};
pub use decision::{DecisionModule, QueueBucket, TaskDispatcher};
pub use error::{DispatchError, DispatchResult};
pub use generator::{GeneratorContext, RandomTaskGenerator, TaskGenerator};
pub use occupancy::OccupancyEngine;

#[cfg(feature = "fx-hash")]
pub(crate) type Map<K, V> = rustc_hash::FxHashMap<K, V>;
#[cfg(not(feature = "fx-hash"))]
pub(crate) type Map<K, V> = std::collections::HashMap<K, V>;
