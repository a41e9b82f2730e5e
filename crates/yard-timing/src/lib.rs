//! `yard-timing` — how long things take.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`model`]    | `TimeModel` trait, `OperationKind`                           |
//! | [`kinematic`]| `KinematicTimeModel`: trapezoidal profile + lift/occupation |
//! | [`config`]   | `TimingConfig`: operation-duration constants                |
//!
//! # Movement model
//!
//! An entity accelerates at `a` up to `v`, cruises, then decelerates at `d`
//! to stop exactly at the destination.  When the distance is too short to
//! reach `v` the profile is triangular.  Durations are returned as whole
//! milliseconds, truncated.

pub mod config;
pub mod kinematic;
pub mod model;


pub use config::TimingConfig;
pub use kinematic::{movement_secs, KinematicTimeModel};
pub use model::{OperationKind, TimeModel};
