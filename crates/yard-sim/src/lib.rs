//! `yard-sim` — discrete-event engine for the container-yard simulator.
//!
//! # Event loop
//!
//! ```text
//! start():
//!   dispatch every idle entity (first run, autoDispatch only)
//!   loop:
//!     stopped?              → Stopped
//!     clock ≥ durationMs?   → DurationReached
//!     pop earliest event    → none left: QueueEmpty
//!     event < clock?        → Err(ClockRegression)
//!     clock := event time
//!     ARRIVAL / COMPLETION  → scheduler handler (may push new events)
//!     append to event log; processed += 1
//!     processed == maxEvents → MaxEvents
//! ```
//!
//! Ties on timestamp pop in the order the events were scheduled.
//!
//! # Crate layout
//!
//! | Module       | Contents                                               |
//! |--------------|--------------------------------------------------------|
//! | [`sim`]      | `Sim`: clock, queue, stores and the loop               |
//! | [`builder`]  | `SimBuilder`                                           |
//! | [`queue`]    | `EventQueue`                                           |
//! | [`control`]  | `SimControl`, a cloneable stop handle                  |
//! | [`observer`] | `SimObserver`, `NoopObserver`, `RunSummary`            |
//! | `scheduler`  | per-event entity state transitions (private)           |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use yard_core::SimConfig;
//! use yard_sim::{NoopObserver, SimBuilder};
//!
//! let config = SimConfig::from_json_path("scenario/config.json".as_ref())?;
//! let mut sim = SimBuilder::from_config(config)?.build()?;
//! let summary = sim.start(&mut NoopObserver)?;
//! println!("{} of {} instructions done", summary.completed_instructions, summary.instructions);
//! ```

pub mod builder;
pub mod control;
pub mod error;
pub mod observer;
pub mod queue;
pub mod sim;

mod scheduler;


pub use builder::SimBuilder;
pub use control::SimControl;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, RunSummary, SimObserver, StopReason};
pub use queue::EventQueue;
pub use sim::Sim;
