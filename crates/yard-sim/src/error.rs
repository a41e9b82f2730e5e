use thiserror::Error;

use yard_core::{EntityId, InstructionId, SimTime, YardError};
use yard_fleet::FleetError;
use yard_topology::TopologyError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation is already running")]
    AlreadyRunning,

    #[error("event at {event} would move the clock back from {now}")]
    ClockRegression { now: SimTime, event: SimTime },

    #[error("entity {id} rejected: {reason}")]
    InvalidEntity { id: EntityId, reason: String },

    #[error("instruction {id} rejected: {reason}")]
    InvalidInstruction { id: InstructionId, reason: String },

    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] YardError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Fleet(#[from] FleetError),
}

pub type SimResult<T> = Result<T, SimError>;
