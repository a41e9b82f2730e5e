use thiserror::Error;

use yard_core::{EntityId, InstructionId, NodeId};

#[derive(Debug, Error)]
pub enum FleetError {
    #[error("entity {entity}: required parameter {name:?} missing")]
    MissingParameter { entity: String, name: &'static str },

    #[error("unknown equipment type {0:?}")]
    UnknownKind(String),

    #[error("{what} {id}: node {node} is not on the map")]
    UnknownNode { what: &'static str, id: String, node: NodeId },

    #[error("entity {entity}: load {load} t exceeds capacity {capacity} t")]
    OverCapacity { entity: EntityId, load: f64, capacity: f64 },

    #[error("entity {0} has an invalid kinematic profile")]
    InvalidProfile(EntityId),

    #[error("duplicate entity id {0}")]
    DuplicateEntity(EntityId),

    #[error("duplicate instruction id {0}")]
    DuplicateInstruction(InstructionId),

    #[error("parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FleetResult<T> = Result<T, FleetError>;
