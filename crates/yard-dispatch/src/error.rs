use thiserror::Error;

use yard_core::{EntityId, SegmentId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// A segment on the requested path is held by another entity.
    #[error("segment {segment} is held by {holder}")]
    Conflict { segment: SegmentId, holder: EntityId },
}

pub type DispatchResult<T> = Result<T, DispatchError>;
