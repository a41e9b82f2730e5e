//! Segment occupancy: the only mutual exclusion over the road network.
//!
//! The table maps each held segment to its holder.  Both operations take the
//! table lock for their whole duration, so a reservation is all-or-nothing
//! even with concurrent callers: either every requested segment ends up held
//! by the requester or none is newly held.

use std::sync::{Mutex, MutexGuard, PoisonError};

use yard_core::{EntityId, SegmentId};

use crate::{DispatchError, DispatchResult, Map};

/// Who holds which segment.
#[derive(Debug, Default)]
pub struct OccupancyEngine {
    table: Mutex<Map<SegmentId, EntityId>>,
}

impl OccupancyEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Map<SegmentId, EntityId>> {
        // The table is never left half-updated, so a poisoned lock is still usable.
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reserve every segment in `path` for `entity`.
    ///
    /// Segments already held by `entity` are fine.
    ///
    /// # Errors
    ///
    /// [`DispatchError::Conflict`] naming the first segment (in path order)
    /// held by someone else.  Nothing is reserved in that case.
    pub fn check_and_occupy_path(&self, path: &[SegmentId], entity: &EntityId) -> DispatchResult<()> {
        let mut table = self.lock();
        for segment in path {
            if let Some(holder) = table.get(segment) {
                if holder != entity {
                    return Err(DispatchError::Conflict {
                        segment: segment.clone(),
                        holder:  holder.clone(),
                    });
                }
            }
        }
        for segment in path {
            table.insert(segment.clone(), entity.clone());
        }
        Ok(())
    }

    /// Release every segment held by `entity`.  Returns how many were freed.
    pub fn release_all_by_entity(&self, entity: &EntityId) -> usize {
        let mut table = self.lock();
        let before = table.len();
        table.retain(|_, holder| holder != entity);
        before - table.len()
    }

    /// Current holder of `segment`.
    pub fn holder(&self, segment: &SegmentId) -> Option<EntityId> {
        self.lock().get(segment).cloned()
    }

    /// Segments held by `entity`, sorted.
    pub fn held_by(&self, entity: &EntityId) -> Vec<SegmentId> {
        let mut held: Vec<SegmentId> = self
            .lock()
            .iter()
            .filter(|(_, holder)| *holder == entity)
            .map(|(segment, _)| segment.clone())
            .collect();
        held.sort();
        held
    }

    /// Number of held segments.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
