//! Entity state machine: one handler per event family.
//!
//! | From      | Trigger                                   | To        |
//! |-----------|-------------------------------------------|-----------|
//! | IDLE      | assigned, work is elsewhere               | MOVING    |
//! | IDLE      | assigned, on the right node, partner ready| EXECUTING |
//! | IDLE      | assigned, on the right node, no partner   | WAITING   |
//! | MOVING    | arrival, partner ready                    | EXECUTING |
//! | MOVING    | arrival, no partner                       | WAITING   |
//! | WAITING   | partner arrives or becomes ready          | EXECUTING |
//! | EXECUTING | completion, next instruction              | as IDLE   |
//! | EXECUTING | completion, nothing queued                | IDLE      |
//!
//! Cranes (QC and YC) work at the instruction's *origin*, trucks drive to its
//! *destination*.  A rendezvous happens when a crane and its bound truck are
//! on the same node and both ready; it puts both into `EXECUTING` and
//! schedules the two completion events.  On arrival a truck looks for a quay
//! crane on a `QUAY` node, a yard crane on a `BAY` node, and either bound
//! crane on any other node.
//!
//! A handover instruction bound to a crane but no truck is executed by the
//! crane alone.  One bound to a truck but no crane is rejected when it is
//! submitted.
//!
//! `WAIT` and `MOVE` instructions involve a single entity: a WAIT executes in
//! place for `parameters.durationMs` (default `backoffMs`), a MOVE completes
//! on arrival.
//!
//! An event naming an unknown entity, an entity of another kind, an unknown
//! instruction, or an instruction the entity no longer holds changes nothing;
//! it is only logged.

use yard_core::{EntityId, EquipmentKind, Event, EventKind, InstructionId, NodeId, SegmentId, SimTime};
use yard_dispatch::{ConflictContext, DispatchError, Resolution, TaskDispatcher};
use yard_fleet::{EntityStatus, InstructionKind, InstructionStatus};
use yard_timing::{OperationKind, TimeModel};
use yard_topology::{NodeType, Route, RoutePlanner};

use crate::Sim;

impl<R: RoutePlanner, T: TimeModel, D: TaskDispatcher> Sim<R, T, D> {
    // ── Dispatch ──────────────────────────────────────────────────────────

    pub(crate) fn handle(&mut self, event: &Event) {
        tracing::debug!(
            t           = %event.timestamp,
            kind        = %event.kind,
            entity      = %event.entity_id,
            instruction = %event.instruction_id,
            "event"
        );
        let Some(kind) = event.kind.equipment() else { return };
        if !self.holds(&event.entity_id, kind, &event.instruction_id) {
            tracing::warn!(
                entity      = %event.entity_id,
                instruction = %event.instruction_id,
                kind        = %event.kind,
                "stale or unknown event target; skipped"
            );
            return;
        }
        match event.kind {
            EventKind::QcExecutionComplete | EventKind::YcExecutionComplete => {
                self.on_crane_complete(kind, &event.entity_id, &event.instruction_id);
            }
            EventKind::ItExecutionComplete => {
                self.on_truck_complete(&event.entity_id, &event.instruction_id);
            }
            EventKind::QcArrival | EventKind::YcArrival => {
                self.on_crane_arrival(kind, &event.entity_id, &event.instruction_id, event.target.as_ref());
            }
            EventKind::ItArrival => {
                self.on_truck_arrival(&event.entity_id, &event.instruction_id, event.target.as_ref());
            }
            EventKind::Unrecognized => {}
        }
    }

    /// `entity` exists, is of `kind`, holds `instruction`, and the
    /// instruction exists.
    fn holds(&self, entity: &EntityId, kind: EquipmentKind, instruction: &InstructionId) -> bool {
        self.instructions.contains(instruction)
            && self
                .entities
                .get_kind(entity, kind)
                .is_some_and(|e| e.holds(instruction))
    }

    /// Give every idle entity a chance to pick up work, in id order.
    pub(crate) fn dispatch_idle(&mut self) {
        let idle: Vec<EntityId> = self
            .entities
            .iter()
            .filter(|e| e.is_idle())
            .map(|e| e.id.clone())
            .collect();
        for id in idle {
            self.request_next(&id);
        }
    }

    // ── Handlers ──────────────────────────────────────────────────────────

    fn on_crane_complete(&mut self, kind: EquipmentKind, crane: &EntityId, instruction: &InstructionId) {
        self.finish(kind, crane, instruction);
        self.request_next(crane);
    }

    fn on_truck_complete(&mut self, truck: &EntityId, instruction: &InstructionId) {
        self.finish(EquipmentKind::It, truck, instruction);
        if let Some(e) = self.entities.get_mut(truck) {
            e.unload();
        }
        self.request_next(truck);
    }

    fn on_crane_arrival(
        &mut self,
        kind:        EquipmentKind,
        crane:       &EntityId,
        instruction: &InstructionId,
        target:      Option<&NodeId>,
    ) {
        if !self.arrive(crane, instruction, target) {
            return;
        }
        if self.is_move(instruction) {
            self.on_crane_complete(kind, crane, instruction);
            return;
        }
        if !self.try_crane_rendezvous(crane, instruction) {
            self.set_status(crane, EntityStatus::Waiting);
        }
    }

    fn on_truck_arrival(&mut self, truck: &EntityId, instruction: &InstructionId, target: Option<&NodeId>) {
        if !self.arrive(truck, instruction, target) {
            return;
        }
        if self.is_move(instruction) {
            self.on_truck_complete(truck, instruction);
            return;
        }

        let Some(position) = self.entities.get(truck).map(|e| e.position.clone()) else { return };
        let partner_kinds: &[EquipmentKind] = match self.map.node_type(&position) {
            Some(NodeType::Quay) => &[EquipmentKind::Qc],
            Some(NodeType::Bay)  => &[EquipmentKind::Yc],
            _ => &[EquipmentKind::Qc, EquipmentKind::Yc],
        };
        let partner = partner_kinds.iter().find_map(|&k| {
            let id = self.instructions.get(instruction)?.target(k)?;
            let crane = self.entities.get_kind(id, k)?;
            let ready = crane.position == position
                && crane.status() == EntityStatus::Waiting
                && crane.holds(instruction);
            ready.then(|| crane.id.clone())
        });

        match partner {
            Some(crane) => self.rendezvous(&crane, Some(truck), instruction),
            None => self.set_status(truck, EntityStatus::Waiting),
        }
    }

    // ── Follow-up: next instruction ───────────────────────────────────────

    /// Ask the dispatcher for `entity`'s next instruction and start on it.
    /// With nothing to do the entity stays idle.
    fn request_next(&mut self, entity: &EntityId) {
        loop {
            let Some(e) = self.entities.get(entity) else { return };
            if !e.is_idle() {
                return;
            }
            let kind = e.kind;
            let Some(next) = self.dispatcher.assign(e) else {
                tracing::debug!(%entity, "no instruction; idle");
                return;
            };
            let Some(instr) = self.instructions.get_mut(&next) else {
                self.dispatcher.complete(kind, &next);
                continue;
            };
            if instr.is_completed() {
                self.dispatcher.complete(kind, &next);
                continue;
            }
            instr.advance(InstructionStatus::Assigned);
            self.start_instruction(entity, kind, next);
            return;
        }
    }

    fn start_instruction(&mut self, entity: &EntityId, kind: EquipmentKind, instruction: InstructionId) {
        let Some(instr) = self.instructions.get(&instruction) else { return };
        let instr_kind  = instr.kind;
        let origin      = instr.origin.clone();
        let destination = instr.destination.clone();

        let Some(e) = self.entities.get_mut(entity) else { return };
        e.begin(instruction.clone(), EntityStatus::Waiting);
        let position = e.position.clone();
        tracing::debug!(%entity, %instruction, kind = %instr_kind, "instruction started");

        match instr_kind {
            InstructionKind::Wait => self.begin_wait(entity, kind, &instruction),
            InstructionKind::Move => self.move_to(entity, &instruction, &destination),
            _ if kind == EquipmentKind::It => self.move_to(entity, &instruction, &destination),
            _ if origin == position => {
                if !self.try_crane_rendezvous(entity, &instruction) {
                    self.set_status(entity, EntityStatus::Waiting);
                }
            }
            _ => self.move_to(entity, &instruction, &origin),
        }
    }

    fn begin_wait(&mut self, entity: &EntityId, kind: EquipmentKind, instruction: &InstructionId) {
        let duration_ms = self
            .instructions
            .get(instruction)
            .and_then(|i| i.param_f64("durationMs"))
            .filter(|ms| ms.is_finite() && *ms >= 0.0)
            .map(|ms| ms as u64)
            .unwrap_or(self.config.backoff_ms);

        if let Some(instr) = self.instructions.get_mut(instruction) {
            instr.advance(InstructionStatus::InProgress);
        }
        self.set_status(entity, EntityStatus::Executing);
        self.queue.push(Event::completion(
            self.clock.offset(duration_ms),
            kind,
            entity.clone(),
            instruction.clone(),
        ));
    }

    // ── Movement ──────────────────────────────────────────────────────────

    /// Send `entity` to `target` and schedule its arrival.
    fn move_to(&mut self, entity: &EntityId, instruction: &InstructionId, target: &NodeId) {
        let Some(e) = self.entities.get(entity) else { return };
        let kind = e.kind;

        let route = match self.planner.search_route(&self.map, &e.position, target) {
            Ok(route) => route,
            Err(err) => {
                tracing::warn!(%entity, %target, error = %err, "route search failed");
                Route::default()
            }
        };
        if route.is_empty() && e.position != *target {
            tracing::warn!(%entity, from = %e.position, to = %target, "destination unreachable; zero-length move");
        }

        if self.config.reserve_paths && !route.is_empty() {
            if let Err(DispatchError::Conflict { segment, holder }) =
                self.occupancy.check_and_occupy_path(&route.segments, entity)
            {
                self.on_conflict(entity, instruction, &segment, &holder);
                return;
            }
        }

        let duration = self.time_model.route_time(e, &route);
        let arrival  = self.clock + duration;
        tracing::debug!(%entity, to = %target, hops = route.hop_count(), %arrival, "moving");
        self.set_status(entity, EntityStatus::Moving);
        self.queue.push(Event::arrival(arrival, kind, entity.clone(), instruction.clone(), target.clone()));
    }

    /// Set the position on arrival and free reserved segments.  `false` if
    /// the arrival has no usable target.
    fn arrive(&mut self, entity: &EntityId, instruction: &InstructionId, target: Option<&NodeId>) -> bool {
        let Some(target) = target.cloned() else {
            tracing::warn!(%entity, %instruction, "arrival without target; skipped");
            return false;
        };
        if self.config.reserve_paths {
            self.occupancy.release_all_by_entity(entity);
        }
        let Some(e) = self.entities.get_mut(entity) else { return false };
        e.position = target;
        true
    }

    fn on_conflict(&mut self, entity: &EntityId, instruction: &InstructionId, segment: &SegmentId, holder: &EntityId) {
        tracing::warn!(%entity, %instruction, %segment, %holder, "path reservation conflict");

        let (Some(e), Some(blocked)) = (self.entities.get(entity), self.instructions.get(instruction)) else {
            return;
        };
        let kind = e.kind;
        let resolution = self.collision.resolve(&ConflictContext {
            now: self.clock,
            entity: e,
            blocked,
            segment,
            holder,
        });

        self.dispatcher.requeue(kind, instruction);
        if let Some(e) = self.entities.get_mut(entity) {
            e.release();
        }

        let Resolution::Backoff { wait } = resolution else {
            return;
        };
        let wait_id = wait.id.clone();
        if let Err(err) = self.add_instruction(wait) {
            tracing::warn!(%entity, error = %err, "backoff instruction rejected");
            return;
        }
        if !self.dispatcher.claim(kind, &wait_id, entity) {
            tracing::warn!(%entity, wait = %wait_id, "backoff instruction not claimable");
            return;
        }
        if let Some(instr) = self.instructions.get_mut(&wait_id) {
            instr.advance(InstructionStatus::Assigned);
        }
        if let Some(e) = self.entities.get_mut(entity) {
            e.begin(wait_id.clone(), EntityStatus::Waiting);
        }
        self.begin_wait(entity, kind, &wait_id);
    }

    // ── Rendezvous ────────────────────────────────────────────────────────

    /// Start `instruction` if the crane's bound truck is on the crane's node
    /// and ready: waiting with the same instruction, or idle (it is then
    /// claimed).  A crane instruction with no bound truck starts at once.
    fn try_crane_rendezvous(&mut self, crane: &EntityId, instruction: &InstructionId) -> bool {
        let Some(c) = self.entities.get(crane) else { return false };
        let Some(instr) = self.instructions.get(instruction) else { return false };
        let Some(truck_id) = instr.target(EquipmentKind::It).cloned() else {
            self.rendezvous(crane, None, instruction);
            return true;
        };
        let Some(truck) = self.entities.get_kind(&truck_id, EquipmentKind::It) else { return false };
        if truck.position != c.position {
            return false;
        }

        let ready = match truck.status() {
            EntityStatus::Waiting => truck.holds(instruction),
            EntityStatus::Idle    => self.dispatcher.claim(EquipmentKind::It, instruction, &truck_id),
            _ => false,
        };
        if ready {
            self.rendezvous(crane, Some(&truck_id), instruction);
        }
        ready
    }

    /// Both sides execute `instruction`.  The truck finishes at
    /// `now + max(lift, occupation)`, the crane at `now + lift`.
    fn rendezvous(&mut self, crane: &EntityId, truck: Option<&EntityId>, instruction: &InstructionId) {
        let now = self.clock;
        let Some(instr) = self.instructions.get(instruction) else { return };
        let Some(c) = self.entities.get(crane) else { return };
        let crane_kind = c.kind;
        let lift = self.time_model.execution_time(c, OperationKind::Lift, Some(instr));
        let occupation = truck
            .and_then(|t| self.entities.get(t))
            .map(|t| self.time_model.execution_time(t, OperationKind::Occupation, Some(instr)))
            .unwrap_or(SimTime::ZERO);
        let weight = instr.container_weight_t;

        tracing::debug!(%crane, truck = ?truck.map(|t| t.as_str()), %instruction, %lift, %occupation, "rendezvous");

        if let Some(instr) = self.instructions.get_mut(instruction) {
            instr.advance(InstructionStatus::InProgress);
        }
        if let Some(c) = self.entities.get_mut(crane) {
            c.begin(instruction.clone(), EntityStatus::Executing);
        }
        if let Some(truck) = truck {
            if let Some(t) = self.entities.get_mut(truck) {
                t.begin(instruction.clone(), EntityStatus::Executing);
                if let Some(w) = weight {
                    if let Err(err) = t.set_load(w) {
                        tracing::warn!(%truck, error = %err, "container not loaded");
                    }
                }
            }
            let truck_done = now + lift.max(occupation);
            self.queue.push(Event::completion(truck_done, EquipmentKind::It, truck.clone(), instruction.clone()));
        }
        self.queue.push(Event::completion(now + lift, crane_kind, crane.clone(), instruction.clone()));
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    /// Release the `kind` assignment, mark the instruction completed and
    /// make the entity idle.
    fn finish(&mut self, kind: EquipmentKind, entity: &EntityId, instruction: &InstructionId) {
        self.dispatcher.complete(kind, instruction);
        if let Some(instr) = self.instructions.get_mut(instruction) {
            if !instr.is_completed() {
                instr.advance(InstructionStatus::Completed);
                self.dispatcher.retire(instruction);
                tracing::debug!(%instruction, t = %self.clock, "instruction completed");
            }
        }
        if let Some(e) = self.entities.get_mut(entity) {
            e.release();
        }
    }

    fn set_status(&mut self, entity: &EntityId, status: EntityStatus) {
        if let Some(e) = self.entities.get_mut(entity) {
            e.set_status(status);
        }
    }

    fn is_move(&self, instruction: &InstructionId) -> bool {
        self.instructions
            .get(instruction)
            .is_some_and(|i| i.kind == InstructionKind::Move)
    }
}
