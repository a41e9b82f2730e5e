//! The `Sim` struct and its event loop.

use yard_core::{EntityId, EquipmentKind, Event, EventKind, InstructionId, SimConfig, SimTime};
use yard_dispatch::{CollisionPolicy, DecisionModule, OccupancyEngine, TaskDispatcher};
use yard_fleet::{Entity, EntityStore, Instruction, InstructionBook};
use yard_timing::TimeModel;
use yard_topology::{RoutePlanner, YardMap};

use crate::{EventQueue, RunSummary, SimControl, SimError, SimObserver, SimResult, StopReason};

/// The discrete-event simulation engine.
///
/// `Sim` owns the clock, the event queue, all entities and instructions, and
/// the pluggable strategies: a [`RoutePlanner`], a [`TimeModel`], a
/// [`TaskDispatcher`] and a [`CollisionPolicy`].  Each loop iteration pops
/// the earliest event, moves the clock to it, hands it to the matching
/// scheduler handler and appends it to the event log.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<R: RoutePlanner, T: TimeModel, D: TaskDispatcher = DecisionModule> {
    pub config: SimConfig,

    /// Read-only yard topology.
    pub map: YardMap,

    pub entities: EntityStore,

    /// Every instruction ever submitted, completed ones included.
    pub instructions: InstructionBook,

    pub planner:    R,
    pub time_model: T,
    pub dispatcher: D,
    pub collision:  Box<dyn CollisionPolicy>,
    pub occupancy:  OccupancyEngine,

    pub(crate) clock:     SimTime,
    pub(crate) queue:     EventQueue,
    pub(crate) log:       Vec<Event>,
    pub(crate) processed: u64,
    pub(crate) control:   SimControl,
    /// Set once the first run has started; initial dispatch happens only then.
    pub(crate) started:   bool,
}

impl<R: RoutePlanner, T: TimeModel, D: TaskDispatcher> Sim<R, T, D> {
    pub(crate) fn new(
        config:     SimConfig,
        map:        YardMap,
        planner:    R,
        time_model: T,
        dispatcher: D,
        collision:  Box<dyn CollisionPolicy>,
    ) -> Self {
        Self {
            config,
            map,
            entities: EntityStore::new(),
            instructions: InstructionBook::new(),
            planner,
            time_model,
            dispatcher,
            collision,
            occupancy: OccupancyEngine::new(),
            clock: SimTime::ZERO,
            queue: EventQueue::new(),
            log: Vec::new(),
            processed: 0,
            control: SimControl::new(),
            started: false,
        }
    }

    // ── Setup ─────────────────────────────────────────────────────────────

    /// Register an entity.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidEntity`] for a duplicate id, a kind that disagrees
    /// with the equipment attributes, an unknown position or a kinematic
    /// profile with a negative or non-finite component.
    pub fn add_entity(&mut self, entity: Entity) -> SimResult<()> {
        let reject = |reason: String| SimError::InvalidEntity { id: entity.id.clone(), reason };
        if self.entities.contains(&entity.id) {
            return Err(reject("duplicate id".into()));
        }
        if entity.kind != entity.spec.kind() {
            return Err(reject(format!("kind {} disagrees with {} attributes", entity.kind, entity.spec.kind())));
        }
        if !entity.profile.is_valid() {
            return Err(reject("invalid kinematic profile".into()));
        }
        if !self.map.contains_node(&entity.position) {
            return Err(reject(format!("position {} is not on the map", entity.position)));
        }
        if !entity.is_consistent() {
            return Err(reject("holds an instruction while idle".into()));
        }
        tracing::debug!(entity = %entity.id, kind = %entity.kind, position = %entity.position, "entity added");
        self.entities.insert(entity)?;
        Ok(())
    }

    /// Register an instruction and hand it to the dispatcher.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidInstruction`] for a duplicate id, an unknown origin
    /// or destination, a bound target that is missing or of the wrong kind,
    /// a container heavier than a bound entity can carry, or a handover bound
    /// to a truck but to no crane.
    pub fn add_instruction(&mut self, instruction: Instruction) -> SimResult<()> {
        self.validate_instruction(&instruction)
            .map_err(|reason| SimError::InvalidInstruction { id: instruction.id.clone(), reason })?;
        self.dispatcher.submit(&instruction);
        self.instructions.insert(instruction)?;
        Ok(())
    }

    fn validate_instruction(&self, instruction: &Instruction) -> Result<(), String> {
        if self.instructions.contains(&instruction.id) {
            return Err("duplicate id".into());
        }
        for (what, node) in [("origin", &instruction.origin), ("destination", &instruction.destination)] {
            if !self.map.contains_node(node) {
                return Err(format!("{what} {node} is not on the map"));
            }
        }
        let crane_bound = instruction.bound_kinds().any(EquipmentKind::is_crane);
        if !instruction.kind.is_solo() && !crane_bound && instruction.target(EquipmentKind::It).is_some() {
            return Err(format!("{} bound to a truck needs a QC or YC", instruction.kind));
        }
        for kind in instruction.bound_kinds() {
            let Some(target) = instruction.target(kind) else { continue };
            let Some(entity) = self.entities.get(target) else {
                return Err(format!("bound {kind} {target} does not exist"));
            };
            if entity.kind != kind {
                return Err(format!("bound {kind} {target} is a {}", entity.kind));
            }
            if let Some(weight) = instruction.container_weight_t {
                if !weight.is_finite() || weight < 0.0 || weight > entity.capacity_t() {
                    return Err(format!(
                        "container weight {weight} t exceeds {target} capacity {} t",
                        entity.capacity_t()
                    ));
                }
            }
        }
        Ok(())
    }

    /// Schedule an event.  Returns its queue sequence number.
    ///
    /// Events earlier than the current clock are accepted here and rejected
    /// by the loop with [`SimError::ClockRegression`].
    pub fn add_event(&mut self, event: Event) -> u64 {
        self.queue.push(event)
    }

    // ── Run control ───────────────────────────────────────────────────────

    /// Run until the queue empties, the clock reaches `durationMs`,
    /// `maxEvents` events have been processed or [`stop`](Self::stop) is
    /// called.
    ///
    /// A run may be resumed by calling `start` again; the clock and event
    /// count carry over.
    ///
    /// # Errors
    ///
    /// - [`SimError::AlreadyRunning`] if a run is in progress.
    /// - [`SimError::ClockRegression`] if a queued event is earlier than the
    ///   clock.  The run is aborted.
    pub fn start<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<RunSummary> {
        if !self.control.begin() {
            return Err(SimError::AlreadyRunning);
        }
        tracing::info!(
            entities     = self.entities.len(),
            instructions = self.instructions.len(),
            queued       = self.queue.len(),
            clock        = %self.clock,
            "simulation started"
        );

        if !self.started {
            self.started = true;
            if self.config.auto_dispatch {
                self.dispatch_idle();
            }
        }
        observer.on_start(self.clock, &self.entities);

        let result = self.run_loop(observer);
        self.control.stop();
        let reason = result?;

        let summary = self.summary(reason);
        tracing::info!(
            entities     = summary.entities,
            instructions = summary.instructions,
            completed    = summary.completed_instructions,
            events       = summary.events_processed,
            clock        = %summary.final_clock,
            reason       = ?summary.stop_reason,
            "simulation finished"
        );
        observer.on_sim_end(&summary);
        Ok(summary)
    }

    fn run_loop<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<StopReason> {
        let end = self.config.end_time();
        loop {
            if !self.control.is_running() {
                return Ok(StopReason::Stopped);
            }
            if self.clock >= end {
                return Ok(StopReason::DurationReached);
            }
            let Some(event) = self.queue.pop() else {
                return Ok(StopReason::QueueEmpty);
            };
            if event.timestamp < self.clock {
                tracing::error!(now = %self.clock, event = %event.timestamp, "clock regression");
                return Err(SimError::ClockRegression { now: self.clock, event: event.timestamp });
            }
            self.clock = event.timestamp;

            if event.kind == EventKind::Unrecognized {
                tracing::warn!(entity = %event.entity_id, instruction = %event.instruction_id, "unrecognised event skipped");
                continue;
            }
            self.handle(&event);
            observer.on_event(&event, &self.entities, &self.instructions);
            self.log.push(event);
            self.processed += 1;

            if self.config.max_events.is_some_and(|max| self.processed >= max) {
                return Ok(StopReason::MaxEvents);
            }
        }
    }

    /// Ask the engine to stop at the next loop iteration.
    pub fn stop(&self) {
        self.control.stop();
    }

    /// A handle that can stop the run from an observer or another thread.
    pub fn control(&self) -> SimControl {
        self.control.clone()
    }

    pub fn is_running(&self) -> bool {
        self.control.is_running()
    }

    // ── Queries ───────────────────────────────────────────────────────────

    #[inline]
    pub fn clock(&self) -> SimTime {
        self.clock
    }

    /// Every processed event, in processing order.
    pub fn event_log(&self) -> &[Event] {
        &self.log
    }

    /// Hand the event log over, leaving an empty one behind.
    pub fn take_event_log(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.log)
    }

    pub fn events_processed(&self) -> u64 {
        self.processed
    }

    pub fn pending_events(&self) -> &EventQueue {
        &self.queue
    }

    pub fn entity(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn instruction(&self, id: &InstructionId) -> Option<&Instruction> {
        self.instructions.get(id)
    }

    pub fn summary(&self, stop_reason: StopReason) -> RunSummary {
        RunSummary {
            entities:               self.entities.len(),
            instructions:           self.instructions.len(),
            completed_instructions: self.instructions.completed_count(),
            events_processed:       self.processed,
            final_clock:            self.clock,
            stop_reason,
        }
    }
}
