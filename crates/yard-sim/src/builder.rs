//! Fluent builder for constructing a [`Sim`].

use yard_core::{Event, SimConfig, SimRng, SimTime};
use yard_dispatch::{
    BackoffPolicy, CollisionPolicy, DecisionModule, GeneratorContext, RandomTaskGenerator,
    TaskDispatcher, TaskGenerator,
};
use yard_fleet::{load_entities_json, load_tasks_json, Entity, Instruction};
use yard_timing::{KinematicTimeModel, TimeModel, TimingConfig};
use yard_topology::{load_map_json, BfsRoutePlanner, RoutePlanner, YardMap};

use crate::{Sim, SimResult};

/// Fluent builder for [`Sim<R, T, D>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: duration, event bound, seed, …
/// - `R: RoutePlanner`: path search (e.g. [`BfsRoutePlanner`])
/// - `T: TimeModel`: duration estimates (e.g. [`KinematicTimeModel`])
///
/// # Optional inputs (have defaults)
///
/// | Method                  | Default                                 |
/// |-------------------------|-----------------------------------------|
/// | `.map(m)`               | `YardMap::empty()`                      |
/// | `.entities(v)`          | none                                    |
/// | `.instructions(v)`      | none                                    |
/// | `.events(v)`            | none                                    |
/// | `.dispatcher(d)`        | [`DecisionModule`]                      |
/// | `.collision_policy(p)`  | [`BackoffPolicy`] with `backoffMs`      |
/// | `.generate_tasks(g, n)` | no generated tasks                      |
///
/// Entities whose kind has an entry in `config.profiles` get that profile.
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, BfsRoutePlanner, KinematicTimeModel::default())
///     .map(map)
///     .entities(entities)
///     .instructions(tasks)
///     .build()?;
/// let summary = sim.start(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<R: RoutePlanner, T: TimeModel, D: TaskDispatcher = DecisionModule> {
    config:       SimConfig,
    planner:      R,
    time_model:   T,
    dispatcher:   D,
    map:          Option<YardMap>,
    collision:    Option<Box<dyn CollisionPolicy>>,
    entities:     Vec<Entity>,
    instructions: Vec<Instruction>,
    events:       Vec<Event>,
    generators:   Vec<(Box<dyn TaskGenerator>, usize)>,
}

impl<R: RoutePlanner, T: TimeModel> SimBuilder<R, T> {
    /// Create a builder with all required inputs.
    pub fn new(config: SimConfig, planner: R, time_model: T) -> Self {
        Self {
            config,
            planner,
            time_model,
            dispatcher:   DecisionModule::new(),
            map:          None,
            collision:    None,
            entities:     Vec::new(),
            instructions: Vec::new(),
            events:       Vec::new(),
            generators:   Vec::new(),
        }
    }
}

impl SimBuilder<BfsRoutePlanner, KinematicTimeModel> {
    /// Builder with the default strategies and every input named by
    /// `config`: the map, entity and task files, the `"timing"` parameters
    /// and `generatedTasks` random tasks.
    pub fn from_config(config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        let timing = TimingConfig::from_sim_config(&config)?;

        let map = match &config.map_file {
            Some(path) => load_map_json(path)?,
            None => YardMap::empty(),
        };
        let entities = match &config.entity_file {
            Some(path) => load_entities_json(path, &map)?,
            None => Vec::new(),
        };
        let tasks = match &config.task_file {
            Some(path) => load_tasks_json(path, &map)?,
            None => Vec::new(),
        };

        let generated = config.generated_tasks;
        let generator = RandomTaskGenerator::from_rng(SimRng::new(config.seed).child(1));

        let builder = SimBuilder::new(config, BfsRoutePlanner, KinematicTimeModel::new(timing))
            .map(map)
            .entities(entities)
            .instructions(tasks);
        Ok(if generated > 0 {
            builder.generate_tasks(generator, generated)
        } else {
            builder
        })
    }
}

impl<R: RoutePlanner, T: TimeModel, D: TaskDispatcher> SimBuilder<R, T, D> {
    pub fn map(mut self, map: YardMap) -> Self {
        self.map = Some(map);
        self
    }

    pub fn entities(mut self, entities: impl IntoIterator<Item = Entity>) -> Self {
        self.entities.extend(entities);
        self
    }

    pub fn entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn instructions(mut self, instructions: impl IntoIterator<Item = Instruction>) -> Self {
        self.instructions.extend(instructions);
        self
    }

    pub fn instruction(mut self, instruction: Instruction) -> Self {
        self.instructions.push(instruction);
        self
    }

    /// Events to schedule before the run starts.
    pub fn events(mut self, events: impl IntoIterator<Item = Event>) -> Self {
        self.events.extend(events);
        self
    }

    /// Replace the assignment policy.
    pub fn dispatcher<D2: TaskDispatcher>(self, dispatcher: D2) -> SimBuilder<R, T, D2> {
        SimBuilder {
            config:       self.config,
            planner:      self.planner,
            time_model:   self.time_model,
            dispatcher,
            map:          self.map,
            collision:    self.collision,
            entities:     self.entities,
            instructions: self.instructions,
            events:       self.events,
            generators:   self.generators,
        }
    }

    pub fn collision_policy(mut self, policy: impl CollisionPolicy + 'static) -> Self {
        self.collision = Some(Box::new(policy));
        self
    }

    /// Submit `count` instructions from `generator`, the n-th stamped
    /// `n * timeStepMs`.  Generation stops early if the generator returns
    /// `None`.
    pub fn generate_tasks(mut self, generator: impl TaskGenerator + 'static, count: usize) -> Self {
        self.generators.push((Box::new(generator), count));
        self
    }

    /// Validate inputs and return a ready-to-run [`Sim`].
    ///
    /// # Errors
    ///
    /// An invalid configuration, or the first entity or instruction the
    /// kernel rejects.
    pub fn build(self) -> SimResult<Sim<R, T, D>> {
        self.config.validate()?;

        let collision: Box<dyn CollisionPolicy> = match self.collision {
            Some(policy) => policy,
            None => {
                let boost = self
                    .config
                    .parameter_f64("priorityBoost")
                    .map(|b| b as i32)
                    .unwrap_or(BackoffPolicy::DEFAULT_PRIORITY_BOOST);
                Box::new(BackoffPolicy::new(self.config.backoff_ms).with_priority_boost(boost))
            }
        };
        let map = self.map.unwrap_or_else(YardMap::empty);
        let time_step = self.config.time_step_ms;
        let profiles = self.config.profiles.clone();

        let mut sim = Sim::new(self.config, map, self.planner, self.time_model, self.dispatcher, collision);

        for mut entity in self.entities {
            if let Some(profile) = profiles.get(&entity.kind) {
                entity.profile = *profile;
            }
            sim.add_entity(entity)?;
        }
        for instruction in self.instructions {
            sim.add_instruction(instruction)?;
        }
        for (mut generator, count) in self.generators {
            generate_into(&mut sim, generator.as_mut(), count, time_step)?;
        }
        for event in self.events {
            sim.add_event(event);
        }
        Ok(sim)
    }
}

fn generate_into<R: RoutePlanner, T: TimeModel, D: TaskDispatcher>(
    sim:       &mut Sim<R, T, D>,
    generator: &mut dyn TaskGenerator,
    count:     usize,
    time_step: u64,
) -> SimResult<()> {
    for n in 0..count as u64 {
        let now = SimTime(n.saturating_mul(time_step));
        let ctx = GeneratorContext { map: &sim.map, entities: &sim.entities };
        let Some(instruction) = generator.generate(now, &ctx) else {
            tracing::warn!(requested = count, generated = n, "task generator ran dry");
            break;
        };
        sim.add_instruction(instruction)?;
    }
    Ok(())
}
