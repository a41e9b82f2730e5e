//! Synthetic task generation.

use yard_core::{EquipmentKind, SimRng, SimTime};
use yard_fleet::{Entity, EntityStore, Instruction, InstructionKind};
use yard_topology::{NodeType, YardMap};

/// Read-only view handed to a [`TaskGenerator`].
pub struct GeneratorContext<'a> {
    pub map:      &'a YardMap,
    pub entities: &'a EntityStore,
}

/// Produces instructions on demand.
pub trait TaskGenerator {
    /// A new instruction generated at `now`, or `None` if nothing can be
    /// generated (e.g. no crane or no truck in the fleet).
    fn generate(&mut self, now: SimTime, ctx: &GeneratorContext<'_>) -> Option<Instruction>;
}

/// Random handover tasks.
///
/// Picks a crane standing at a node it can work (a quay crane on a `QUAY`
/// node, a yard crane on a `BAY` node) and a truck, and binds both to a task
/// whose origin and destination are the crane's node.  Quay cranes get
/// `LOAD_TO_SHIP` or `UNLOAD_FROM_SHIP`, yard cranes `YARD_TO_YARD`.  The
/// container weight fits the truck and the crane.
pub struct RandomTaskGenerator {
    rng:       SimRng,
    prefix:    String,
    generated: u64,
}

impl RandomTaskGenerator {
    pub fn new(seed: u64) -> Self {
        Self::from_rng(SimRng::new(seed))
    }

    pub fn from_rng(rng: SimRng) -> Self {
        Self { rng, prefix: "GEN".into(), generated: 0 }
    }

    /// Prefix of generated ids, `GEN` by default.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn generated(&self) -> u64 {
        self.generated
    }
}

fn works_at(crane: &Entity, map: &YardMap) -> bool {
    match (crane.kind, map.node_type(&crane.position)) {
        (EquipmentKind::Qc, Some(NodeType::Quay)) => true,
        (EquipmentKind::Yc, Some(NodeType::Bay))  => true,
        _ => false,
    }
}

impl TaskGenerator for RandomTaskGenerator {
    fn generate(&mut self, now: SimTime, ctx: &GeneratorContext<'_>) -> Option<Instruction> {
        let cranes: Vec<&Entity> = ctx
            .entities
            .iter()
            .filter(|e| e.kind.is_crane() && works_at(e, ctx.map))
            .collect();
        let trucks: Vec<&Entity> = ctx
            .entities
            .iter()
            .filter(|e| e.kind == EquipmentKind::It)
            .collect();

        let crane = *self.rng.choose(&cranes)?;
        let truck = *self.rng.choose(&trucks)?;

        let kind = match crane.kind {
            EquipmentKind::Qc if self.rng.gen_bool(0.5) => InstructionKind::LoadToShip,
            EquipmentKind::Qc => InstructionKind::UnloadFromShip,
            _ => InstructionKind::YardToYard,
        };

        let max_weight = crane.capacity_t().min(truck.capacity_t());
        let weight = if max_weight > 5.0 {
            (self.rng.gen_range(5.0..=max_weight) * 10.0).floor() / 10.0
        } else {
            max_weight.max(0.0)
        };

        self.generated += 1;
        let id = format!("{}{:05}", self.prefix, self.generated);
        let instruction = Instruction::new(id.clone(), kind, crane.position.clone(), crane.position.clone())
            .with_target(crane.kind, crane.id.clone())
            .with_target(EquipmentKind::It, truck.id.clone())
            .with_container(format!("CONT{:07}", self.generated), weight)
            .with_priority(self.rng.gen_range(0..=3))
            .generated_at(now);
        tracing::debug!(instruction = %id, crane = %crane.id, truck = %truck.id, "task generated");
        Some(instruction)
    }
}
