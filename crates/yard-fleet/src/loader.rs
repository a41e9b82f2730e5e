//! JSON loaders for the entity and task files.
//!
//! # Entity file
//!
//! ```json
//! [
//!   { "id": "QC01", "type": "QC", "initialPosition": "Q1",
//!     "parameters": { "maxSpeed": 0.75, "acceleration": 0.3, "deceleration": 0.3,
//!                     "liftWeight": 65, "spreaderWidth": 40 } },
//!   { "id": "IT01", "type": "IT", "initialPosition": "P1",
//!     "parameters": { "maxSpeed": 6.0, "acceleration": 0.8, "deceleration": 1.2,
//!                     "loadWeight": 60 } }
//! ]
//! ```
//!
//! Kinematic parameters and the kind-specific ones (`liftWeight` +
//! `spreaderWidth` for QC, `liftWeight` + `gantrySpeed` for YC, `loadWeight`
//! for IT) are required.
//!
//! # Task file
//!
//! ```json
//! [
//!   { "id": "I1", "type": "UNLOAD_FROM_SHIP", "origin": "Q1", "destination": "Q1",
//!     "containerId": "MSCU1234567", "containerWeight": 24.5,
//!     "targetQC": "QC01", "targetIT": "IT01", "priority": 5,
//!     "generateTime": 0, "parameters": { "liftHeight": 28 } }
//! ]
//! ```
//!
//! Every node reference must resolve on the map.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use yard_core::{EntityId, EquipmentKind, KinematicProfile, NodeId, SimTime};
use yard_topology::YardMap;

use crate::{Entity, EquipmentSpec, FleetError, FleetResult, Instruction, InstructionKind};

// ── JSON records ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityRecord {
    id:               String,
    #[serde(rename = "type")]
    kind:             String,
    initial_position: String,
    #[serde(default)]
    parameters:       BTreeMap<String, f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    id:                String,
    #[serde(rename = "type")]
    kind:              InstructionKind,
    origin:            String,
    destination:       String,
    #[serde(default)]
    container_id:      Option<String>,
    #[serde(default)]
    container_weight:  Option<f64>,
    #[serde(default, rename = "targetQC")]
    target_qc:         Option<String>,
    #[serde(default, rename = "targetYC")]
    target_yc:         Option<String>,
    #[serde(default, rename = "targetIT")]
    target_it:         Option<String>,
    #[serde(default)]
    priority:          i32,
    #[serde(default)]
    generate_time:     u64,
    #[serde(default)]
    expected_duration: Option<u64>,
    #[serde(default)]
    parameters:        BTreeMap<String, serde_json::Value>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load entities from a JSON file, checking positions against `map`.
pub fn load_entities_json(path: &Path, map: &YardMap) -> FleetResult<Vec<Entity>> {
    let file = std::fs::File::open(path)?;
    load_entities_reader(std::io::BufReader::new(file), map)
}

/// Like [`load_entities_json`] but accepts any `Read` source.
pub fn load_entities_reader<R: Read>(reader: R, map: &YardMap) -> FleetResult<Vec<Entity>> {
    let records: Vec<EntityRecord> = serde_json::from_reader(reader)?;
    let entities = records
        .into_iter()
        .map(|r| entity_from_record(r, map))
        .collect::<FleetResult<Vec<_>>>()?;
    tracing::info!(count = entities.len(), "entities loaded");
    Ok(entities)
}

/// Load instructions from a JSON file, checking node references against `map`.
pub fn load_tasks_json(path: &Path, map: &YardMap) -> FleetResult<Vec<Instruction>> {
    let file = std::fs::File::open(path)?;
    load_tasks_reader(std::io::BufReader::new(file), map)
}

/// Like [`load_tasks_json`] but accepts any `Read` source.
pub fn load_tasks_reader<R: Read>(reader: R, map: &YardMap) -> FleetResult<Vec<Instruction>> {
    let records: Vec<TaskRecord> = serde_json::from_reader(reader)?;
    let tasks = records
        .into_iter()
        .map(|r| instruction_from_record(r, map))
        .collect::<FleetResult<Vec<_>>>()?;
    tracing::info!(count = tasks.len(), "tasks loaded");
    Ok(tasks)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_kind(s: &str) -> FleetResult<EquipmentKind> {
    match s {
        "QC" => Ok(EquipmentKind::Qc),
        "YC" => Ok(EquipmentKind::Yc),
        "IT" => Ok(EquipmentKind::It),
        other => Err(FleetError::UnknownKind(other.to_owned())),
    }
}

fn known_node(map: &YardMap, what: &'static str, id: &str, node: String) -> FleetResult<NodeId> {
    let node = NodeId::from(node);
    if !map.contains_node(&node) {
        return Err(FleetError::UnknownNode { what, id: id.to_owned(), node });
    }
    Ok(node)
}

fn entity_from_record(r: EntityRecord, map: &YardMap) -> FleetResult<Entity> {
    let kind = parse_kind(&r.kind)?;
    let param = |name: &'static str| {
        r.parameters
            .get(name)
            .copied()
            .ok_or_else(|| FleetError::MissingParameter { entity: r.id.clone(), name })
    };

    let profile = KinematicProfile::new(
        param("maxSpeed")?,
        param("acceleration")?,
        param("deceleration")?,
    );
    let spec = match kind {
        EquipmentKind::Qc => EquipmentSpec::Qc {
            lift_weight_t:     param("liftWeight")?,
            spreader_width_ft: param("spreaderWidth")?,
        },
        EquipmentKind::Yc => EquipmentSpec::Yc {
            lift_weight_t: param("liftWeight")?,
            gantry_speed:  param("gantrySpeed")?,
        },
        EquipmentKind::It => EquipmentSpec::It { load_weight_t: param("loadWeight")? },
    };

    let position = known_node(map, "entity", &r.id, r.initial_position.clone())?;
    let entity = Entity::new(EntityId::from(r.id), position, profile, spec);
    if !entity.profile.is_valid() {
        return Err(FleetError::InvalidProfile(entity.id));
    }
    Ok(entity)
}

fn instruction_from_record(r: TaskRecord, map: &YardMap) -> FleetResult<Instruction> {
    let origin      = known_node(map, "instruction", &r.id, r.origin)?;
    let destination = known_node(map, "instruction", &r.id, r.destination)?;

    let mut instr = Instruction::new(r.id, r.kind, origin, destination)
        .with_priority(r.priority)
        .generated_at(SimTime(r.generate_time));
    instr.container_id         = r.container_id;
    instr.container_weight_t   = r.container_weight;
    instr.target_qc            = r.target_qc.map(EntityId::from);
    instr.target_yc            = r.target_yc.map(EntityId::from);
    instr.target_it            = r.target_it.map(EntityId::from);
    instr.expected_duration_ms = r.expected_duration;
    instr.parameters           = r.parameters;
    Ok(instr)
}
