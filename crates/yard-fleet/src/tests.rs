//! Unit tests for yard-fleet.

#[cfg(test)]
mod helpers {
    use yard_topology::{NodeType, YardMap, YardMapBuilder};

    /// `Q1 ─S1─ R1 ─S2─ B1`, plus a parking node `P1` off `R1`.
    pub fn small_map() -> YardMap {
        let mut b = YardMapBuilder::new("fleet-test");
        b.add_node("Q1", NodeType::Quay, 0.0, 0.0);
        b.add_node("R1", NodeType::Road, 50.0, 0.0);
        b.add_node("B1", NodeType::Bay, 100.0, 0.0);
        b.add_node("P1", NodeType::Parking, 50.0, 20.0);
        b.add_segment("S1", "Q1", "R1", 50.0);
        b.add_segment("S2", "R1", "B1", 50.0);
        b.add_segment("S3", "R1", "P1", 20.0);
        b.build().unwrap()
    }
}

// ── Entity state ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod entity {
    use yard_core::{EquipmentKind, InstructionId, KinematicProfile};

    use crate::{Entity, EntityStatus, EquipmentSpec, FleetError, ProfileTable};

    #[test]
    fn starts_idle_and_consistent() {
        let e = Entity::with_defaults("IT01", EquipmentKind::It, "P1");
        assert!(e.is_idle());
        assert!(e.current_instruction().is_none());
        assert!(e.is_consistent());
        assert_eq!(e.kind, EquipmentKind::It);
        assert_eq!(e.capacity_t(), 60.0);
    }

    #[test]
    fn begin_and_release() {
        let mut e = Entity::with_defaults("QC01", EquipmentKind::Qc, "Q1");
        let id = InstructionId::from("I1");
        e.begin(id.clone(), EntityStatus::Moving);
        assert_eq!(e.status(), EntityStatus::Moving);
        assert!(e.holds(&id));
        assert!(e.is_consistent());

        e.set_status(EntityStatus::Executing);
        assert_eq!(e.status(), EntityStatus::Executing);

        assert_eq!(e.release(), Some(id));
        assert!(e.is_idle());
        assert!(e.is_consistent());
    }

    #[test]
    fn begin_idle_releases() {
        let mut e = Entity::with_defaults("YC01", EquipmentKind::Yc, "B1");
        e.begin("I1".into(), EntityStatus::Waiting);
        e.begin("I2".into(), EntityStatus::Idle);
        assert!(e.is_idle());
        assert!(e.current_instruction().is_none());
    }

    #[test]
    fn set_status_without_instruction_is_ignored() {
        let mut e = Entity::with_defaults("IT01", EquipmentKind::It, "P1");
        e.set_status(EntityStatus::Moving);
        assert!(e.is_idle());
        assert!(e.is_consistent());
    }

    #[test]
    fn over_capacity_keeps_previous_load() {
        let mut e = Entity::with_defaults("IT01", EquipmentKind::It, "P1");
        e.set_load(30.0).unwrap();
        match e.set_load(61.0) {
            Err(FleetError::OverCapacity { load, capacity, .. }) => {
                assert_eq!(load, 61.0);
                assert_eq!(capacity, 60.0);
            }
            other => panic!("expected OverCapacity, got {other:?}"),
        }
        assert_eq!(e.load_t(), 30.0);
        e.unload();
        assert_eq!(e.load_t(), 0.0);
    }

    #[test]
    fn profile_table_overrides() {
        let mut table = ProfileTable::new();
        table.set(EquipmentKind::It, KinematicProfile::new(5.0, 1.0, 1.0));
        let it = Entity::from_table("IT01", EquipmentKind::It, "P1", &table);
        let qc = Entity::from_table("QC01", EquipmentKind::Qc, "Q1", &table);
        assert_eq!(it.profile.max_speed, 5.0);
        assert_eq!(qc.profile, KinematicProfile::default_for(EquipmentKind::Qc));
    }

    #[test]
    fn spec_kind_matches() {
        for kind in EquipmentKind::ALL {
            assert_eq!(EquipmentSpec::default_for(kind).kind(), kind);
        }
    }
}

// ── Instructions ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod instruction {
    use yard_core::EquipmentKind;

    use crate::{Instruction, InstructionKind, InstructionStatus};

    fn unload() -> Instruction {
        Instruction::new("I1", InstructionKind::UnloadFromShip, "Q1", "B1")
            .with_target(EquipmentKind::Qc, "QC01")
            .with_target(EquipmentKind::It, "IT01")
            .with_container("MSCU1234567", 24.5)
            .with_priority(3)
            .with_param("liftHeight", 28.0)
    }

    #[test]
    fn bound_kinds_in_order() {
        let i = unload();
        let kinds: Vec<_> = i.bound_kinds().collect();
        assert_eq!(kinds, vec![EquipmentKind::Qc, EquipmentKind::It]);
        assert!(i.is_bound_to(EquipmentKind::Qc, &"QC01".into()));
        assert!(!i.is_bound_to(EquipmentKind::Yc, &"QC01".into()));
    }

    #[test]
    fn status_only_moves_forward() {
        let mut i = unload();
        assert_eq!(i.status(), InstructionStatus::Pending);
        assert!(i.advance(InstructionStatus::Assigned));
        assert!(i.advance(InstructionStatus::InProgress));
        assert!(!i.advance(InstructionStatus::Assigned));
        assert_eq!(i.status(), InstructionStatus::InProgress);
        assert!(i.advance(InstructionStatus::Completed));
        // Completing twice is harmless.
        assert!(i.advance(InstructionStatus::Completed));
        assert!(i.is_completed());
    }

    #[test]
    fn parameters() {
        let i = unload();
        assert_eq!(i.param_f64("liftHeight"), Some(28.0));
        assert_eq!(i.param_f64("targetTier"), None);
        assert_eq!(i.container_weight_t, Some(24.5));
    }

    #[test]
    fn solo_kinds() {
        assert!(InstructionKind::Wait.is_solo());
        assert!(InstructionKind::Move.is_solo());
        assert!(!InstructionKind::YardToYard.is_solo());
    }
}

// ── Stores ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod store {
    use yard_core::EquipmentKind;

    use crate::{Entity, EntityStore, FleetError, Instruction, InstructionBook, InstructionKind, InstructionStatus};

    #[test]
    fn entity_store_by_kind() {
        let mut store = EntityStore::new();
        store.insert(Entity::with_defaults("IT02", EquipmentKind::It, "P1")).unwrap();
        store.insert(Entity::with_defaults("QC01", EquipmentKind::Qc, "Q1")).unwrap();
        store.insert(Entity::with_defaults("IT01", EquipmentKind::It, "P1")).unwrap();

        let its = store.ids_of_kind(EquipmentKind::It);
        assert_eq!(its.iter().map(|i| i.as_str()).collect::<Vec<_>>(), vec!["IT01", "IT02"]);
        assert_eq!(store.count_of_kind(EquipmentKind::Qc), 1);
        assert!(store.get_kind(&"QC01".into(), EquipmentKind::It).is_none());
        assert!(store.get_kind(&"QC01".into(), EquipmentKind::Qc).is_some());
    }

    #[test]
    fn duplicate_entity_rejected() {
        let mut store = EntityStore::new();
        store.insert(Entity::with_defaults("IT01", EquipmentKind::It, "P1")).unwrap();
        let err = store.insert(Entity::with_defaults("IT01", EquipmentKind::It, "P1"));
        assert!(matches!(err, Err(FleetError::DuplicateEntity(_))));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn instruction_book_counts_completed() {
        let mut book = InstructionBook::new();
        book.insert(Instruction::new("I1", InstructionKind::Move, "Q1", "B1")).unwrap();
        book.insert(Instruction::new("I2", InstructionKind::Move, "Q1", "B1")).unwrap();
        assert!(matches!(
            book.insert(Instruction::new("I1", InstructionKind::Wait, "Q1", "Q1")),
            Err(FleetError::DuplicateInstruction(_))
        ));
        book.get_mut(&"I2".into()).unwrap().advance(InstructionStatus::Completed);
        assert_eq!(book.completed_count(), 1);
    }
}

// ── Loaders ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use yard_core::EquipmentKind;

    use crate::{load_entities_reader, load_tasks_reader, EquipmentSpec, FleetError, InstructionKind};

    #[test]
    fn loads_entities() {
        let map = super::helpers::small_map();
        let json = r#"[
            { "id": "QC01", "type": "QC", "initialPosition": "Q1",
              "parameters": { "maxSpeed": 0.75, "acceleration": 0.3, "deceleration": 0.3,
                              "liftWeight": 65, "spreaderWidth": 40 } },
            { "id": "YC01", "type": "YC", "initialPosition": "B1",
              "parameters": { "maxSpeed": 2.0, "acceleration": 0.4, "deceleration": 0.5,
                              "liftWeight": 40, "gantrySpeed": 2.0 } },
            { "id": "IT01", "type": "IT", "initialPosition": "P1",
              "parameters": { "maxSpeed": 6.0, "acceleration": 0.8, "deceleration": 1.2,
                              "loadWeight": 60 } }
        ]"#;
        let entities = load_entities_reader(json.as_bytes(), &map).unwrap();
        assert_eq!(entities.len(), 3);
        assert_eq!(entities[0].kind, EquipmentKind::Qc);
        assert_eq!(entities[1].spec, EquipmentSpec::Yc { lift_weight_t: 40.0, gantry_speed: 2.0 });
        assert_eq!(entities[2].profile.deceleration, 1.2);
        assert!(entities.iter().all(|e| e.is_idle()));
    }

    #[test]
    fn missing_parameter() {
        let map = super::helpers::small_map();
        let json = r#"[{ "id": "IT01", "type": "IT", "initialPosition": "P1",
                         "parameters": { "maxSpeed": 6.0, "acceleration": 0.8, "deceleration": 1.2 } }]"#;
        match load_entities_reader(json.as_bytes(), &map) {
            Err(FleetError::MissingParameter { entity, name }) => {
                assert_eq!(entity, "IT01");
                assert_eq!(name, "loadWeight");
            }
            other => panic!("expected MissingParameter, got {other:?}"),
        }
    }

    #[test]
    fn unknown_kind_and_position() {
        let map = super::helpers::small_map();
        let bad_kind = r#"[{ "id": "X", "type": "RTG", "initialPosition": "P1", "parameters": {} }]"#;
        assert!(matches!(
            load_entities_reader(bad_kind.as_bytes(), &map),
            Err(FleetError::UnknownKind(k)) if k == "RTG"
        ));

        let bad_pos = r#"[{ "id": "IT01", "type": "IT", "initialPosition": "NOWHERE",
                            "parameters": { "maxSpeed": 6.0, "acceleration": 0.8,
                                            "deceleration": 1.2, "loadWeight": 60 } }]"#;
        assert!(matches!(
            load_entities_reader(bad_pos.as_bytes(), &map),
            Err(FleetError::UnknownNode { .. })
        ));
    }

    #[test]
    fn negative_speed_rejected() {
        let map = super::helpers::small_map();
        let json = r#"[{ "id": "IT01", "type": "IT", "initialPosition": "P1",
                         "parameters": { "maxSpeed": -1.0, "acceleration": 0.8,
                                         "deceleration": 1.2, "loadWeight": 60 } }]"#;
        assert!(matches!(
            load_entities_reader(json.as_bytes(), &map),
            Err(FleetError::InvalidProfile(_))
        ));
    }

    #[test]
    fn loads_tasks() {
        let map = super::helpers::small_map();
        let json = r#"[
            { "id": "I1", "type": "UNLOAD_FROM_SHIP", "origin": "Q1", "destination": "B1",
              "containerId": "MSCU1234567", "containerWeight": 24.5,
              "targetQC": "QC01", "targetIT": "IT01", "priority": 5,
              "generateTime": 1000, "parameters": { "liftHeight": 28 } },
            { "id": "W1", "type": "WAIT", "origin": "P1", "destination": "P1" }
        ]"#;
        let tasks = load_tasks_reader(json.as_bytes(), &map).unwrap();
        assert_eq!(tasks.len(), 2);
        let i1 = &tasks[0];
        assert_eq!(i1.kind, InstructionKind::UnloadFromShip);
        assert_eq!(i1.target(EquipmentKind::Qc).map(|e| e.as_str()), Some("QC01"));
        assert_eq!(i1.target(EquipmentKind::Yc), None);
        assert_eq!(i1.priority, 5);
        assert_eq!(i1.generate_time.as_millis(), 1000);
        assert_eq!(i1.param_f64("liftHeight"), Some(28.0));
        assert_eq!(tasks[1].priority, 0);
    }

    #[test]
    fn task_with_unknown_node() {
        let map = super::helpers::small_map();
        let json = r#"[{ "id": "I1", "type": "MOVE", "origin": "Q1", "destination": "Z9" }]"#;
        match load_tasks_reader(json.as_bytes(), &map) {
            Err(FleetError::UnknownNode { what, id, node }) => {
                assert_eq!(what, "instruction");
                assert_eq!(id, "I1");
                assert_eq!(node.as_str(), "Z9");
            }
            other => panic!("expected UnknownNode, got {other:?}"),
        }
    }
}
