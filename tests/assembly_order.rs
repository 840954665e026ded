//! Model assembly: command ordering, diaphragm membership, and hinge wiring.

mod common;

use common::{Command, RecordingEngine};
use nlrha::assembler::ModelAssembler;
use nlrha::config::RunConfig;
use nlrha::hinges::{HingeCapacityRow, HingeCapacityTable};
use nlrha::model::{Frame, Joint, JointLoad, JointTag, NodalMass, SectionProperties};
use nlrha::source::{SnapshotSource, StructureData};

fn section(name: &str) -> SectionProperties {
    SectionProperties {
        name: name.to_string(),
        area: 26.5,
        as2: 10.0,
        as3: 14.0,
        torsion: 4.06,
        i22: 362.0,
        i33: 999.0,
        i33_modifier: 1.0,
    }
}

fn hinge_table() -> HingeCapacityTable {
    HingeCapacityTable::new(vec![HingeCapacityRow {
        name: "W18X35".to_string(),
        fy: 2_900.0,
        fu: 3_800.0,
        dl: 0.04,
        dr: 0.07,
        fr_over_fu: 0.4,
    }])
}

/// Two-column, one-bay frame with one beam hinge. Joints 1 and 2 are fixed
/// base supports; the floor at z = 144 holds joints 3, 4, 5 plus the dummy
/// N5 flagging a hinge at joint 5.
fn snapshot() -> SnapshotSource {
    let mut base_1 = Joint::new(JointTag::Numeric(1), 0.0, 0.0, 0.0);
    base_1.restraints = [true; 6];
    let mut base_2 = Joint::new(JointTag::Numeric(2), 288.0, 0.0, 0.0);
    base_2.restraints = [true; 6];

    SnapshotSource {
        joints: vec![
            base_1,
            base_2,
            Joint::new(JointTag::Numeric(3), 0.0, 0.0, 144.0),
            Joint::new(JointTag::Numeric(4), 144.0, 0.0, 144.0),
            Joint::new(JointTag::Numeric(5), 288.0, 0.0, 144.0),
            Joint::new(JointTag::parse("N5"), 288.0, 24.0, 144.0),
        ],
        frames: vec![
            Frame::new(101, "W14X90", JointTag::Numeric(1), JointTag::Numeric(3))
                .with_label("C1"),
            Frame::new(102, "W14X90", JointTag::Numeric(2), JointTag::Numeric(5))
                .with_label("C2"),
            Frame::new(103, "W18X35", JointTag::Numeric(3), JointTag::Numeric(4))
                .with_label("B1"),
            Frame::new(104, "W18X35", JointTag::Numeric(4), JointTag::parse("N5"))
                .with_label("B2"),
        ],
        masses: vec![NodalMass::translational(4, 0.5)],
        sections: vec![section("W14X90"), section("W18X35")],
        loads: vec![JointLoad {
            joint: 4,
            pattern: "Dead".to_string(),
            components: [0.0, 0.0, -12.0, 0.0, 0.0, 0.0],
        }],
        ..Default::default()
    }
}

fn assemble(config: &RunConfig) -> RecordingEngine {
    let data = StructureData::from_source(&snapshot(), config).unwrap();
    let mut engine = RecordingEngine::new();
    ModelAssembler::new(config)
        .assemble(&mut engine, &data, &hinge_table())
        .unwrap();
    engine
}

#[test]
fn test_command_dependency_order() {
    let engine = assemble(&RunConfig::default());

    let wipe = engine.position(|c| matches!(c, Command::Wipe));
    let init = engine.position(|c| matches!(c, Command::InitModel(3)));
    let first_node = engine.position(|c| matches!(c, Command::AddNode(_)));
    let handler = engine.position(|c| matches!(c, Command::SetConstraintHandler(_)));
    let diaphragm = engine.position(|c| matches!(c, Command::RigidDiaphragm { .. }));
    let mass = engine.position(|c| matches!(c, Command::AssignMass(..)));
    let transform = engine.position(|c| matches!(c, Command::GeomTransform { .. }));
    let beam = engine.position(|c| matches!(c, Command::AddElasticBeam(_)));
    let material = engine.position(|c| matches!(c, Command::AddDeterioratingMaterial(..)));
    let zero_length = engine.position(|c| matches!(c, Command::AddZeroLength { .. }));
    let equal_dof = engine.position(|c| matches!(c, Command::EqualDof { .. }));

    assert!(wipe < init);
    assert!(init < first_node);
    assert!(first_node < handler);
    assert!(handler < diaphragm);
    assert!(diaphragm < mass);
    assert!(mass < transform);
    assert!(transform < beam);
    assert!(beam < material);
    assert!(material < zero_length);
    assert!(zero_length < equal_dof);
}

#[test]
fn test_diaphragm_excludes_synthetic_and_hinged_joints() {
    let engine = assemble(&RunConfig::default());

    let diaphragms: Vec<&Command> = engine
        .commands
        .iter()
        .filter(|c| matches!(c, Command::RigidDiaphragm { .. }))
        .collect();
    assert_eq!(diaphragms.len(), 1);

    // Joint 5 received a hinge and joint 105 is its synthetic twin; only 3
    // and 4 join the floor constraint, with 3 as master.
    match diaphragms[0] {
        Command::RigidDiaphragm {
            perpendicular_dof,
            master,
            slaves,
        } => {
            assert_eq!(*perpendicular_dof, 3);
            assert_eq!(*master, 3);
            assert_eq!(slaves, &vec![4]);
        }
        _ => unreachable!(),
    }
}

#[test]
fn test_diaphragm_can_be_disabled() {
    let engine = assemble(&RunConfig::default().with_rigid_diaphragm(false));
    assert!(engine
        .positions(|c| matches!(c, Command::RigidDiaphragm { .. }))
        .is_empty());
}

#[test]
fn test_hinge_material_element_and_coupling() {
    let engine = assemble(&RunConfig::default());

    // Max numeric id 5: joint offset 100, element offset 200
    assert!(engine
        .commands
        .contains(&Command::AddDeterioratingMaterial(
            205,
            hinge_table().params_for("W18X35").unwrap(),
        )));

    let zero_length = engine
        .commands
        .iter()
        .find(|c| matches!(c, Command::AddZeroLength { .. }))
        .unwrap();
    match zero_length {
        Command::AddZeroLength {
            tag,
            node_i,
            node_j,
            material,
            dof,
        } => {
            assert_eq!(*tag, 205);
            assert_eq!(*node_i, 5);
            assert_eq!(*node_j, 105);
            assert_eq!(*material, 205);
            // Dummy N5 shares joint 5's X coordinate: hinge about X
            assert_eq!(*dof, 4);
        }
        _ => unreachable!(),
    }

    assert!(engine.commands.contains(&Command::EqualDof {
        retained: 5,
        constrained: 105,
        dofs: vec![1, 2, 3, 5, 6],
    }));
    assert!(engine
        .commands
        .contains(&Command::DefineRegion(5, vec![205])));
}

#[test]
fn test_column_and_beam_transform_tags() {
    let engine = assemble(&RunConfig::default());

    for command in &engine.commands {
        if let Command::AddElasticBeam(spec) = command {
            match spec.tag {
                101 | 102 => assert_eq!(spec.transform_tag, 1, "columns use the column transform"),
                103 | 104 => assert_eq!(spec.transform_tag, 2, "beams use the beam transform"),
                other => panic!("unexpected beam tag {other}"),
            }
            assert_eq!(spec.elastic_modulus, 29_000.0);
        }
    }
    assert_eq!(
        engine
            .positions(|c| matches!(c, Command::AddElasticBeam(_)))
            .len(),
        4
    );
}

#[test]
fn test_restraints_are_applied_per_joint() {
    let engine = assemble(&RunConfig::default());
    assert!(engine.commands.contains(&Command::Fix(1, [true; 6])));
    assert!(engine.commands.contains(&Command::Fix(2, [true; 6])));
    assert!(engine.commands.contains(&Command::Fix(4, [false; 6])));
}

#[test]
fn test_gravity_loads_are_opt_in() {
    let without = assemble(&RunConfig::default());
    assert!(without
        .positions(|c| matches!(c, Command::AddLoad(..)))
        .is_empty());

    let with = assemble(&RunConfig::default().with_gravity_loads());
    let pattern = with.position(|c| matches!(c, Command::AddPlainPattern(..)));
    let load = with.position(|c| matches!(c, Command::AddLoad(..)));
    assert!(pattern < load);
    assert!(with
        .commands
        .contains(&Command::AddLoad(4, [0.0, 0.0, -12.0, 0.0, 0.0, 0.0])));
}

#[test]
fn test_auto_master_restraint_override() {
    let mut snap = snapshot();
    let mut master = Joint::new(JointTag::Numeric(90), 144.0, 0.0, 144.0);
    master.auto_master = true;
    snap.joints.push(master);

    let config = RunConfig::default();
    let data = StructureData::from_source(&snap, &config).unwrap();
    let mut engine = RecordingEngine::new();
    ModelAssembler::new(&config)
        .assemble(&mut engine, &data, &hinge_table())
        .unwrap();

    // Out-of-plane DOFs locked, in-plane movement left free
    assert!(engine.commands.contains(&Command::Fix(
        90,
        [false, false, true, true, true, false],
    )));
}

#[test]
fn test_unknown_hinge_section_fails_assembly() {
    let config = RunConfig::default();
    let data = StructureData::from_source(&snapshot(), &config).unwrap();
    let mut engine = RecordingEngine::new();
    let empty_table = HingeCapacityTable::new(vec![]);
    let result = ModelAssembler::new(&config).assemble(&mut engine, &data, &empty_table);
    assert!(result.is_err());
}

#[test]
fn test_assembly_leaves_solution_strategy_untouched() {
    let engine = assemble(&RunConfig::default());
    assert!(engine
        .positions(|c| matches!(c, Command::SetAlgorithm(_)))
        .is_empty());
    assert!(engine
        .positions(|c| matches!(c, Command::SetIntegrator(_)))
        .is_empty());
}
