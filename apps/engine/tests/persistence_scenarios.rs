use std::collections::BTreeMap;

use hexsim_engine::{Simulation, TopologyType, Value, WorldConfig};
use hexsim_error::SimError;
use hexsim_persistence::{compute_save_hash, read_save, LoadedSave, SavePayload};

fn tmp_path(label: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("hexsim-engine-test-{label}-{:?}", std::thread::current().id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(format!("{label}.save"))
}

fn hex_disk(seed: u64, radius: i64) -> Simulation {
    let params = Value::Object(BTreeMap::from([("radius".to_string(), Value::Int(radius))]));
    Simulation::new_with_seed_and_topology(seed, TopologyType::HexAxial, params).unwrap()
}

/// Scenario 4: build any simulation, save twice (directly, and via an
/// intermediate load), and the two files are byte-identical.
#[test]
fn save_then_reload_then_resave_is_byte_identical() {
    let mut sim = hex_disk(21, 3);
    sim.append_command(0, None, "narrative_beat", Value::Int(1));
    sim.advance_ticks(9).unwrap();

    let path_a = tmp_path("roundtrip-a");
    let path_b = tmp_path("roundtrip-b");
    sim.save_game(&path_a, Value::object()).unwrap();

    let reloaded = Simulation::load_game(&path_a, WorldConfig::default()).unwrap();
    reloaded.save_game(&path_b, Value::object()).unwrap();

    let bytes_a = std::fs::read(&path_a).unwrap();
    let bytes_b = std::fs::read(&path_b).unwrap();
    assert_eq!(bytes_a, bytes_b);

    let _ = std::fs::remove_file(&path_a);
    let _ = std::fs::remove_file(&path_b);
}

/// Scenario 5: flipping a byte inside `world_state` without updating
/// `save_hash` must fail the load with `HashMismatch` and produce no
/// simulation, exercised end to end through `Simulation::load_game`.
#[test]
fn tampering_with_world_state_fails_load_with_hash_mismatch() {
    let mut sim = hex_disk(22, 2);
    sim.advance_ticks(3).unwrap();

    let path = tmp_path("tamper");
    sim.save_game(&path, Value::object()).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let tampered = raw.replacen("\"overworld\"", "\"overwormd\"", 1);
    assert_ne!(raw, tampered, "fixture did not contain the expected substring to tamper");
    std::fs::write(&path, tampered).unwrap();

    let err = Simulation::load_game(&path, WorldConfig::default()).unwrap_err();
    assert!(matches!(err, SimError::HashMismatch { .. }));

    let _ = std::fs::remove_file(&path);
}

/// A dangling `entity.space_id` in a save's `world_state` must reject the
/// load outright with a structural `InvariantViolation`, the same check
/// `World::validate` already runs on a live simulation — a save can't skip
/// it just because it was deserialized instead of ticked.
#[test]
fn loading_a_save_with_a_dangling_entity_space_fails_structural_validation() {
    let mut world = hexsim_world::World::genesis(
        hexsim_world::TopologyType::HexAxial,
        Value::Object(BTreeMap::from([("radius".to_string(), Value::Int(1))])),
    )
    .unwrap();
    world.add_entity(hexsim_world::Entity::new("ghost", "nowhere", (0.0, 0.0)));
    let world_state = world.to_value();
    let simulation_state = Value::object();
    let save_hash = compute_save_hash(&world_state, &simulation_state, &Value::Array(vec![]));
    let envelope = Value::Object(BTreeMap::from([
        ("schema_version".to_string(), Value::Int(1)),
        ("save_hash".to_string(), Value::String(save_hash)),
        ("world_state".to_string(), world_state),
        ("simulation_state".to_string(), simulation_state),
    ]));

    let path = tmp_path("dangling-space");
    std::fs::write(&path, hexsim_codec::canonical_encode(&envelope)).unwrap();

    let err = Simulation::load_game(&path, WorldConfig::default()).unwrap_err();
    assert!(matches!(err, SimError::InvariantViolation { .. }));

    let _ = std::fs::remove_file(&path);
}

/// Bounded ledgers: `World::signals` (cap = `MAX_SIGNALS` = 128) keeps
/// exactly the last 128 entries in FIFO order after 131 pushes, and that
/// eviction is visible through the same `world_state` a save/load sees.
#[test]
fn world_signal_ledger_keeps_exactly_the_last_cap_entries() {
    let mut world = hexsim_world::World::genesis(
        hexsim_world::TopologyType::HexAxial,
        Value::Object(BTreeMap::from([("radius".to_string(), Value::Int(1))])),
    )
    .unwrap();
    for i in 0..131i64 {
        world.signals.push(Value::Int(i));
    }
    let kept: Vec<i64> = world.signals.iter().filter_map(Value::as_i64).collect();
    assert_eq!(kept, (3..131).collect::<Vec<_>>());
}

/// Absent-vs-empty parity: a save envelope that omits `metadata`/`input_log`
/// entirely and one that supplies them as explicit empty values produce the
/// same loaded payload (and therefore the same `simulation_hash`), since
/// `read_save` treats "missing" and "empty" as the same default.
#[test]
fn omitted_optional_fields_match_explicit_empty_values() {
    let world_state = Value::Object(BTreeMap::from([("spaces".to_string(), Value::object())]));
    let simulation_state = Value::Object(BTreeMap::from([("time".to_string(), Value::Int(0))]));
    let save_hash = compute_save_hash(&world_state, &simulation_state, &Value::Array(vec![]));

    let minimal = Value::Object(BTreeMap::from([
        ("schema_version".to_string(), Value::Int(1)),
        ("save_hash".to_string(), Value::String(save_hash.clone())),
        ("world_state".to_string(), world_state.clone()),
        ("simulation_state".to_string(), simulation_state.clone()),
    ]));
    let explicit = Value::Object(BTreeMap::from([
        ("schema_version".to_string(), Value::Int(1)),
        ("save_hash".to_string(), Value::String(save_hash)),
        ("world_state".to_string(), world_state),
        ("simulation_state".to_string(), simulation_state),
        ("input_log".to_string(), Value::Array(vec![])),
        ("metadata".to_string(), Value::object()),
    ]));

    let path_minimal = tmp_path("absent-vs-empty-minimal");
    let path_explicit = tmp_path("absent-vs-empty-explicit");
    std::fs::write(&path_minimal, hexsim_codec::canonical_encode(&minimal)).unwrap();
    std::fs::write(&path_explicit, hexsim_codec::canonical_encode(&explicit)).unwrap();

    let loaded_minimal = match read_save(&path_minimal).unwrap() {
        LoadedSave::Full(payload) => payload,
        LoadedSave::LegacyWorldTemplate(_) => panic!("expected full schema load"),
    };
    let loaded_explicit = match read_save(&path_explicit).unwrap() {
        LoadedSave::Full(payload) => payload,
        LoadedSave::LegacyWorldTemplate(_) => panic!("expected full schema load"),
    };

    assert_eq!(loaded_minimal, loaded_explicit);
    fn hash_of(payload: &SavePayload) -> String {
        compute_save_hash(&payload.world_state, &payload.simulation_state, &payload.input_log)
    }
    assert_eq!(hash_of(&loaded_minimal), hash_of(&loaded_explicit));

    let _ = std::fs::remove_file(&path_minimal);
    let _ = std::fs::remove_file(&path_explicit);
}
