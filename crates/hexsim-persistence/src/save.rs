use std::collections::BTreeMap;
use std::fs;
use std::io::Write as _;
use std::path::Path;

use hexsim_codec::{canonical_encode, hash, Value};
use hexsim_error::SimError;
use tracing::{info, warn};

pub const SCHEMA_VERSION: i64 = 1;

/// The four fields the save hash is computed over. `metadata` and
/// `save_hash` itself are deliberately excluded.
fn hashed_envelope(world_state: &Value, simulation_state: &Value, input_log: &Value) -> Value {
    Value::Object(BTreeMap::from([
        ("schema_version".to_string(), Value::Int(SCHEMA_VERSION)),
        ("world_state".to_string(), world_state.clone()),
        ("simulation_state".to_string(), simulation_state.clone()),
        ("input_log".to_string(), input_log.clone()),
    ]))
}

pub fn compute_save_hash(world_state: &Value, simulation_state: &Value, input_log: &Value) -> String {
    hash(&hashed_envelope(world_state, simulation_state, input_log))
}

/// A fully-formed save payload ready to write, or just loaded and
/// hash-verified.
#[derive(Debug, Clone, PartialEq)]
pub struct SavePayload {
    pub world_state: Value,
    pub simulation_state: Value,
    pub input_log: Value,
    pub metadata: Value,
}

impl SavePayload {
    pub fn new(world_state: Value, simulation_state: Value, input_log: Value, metadata: Value) -> Self {
        Self { world_state, simulation_state, input_log, metadata }
    }

    fn to_envelope(&self) -> Value {
        let save_hash = compute_save_hash(&self.world_state, &self.simulation_state, &self.input_log);
        Value::Object(BTreeMap::from([
            ("schema_version".to_string(), Value::Int(SCHEMA_VERSION)),
            ("save_hash".to_string(), Value::String(save_hash)),
            ("world_state".to_string(), self.world_state.clone()),
            ("simulation_state".to_string(), self.simulation_state.clone()),
            ("input_log".to_string(), self.input_log.clone()),
            ("metadata".to_string(), self.metadata.clone()),
        ]))
    }
}

/// What [`read_save`] found on disk: either a current-schema payload, or a
/// pre-substrate world-only snapshot kept loadable as a template.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedSave {
    Full(SavePayload),
    LegacyWorldTemplate(Value),
}

/// Atomic write: `path.tmp` in the same directory, write, fsync where the
/// platform supports it, then rename over `path`. A failure at any step
/// leaves the previous `path` untouched.
pub fn write_save(path: &Path, payload: &SavePayload) -> Result<(), SimError> {
    let envelope = payload.to_envelope();
    let bytes = canonical_encode(&envelope);

    let tmp_path = sibling_tmp_path(path);
    let mut file = fs::File::create(&tmp_path).map_err(|e| SimError::Io(e.to_string()))?;
    file.write_all(&bytes).map_err(|e| SimError::Io(e.to_string()))?;
    file.sync_all().map_err(|e| SimError::Io(e.to_string()))?;
    drop(file);

    fs::rename(&tmp_path, path).map_err(|e| SimError::Io(e.to_string()))?;
    info!(path = %path.display(), bytes = bytes.len(), "save written");
    Ok(())
}

fn sibling_tmp_path(path: &Path) -> std::path::PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Reads and hash-verifies a save file. Legacy world-only payloads (no
/// `simulation_state`/`save_hash`) are returned as templates rather than
/// rejected.
pub fn read_save(path: &Path) -> Result<LoadedSave, SimError> {
    let bytes = fs::read(path).map_err(|e| SimError::Io(e.to_string()))?;
    let json: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| SimError::Json(e.to_string()))?;
    let value = Value::from(json);

    let obj = value
        .as_object()
        .ok_or_else(|| SimError::SchemaInvalid("save payload is not a JSON object".to_string()))?;

    let schema_version = obj
        .get("schema_version")
        .and_then(Value::as_i64)
        .ok_or_else(|| SimError::SchemaInvalid("save payload missing integer schema_version".to_string()))?;

    let is_full_schema = obj.contains_key("save_hash") && obj.contains_key("simulation_state");
    if !is_full_schema {
        if obj.contains_key("world_hash") || obj.contains_key("hexes") {
            warn!(path = %path.display(), "loading legacy world-only payload as a template; no Simulation produced");
            return Ok(LoadedSave::LegacyWorldTemplate(value));
        }
        return Err(SimError::SchemaInvalid(
            "save payload is neither a full schema-v1 save nor a recognizable legacy world template".to_string(),
        ));
    }

    if schema_version != SCHEMA_VERSION {
        return Err(SimError::SchemaVersionUnsupported(schema_version as u32));
    }

    let world_state = obj.get("world_state").cloned().unwrap_or_else(Value::object);
    let simulation_state = obj.get("simulation_state").cloned().unwrap_or_else(Value::object);
    let input_log = obj.get("input_log").cloned().unwrap_or_else(|| Value::Array(Vec::new()));
    let metadata = obj.get("metadata").cloned().unwrap_or_else(Value::object);

    let recorded_hash = obj
        .get("save_hash")
        .and_then(Value::as_str)
        .ok_or_else(|| SimError::SchemaInvalid("save payload missing string save_hash".to_string()))?
        .to_string();
    let computed_hash = compute_save_hash(&world_state, &simulation_state, &input_log);
    if computed_hash != recorded_hash {
        return Err(SimError::HashMismatch { expected: recorded_hash, computed: computed_hash });
    }

    info!(path = %path.display(), "save loaded and hash-verified");
    Ok(LoadedSave::Full(SavePayload::new(world_state, simulation_state, input_log, metadata)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn tmp_dir() -> std::path::PathBuf {
        let mut dir = env::temp_dir();
        dir.push(format!("hexsim-persistence-test-{:?}", std::thread::current().id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn sample_payload() -> SavePayload {
        SavePayload::new(
            Value::Object(BTreeMap::from([("spaces".to_string(), Value::object())])),
            Value::Object(BTreeMap::from([("tick".to_string(), Value::Int(5))])),
            Value::Array(vec![]),
            Value::object(),
        )
    }

    #[test]
    fn round_trip_preserves_content_and_verifies_hash() {
        let dir = tmp_dir();
        let path = dir.join("round_trip.save");
        let payload = sample_payload();
        write_save(&path, &payload).unwrap();

        match read_save(&path).unwrap() {
            LoadedSave::Full(loaded) => assert_eq!(loaded, payload),
            LoadedSave::LegacyWorldTemplate(_) => panic!("expected full schema load"),
        }
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn tampered_payload_fails_hash_verification() {
        let dir = tmp_dir();
        let path = dir.join("tampered.save");
        write_save(&path, &sample_payload()).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let tampered = raw.replace("\"tick\":5", "\"tick\":6");
        fs::write(&path, tampered).unwrap();

        let err = read_save(&path).unwrap_err();
        assert!(matches!(err, SimError::HashMismatch { .. }));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn unsupported_schema_version_is_rejected() {
        let dir = tmp_dir();
        let path = dir.join("future_schema.save");
        let envelope = Value::Object(BTreeMap::from([
            ("schema_version".to_string(), Value::Int(99)),
            ("save_hash".to_string(), Value::String("deadbeef".to_string())),
            ("world_state".to_string(), Value::object()),
            ("simulation_state".to_string(), Value::object()),
            ("input_log".to_string(), Value::Array(vec![])),
        ]));
        fs::write(&path, canonical_encode(&envelope)).unwrap();

        let err = read_save(&path).unwrap_err();
        assert!(matches!(err, SimError::SchemaVersionUnsupported(99)));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn legacy_world_only_payload_loads_as_template() {
        let dir = tmp_dir();
        let path = dir.join("legacy.save");
        let envelope = Value::Object(BTreeMap::from([
            ("schema_version".to_string(), Value::Int(1)),
            ("world_hash".to_string(), Value::String("aa".repeat(32))),
            ("hexes".to_string(), Value::Array(vec![])),
        ]));
        fs::write(&path, canonical_encode(&envelope)).unwrap();

        match read_save(&path).unwrap() {
            LoadedSave::LegacyWorldTemplate(_) => {}
            LoadedSave::Full(_) => panic!("expected legacy template"),
        }
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn failed_write_never_touches_existing_file() {
        let dir = tmp_dir();
        let path = dir.join("protected.save");
        write_save(&path, &sample_payload()).unwrap();
        let original = fs::read(&path).unwrap();

        // Writing to an unwritable tmp sibling (a directory in its place)
        // must fail before any rename touches `path`.
        let tmp_path = sibling_tmp_path(&path);
        fs::create_dir_all(&tmp_path).unwrap();
        let err = write_save(&path, &sample_payload());
        assert!(err.is_err());
        assert_eq!(fs::read(&path).unwrap(), original);

        let _ = fs::remove_dir_all(&tmp_path);
        let _ = fs::remove_file(&path);
    }
}
