use hexsim_codec::Value;
use serde::{Deserialize, Serialize};

/// A single logged command. `entity_id` is `None` for commands that act
/// on the simulation at large rather than a specific entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimCommand {
    pub tick: u64,
    pub command_index: u64,
    pub entity_id: Option<String>,
    pub command_type: String,
    #[serde(default = "Value::object")]
    pub params: Value,
}

/// Command types reserved by the substrate; every other `command_type`
/// string belongs to a rule module and is validated only structurally at
/// this layer (`command_type: string`, `params: JSON-object`).
pub const COMMAND_SET_ENTITY_MOVE_VECTOR: &str = "set_entity_move_vector";
pub const COMMAND_SET_ENTITY_TARGET_POSITION: &str = "set_entity_target_position";
pub const COMMAND_TRANSITION_SPACE: &str = "transition_space";

/// Deterministic id a rule module uses to enforce idempotence of a
/// command's effects across save/load — see `GLOSSARY: Action UID`.
pub fn action_uid(tick: u64, command_index: u64) -> String {
    format!("{tick}:{command_index}")
}
