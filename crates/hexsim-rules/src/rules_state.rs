use std::collections::BTreeMap;

use hexsim_codec::Value;
use hexsim_error::SimError;
use serde::{Deserialize, Serialize};

/// `module_name -> opaque JSON-safe value`. The only sanctioned persistent
/// memory of a rule module across saves, restarts, or replays.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesStateStore {
    modules: BTreeMap<String, Value>,
}

/// `Value::Float` can represent `NaN`/infinity; those aren't JSON-safe, so
/// they're rejected at the one place rules-state enters the store.
fn is_json_safe(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(_) | Value::Int(_) | Value::String(_) => true,
        Value::Float(f) => f.is_finite(),
        Value::Array(items) => items.iter().all(is_json_safe),
        Value::Object(map) => map.values().all(is_json_safe),
    }
}

impl RulesStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a deep copy (an owned [`Value`]) of the module's state, or
    /// an empty object if it has never been set.
    pub fn get(&self, module_name: &str) -> Value {
        self.modules.get(module_name).cloned().unwrap_or_else(Value::object)
    }

    pub fn set(&mut self, module_name: &str, value: Value) -> Result<(), SimError> {
        if !is_json_safe(&value) {
            return Err(SimError::SchemaInvalid(format!(
                "rules-state for {module_name:?} is not JSON-safe (contains NaN/Infinity)"
            )));
        }
        self.modules.insert(module_name.to_string(), value);
        Ok(())
    }

    pub fn has(&self, module_name: &str) -> bool {
        self.modules.contains_key(module_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_module_returns_empty_object() {
        let store = RulesStateStore::new();
        assert_eq!(store.get("signals"), Value::object());
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut store = RulesStateStore::new();
        store.set("signals", Value::Int(42)).unwrap();
        assert_eq!(store.get("signals"), Value::Int(42));
    }

    #[test]
    fn nan_is_rejected() {
        let mut store = RulesStateStore::new();
        let err = store.set("signals", Value::Float(f64::NAN)).unwrap_err();
        assert!(matches!(err, SimError::SchemaInvalid(_)));
    }

    #[test]
    fn nan_nested_in_array_is_rejected() {
        let mut store = RulesStateStore::new();
        let err = store.set("signals", Value::Array(vec![Value::Float(f64::INFINITY)])).unwrap_err();
        assert!(matches!(err, SimError::SchemaInvalid(_)));
    }
}
