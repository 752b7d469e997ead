use hexsim_codec::Value;
use serde::{Deserialize, Serialize};

/// A single scheduled or executed event. `unknown_fields` preserves
/// anything a newer save format wrote that this build doesn't recognize,
/// so round-tripping an event through load/save never silently drops data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimEvent {
    pub tick: u64,
    pub event_id: u64,
    pub event_type: String,
    #[serde(default = "Value::object")]
    pub params: Value,
    #[serde(default = "Value::object")]
    pub unknown_fields: Value,
}

impl SimEvent {
    pub fn new(tick: u64, event_id: u64, event_type: impl Into<String>, params: Value) -> Self {
        Self {
            tick,
            event_id,
            event_type: event_type.into(),
            params,
            unknown_fields: Value::object(),
        }
    }
}

/// Event type reserved by the substrate's periodic scheduler.
pub const EVENT_TYPE_PERIODIC_TICK: &str = "periodic_tick";
/// Event type reserved by the substrate for hex-boundary crossings.
pub const EVENT_TYPE_TRAVEL_STEP: &str = "travel_step";
