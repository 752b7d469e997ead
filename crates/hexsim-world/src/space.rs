use std::collections::BTreeMap;

use hexsim_codec::Value;
use serde::{Deserialize, Serialize};

use crate::coord::TopologyType;

/// Per-space classification, independent of topology. Gates tactical-only
/// behaviors (e.g. a `local` dungeon instance vs. the `campaign` overworld)
/// without implying anything about coordinate shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Campaign,
    Local,
}

/// Coarse classification of what sits on a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteType {
    None,
    Town,
    Dungeon,
    Other(String),
}

impl Default for SiteType {
    fn default() -> Self {
        SiteType::None
    }
}

/// The per-cell record stored in a space's cell map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HexRecord {
    pub terrain_type: String,
    pub site_type: SiteType,
    #[serde(default = "Value::object")]
    pub metadata: Value,
}

impl HexRecord {
    pub fn new(terrain_type: impl Into<String>) -> Self {
        Self {
            terrain_type: terrain_type.into(),
            site_type: SiteType::None,
            metadata: Value::object(),
        }
    }
}

/// A named topological region: its own cell set, doors, anchors, and
/// interactables. `role` is orthogonal to `topology_type` — a `local`
/// space may use either topology, and so may a `campaign` space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceState {
    pub space_id: String,
    pub role: Role,
    pub topology_type: TopologyType,
    pub topology_params: Value,
    /// Keyed by `Coord::canonical_key()`.
    pub cells: BTreeMap<String, HexRecord>,
    pub doors: Vec<Value>,
    pub anchors: Vec<Value>,
    pub interactables: Vec<Value>,
}

impl SpaceState {
    pub fn new(space_id: impl Into<String>, role: Role, topology_type: TopologyType, topology_params: Value) -> Self {
        Self {
            space_id: space_id.into(),
            role,
            topology_type,
            topology_params,
            cells: BTreeMap::new(),
            doors: Vec::new(),
            anchors: Vec::new(),
            interactables: Vec::new(),
        }
    }

    pub fn contains_cell(&self, key: &str) -> bool {
        self.cells.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_space_starts_with_empty_ledgers() {
        let space = SpaceState::new("overworld", Role::Campaign, TopologyType::HexAxial, Value::object());
        assert!(space.cells.is_empty());
        assert!(space.doors.is_empty());
    }
}
