use std::collections::BTreeMap;

use hexsim_codec::Value;
use serde::{Deserialize, Serialize};

use crate::coord::HexCoord;
use crate::limits::MAX_WOUNDS;

/// A single inflicted wound. `severity` and `tags` are module-defined
/// vocabulary, kept JSON-safe rather than a fixed enum so rule modules can
/// extend the taxonomy without a substrate change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WoundRecord {
    pub region: String,
    pub severity: Value,
    pub tags: Vec<String>,
    pub inflicted_tick: u64,
    pub source: Option<String>,
}

/// A stackable-item container. `items` maps item id to a non-negative
/// quantity; a quantity of zero is indistinguishable in canonical hashing
/// from the item being absent only if the encoder is told to drop zeros —
/// this substrate keeps explicit zero entries so callers can see "reduced
/// to zero" distinctly from "never had any", at the cost of that being the
/// caller's responsibility to prune if unwanted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Container {
    pub id: String,
    pub items: BTreeMap<String, u64>,
}

impl Container {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), items: BTreeMap::new() }
    }

    pub fn add(&mut self, item_id: &str, quantity: u64) {
        *self.items.entry(item_id.to_string()).or_insert(0) += quantity;
    }

    /// Removes up to `quantity` of `item_id`, returning how much was
    /// actually removed (capped at what was present).
    pub fn remove(&mut self, item_id: &str, quantity: u64) -> u64 {
        match self.items.get_mut(item_id) {
            Some(have) => {
                let taken = quantity.min(*have);
                *have -= taken;
                taken
            }
            None => 0,
        }
    }
}

/// An in-world actor: position, facing, movement intent, inventory link,
/// wounds, and module-owned `stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub space_id: String,
    pub position: (f64, f64),
    pub facing: f64,
    /// Derived from `position`; recomputed whenever position changes, not
    /// an independent source of truth.
    pub hex_coord: HexCoord,
    pub move_vector: (f64, f64),
    pub target_position: Option<(f64, f64)>,
    pub inventory_container_id: Option<String>,
    pub stats: Value,
    pub wounds: Vec<WoundRecord>,
    pub cooldown_until_tick: u64,
}

impl Entity {
    pub fn new(id: impl Into<String>, space_id: impl Into<String>, position: (f64, f64)) -> Self {
        Self {
            id: id.into(),
            space_id: space_id.into(),
            position,
            facing: 0.0,
            hex_coord: position_to_hex(position),
            move_vector: (0.0, 0.0),
            target_position: None,
            inventory_container_id: None,
            stats: Value::object(),
            wounds: Vec::new(),
            cooldown_until_tick: 0,
        }
    }

    pub fn set_position(&mut self, position: (f64, f64)) {
        self.position = position;
        self.hex_coord = position_to_hex(position);
    }

    /// Appends a wound, evicting the oldest if `MAX_WOUNDS` would be
    /// exceeded (FIFO, matching every other bounded ledger in this
    /// substrate).
    pub fn add_wound(&mut self, wound: WoundRecord) {
        if self.wounds.len() >= MAX_WOUNDS {
            self.wounds.remove(0);
        }
        self.wounds.push(wound);
    }
}

/// Derives an entity's axial hex coordinate from its continuous position.
/// Uses axial pointy-top rounding so entities at fractional positions land
/// in exactly one cell.
pub fn position_to_hex(position: (f64, f64)) -> HexCoord {
    let (x, y) = position;
    let q = x;
    let r = y - x / 2.0;
    HexCoord::new(q.round() as i32, r.round() as i32)
}
