use hexsim_codec::Value;
use hexsim_error::SimError;

use crate::coord::{Coord, HexCoord, TopologyType};
use crate::space::{HexRecord, Role, SpaceState};

/// Builds the initial `"overworld"` space for a fresh simulation, from a
/// topology type and its caller-supplied params. Params are validated
/// structurally rather than trusted, since they arrive as opaque JSON at
/// the public API boundary.
///
/// Recognized topologies:
/// - `hex_axial` with `{ "radius": <non-negative int> }` — a hex disk of
///   that radius centered on `(0, 0)`.
/// - `square_grid` with `{ "width": <positive int>, "height": <positive int> }`.
pub fn genesis_space(topology_type: TopologyType, topology_params: Value) -> Result<SpaceState, SimError> {
    let mut space = SpaceState::new("overworld", Role::Campaign, topology_type, topology_params.clone());
    match topology_type {
        TopologyType::HexAxial => {
            let radius = topology_params
                .get("radius")
                .and_then(Value::as_i64)
                .ok_or_else(|| SimError::SchemaInvalid("hex_axial topology requires integer 'radius'".to_string()))?;
            if radius < 0 {
                return Err(SimError::SchemaInvalid("hex_axial 'radius' must be non-negative".to_string()));
            }
            for q in -radius..=radius {
                let r_min = (-radius).max(-q - radius);
                let r_max = radius.min(-q + radius);
                for r in r_min..=r_max {
                    let coord = Coord::Hex(HexCoord::new(q as i32, r as i32));
                    space.cells.insert(coord.canonical_key(), HexRecord::new("plains"));
                }
            }
        }
        TopologyType::SquareGrid => {
            let width = topology_params
                .get("width")
                .and_then(Value::as_i64)
                .ok_or_else(|| SimError::SchemaInvalid("square_grid topology requires integer 'width'".to_string()))?;
            let height = topology_params
                .get("height")
                .and_then(Value::as_i64)
                .ok_or_else(|| SimError::SchemaInvalid("square_grid topology requires integer 'height'".to_string()))?;
            if width <= 0 || height <= 0 {
                return Err(SimError::SchemaInvalid("square_grid 'width'/'height' must be positive".to_string()));
            }
            for x in 0..width {
                for y in 0..height {
                    let coord = Coord::Square { x: x as i32, y: y as i32 };
                    space.cells.insert(coord.canonical_key(), HexRecord::new("plains"));
                }
            }
        }
    }
    Ok(space)
}
