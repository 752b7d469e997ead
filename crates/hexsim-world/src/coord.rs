use serde::{Deserialize, Serialize};

/// Axial hex coordinate. Canonical string form is `"{q},{r}"`, used as the
/// map key wherever a coordinate needs to be hashable and sortable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    pub fn canonical_key(&self) -> String {
        format!("{},{}", self.q, self.r)
    }

    /// Manhattan-equivalent distance on an axial hex grid.
    pub fn distance_to(&self, other: &HexCoord) -> i32 {
        let dq = self.q - other.q;
        let dr = self.r - other.r;
        ((dq.abs() + dr.abs() + (dq + dr).abs()) as f64 / 2.0) as i32
    }

    /// The six neighboring axial coordinates, in a fixed clockwise order.
    pub fn neighbors(&self) -> [HexCoord; 6] {
        const DIRS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];
        DIRS.map(|(dq, dr)| HexCoord::new(self.q + dq, self.r + dr))
    }
}

/// The coordinate shape used by a space, driven by its `topology_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopologyType {
    HexAxial,
    SquareGrid,
}

/// A coordinate whose shape matches the `topology_type` of the space it
/// belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coord {
    Hex(HexCoord),
    Square { x: i32, y: i32 },
}

impl Coord {
    pub fn canonical_key(&self) -> String {
        match self {
            Coord::Hex(h) => h.canonical_key(),
            Coord::Square { x, y } => format!("{x},{y}"),
        }
    }

    pub fn matches_topology(&self, topology_type: TopologyType) -> bool {
        matches!(
            (self, topology_type),
            (Coord::Hex(_), TopologyType::HexAxial) | (Coord::Square { .. }, TopologyType::SquareGrid)
        )
    }
}

/// A reference to a single cell: which space, what topology, which coord.
/// `space_id` defaults to `"overworld"` when a legacy payload omits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRef {
    pub space_id: String,
    pub topology_type: TopologyType,
    pub coord: Coord,
}

impl LocationRef {
    pub fn new(space_id: impl Into<String>, topology_type: TopologyType, coord: Coord) -> Self {
        Self { space_id: space_id.into(), topology_type, coord }
    }

    pub fn default_space_id() -> &'static str {
        "overworld"
    }
}

/// `CellRef` and `LocationRef` share the same shape in this substrate.
pub type CellRef = LocationRef;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_key_is_stable() {
        let a = HexCoord::new(3, -2);
        let b = HexCoord::new(3, -2);
        assert_eq!(a.canonical_key(), b.canonical_key());
        assert_eq!(a.canonical_key(), "3,-2");
    }

    #[test]
    fn distance_is_zero_for_identical_coords() {
        let h = HexCoord::new(1, 1);
        assert_eq!(h.distance_to(&h), 0);
    }

    #[test]
    fn neighbors_are_all_distance_one() {
        let center = HexCoord::new(0, 0);
        for n in center.neighbors() {
            assert_eq!(center.distance_to(&n), 1);
        }
    }

    #[test]
    fn coord_matches_declared_topology() {
        let hex = Coord::Hex(HexCoord::new(0, 0));
        assert!(hex.matches_topology(TopologyType::HexAxial));
        assert!(!hex.matches_topology(TopologyType::SquareGrid));
    }
}
