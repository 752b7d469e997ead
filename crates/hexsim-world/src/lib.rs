//! The world: cells, spaces, entities, containers, and the bounded
//! ambient ledgers the substrate owns directly. This crate has no notion
//! of ticks or events; it is pure data plus the invariants that must hold
//! after any mutation.

pub mod coord;
pub mod entity;
pub mod genesis;
pub mod ledger;
pub mod limits;
pub mod space;
pub mod time;
pub mod world;

pub use coord::{CellRef, Coord, HexCoord, LocationRef, TopologyType};
pub use entity::{Container, Entity, WoundRecord};
pub use genesis::genesis_space;
pub use ledger::BoundedLedger;
pub use space::{HexRecord, Role, SiteType, SpaceState};
pub use time::SimulationTime;
pub use world::World;
