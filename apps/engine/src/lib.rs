//! Deterministic hex/square-grid world engine.
//!
//! This crate binds the substrate crates (`hexsim-world`, `hexsim-events`,
//! `hexsim-commands`, `hexsim-rng`, `hexsim-rules`, `hexsim-persistence`)
//! into a single authoritative [`Simulation`] that drives a six-phase tick:
//! tick-start hooks, command application, same-tick event drain, entity
//! updates, tick-end hooks, then the tick counter advances.
//!
//! Time progression is tick-based only — nothing in the authoritative state
//! is derived from wall-clock time.
//!
//! # Usage
//!
//! ```no_run
//! use hexsim_engine::{Simulation, TopologyType, Value};
//!
//! let params = Value::object();
//! let mut sim = Simulation::new_with_seed_and_topology(1337, TopologyType::HexAxial, params)?;
//! sim.tick()?;
//! # Ok::<(), hexsim_engine::SimError>(())
//! ```

pub mod config;
mod simulation;

pub use config::WorldConfig;
pub use simulation::Simulation;

pub use hexsim_codec::Value;
pub use hexsim_commands::{
    SimCommand, COMMAND_SET_ENTITY_MOVE_VECTOR, COMMAND_SET_ENTITY_TARGET_POSITION,
    COMMAND_TRANSITION_SPACE,
};
pub use hexsim_error::SimError;
pub use hexsim_events::{SimEvent, EVENT_TYPE_PERIODIC_TICK, EVENT_TYPE_TRAVEL_STEP};
pub use hexsim_rules::{PeriodicScheduler, RuleModule, SimHandle};
pub use hexsim_world::TopologyType;
