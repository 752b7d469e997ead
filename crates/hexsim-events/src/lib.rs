//! The deterministic event queue: JSON-safe event records, ordered by
//! `(tick, event_id)`, with same-tick drain-until-empty semantics owned by
//! the caller (the phase machine) rather than this crate — `EventQueue`
//! only guarantees ordering and rejects scheduling into the past.

pub mod event;
pub mod queue;

pub use event::{SimEvent, EVENT_TYPE_PERIODIC_TICK, EVENT_TYPE_TRAVEL_STEP};
pub use queue::EventQueue;
