//! Canonical encoding and hashing for simulation state.
//!
//! [`Value`] is the JSON-safe universal representation every hashed or
//! persisted piece of state passes through. [`canonical_encode`] is the
//! one true byte form of a `Value`; [`hash`] is `SHA-256` over those bytes.
//! Anything that needs to agree bit-for-bit across machines, processes, or
//! save/load cycles goes through this crate first.

pub mod encode;
pub mod hash;
pub mod value;

pub use encode::canonical_encode;
pub use hash::hash;
pub use value::Value;
