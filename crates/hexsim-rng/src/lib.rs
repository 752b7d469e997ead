//! Deterministic, named RNG streams.
//!
//! Every stream a rule module or the engine itself needs is derived on
//! demand from a single master seed and a caller-chosen name — there is no
//! fixed enumeration of subsystems. Two streams with the same name always
//! draw the same sequence; adding a brand new stream never perturbs an
//! existing one (butterfly containment), because each stream's key
//! material depends only on `(master_seed, name)`.

pub mod chacha20;
pub mod registry;
pub mod stream;

pub use registry::{RngStreams, RngStreamsState};
pub use stream::{Generator, GeneratorState};
