//! The error taxonomy shared by every crate in the simulation substrate.
//!
//! Two classes matter. Fatal errors abort `advance_ticks`/`advance_days`
//! entirely and leave the caller free to inspect state as of the last
//! tick boundary that completed cleanly. `InvalidCommand`/`InvalidEvent`
//! are deterministic rejections: the offending command or event is
//! dropped without mutating anything, and the machine keeps running.
//!
//! `NotApplicable` (a rule module declining to act because a precondition
//! doesn't hold) is not represented here at all — it is never an `Err`,
//! only a forensic outcome recorded on the event trace.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    /// A save file's recorded hash does not match the hash recomputed over
    /// its own payload. Fatal: the save is either corrupt or was edited.
    #[error("save hash mismatch: expected {expected}, computed {computed}")]
    HashMismatch { expected: String, computed: String },

    /// The save file's `schema_version` is not one this build knows how to
    /// load. Fatal.
    #[error("unsupported save schema version: {0}")]
    SchemaVersionUnsupported(u32),

    /// The save file's structure doesn't match any known schema for its
    /// declared version. Fatal.
    #[error("save payload does not match schema: {0}")]
    SchemaInvalid(String),

    /// Two rule modules registered under the same name. Fatal: module
    /// identity must be unique for dispatch order and rules-state
    /// namespacing to be well-defined.
    #[error("rule module {0:?} is already registered")]
    DuplicateModule(String),

    /// A periodic task name was registered twice with conflicting
    /// parameters. Fatal.
    #[error("periodic task {0:?} already registered with different parameters")]
    ConflictingTaskRegistration(String),

    /// A single tick scheduled more events than `MAX_EVENTS_PER_TICK`
    /// without ever draining to empty. Fatal: almost always a rule module
    /// scheduling itself in a tight loop.
    #[error("tick {tick} scheduled more than {limit} events without draining")]
    RunawayEventFanout { tick: u64, limit: u64 },

    /// A command failed structural validation (unknown entity, malformed
    /// params, ...). The command is dropped; no state changes.
    #[error("invalid command at tick {tick}: {reason}")]
    InvalidCommand { tick: u64, reason: String },

    /// An event failed structural validation. The event is dropped; no
    /// state changes.
    #[error("invalid event at tick {tick}: {reason}")]
    InvalidEvent { tick: u64, reason: String },

    /// Wraps an I/O failure encountered while reading or writing a save.
    #[error("save i/o error: {0}")]
    Io(String),

    /// Wraps a JSON encode/decode failure encountered while reading or
    /// writing a save payload.
    #[error("save json error: {0}")]
    Json(String),

    /// A structural invariant (entity references an unknown space,
    /// position maps outside any valid cell, a bounded ledger would exceed
    /// its cap, ...) was violated during a tick. Fatal: this is always a
    /// bug in a rule module or in the engine itself, never user input, so
    /// the tick aborts without partial mutation.
    #[error("invariant violated at tick {tick}: {reason}")]
    InvariantViolation { tick: u64, reason: String },
}

pub type SimResult<T> = Result<T, SimError>;
