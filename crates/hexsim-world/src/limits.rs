//! Fixed bounds on every ledger the world owns. Each is a deterministic
//! constant, not configuration: changing one changes the canonical hash of
//! any save that has ever filled the ledger it bounds, so these are part
//! of the substrate's contract, not a per-world tuning knob.

pub const MAX_SIGNALS: usize = 128;
pub const MAX_TRACKS: usize = 128;
pub const MAX_RUMORS: usize = 64;
pub const MAX_SPAWN_DESCRIPTORS: usize = 64;
pub const MAX_OCCLUSION_EDGES: usize = 256;
pub const MAX_WOUNDS: usize = 16;
pub const MAX_EVENT_TRACE: usize = 256;
pub const MAX_EVENTS_PER_TICK: u64 = 10_000;
