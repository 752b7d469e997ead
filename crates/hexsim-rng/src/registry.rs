use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::stream::{Generator, GeneratorState};

/// Owns every RNG stream a running simulation has touched, keyed by name.
///
/// Streams are created lazily on first use and persist for the life of the
/// simulation; `state()`/`restore()` round-trip every active stream's full
/// internal generator state (not just the master seed), so a loaded save
/// resumes each stream exactly where it left off.
#[derive(Debug, Clone)]
pub struct RngStreams {
    master_seed: u64,
    streams: BTreeMap<String, Generator>,
}

/// Serializable snapshot of every active stream, for inclusion in
/// `simulation_state` on save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngStreamsState {
    pub master_seed: u64,
    pub streams: BTreeMap<String, GeneratorState>,
}

impl RngStreams {
    pub fn new(master_seed: u64) -> Self {
        Self {
            master_seed,
            streams: BTreeMap::new(),
        }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Get (creating if necessary) the named stream.
    pub fn stream(&mut self, name: &str) -> &mut Generator {
        self.streams.entry(name.to_string()).or_insert_with(|| {
            debug!(stream = name, "creating rng stream");
            Generator::new(self.master_seed, name)
        })
    }

    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    pub fn has_stream(&self, name: &str) -> bool {
        self.streams.contains_key(name)
    }

    pub fn state(&self) -> RngStreamsState {
        RngStreamsState {
            master_seed: self.master_seed,
            streams: self
                .streams
                .iter()
                .map(|(name, gen)| (name.clone(), gen.state()))
                .collect(),
        }
    }

    pub fn restore(state: RngStreamsState) -> Self {
        let streams = state
            .streams
            .into_iter()
            .map(|(name, gen_state)| (name, Generator::from_state(gen_state)))
            .collect();
        Self {
            master_seed: state.master_seed,
            streams,
        }
    }
}
