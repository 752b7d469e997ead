use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::chacha20::ChaCha20Block;

/// A single named, independent RNG stream.
///
/// Two streams with the same name under the same master seed always
/// produce the same sequence of draws; two streams with different names
/// are independent regardless of draw order (butterfly containment: adding
/// a new stream never perturbs an existing one, since each stream's key
/// material is derived solely from `master_seed` and its own name).
#[derive(Debug, Clone)]
pub struct Generator {
    name: String,
    block: ChaCha20Block,
    draws: u64,
}

/// Serializable snapshot of a [`Generator`]'s internal state.
///
/// Round-trips verbatim: restoring from a `GeneratorState` and continuing
/// to draw produces exactly the same sequence as the original would have.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorState {
    pub name: String,
    pub key: [u32; 8],
    pub nonce: [u32; 3],
    pub counter: u64,
    pub block_index: usize,
    pub current_block: [u32; 16],
    pub draws: u64,
}

fn sha256(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

impl Generator {
    /// Derive a stream from `master_seed` and an arbitrary caller-chosen
    /// `name`. The seed is the first 8 bytes (big-endian) of
    /// `SHA-256("{master_seed}:{name}")`; that digest is also used whole as
    /// the ChaCha20 key, and a second digest over `"{master_seed}:{name}:nonce"`
    /// supplies the 96-bit nonce, so the full 256 bits of key material are
    /// a pure function of `(master_seed, name)`.
    pub fn new(master_seed: u64, name: &str) -> Self {
        let key = sha256(format!("{master_seed}:{name}").as_bytes());
        let nonce_digest = sha256(format!("{master_seed}:{name}:nonce").as_bytes());
        let mut nonce = [0u8; 12];
        nonce.copy_from_slice(&nonce_digest[0..12]);
        Self {
            name: name.to_string(),
            block: ChaCha20Block::new(key, nonce),
            draws: 0,
        }
    }

    /// The 64-bit seed a caller would derive independently from
    /// `(master_seed, name)` per the stream-derivation rule. Exposed for
    /// callers that want to assert on seed identity without drawing values.
    pub fn derived_seed(master_seed: u64, name: &str) -> u64 {
        let digest = sha256(format!("{master_seed}:{name}").as_bytes());
        u64::from_be_bytes(digest[0..8].try_into().expect("8 bytes"))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn draw_count(&self) -> u64 {
        self.draws
    }

    pub fn next_u32(&mut self) -> u32 {
        self.draws += 1;
        self.block.next_u32()
    }

    pub fn next_u64(&mut self) -> u64 {
        self.draws += 1;
        self.block.next_u64()
    }

    /// Uniform value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.draws += 1;
        self.block.next_f64()
    }

    /// Uniform integer in `[min, max)`. `max` must be greater than `min`.
    pub fn next_in_range(&mut self, min: i64, max: i64) -> i64 {
        debug_assert!(max > min);
        let span = (max - min) as u64;
        min + (self.next_u64() % span) as i64
    }

    pub fn state(&self) -> GeneratorState {
        let (key, nonce, counter, block_index, current_block) = self.block.state();
        GeneratorState {
            name: self.name.clone(),
            key,
            nonce,
            counter,
            block_index,
            current_block,
            draws: self.draws,
        }
    }

    pub fn from_state(state: GeneratorState) -> Self {
        Self {
            name: state.name,
            block: ChaCha20Block::from_state(
                state.key,
                state.nonce,
                state.counter,
                state.block_index,
                state.current_block,
            ),
            draws: state.draws,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_same_seed_is_deterministic() {
        let mut a = Generator::new(1337, "weather");
        let mut b = Generator::new(1337, "weather");
        for _ in 0..20 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn different_names_diverge() {
        let mut a = Generator::new(1337, "weather");
        let mut b = Generator::new(1337, "combat");
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = Generator::new(1337, "weather");
        let mut b = Generator::new(7, "weather");
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn butterfly_containment_new_stream_does_not_perturb_existing() {
        let mut before = Generator::new(99, "weather");
        let baseline: Vec<u64> = (0..10).map(|_| before.next_u64()).collect();

        // Draw from an entirely new, previously unused stream name.
        let mut other = Generator::new(99, "migration-waves");
        let _ = (0..10).map(|_| other.next_u64()).count();

        let mut after = Generator::new(99, "weather");
        let repeat: Vec<u64> = (0..10).map(|_| after.next_u64()).collect();
        assert_eq!(baseline, repeat);
    }

    #[test]
    fn state_round_trip_resumes_identically() {
        let mut g = Generator::new(42, "tides");
        for _ in 0..7 {
            let _ = g.next_u64();
        }
        let state = g.state();
        let mut resumed = Generator::from_state(state);
        for _ in 0..7 {
            assert_eq!(g.next_u64(), resumed.next_u64());
        }
        assert_eq!(g.draw_count(), resumed.draw_count());
    }

    #[test]
    fn next_in_range_stays_in_bounds() {
        let mut g = Generator::new(1, "loot");
        for _ in 0..500 {
            let v = g.next_in_range(3, 9);
            assert!((3..9).contains(&v));
        }
    }

    #[test]
    fn derived_seed_matches_spec_rule() {
        let seed = Generator::derived_seed(1337, "weather");
        let digest = sha256(b"1337:weather");
        let expected = u64::from_be_bytes(digest[0..8].try_into().unwrap());
        assert_eq!(seed, expected);
    }
}
