use hexsim_world::limits::MAX_EVENTS_PER_TICK;

/// Construction-time parameters for a [`crate::simulation::Simulation`].
///
/// Ledger caps (`MAX_SIGNALS`, `MAX_WOUNDS`, `MAX_EVENT_TRACE`, ...) are
/// deliberately not exposed here: they are part of the substrate's
/// hash-stability contract (see `hexsim_world::limits`), not a per-world
/// tuning knob, so they stay fixed constants rather than fields a caller
/// can vary between runs that must still produce comparable hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldConfig {
    pub ticks_per_day: u64,
    /// Fatal guard: a tick that schedules more same-tick events than this
    /// without draining to empty aborts with `RunawayEventFanout`. Kept as
    /// a config field (rather than baked into `EventQueue` itself) so the
    /// engine's phase machine is the single place this guard is enforced.
    pub max_events_per_tick: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self { ticks_per_day: 240, max_events_per_tick: MAX_EVENTS_PER_TICK }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_substrate_constant() {
        assert_eq!(WorldConfig::default().max_events_per_tick, MAX_EVENTS_PER_TICK);
    }
}
