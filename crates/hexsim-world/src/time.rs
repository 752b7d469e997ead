use serde::{Deserialize, Serialize};

/// The authoritative logical clock. `tick` is the only time source the
/// substrate consults; wall clock never participates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationTime {
    pub tick: u64,
    pub ticks_per_day: u64,
    pub epoch_tick: u64,
}

impl Default for SimulationTime {
    fn default() -> Self {
        Self { tick: 0, ticks_per_day: 240, epoch_tick: 0 }
    }
}

impl SimulationTime {
    pub fn new(ticks_per_day: u64) -> Self {
        Self { tick: 0, ticks_per_day, epoch_tick: 0 }
    }

    pub fn day_index(&self) -> u64 {
        self.tick.saturating_sub(self.epoch_tick) / self.ticks_per_day.max(1)
    }

    pub fn tick_in_day(&self) -> u64 {
        self.tick.saturating_sub(self.epoch_tick) % self.ticks_per_day.max(1)
    }

    pub fn time_of_day_fraction(&self) -> f64 {
        self.tick_in_day() as f64 / self.ticks_per_day.max(1) as f64
    }

    pub fn advance(&mut self, n: u64) {
        self.tick += n;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_index_rolls_over_at_ticks_per_day() {
        let mut t = SimulationTime::new(240);
        t.advance(240);
        assert_eq!(t.day_index(), 1);
        assert_eq!(t.tick_in_day(), 0);
    }

    #[test]
    fn time_of_day_fraction_stays_in_unit_range() {
        let mut t = SimulationTime::new(240);
        for _ in 0..500 {
            t.advance(1);
            let f = t.time_of_day_fraction();
            assert!((0.0..1.0).contains(&f));
        }
    }
}
