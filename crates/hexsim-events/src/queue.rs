use std::collections::{BTreeMap, VecDeque};

use hexsim_codec::Value;
use hexsim_error::SimError;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::event::SimEvent;

/// Deterministic min-heap-by-tick event queue with stable per-tick
/// insertion order. Two events scheduled for the same tick always drain
/// in the order they were scheduled, because `event_id` is assigned
/// monotonically at schedule time and buckets are plain FIFO queues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventQueue {
    buckets: BTreeMap<u64, VecDeque<SimEvent>>,
    next_event_id: u64,
    current_tick: u64,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    pub fn new() -> Self {
        Self { buckets: BTreeMap::new(), next_event_id: 0, current_tick: 0 }
    }

    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    /// Called by the phase machine at the start of each tick. Scheduling
    /// for any `tick < current_tick` after this is rejected.
    pub fn set_current_tick(&mut self, tick: u64) {
        self.current_tick = tick;
    }

    /// Schedules an event, assigning it the next monotonic `event_id`.
    /// Rejects scheduling into a tick strictly before `current_tick` —
    /// scheduling for `tick == current_tick` is always allowed, which is
    /// exactly what the same-tick drain phase relies on.
    pub fn schedule_event(&mut self, tick: u64, event_type: &str, params: Value) -> Result<u64, SimError> {
        if tick < self.current_tick {
            return Err(SimError::InvalidEvent {
                tick,
                reason: format!(
                    "cannot schedule event for past tick {tick} while current tick is {}",
                    self.current_tick
                ),
            });
        }
        let event_id = self.next_event_id;
        self.next_event_id += 1;
        let event = SimEvent::new(tick, event_id, event_type, params);
        trace!(tick, event_id, event_type, "scheduled event");
        self.buckets.entry(tick).or_default().push_back(event);
        Ok(event_id)
    }

    /// Cancels a pending event by id. Returns whether it was found.
    pub fn cancel_event(&mut self, event_id: u64) -> bool {
        for bucket in self.buckets.values_mut() {
            if let Some(pos) = bucket.iter().position(|e| e.event_id == event_id) {
                bucket.remove(pos);
                return true;
            }
        }
        false
    }

    /// Pops the next event for `tick` in `(tick, event_id)` order, or
    /// `None` if the bucket is empty or absent. Used in a loop by the
    /// phase machine to implement same-tick drain-until-empty: new events
    /// scheduled for `tick` during execution land in the same bucket and
    /// are picked up by the next call.
    pub fn pop_next(&mut self, tick: u64) -> Option<SimEvent> {
        let bucket = self.buckets.get_mut(&tick)?;
        let event = bucket.pop_front();
        if bucket.is_empty() {
            self.buckets.remove(&tick);
        }
        event
    }

    pub fn bucket_len(&self, tick: u64) -> usize {
        self.buckets.get(&tick).map(VecDeque::len).unwrap_or(0)
    }

    pub fn is_tick_empty(&self, tick: u64) -> bool {
        self.bucket_len(tick) == 0
    }

    /// All events pending at or after `tick`, in `(tick, event_id)` order.
    /// Used by the periodic scheduler to find pending `periodic_tick`
    /// events on rehydration without draining them.
    pub fn pending_from(&self, tick: u64) -> Vec<&SimEvent> {
        self.buckets
            .range(tick..)
            .flat_map(|(_, bucket)| bucket.iter())
            .collect()
    }

    pub fn next_event_id(&self) -> u64 {
        self.next_event_id
    }
}
