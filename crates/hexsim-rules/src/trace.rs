use hexsim_events::SimEvent;
use hexsim_world::limits::MAX_EVENT_TRACE;
use hexsim_world::BoundedLedger;
use serde::{Deserialize, Serialize};

/// Bounded, read-only FIFO of executed events, kept for forensic
/// inspection and hash-covered like everything else in `simulation_state`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventTrace {
    ledger: BoundedLedger<SimEvent>,
}

impl Default for EventTrace {
    fn default() -> Self {
        Self::new()
    }
}

impl EventTrace {
    pub fn new() -> Self {
        Self { ledger: BoundedLedger::new(MAX_EVENT_TRACE) }
    }

    pub fn rebind_cap(&mut self) {
        self.ledger = std::mem::replace(&mut self.ledger, BoundedLedger::new(0)).with_cap(MAX_EVENT_TRACE);
    }

    pub fn record(&mut self, event: SimEvent) {
        self.ledger.push(event);
    }

    /// A deep copy of the trace's current contents, oldest first.
    pub fn snapshot(&self) -> Vec<SimEvent> {
        self.ledger.as_vec()
    }

    pub fn len(&self) -> usize {
        self.ledger.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexsim_codec::Value;

    fn event(tick: u64, id: u64) -> SimEvent {
        SimEvent::new(tick, id, "travel_step", Value::object())
    }

    #[test]
    fn evicts_oldest_past_cap() {
        let mut trace = EventTrace::new();
        for i in 0..(MAX_EVENT_TRACE + 10) as u64 {
            trace.record(event(i, i));
        }
        assert_eq!(trace.len(), MAX_EVENT_TRACE);
        assert_eq!(trace.snapshot().first().unwrap().event_id, 10);
    }

    #[test]
    fn cap_survives_rebind_after_deserialize() {
        let mut trace = EventTrace::new();
        for i in 0..(MAX_EVENT_TRACE + 3) as u64 {
            trace.record(event(i, i));
        }
        trace.rebind_cap();
        trace.record(event(9999, 9999));
        assert_eq!(trace.len(), MAX_EVENT_TRACE);
    }
}
