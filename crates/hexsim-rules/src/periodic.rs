use std::any::Any;
use std::collections::BTreeMap;

use hexsim_codec::Value;
use hexsim_error::SimError;
use hexsim_events::{SimEvent, EVENT_TYPE_PERIODIC_TICK};
use tracing::{debug, warn};

use crate::handle::SimHandle;
use crate::module::RuleModule;

pub const PERIODIC_SCHEDULER_MODULE_NAME: &str = "periodic_scheduler";

/// In-memory only; reattached explicitly by the caller after a load, per
/// the substrate's rule that callbacks never persist.
pub type PeriodicCallback = Box<dyn FnMut(&mut dyn SimHandle, u64)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TaskMeta {
    interval_ticks: u64,
    start_tick: u64,
}

/// Built-in rule module expressing fixed-interval tasks as ordinary
/// queued `periodic_tick` events. Carries no persistent state of its own
/// beyond what's reconstructible from the pending event queue: after a
/// fresh construction, [`RuleModule::on_simulation_start`] rebuilds
/// `tasks` by scanning pending `periodic_tick` events, so no chain is ever
/// duplicated across a save/load cycle.
#[derive(Default)]
pub struct PeriodicScheduler {
    tasks: BTreeMap<String, TaskMeta>,
    callbacks: BTreeMap<String, PeriodicCallback>,
}

impl PeriodicScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent when `(interval_ticks, start_tick)` matches what's
    /// already registered for `task_name`. Rejects a mismatched
    /// re-registration with `ConflictingTaskRegistration`.
    pub fn register_task(
        &mut self,
        sim: &mut dyn SimHandle,
        task_name: &str,
        interval_ticks: u64,
        start_tick: u64,
    ) -> Result<(), SimError> {
        if interval_ticks < 1 {
            return Err(SimError::SchemaInvalid(format!(
                "periodic task {task_name:?} interval_ticks must be >= 1"
            )));
        }
        if let Some(existing) = self.tasks.get(task_name) {
            if existing.interval_ticks != interval_ticks {
                return Err(SimError::ConflictingTaskRegistration(task_name.to_string()));
            }
            // start_tick only matters for the very first scheduling; once
            // a chain exists, re-registration with the same interval is a
            // pure no-op regardless of the start_tick argument.
            return Ok(());
        }

        self.tasks.insert(task_name.to_string(), TaskMeta { interval_ticks, start_tick });

        let already_pending = !sim
            .pending_events_of_type(EVENT_TYPE_PERIODIC_TICK)
            .iter()
            .filter(|e| e.params.get("task").and_then(Value::as_str) == Some(task_name))
            .collect::<Vec<_>>()
            .is_empty();
        if !already_pending {
            let fire_at = start_tick.max(sim.current_tick());
            let params = periodic_params(task_name, interval_ticks);
            let _ = sim.schedule_event(fire_at, EVENT_TYPE_PERIODIC_TICK, params)?;
            debug!(task = task_name, fire_at, "periodic task scheduled");
        }
        Ok(())
    }

    pub fn set_task_callback(&mut self, task_name: &str, callback: PeriodicCallback) {
        self.callbacks.insert(task_name.to_string(), callback);
    }

    pub fn has_task(&self, task_name: &str) -> bool {
        self.tasks.contains_key(task_name)
    }
}

fn periodic_params(task_name: &str, interval_ticks: u64) -> Value {
    Value::Object(BTreeMap::from([
        ("task".to_string(), Value::String(task_name.to_string())),
        ("interval".to_string(), Value::Int(interval_ticks as i64)),
    ]))
}

impl RuleModule for PeriodicScheduler {
    fn name(&self) -> &str {
        PERIODIC_SCHEDULER_MODULE_NAME
    }

    fn on_simulation_start(&mut self, sim: &mut dyn SimHandle) {
        self.tasks.clear();
        for event in sim.pending_events_of_type(EVENT_TYPE_PERIODIC_TICK) {
            let Some(task_name) = event.params.get("task").and_then(Value::as_str) else {
                warn!("pending periodic_tick event missing 'task' field; skipping rehydration for it");
                continue;
            };
            let Some(interval_ticks) = event.params.get("interval").and_then(Value::as_i64) else {
                warn!(task = task_name, "pending periodic_tick event missing 'interval' field");
                continue;
            };
            // start_tick is only meaningful for the initial scheduling
            // decision, already made; the rehydrated entry just needs the
            // interval so a future register_task call recognizes it.
            self.tasks
                .entry(task_name.to_string())
                .or_insert(TaskMeta { interval_ticks: interval_ticks as u64, start_tick: event.tick });
        }
    }

    fn on_event_executed(&mut self, sim: &mut dyn SimHandle, event: &SimEvent) {
        if event.event_type != EVENT_TYPE_PERIODIC_TICK {
            return;
        }
        let Some(task_name) = event.params.get("task").and_then(Value::as_str).map(str::to_string) else {
            return;
        };
        let Some(interval_ticks) = event.params.get("interval").and_then(Value::as_i64) else {
            return;
        };
        let interval_ticks = interval_ticks as u64;

        if let Some(mut callback) = self.callbacks.remove(&task_name) {
            callback(sim, event.tick);
            self.callbacks.insert(task_name.clone(), callback);
        }

        let params = periodic_params(&task_name, interval_ticks);
        if let Err(err) = sim.schedule_event(event.tick + interval_ticks, EVENT_TYPE_PERIODIC_TICK, params) {
            warn!(task = %task_name, error = %err, "failed to reschedule periodic task");
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
