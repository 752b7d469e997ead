use hexsim_codec::Value;
use hexsim_error::SimError;
use hexsim_events::SimEvent;
use hexsim_rng::Generator;

/// The only seam through which a rule module may affect the simulation.
/// Modules never see world/entity internals directly; `Simulation` (in
/// the engine crate) implements this trait and passes `&mut dyn SimHandle`
/// into every hook.
pub trait SimHandle {
    fn current_tick(&self) -> u64;

    fn append_command(&mut self, tick: u64, entity_id: Option<String>, command_type: &str, params: Value) -> u64;

    fn schedule_event(&mut self, tick: u64, event_type: &str, params: Value) -> Result<u64, SimError>;

    fn cancel_event(&mut self, event_id: u64) -> bool;

    /// Every event still pending with the given `event_type`, across all
    /// future ticks. Used by the periodic scheduler to rehydrate task
    /// metadata from the serialized queue rather than from its own
    /// (ephemeral) memory.
    fn pending_events_of_type(&self, event_type: &str) -> Vec<SimEvent>;

    fn get_rules_state(&self, module_name: &str) -> Value;

    fn set_rules_state(&mut self, module_name: &str, value: Value) -> Result<(), SimError>;

    fn rng_stream(&mut self, name: &str) -> &mut Generator;
}
