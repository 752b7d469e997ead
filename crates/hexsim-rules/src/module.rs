use std::any::Any;

use hexsim_error::SimError;
use hexsim_events::SimEvent;

use crate::handle::SimHandle;

/// Pluggable behavior attached to the substrate. A module never mutates
/// world/entity state directly — only through the [`SimHandle`] passed
/// into each hook. Default (empty) hook bodies mean a module overrides
/// only what it actually needs.
pub trait RuleModule: Any {
    fn name(&self) -> &str;

    fn on_simulation_start(&mut self, _sim: &mut dyn SimHandle) {}
    fn on_tick_start(&mut self, _sim: &mut dyn SimHandle, _tick: u64) {}
    fn on_tick_end(&mut self, _sim: &mut dyn SimHandle, _tick: u64) {}
    fn on_event_executed(&mut self, _sim: &mut dyn SimHandle, _event: &SimEvent) {}

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Flat, ordered registry of rule modules. Dispatch order for every hook
/// is registration order; there is no priority system or dependency
/// graph.
#[derive(Default)]
pub struct RuleModuleRegistry {
    modules: Vec<Box<dyn RuleModule>>,
}

impl RuleModuleRegistry {
    pub fn new() -> Self {
        Self { modules: Vec::new() }
    }

    pub fn register(&mut self, module: Box<dyn RuleModule>) -> Result<(), SimError> {
        if self.modules.iter().any(|m| m.name() == module.name()) {
            return Err(SimError::DuplicateModule(module.name().to_string()));
        }
        self.modules.push(module);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn RuleModule> {
        self.modules.iter().find(|m| m.name() == name).map(Box::as_ref)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut (dyn RuleModule + 'static)> {
        self.modules.iter_mut().find(|m| m.name() == name).map(Box::as_mut)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn RuleModule>> {
        self.modules.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
