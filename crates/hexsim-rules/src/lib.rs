mod handle;
mod module;
mod periodic;
mod rules_state;
mod trace;

pub use handle::SimHandle;
pub use module::{RuleModule, RuleModuleRegistry};
pub use periodic::{PeriodicCallback, PeriodicScheduler, PERIODIC_SCHEDULER_MODULE_NAME};
pub use rules_state::RulesStateStore;
pub use trace::EventTrace;
