//! The append-only command log. Purely data plus ordering: applying the
//! commands it holds is the phase machine's job, not this crate's.

pub mod command;
pub mod log;

pub use command::{
    action_uid, SimCommand, COMMAND_SET_ENTITY_MOVE_VECTOR, COMMAND_SET_ENTITY_TARGET_POSITION,
    COMMAND_TRANSITION_SPACE,
};
pub use log::CommandLog;
