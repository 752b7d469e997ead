use std::collections::BTreeMap;

use hexsim_codec::Value;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::command::SimCommand;

/// Ordered, append-only log of commands, bucketed by tick. The log is
/// authoritative: `run_replay` (in the engine crate, since it drives the
/// same phase machine as live execution) reconstructs identical state from
/// nothing but an initial world and this log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandLog {
    buckets: BTreeMap<u64, Vec<SimCommand>>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self { buckets: BTreeMap::new() }
    }

    /// Appends a command to the end of `tick`'s bucket. `command_index`
    /// is assigned as the bucket's length before this append, so commands
    /// within a tick are indexed `0, 1, 2, ...` in append order.
    pub fn append_command(
        &mut self,
        tick: u64,
        entity_id: Option<String>,
        command_type: impl Into<String>,
        params: Value,
    ) -> u64 {
        let bucket = self.buckets.entry(tick).or_default();
        let command_index = bucket.len() as u64;
        let command_type = command_type.into();
        trace!(tick, command_index, %command_type, "appended command");
        bucket.push(SimCommand {
            tick,
            command_index,
            entity_id,
            command_type,
            params,
        });
        command_index
    }

    /// Commands for `tick`, in stored insertion order — the order the
    /// phase machine must apply them in.
    pub fn commands_for_tick(&self, tick: u64) -> &[SimCommand] {
        self.buckets.get(&tick).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All commands across every tick, in `(tick, command_index)` order —
    /// the exact order `run_replay` must feed back through
    /// `append_command` to reproduce a run.
    pub fn all_in_order(&self) -> Vec<&SimCommand> {
        self.buckets.values().flat_map(|bucket| bucket.iter()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_index_counts_up_within_a_tick() {
        let mut log = CommandLog::new();
        let first = log.append_command(5, None, "a", Value::object());
        let second = log.append_command(5, None, "b", Value::object());
        assert_eq!(first, 0);
        assert_eq!(second, 1);
    }

    #[test]
    fn commands_for_tick_preserve_append_order() {
        let mut log = CommandLog::new();
        log.append_command(5, Some("e1".to_string()), "first", Value::object());
        log.append_command(5, Some("e2".to_string()), "second", Value::object());
        let commands = log.commands_for_tick(5);
        assert_eq!(commands[0].command_type, "first");
        assert_eq!(commands[1].command_type, "second");
    }

    #[test]
    fn different_ticks_have_independent_indices() {
        let mut log = CommandLog::new();
        log.append_command(5, None, "a", Value::object());
        let index_at_tick_6 = log.append_command(6, None, "b", Value::object());
        assert_eq!(index_at_tick_6, 0);
    }
}
