use std::collections::BTreeMap;
use std::path::Path;

use hexsim_codec::{hash, Value};
use hexsim_commands::{
    CommandLog, SimCommand, COMMAND_SET_ENTITY_MOVE_VECTOR, COMMAND_SET_ENTITY_TARGET_POSITION,
    COMMAND_TRANSITION_SPACE,
};
use hexsim_error::SimError;
use hexsim_events::{EventQueue, SimEvent, EVENT_TYPE_TRAVEL_STEP};
use hexsim_persistence::{compute_save_hash, read_save, write_save, LoadedSave, SavePayload};
use hexsim_rng::{Generator, RngStreams, RngStreamsState};
use hexsim_rules::{RuleModule, RuleModuleRegistry, RulesStateStore, SimHandle};
use hexsim_world::entity::position_to_hex;
use hexsim_world::{Coord, SimulationTime, TopologyType, World};
use tracing::{info, warn};

use crate::config::WorldConfig;

/// Fixed per-tick step length for entities moving toward a `target_position`
/// rather than along an explicit `move_vector`. The data model has no speed
/// field, so a single constant stands in for "one step per tick."
const ENTITY_SEEK_STEP: f64 = 1.0;

/// Binds every substrate component — RNG streams, world, event queue,
/// command log, rules-state store, event trace, rule module registry — and
/// drives the authoritative six-phase tick. This is the only thing in the
/// workspace that mutates world/entity state; everything else acts on it
/// only through the [`SimHandle`] seam.
pub struct Simulation {
    config: WorldConfig,
    time: SimulationTime,
    world: World,
    rng_streams: RngStreams,
    event_queue: EventQueue,
    command_log: CommandLog,
    rules_state: RulesStateStore,
    event_trace: hexsim_rules::EventTrace,
    modules: RuleModuleRegistry,
}

impl Simulation {
    pub fn new_with_seed_and_topology(
        master_seed: u64,
        topology_type: TopologyType,
        topology_params: Value,
    ) -> Result<Self, SimError> {
        Self::new_with_seed_and_topology_and_config(master_seed, topology_type, topology_params, WorldConfig::default())
    }

    pub fn new_with_seed_and_topology_and_config(
        master_seed: u64,
        topology_type: TopologyType,
        topology_params: Value,
        config: WorldConfig,
    ) -> Result<Self, SimError> {
        let world = World::genesis(topology_type, topology_params)?;
        info!(master_seed, ticks_per_day = config.ticks_per_day, "simulation created");
        Ok(Self {
            time: SimulationTime::new(config.ticks_per_day),
            world,
            rng_streams: RngStreams::new(master_seed),
            event_queue: EventQueue::new(),
            command_log: CommandLog::new(),
            rules_state: RulesStateStore::new(),
            event_trace: hexsim_rules::EventTrace::new(),
            modules: RuleModuleRegistry::new(),
            config,
        })
    }

    pub fn current_tick(&self) -> u64 {
        self.time.tick
    }

    pub fn time(&self) -> SimulationTime {
        self.time
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Advances exactly one tick. A thin wrapper over `advance_ticks(1)`,
    /// kept because every caller of a tick substrate eventually wants a
    /// single-step entry point for tests and debugging.
    pub fn tick(&mut self) -> Result<(), SimError> {
        self.advance_ticks(1)
    }

    pub fn advance_ticks(&mut self, n: u64) -> Result<(), SimError> {
        for _ in 0..n {
            self.run_one_tick()?;
        }
        Ok(())
    }

    pub fn advance_days(&mut self, n: u64) -> Result<(), SimError> {
        self.advance_ticks(n.saturating_mul(self.time.ticks_per_day.max(1)))
    }

    fn run_one_tick(&mut self) -> Result<(), SimError> {
        let tick = self.time.tick;
        self.event_queue.set_current_tick(tick);

        self.dispatch_hook(tick, |module, sim, tick| module.on_tick_start(sim, tick));

        let commands = self.command_log.commands_for_tick(tick).to_vec();
        for command in &commands {
            self.apply_command(command);
        }

        let mut executed: u64 = 0;
        while let Some(event) = self.event_queue.pop_next(tick) {
            executed += 1;
            if executed > self.config.max_events_per_tick {
                return Err(SimError::RunawayEventFanout { tick, limit: self.config.max_events_per_tick });
            }
            self.dispatch_event_executed(&event);
            self.event_trace.record(event);
        }

        self.update_entities(tick)?;

        self.dispatch_hook(tick, |module, sim, tick| module.on_tick_end(sim, tick));

        self.time.advance(1);
        Ok(())
    }

    /// Runs a module hook across every registered module in registration
    /// order. Modules are temporarily taken out of `self` so each hook call
    /// can pass `self` itself as the `&mut dyn SimHandle` argument without a
    /// double mutable borrow of `self.modules`.
    fn dispatch_hook(&mut self, tick: u64, mut hook: impl FnMut(&mut Box<dyn RuleModule>, &mut dyn SimHandle, u64)) {
        let mut modules = std::mem::take(&mut self.modules);
        for module in modules.iter_mut() {
            hook(module, self, tick);
        }
        self.modules = modules;
    }

    fn dispatch_event_executed(&mut self, event: &SimEvent) {
        let mut modules = std::mem::take(&mut self.modules);
        for module in modules.iter_mut() {
            module.on_event_executed(self, event);
        }
        self.modules = modules;
    }

    /// Registers a module, running `on_simulation_start` on it before
    /// insertion. Calling the hook on the still-local `module` (rather than
    /// after `self.modules.register`) avoids holding a mutable borrow of
    /// `self.modules` at the same time `self` is needed whole as the
    /// `&mut dyn SimHandle` argument.
    pub fn register_rule_module(&mut self, mut module: Box<dyn RuleModule>) -> Result<(), SimError> {
        module.on_simulation_start(self);
        self.modules.register(module)
    }

    pub fn get_rule_module(&self, name: &str) -> Option<&dyn RuleModule> {
        self.modules.get(name)
    }

    pub fn get_rule_module_mut(&mut self, name: &str) -> Option<&mut dyn RuleModule> {
        self.modules.get_mut(name)
    }

    pub fn append_command(
        &mut self,
        tick: u64,
        entity_id: Option<String>,
        command_type: &str,
        params: Value,
    ) -> u64 {
        self.command_log.append_command(tick, entity_id, command_type, params)
    }

    pub fn schedule_event(&mut self, tick: u64, event_type: &str, params: Value) -> Result<u64, SimError> {
        self.event_queue.schedule_event(tick, event_type, params)
    }

    pub fn cancel_event(&mut self, event_id: u64) -> bool {
        self.event_queue.cancel_event(event_id)
    }

    pub fn rng_stream(&mut self, name: &str) -> &mut Generator {
        self.rng_streams.stream(name)
    }

    pub fn get_rules_state(&self, module_name: &str) -> Value {
        self.rules_state.get(module_name)
    }

    pub fn set_rules_state(&mut self, module_name: &str, value: Value) -> Result<(), SimError> {
        self.rules_state.set(module_name, value)
    }

    pub fn get_event_trace(&self) -> Vec<SimEvent> {
        self.event_trace.snapshot()
    }

    /// Hash of the full authoritative state (`world_state` + `simulation_state`
    /// + the ordered command history), computed the same way a save's
    /// `save_hash` is — so `simulation_hash()` on a freshly loaded save
    /// equals the `save_hash` it was written with.
    pub fn simulation_hash(&self) -> String {
        compute_save_hash(&self.world.to_value(), &self.simulation_state_value(), &self.input_log_value())
    }

    pub fn save_game(&self, path: &Path, metadata: Value) -> Result<(), SimError> {
        let payload =
            SavePayload::new(self.world.to_value(), self.simulation_state_value(), self.input_log_value(), metadata);
        write_save(path, &payload)
    }

    pub fn load_game(path: &Path, config: WorldConfig) -> Result<Self, SimError> {
        match read_save(path)? {
            LoadedSave::Full(payload) => Self::from_save_payload(payload, config),
            LoadedSave::LegacyWorldTemplate(_) => {
                warn!(path = %path.display(), "refusing to load a legacy world-only template as a Simulation");
                Err(SimError::SchemaInvalid(
                    "legacy world-only save has no simulation_state; load it as a world template instead".to_string(),
                ))
            }
        }
    }

    fn from_save_payload(payload: SavePayload, config: WorldConfig) -> Result<Self, SimError> {
        let world = World::from_value(&payload.world_state)?;
        let state_obj = payload
            .simulation_state
            .as_object()
            .ok_or_else(|| SimError::SchemaInvalid("simulation_state is not an object".to_string()))?;

        let time: SimulationTime = decode(state_obj, "time")?;
        let rng_state: RngStreamsState = decode(state_obj, "rng_streams")?;
        let event_queue: EventQueue = decode(state_obj, "event_queue")?;
        let rules_state: RulesStateStore = decode(state_obj, "rules_state")?;
        let mut event_trace: hexsim_rules::EventTrace = decode(state_obj, "event_trace")?;
        event_trace.rebind_cap();

        let mut command_log = CommandLog::new();
        for command_value in payload.input_log.as_array().unwrap_or(&[]) {
            let command: SimCommand = serde_json::from_value(command_value.into())
                .map_err(|e| SimError::SchemaInvalid(format!("input_log entry: {e}")))?;
            command_log.append_command(command.tick, command.entity_id, command.command_type, command.params);
        }

        info!(tick = time.tick, "simulation loaded");
        Ok(Self {
            config,
            time,
            world,
            rng_streams: RngStreams::restore(rng_state),
            event_queue,
            command_log,
            rules_state,
            event_trace,
            modules: RuleModuleRegistry::new(),
        })
    }

    /// Runs `commands` through `initial_state` using nothing but the live
    /// phase machine — no replay-specific execution path. Commands are
    /// appended to the log first (so they land in the buckets the phase
    /// machine reads from), then ticks run up to and including the highest
    /// `tick` any command targets.
    pub fn run_replay(mut initial_state: Simulation, commands: &[SimCommand]) -> Result<Simulation, SimError> {
        for command in commands {
            initial_state.command_log.append_command(
                command.tick,
                command.entity_id.clone(),
                command.command_type.clone(),
                command.params.clone(),
            );
        }
        let target_tick = commands.iter().map(|c| c.tick).max().unwrap_or(initial_state.time.tick);
        while initial_state.time.tick <= target_tick {
            initial_state.tick()?;
        }
        Ok(initial_state)
    }

    fn simulation_state_value(&self) -> Value {
        Value::Object(BTreeMap::from([
            ("time".to_string(), encode(&self.time)),
            ("rng_streams".to_string(), encode(&self.rng_streams.state())),
            ("event_queue".to_string(), encode(&self.event_queue)),
            ("rules_state".to_string(), encode(&self.rules_state)),
            ("event_trace".to_string(), encode(&self.event_trace)),
        ]))
    }

    fn input_log_value(&self) -> Value {
        Value::Array(self.command_log.all_in_order().into_iter().map(encode).collect())
    }

    fn apply_command(&mut self, command: &SimCommand) {
        let result = match command.command_type.as_str() {
            COMMAND_SET_ENTITY_MOVE_VECTOR => self.apply_set_move_vector(command),
            COMMAND_SET_ENTITY_TARGET_POSITION => self.apply_set_target_position(command),
            COMMAND_TRANSITION_SPACE => self.apply_transition_space(command),
            _ => self.forward_command_as_event(command),
        };
        if let Err(err) = result {
            warn!(
                tick = command.tick,
                command_index = command.command_index,
                command_type = %command.command_type,
                error = %err,
                "command rejected"
            );
        }
    }

    fn apply_set_move_vector(&mut self, command: &SimCommand) -> Result<(), SimError> {
        let entity_id = required_entity_id(command)?;
        let dx = required_f64(command, "dx")?;
        let dy = required_f64(command, "dy")?;
        let entity = self.world.get_entity_mut(entity_id).ok_or_else(|| unknown_entity(command, entity_id))?;
        entity.move_vector = (dx, dy);
        entity.target_position = None;
        Ok(())
    }

    fn apply_set_target_position(&mut self, command: &SimCommand) -> Result<(), SimError> {
        let entity_id = required_entity_id(command)?;
        let x = required_f64(command, "x")?;
        let y = required_f64(command, "y")?;
        let entity = self.world.get_entity_mut(entity_id).ok_or_else(|| unknown_entity(command, entity_id))?;
        entity.target_position = Some((x, y));
        Ok(())
    }

    fn apply_transition_space(&mut self, command: &SimCommand) -> Result<(), SimError> {
        let entity_id = required_entity_id(command)?;
        let space_id = command
            .params
            .get("space_id")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid_command(command, "transition_space requires string 'space_id'"))?
            .to_string();
        if !self.world.spaces.contains_key(&space_id) {
            return Err(invalid_command(command, &format!("unknown space {space_id:?}")));
        }
        let position = match command.params.get("position").and_then(Value::as_array) {
            Some([x, y]) => {
                let x = value_as_f64(x).ok_or_else(|| invalid_command(command, "'position' entries must be numeric"))?;
                let y = value_as_f64(y).ok_or_else(|| invalid_command(command, "'position' entries must be numeric"))?;
                Some((x, y))
            }
            Some(_) => return Err(invalid_command(command, "'position' must have exactly 2 entries")),
            None => None,
        };
        let entity = self.world.get_entity_mut(entity_id).ok_or_else(|| unknown_entity(command, entity_id))?;
        entity.space_id = space_id;
        if let Some(position) = position {
            entity.set_position(position);
        }
        entity.move_vector = (0.0, 0.0);
        entity.target_position = None;
        Ok(())
    }

    /// Any command type not reserved by the substrate carries no built-in
    /// semantics: it is forwarded as a same-tick event of the same type and
    /// params, so rule modules can react to it through `on_event_executed`,
    /// the only per-event hook they have.
    fn forward_command_as_event(&mut self, command: &SimCommand) -> Result<(), SimError> {
        let mut params = command.params.clone();
        if let Value::Object(map) = &mut params {
            if let Some(entity_id) = &command.entity_id {
                map.entry("entity_id".to_string()).or_insert_with(|| Value::String(entity_id.clone()));
            }
        }
        self.event_queue.schedule_event(command.tick, &command.command_type, params).map(|_| ())
    }

    fn update_entities(&mut self, tick: u64) -> Result<(), SimError> {
        let entity_ids: Vec<String> = self.world.entities.keys().cloned().collect();
        for entity_id in entity_ids {
            self.update_one_entity(tick, &entity_id)?;
        }
        self.world.validate(tick)
    }

    /// Advances one entity by its `move_vector` (preferred) or a
    /// target-seek vector, clamped to a valid cell of its space's topology.
    /// A proposed position that lands outside any cell is rejected outright
    /// — the entity stays put rather than sliding partway to the boundary.
    fn update_one_entity(&mut self, tick: u64, entity_id: &str) -> Result<(), SimError> {
        let (space_id, topology_type, old_position, proposed_position, old_hex) = {
            let entity = self.world.get_entity(entity_id).ok_or_else(|| SimError::InvariantViolation {
                tick,
                reason: format!("entity {entity_id:?} vanished during the entity-update phase"),
            })?;
            let space = self.world.get_space(&entity.space_id).ok_or_else(|| SimError::InvariantViolation {
                tick,
                reason: format!("entity {entity_id:?} references unknown space {:?}", entity.space_id),
            })?;
            let step = if entity.move_vector != (0.0, 0.0) {
                entity.move_vector
            } else if let Some(target) = entity.target_position {
                seek_vector(entity.position, target)
            } else {
                (0.0, 0.0)
            };
            let proposed = (entity.position.0 + step.0, entity.position.1 + step.1);
            (entity.space_id.clone(), space.topology_type, entity.position, proposed, entity.hex_coord)
        };

        if proposed_position == old_position {
            return Ok(());
        }

        let cell_key = topology_cell_key(topology_type, proposed_position);
        let space = self.world.get_space(&space_id).ok_or_else(|| SimError::InvariantViolation {
            tick,
            reason: format!("space {space_id:?} vanished during the entity-update phase"),
        })?;
        let accepted_position = if space.contains_cell(&cell_key) { proposed_position } else { old_position };

        let new_hex = {
            let entity = self.world.get_entity_mut(entity_id).ok_or_else(|| SimError::InvariantViolation {
                tick,
                reason: format!("entity {entity_id:?} vanished during the entity-update phase"),
            })?;
            entity.set_position(accepted_position);
            if let Some(target) = entity.target_position {
                if entity.position == target {
                    entity.target_position = None;
                    entity.move_vector = (0.0, 0.0);
                }
            }
            entity.hex_coord
        };

        if new_hex != old_hex {
            // Entity-update runs after this tick's event-drain phase, so an
            // event scheduled here for `tick` would never be popped — it'd
            // sit in an already-closed bucket. Scheduling for `tick + 1`
            // lets it drain and dispatch through the normal phase-3 path on
            // the next tick instead of being orphaned.
            let params = Value::Object(BTreeMap::from([
                ("tick".to_string(), Value::Int(tick as i64)),
                ("entity_id".to_string(), Value::String(entity_id.to_string())),
                ("location_from".to_string(), Value::String(old_hex.canonical_key())),
                ("location_to".to_string(), Value::String(new_hex.canonical_key())),
            ]));
            self.event_queue.schedule_event(tick + 1, EVENT_TYPE_TRAVEL_STEP, params)?;
        }
        Ok(())
    }
}

impl SimHandle for Simulation {
    fn current_tick(&self) -> u64 {
        self.current_tick()
    }

    fn append_command(&mut self, tick: u64, entity_id: Option<String>, command_type: &str, params: Value) -> u64 {
        self.append_command(tick, entity_id, command_type, params)
    }

    fn schedule_event(&mut self, tick: u64, event_type: &str, params: Value) -> Result<u64, SimError> {
        self.schedule_event(tick, event_type, params)
    }

    fn cancel_event(&mut self, event_id: u64) -> bool {
        self.cancel_event(event_id)
    }

    fn pending_events_of_type(&self, event_type: &str) -> Vec<SimEvent> {
        self.event_queue.pending_from(0).into_iter().filter(|e| e.event_type == event_type).cloned().collect()
    }

    fn get_rules_state(&self, module_name: &str) -> Value {
        self.get_rules_state(module_name)
    }

    fn set_rules_state(&mut self, module_name: &str, value: Value) -> Result<(), SimError> {
        self.set_rules_state(module_name, value)
    }

    fn rng_stream(&mut self, name: &str) -> &mut Generator {
        self.rng_stream(name)
    }
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Float(f) => Some(*f),
        Value::Int(i) => Some(*i as f64),
        _ => None,
    }
}

fn required_entity_id(command: &SimCommand) -> Result<&str, SimError> {
    command
        .entity_id
        .as_deref()
        .ok_or_else(|| invalid_command(command, &format!("{} requires entity_id", command.command_type)))
}

fn required_f64(command: &SimCommand, field: &str) -> Result<f64, SimError> {
    command
        .params
        .get(field)
        .and_then(value_as_f64)
        .ok_or_else(|| invalid_command(command, &format!("requires numeric '{field}'")))
}

fn invalid_command(command: &SimCommand, reason: &str) -> SimError {
    SimError::InvalidCommand { tick: command.tick, reason: reason.to_string() }
}

fn unknown_entity(command: &SimCommand, entity_id: &str) -> SimError {
    invalid_command(command, &format!("unknown entity {entity_id:?}"))
}

fn seek_vector(position: (f64, f64), target: (f64, f64)) -> (f64, f64) {
    let dx = target.0 - position.0;
    let dy = target.1 - position.1;
    let distance = (dx * dx + dy * dy).sqrt();
    if distance <= ENTITY_SEEK_STEP || distance == 0.0 {
        (dx, dy)
    } else {
        (dx / distance * ENTITY_SEEK_STEP, dy / distance * ENTITY_SEEK_STEP)
    }
}

fn topology_cell_key(topology_type: TopologyType, position: (f64, f64)) -> String {
    match topology_type {
        TopologyType::HexAxial => position_to_hex(position).canonical_key(),
        TopologyType::SquareGrid => {
            Coord::Square { x: position.0.round() as i32, y: position.1.round() as i32 }.canonical_key()
        }
    }
}

fn encode<T: serde::Serialize>(value: T) -> Value {
    Value::from(serde_json::to_value(value).unwrap_or(serde_json::Value::Null))
}

fn decode<T: serde::de::DeserializeOwned>(obj: &BTreeMap<String, Value>, field: &str) -> Result<T, SimError> {
    let value = obj.get(field).cloned().unwrap_or_else(Value::object);
    let json: serde_json::Value = (&value).into();
    serde_json::from_value(json).map_err(|e| SimError::SchemaInvalid(format!("simulation_state.{field}: {e}")))
}
