use std::collections::BTreeMap;

use hexsim_codec::Value;
use hexsim_error::SimError;
use tracing::debug;

use crate::coord::TopologyType;
use crate::entity::{Container, Entity};
use crate::genesis::genesis_space;
use crate::ledger::BoundedLedger;
use crate::limits::{MAX_OCCLUSION_EDGES, MAX_RUMORS, MAX_SIGNALS, MAX_SPAWN_DESCRIPTORS, MAX_TRACKS};
use crate::space::SpaceState;

/// The world: every space, entity, and container, plus the bounded
/// ambient ledgers the substrate itself owns. Mutated only by the tick
/// phase machine in `apps/engine`; nothing here advances a tick on its
/// own.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct World {
    pub spaces: BTreeMap<String, SpaceState>,
    pub entities: BTreeMap<String, Entity>,
    pub containers: BTreeMap<String, Container>,
    pub signals: BoundedLedger<Value>,
    pub tracks: BoundedLedger<Value>,
    pub rumors: BoundedLedger<Value>,
    pub spawn_descriptors: BoundedLedger<Value>,
    pub occlusion_edges: BoundedLedger<Value>,
}

impl World {
    /// Build a fresh world with a single `"overworld"` space of the given
    /// topology. This is the world-state half of
    /// `Simulation::new_with_seed_and_topology`; the simulation layer adds
    /// the RNG streams, event queue, and rules-state store around it.
    pub fn genesis(topology_type: TopologyType, topology_params: Value) -> Result<Self, SimError> {
        let space = genesis_space(topology_type, topology_params)?;
        let mut spaces = BTreeMap::new();
        spaces.insert(space.space_id.clone(), space);
        Ok(Self {
            spaces,
            entities: BTreeMap::new(),
            containers: BTreeMap::new(),
            signals: BoundedLedger::new(MAX_SIGNALS),
            tracks: BoundedLedger::new(MAX_TRACKS),
            rumors: BoundedLedger::new(MAX_RUMORS),
            spawn_descriptors: BoundedLedger::new(MAX_SPAWN_DESCRIPTORS),
            occlusion_edges: BoundedLedger::new(MAX_OCCLUSION_EDGES),
        })
    }

    /// Re-establish ledger caps after deserializing from a save, where
    /// caps are intentionally not persisted (they're a substrate constant,
    /// not world data).
    pub fn rebind_ledger_caps(&mut self) {
        self.signals = std::mem::replace(&mut self.signals, BoundedLedger::new(0)).with_cap(MAX_SIGNALS);
        self.tracks = std::mem::replace(&mut self.tracks, BoundedLedger::new(0)).with_cap(MAX_TRACKS);
        self.rumors = std::mem::replace(&mut self.rumors, BoundedLedger::new(0)).with_cap(MAX_RUMORS);
        self.spawn_descriptors =
            std::mem::replace(&mut self.spawn_descriptors, BoundedLedger::new(0)).with_cap(MAX_SPAWN_DESCRIPTORS);
        self.occlusion_edges =
            std::mem::replace(&mut self.occlusion_edges, BoundedLedger::new(0)).with_cap(MAX_OCCLUSION_EDGES);
    }

    /// Checks the invariants that must hold after every tick: every
    /// entity's space exists, every entity's inventory container (if any)
    /// exists. `tick` is only used to annotate the error.
    pub fn validate(&self, tick: u64) -> Result<(), SimError> {
        for entity in self.entities.values() {
            if !self.spaces.contains_key(&entity.space_id) {
                return Err(SimError::InvariantViolation {
                    tick,
                    reason: format!("entity {:?} references unknown space {:?}", entity.id, entity.space_id),
                });
            }
            if let Some(container_id) = &entity.inventory_container_id {
                if !self.containers.contains_key(container_id) {
                    return Err(SimError::InvariantViolation {
                        tick,
                        reason: format!(
                            "entity {:?} references unknown inventory container {:?}",
                            entity.id, container_id
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn add_entity(&mut self, entity: Entity) {
        debug!(entity = %entity.id, space = %entity.space_id, "adding entity");
        self.entities.insert(entity.id.clone(), entity);
    }

    pub fn add_container(&mut self, container: Container) {
        self.containers.insert(container.id.clone(), container);
    }

    pub fn get_space(&self, space_id: &str) -> Option<&SpaceState> {
        self.spaces.get(space_id)
    }

    pub fn get_entity(&self, entity_id: &str) -> Option<&Entity> {
        self.entities.get(entity_id)
    }

    pub fn get_entity_mut(&mut self, entity_id: &str) -> Option<&mut Entity> {
        self.entities.get_mut(entity_id)
    }

    /// Converts the world to its canonical [`Value`] representation. This
    /// is what feeds `canonical_encode`/`hash` for `world_state` inside a
    /// save, so it must capture full content, not just identity — every
    /// field that can change state must appear here.
    pub fn to_value(&self) -> Value {
        Value::from(serde_json::to_value(self).unwrap_or(serde_json::Value::Null))
    }

    pub fn from_value(value: &Value) -> Result<Self, SimError> {
        let json: serde_json::Value = value.into();
        let mut world: World =
            serde_json::from_value(json).map_err(|e| SimError::SchemaInvalid(format!("world_state: {e}")))?;
        world.rebind_ledger_caps();
        world.validate(0)?;
        Ok(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap as Map;

    fn hex_disk(radius: i64) -> World {
        let params = Value::Object(Map::from([("radius".to_string(), Value::Int(radius))]));
        World::genesis(TopologyType::HexAxial, params).unwrap()
    }

    #[test]
    fn genesis_world_validates_cleanly() {
        let world = hex_disk(2);
        assert!(world.validate(0).is_ok());
    }

    #[test]
    fn entity_with_unknown_space_fails_validation() {
        let mut world = hex_disk(1);
        world.add_entity(Entity::new("ghost", "nowhere", (0.0, 0.0)));
        let err = world.validate(3).unwrap_err();
        match err {
            SimError::InvariantViolation { tick, .. } => assert_eq!(tick, 3),
            other => panic!("expected InvariantViolation, got {other:?}"),
        }
    }

    #[test]
    fn entity_with_unknown_container_fails_validation() {
        let mut world = hex_disk(1);
        let mut e = Entity::new("e1", "overworld", (0.0, 0.0));
        e.inventory_container_id = Some("missing-bag".to_string());
        world.add_entity(e);
        assert!(world.validate(0).is_err());
    }

    #[test]
    fn from_value_rejects_a_dangling_entity_space_id() {
        let mut world = hex_disk(1);
        world.add_entity(Entity::new("ghost", "overworld", (0.0, 0.0)));
        let mut value = world.to_value();
        if let Value::Object(map) = &mut value {
            if let Some(Value::Object(entities)) = map.get_mut("entities") {
                if let Some(Value::Object(ghost)) = entities.get_mut("ghost") {
                    ghost.insert("space_id".to_string(), Value::String("nowhere".to_string()));
                }
            }
        }
        let err = World::from_value(&value).unwrap_err();
        assert!(matches!(err, SimError::InvariantViolation { .. }));
    }

    #[test]
    fn value_round_trip_preserves_content() {
        let mut world = hex_disk(1);
        world.add_entity(Entity::new("e1", "overworld", (1.0, 1.0)));
        let value = world.to_value();
        let restored = World::from_value(&value).unwrap();
        assert_eq!(restored.entities.len(), 1);
        assert_eq!(restored.to_value(), value);
    }

    #[test]
    fn ledger_caps_are_enforced_after_round_trip() {
        let mut world = hex_disk(0);
        for i in 0..(MAX_SIGNALS + 5) {
            world.signals.push(Value::Int(i as i64));
        }
        let value = world.to_value();
        let mut restored = World::from_value(&value).unwrap();
        assert_eq!(restored.signals.len(), MAX_SIGNALS);
        restored.signals.push(Value::Int(999));
        assert_eq!(restored.signals.len(), MAX_SIGNALS);
    }
}
