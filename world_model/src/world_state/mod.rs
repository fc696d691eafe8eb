//! In-memory world: raw entity records plus the player position.
//!
//! `WorldState` is the reference host for the navigation core. It implements
//! every provider contract through [`SharedWorld`], so hosts without their own
//! engine binding (and the test suites) can drive the core directly.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;
use tracing::debug;

use crate::entities::{Category, EntityId, IndividualItem, Vector3};
use crate::providers::{ItemFactory, PathLookup, PathResult, PositionProvider, WorldSnapshot};

/// Errors raised while loading a world description.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("failed to parse world description: {0}")]
    Parse(#[from] serde_json::Error),
}

fn default_true() -> bool {
    true
}

/// A raw object as the world reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldEntity {
    #[serde(default)]
    pub id: EntityId,
    pub name: String,
    /// Friendlier name for announcements, falls back to `name`.
    #[serde(default)]
    pub display_name: Option<String>,
    pub category: Category,
    #[serde(default)]
    pub position: Vector3,
    /// Non-interactive objects are never navigable.
    #[serde(default = "default_true")]
    pub interactive: bool,
    /// Whether a path to this object exists.
    #[serde(default = "default_true")]
    pub reachable: bool,
}

impl WorldEntity {
    /// Create a new interactive, reachable entity.
    pub fn new(name: impl Into<String>, category: Category, position: Vector3) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            display_name: None,
            category,
            position,
            interactive: true,
            reachable: true,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn non_interactive(mut self) -> Self {
        self.interactive = false;
        self
    }

    pub fn unreachable(mut self) -> Self {
        self.reachable = false;
        self
    }
}

/// The complete state of the in-memory world.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WorldState {
    /// Live objects in spawn order.
    #[serde(default)]
    pub entities: Vec<WorldEntity>,

    /// `None` while the player is not spawned.
    #[serde(default)]
    pub player_position: Option<Vector3>,

    /// Objects farther than this from the player are not navigable.
    #[serde(default)]
    pub scan_radius: Option<f32>,

    /// Simulates a world that cannot be queried (loading screen).
    #[serde(default)]
    pub offline: bool,
}

impl WorldState {
    /// Create a new empty world with the player at the origin.
    pub fn new() -> Self {
        Self {
            player_position: Some(Vector3::ZERO),
            ..Self::default()
        }
    }

    /// Load a world description from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, WorldError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Add an entity to the world.
    pub fn spawn(&mut self, entity: WorldEntity) -> EntityId {
        let id = entity.id;
        self.entities.push(entity);
        id
    }

    /// Remove an entity from the world.
    pub fn despawn(&mut self, id: EntityId) -> Option<WorldEntity> {
        let index = self.entities.iter().position(|e| e.id == id)?;
        Some(self.entities.remove(index))
    }

    /// Move an entity. Returns false when the entity does not exist.
    pub fn move_entity(&mut self, id: EntityId, position: Vector3) -> bool {
        match self.get_entity_mut(id) {
            Some(entity) => {
                entity.position = position;
                true
            }
            None => false,
        }
    }

    pub fn set_player_position(&mut self, position: Vector3) {
        self.player_position = Some(position);
    }

    /// Get entity by ID.
    pub fn get_entity(&self, id: EntityId) -> Option<&WorldEntity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Get mutable entity by ID.
    pub fn get_entity_mut(&mut self, id: EntityId) -> Option<&mut WorldEntity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    fn build_item(&self, id: EntityId, player_position: Vector3) -> Option<IndividualItem> {
        let entity = self.get_entity(id)?;

        if !entity.interactive {
            debug!(entity = %id, name = %entity.name, "item_rejected_non_interactive");
            return None;
        }
        if entity.name.trim().is_empty() {
            debug!(entity = %id, "item_rejected_unnamed");
            return None;
        }
        if let Some(radius) = self.scan_radius {
            if entity.position.distance(&player_position) > radius {
                return None;
            }
        }

        let display_name = entity
            .display_name
            .clone()
            .unwrap_or_else(|| entity.name.clone());
        Some(
            IndividualItem::new(id, entity.name.clone(), entity.category, entity.position)
                .with_display_name(display_name),
        )
    }

    fn path_between(&self, from: Vector3, to: Vector3) -> PathResult {
        if self.offline {
            return PathResult::not_found("world unavailable");
        }
        let blocked = self
            .entities
            .iter()
            .any(|e| e.position == to && !e.reachable);
        if blocked {
            PathResult::not_found("no path")
        } else {
            PathResult::found(format!("{:.0} meters", from.distance(&to)))
        }
    }
}

/// Cloneable single-threaded handle to a [`WorldState`].
///
/// The navigation core holds its collaborators behind `Rc`, and the host keeps
/// a clone to mutate the world between scans.
#[derive(Debug, Clone, Default)]
pub struct SharedWorld(Rc<RefCell<WorldState>>);

impl SharedWorld {
    pub fn new(state: WorldState) -> Self {
        Self(Rc::new(RefCell::new(state)))
    }

    /// Mutate the world in place.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut WorldState) -> R) -> R {
        f(&mut self.0.borrow_mut())
    }
}

impl WorldSnapshot for SharedWorld {
    fn list_live_identities(&self) -> Option<Vec<EntityId>> {
        let state = self.0.borrow();
        if state.offline {
            return None;
        }
        Some(state.entities.iter().map(|e| e.id).collect())
    }

    fn position_of(&self, id: EntityId) -> Option<Vector3> {
        self.0.borrow().get_entity(id).map(|e| e.position)
    }
}

impl ItemFactory for SharedWorld {
    fn try_build(&self, id: EntityId, player_position: Vector3) -> Option<IndividualItem> {
        self.0.borrow().build_item(id, player_position)
    }
}

impl PositionProvider for SharedWorld {
    fn current_position(&self) -> Option<Vector3> {
        let state = self.0.borrow();
        if state.offline {
            return None;
        }
        state.player_position
    }
}

impl PathLookup for SharedWorld {
    fn find_path(&self, from: Vector3, to: Vector3) -> PathResult {
        self.0.borrow().path_between(from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_and_despawn() {
        let mut state = WorldState::new();
        let id = state.spawn(WorldEntity::new("Chest", Category::Chest, Vector3::ZERO));

        assert_eq!(state.entity_count(), 1);
        assert!(state.get_entity(id).is_some());

        let removed = state.despawn(id);
        assert_eq!(removed.unwrap().name, "Chest");
        assert_eq!(state.entity_count(), 0);
        assert!(state.despawn(id).is_none());
    }

    #[test]
    fn test_move_entity() {
        let mut state = WorldState::new();
        let id = state.spawn(WorldEntity::new("Cart", Category::Vehicle, Vector3::ZERO));

        assert!(state.move_entity(id, Vector3::new(1.0, 2.0, 3.0)));
        assert_eq!(state.get_entity(id).unwrap().position, Vector3::new(1.0, 2.0, 3.0));
        assert!(!state.move_entity(EntityId::new(), Vector3::ZERO));
    }

    #[test]
    fn test_factory_rejects_non_interactive_and_unnamed() {
        let world = SharedWorld::new(WorldState::new());
        let (decor, unnamed, chest) = world.with_mut(|w| {
            (
                w.spawn(WorldEntity::new("Rock", Category::Event, Vector3::ZERO).non_interactive()),
                w.spawn(WorldEntity::new("  ", Category::Chest, Vector3::ZERO)),
                w.spawn(WorldEntity::new("Chest", Category::Chest, Vector3::ZERO)),
            )
        });

        assert!(world.try_build(decor, Vector3::ZERO).is_none());
        assert!(world.try_build(unnamed, Vector3::ZERO).is_none());
        assert!(world.try_build(chest, Vector3::ZERO).is_some());
        assert!(world.try_build(EntityId::new(), Vector3::ZERO).is_none());
    }

    #[test]
    fn test_factory_applies_scan_radius() {
        let world = SharedWorld::new(WorldState {
            scan_radius: Some(10.0),
            ..WorldState::new()
        });
        let far = world.with_mut(|w| {
            w.spawn(WorldEntity::new("Far", Category::Npc, Vector3::new(20.0, 0.0, 0.0)))
        });

        assert!(world.try_build(far, Vector3::ZERO).is_none());
        assert!(world.try_build(far, Vector3::new(15.0, 0.0, 0.0)).is_some());
    }

    #[test]
    fn test_factory_display_name() {
        let world = SharedWorld::new(WorldState::new());
        let id = world.with_mut(|w| {
            w.spawn(
                WorldEntity::new("npc_smith", Category::Npc, Vector3::ZERO)
                    .with_display_name("Blacksmith"),
            )
        });

        let item = world.try_build(id, Vector3::ZERO).unwrap();
        assert_eq!(item.display_name, "Blacksmith");
        assert_eq!(item.raw_name, "npc_smith");
        assert_eq!(item.category, Category::Npc);
    }

    #[test]
    fn test_offline_world_is_unavailable() {
        let world = SharedWorld::new(WorldState::new());
        world.with_mut(|w| w.offline = true);

        assert!(world.list_live_identities().is_none());
        assert!(world.current_position().is_none());
        assert!(!world.find_path(Vector3::ZERO, Vector3::ZERO).success);
    }

    #[test]
    fn test_path_lookup_respects_reachability() {
        let world = SharedWorld::new(WorldState::new());
        let target = Vector3::new(3.0, 4.0, 0.0);
        world.with_mut(|w| {
            w.spawn(WorldEntity::new("Locked", Category::Chest, target).unreachable());
        });

        assert!(!world.find_path(Vector3::ZERO, target).success);

        let open = world.find_path(Vector3::ZERO, Vector3::new(6.0, 8.0, 0.0));
        assert!(open.success);
        assert_eq!(open.description, "10 meters");
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "player_position": { "x": 1.0, "y": 0.0, "z": 0.0 },
            "entities": [
                { "name": "Chest", "category": "chest", "position": { "x": 2.0, "y": 0.0, "z": 0.0 } },
                { "name": "Gate", "category": "map_exit", "interactive": false }
            ]
        }"#;

        let state = WorldState::from_json_str(json).unwrap();
        assert_eq!(state.entity_count(), 2);
        assert_eq!(state.player_position, Some(Vector3::new(1.0, 0.0, 0.0)));
        assert!(state.entities[0].interactive);
        assert!(!state.entities[1].interactive);
        assert_ne!(state.entities[0].id, state.entities[1].id);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = WorldState::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, WorldError::Parse(_)));
    }
}
