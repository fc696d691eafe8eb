//! Entity definitions for the navigable world.

mod item;
mod vector;

pub use item::*;
pub use vector::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque handle to a live world object.
///
/// The world mints one per spawned object and keeps it for as long as the
/// object stays live, so a scan can diff handles instead of comparing
/// records. The index only compares and hashes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Mint a handle for a newly spawned object.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Fixture records without an explicit id still get a unique handle.
impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

/// Log fields show the first eight hex digits, which is enough to tell live
/// objects apart in a scan trace. `Debug` keeps the full value.
impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bytes = self.0.as_bytes();
        write!(
            f,
            "{:02x}{:02x}{:02x}{:02x}",
            bytes[0], bytes[1], bytes[2], bytes[3]
        )
    }
}

/// Classification used to browse entities one kind at a time.
///
/// `All` is a browsing mode rather than a real entity kind: the category
/// filter lets every item through when it is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    All,
    Chest,
    Npc,
    MapExit,
    Event,
    Vehicle,
    Waypoint,
}

impl Category {
    /// Browsing order used when switching categories.
    pub const CYCLE_ORDER: [Category; 7] = [
        Category::All,
        Category::Chest,
        Category::Npc,
        Category::MapExit,
        Category::Event,
        Category::Vehicle,
        Category::Waypoint,
    ];

    /// The category after this one, wrapping around.
    pub fn next(self) -> Self {
        let index = self.cycle_position();
        Self::CYCLE_ORDER[(index + 1) % Self::CYCLE_ORDER.len()]
    }

    /// The category before this one, wrapping around.
    pub fn previous(self) -> Self {
        let index = self.cycle_position();
        let len = Self::CYCLE_ORDER.len();
        Self::CYCLE_ORDER[(index + len - 1) % len]
    }

    /// Human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Category::All => "All",
            Category::Chest => "Chests",
            Category::Npc => "NPCs",
            Category::MapExit => "Map Exits",
            Category::Event => "Events",
            Category::Vehicle => "Vehicles",
            Category::Waypoint => "Waypoints",
        }
    }

    fn cycle_position(self) -> usize {
        Self::CYCLE_ORDER
            .iter()
            .position(|c| *c == self)
            .unwrap_or(0)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_next_wraps() {
        assert_eq!(Category::All.next(), Category::Chest);
        assert_eq!(Category::Waypoint.next(), Category::All);
    }

    #[test]
    fn test_category_previous_wraps() {
        assert_eq!(Category::All.previous(), Category::Waypoint);
        assert_eq!(Category::Npc.previous(), Category::Chest);
    }

    #[test]
    fn test_category_serde_names() {
        let json = serde_json::to_string(&Category::MapExit).unwrap();
        assert_eq!(json, "\"map_exit\"");

        let parsed: Category = serde_json::from_str("\"npc\"").unwrap();
        assert_eq!(parsed, Category::Npc);
    }

    #[test]
    fn test_entity_id_uniqueness() {
        assert_ne!(EntityId::new(), EntityId::new());
        assert_ne!(EntityId::default(), EntityId::default());
    }

    #[test]
    fn test_entity_id_round_trips_host_handle() {
        let json = "\"3f2a9c41-0b7d-4e8a-9a21-5c6d7e8f9012\"";
        let id: EntityId = serde_json::from_str(json).unwrap();

        assert_eq!(id.to_string(), "3f2a9c41");
        assert_eq!(serde_json::to_string(&id).unwrap(), json);
    }
}
