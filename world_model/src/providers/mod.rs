//! Contracts the navigation core uses to talk to the host.
//!
//! Every provider may be temporarily unavailable (a loading screen, a scene
//! transition). Unavailability is expressed as `None`, never as a panic, and
//! the core treats it as "keep the last known state".

use serde::{Deserialize, Serialize};

use crate::entities::{EntityId, IndividualItem, Vector3};

/// Enumerates the raw world objects currently present.
pub trait WorldSnapshot {
    /// Identities of every live object, or `None` when the world cannot be read.
    fn list_live_identities(&self) -> Option<Vec<EntityId>>;

    /// Current position of a live object.
    fn position_of(&self, id: EntityId) -> Option<Vector3>;
}

/// Turns a raw identity into a navigable item.
pub trait ItemFactory {
    /// Returns `None` for objects that are not navigable (non-interactive,
    /// malformed, or already gone).
    fn try_build(&self, id: EntityId, player_position: Vector3) -> Option<IndividualItem>;
}

/// Resolves where the player currently stands.
pub trait PositionProvider {
    fn current_position(&self) -> Option<Vector3>;
}

/// Outcome of a path query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathResult {
    pub success: bool,
    pub description: String,
}

impl PathResult {
    pub fn found(description: impl Into<String>) -> Self {
        Self {
            success: true,
            description: description.into(),
        }
    }

    pub fn not_found(description: impl Into<String>) -> Self {
        Self {
            success: false,
            description: description.into(),
        }
    }
}

/// Opaque path computation between two points.
pub trait PathLookup {
    fn find_path(&self, from: Vector3, to: Vector3) -> PathResult;
}
