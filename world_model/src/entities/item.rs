//! Individual navigable items as built from raw world entities.

use serde::{Deserialize, Serialize};

use super::{Category, EntityId, Vector3};

/// A single world object the user can land on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualItem {
    pub id: EntityId,
    pub position: Vector3,
    pub category: Category,
    /// Name meant for announcements.
    pub display_name: String,
    /// Name as reported by the world, used for grouping.
    pub raw_name: String,
}

impl IndividualItem {
    /// Create a new item whose display name matches its raw name.
    pub fn new(
        id: EntityId,
        raw_name: impl Into<String>,
        category: Category,
        position: Vector3,
    ) -> Self {
        let raw_name = raw_name.into();
        Self {
            id,
            position,
            category,
            display_name: raw_name.clone(),
            raw_name,
        }
    }

    /// Override the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn distance_to(&self, point: &Vector3) -> f32 {
        self.position.distance(point)
    }
}
