//! Navigable items: individuals and the groups strategies merge them into.

use serde::{Deserialize, Serialize};
use world_model::{Category, EntityId, IndividualItem, Vector3};

/// Identifies a group: the strategy that produced it plus the key it derived.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    pub strategy: String,
    pub key: String,
}

impl GroupKey {
    pub fn new(strategy: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            strategy: strategy.into(),
            key: key.into(),
        }
    }
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.strategy, self.key)
    }
}

/// Stable identity of a navigable item across scans.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKey {
    Individual(EntityId),
    Group(GroupKey),
}

impl std::fmt::Display for ItemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKey::Individual(id) => write!(f, "entity:{}", id),
            ItemKey::Group(key) => write!(f, "group:{}", key),
        }
    }
}

/// Several individuals presented as one navigable entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupEntity {
    pub key: GroupKey,
    /// Presentation label chosen by the strategy when the group was created.
    pub label: String,
    /// Category of the first member, captured at creation.
    pub category: Category,
    members: Vec<IndividualItem>,
}

impl GroupEntity {
    /// Create a group seeded with its first member.
    pub fn new(key: GroupKey, label: impl Into<String>, first: IndividualItem) -> Self {
        Self {
            key,
            label: label.into(),
            category: first.category,
            members: vec![first],
        }
    }

    pub fn members(&self) -> &[IndividualItem] {
        &self.members
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub(crate) fn push(&mut self, member: IndividualItem) {
        self.members.push(member);
    }

    pub(crate) fn remove(&mut self, id: EntityId) -> Option<IndividualItem> {
        let index = self.members.iter().position(|m| m.id == id)?;
        Some(self.members.remove(index))
    }

    pub(crate) fn member_mut(&mut self, id: EntityId) -> Option<&mut IndividualItem> {
        self.members.iter_mut().find(|m| m.id == id)
    }

    /// The member standing in for the whole group.
    pub fn representative(&self) -> Option<&IndividualItem> {
        self.members.first()
    }

    pub fn display_name(&self) -> String {
        match self.members.len() {
            0 | 1 => self.label.clone(),
            n => format!("{} ({})", self.label, n),
        }
    }
}

/// A unit the user can select and cycle through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NavigableItem {
    Individual(IndividualItem),
    Group(GroupEntity),
}

impl NavigableItem {
    pub fn key(&self) -> ItemKey {
        match self {
            NavigableItem::Individual(item) => ItemKey::Individual(item.id),
            NavigableItem::Group(group) => ItemKey::Group(group.key.clone()),
        }
    }

    /// World position. An empty group has none.
    pub fn position(&self) -> Option<Vector3> {
        match self {
            NavigableItem::Individual(item) => Some(item.position),
            NavigableItem::Group(group) => group.representative().map(|m| m.position),
        }
    }

    pub fn category(&self) -> Category {
        match self {
            NavigableItem::Individual(item) => item.category,
            NavigableItem::Group(group) => group.category,
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            NavigableItem::Individual(item) => item.display_name.clone(),
            NavigableItem::Group(group) => group.display_name(),
        }
    }

    pub fn raw_name(&self) -> &str {
        match self {
            NavigableItem::Individual(item) => &item.raw_name,
            NavigableItem::Group(group) => group
                .representative()
                .map(|m| m.raw_name.as_str())
                .unwrap_or(group.label.as_str()),
        }
    }

    /// Identity used to keep a selection alive when grouping changes.
    pub fn anchor(&self) -> Option<EntityId> {
        match self {
            NavigableItem::Individual(item) => Some(item.id),
            NavigableItem::Group(group) => group.representative().map(|m| m.id),
        }
    }

    /// Distance from `point`; items without a position sort last.
    pub fn distance_to(&self, point: &Vector3) -> f32 {
        self.position()
            .map(|p| p.distance(point))
            .unwrap_or(f32::INFINITY)
    }

    pub fn is_group(&self) -> bool {
        matches!(self, NavigableItem::Group(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chest(name: &str, x: f32) -> IndividualItem {
        IndividualItem::new(EntityId::new(), name, Category::Chest, Vector3::new(x, 0.0, 0.0))
    }

    #[test]
    fn test_group_takes_first_member_category_and_position() {
        let first = chest("Chest", 4.0);
        let mut group = GroupEntity::new(GroupKey::new("test", "k"), "Chests", first.clone());
        group.push(IndividualItem::new(
            EntityId::new(),
            "Npc",
            Category::Npc,
            Vector3::new(1.0, 0.0, 0.0),
        ));

        let item = NavigableItem::Group(group);
        assert_eq!(item.category(), Category::Chest);
        assert_eq!(item.position(), Some(first.position));
        assert_eq!(item.anchor(), Some(first.id));
    }

    #[test]
    fn test_group_display_name_counts_members() {
        let mut group = GroupEntity::new(GroupKey::new("test", "k"), "Door", chest("a", 0.0));
        assert_eq!(group.display_name(), "Door");

        group.push(chest("b", 0.0));
        assert_eq!(group.display_name(), "Door (2)");
    }

    #[test]
    fn test_empty_group_has_no_position() {
        let first = chest("a", 1.0);
        let id = first.id;
        let mut group = GroupEntity::new(GroupKey::new("test", "k"), "a", first);
        assert!(group.remove(id).is_some());
        assert!(group.is_empty());

        let item = NavigableItem::Group(group);
        assert!(item.position().is_none());
        assert!(item.anchor().is_none());
        assert_eq!(item.distance_to(&Vector3::ZERO), f32::INFINITY);
    }

    #[test]
    fn test_item_keys() {
        let single = chest("a", 0.0);
        let id = single.id;
        assert_eq!(NavigableItem::Individual(single).key(), ItemKey::Individual(id));

        let group = GroupEntity::new(GroupKey::new("s", "k"), "a", chest("b", 0.0));
        assert_eq!(
            NavigableItem::Group(group).key(),
            ItemKey::Group(GroupKey::new("s", "k"))
        );
    }
}
