//! Grouping strategies decide which items collapse into one navigable group.
//!
//! A strategy must be deterministic and side-effect free: the index calls it
//! on every live add, again when the strategy is enabled, and once more per
//! member when it is disabled. Keys are namespaced by the strategy so two
//! strategies never collide.

use world_model::{Category, IndividualItem};

/// Maps an item to an optional group key. Equal keys merge.
pub trait GroupingStrategy {
    /// Stable identifier; enabling or disabling is keyed on it.
    fn id(&self) -> &str;

    /// The group this item belongs to, if any.
    fn group_key(&self, item: &IndividualItem) -> Option<String>;

    /// Label for a freshly created group.
    fn group_label(&self, first: &IndividualItem) -> String {
        first.display_name.clone()
    }
}

/// Collapses map exits that lead to the same destination.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapExitGrouping;

impl MapExitGrouping {
    pub const ID: &'static str = "map_exits";

    /// Exit names carry a numeric suffix per doorway ("Exit_Town_02").
    fn strip_doorway(raw_name: &str) -> &str {
        raw_name
            .trim()
            .trim_end_matches(|c: char| c.is_ascii_digit() || c == '_' || c == ' ' || c == '#')
    }

    fn destination(raw_name: &str) -> String {
        Self::strip_doorway(raw_name).to_lowercase()
    }
}

impl GroupingStrategy for MapExitGrouping {
    fn id(&self) -> &str {
        Self::ID
    }

    fn group_key(&self, item: &IndividualItem) -> Option<String> {
        if item.category != Category::MapExit {
            return None;
        }
        let destination = Self::destination(&item.raw_name);
        if destination.is_empty() {
            return None;
        }
        Some(format!("map_exit:{}", destination))
    }

    /// Names the shared destination, not whichever doorway was seen first.
    fn group_label(&self, first: &IndividualItem) -> String {
        let destination = Self::strip_doorway(&first.raw_name).replace('_', " ");
        if destination.is_empty() {
            first.display_name.clone()
        } else {
            destination
        }
    }
}

/// Collapses items of one category that share a raw name.
#[derive(Debug, Clone, Copy, Default)]
pub struct SameNameGrouping;

impl SameNameGrouping {
    pub const ID: &'static str = "same_name";
}

impl GroupingStrategy for SameNameGrouping {
    fn id(&self) -> &str {
        Self::ID
    }

    fn group_key(&self, item: &IndividualItem) -> Option<String> {
        if item.raw_name.is_empty() {
            return None;
        }
        Some(format!("same_name:{:?}:{}", item.category, item.raw_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use world_model::{EntityId, Vector3};

    fn item(name: &str, category: Category) -> IndividualItem {
        IndividualItem::new(EntityId::new(), name, category, Vector3::ZERO)
    }

    #[test]
    fn test_map_exit_key_ignores_doorway_suffix() {
        let strategy = MapExitGrouping;
        let a = strategy.group_key(&item("Exit_Town_01", Category::MapExit));
        let b = strategy.group_key(&item("Exit_Town_02", Category::MapExit));
        let c = strategy.group_key(&item("Exit_Cave", Category::MapExit));

        assert_eq!(a.as_deref(), Some("map_exit:exit_town"));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_map_exit_skips_other_categories() {
        assert!(MapExitGrouping
            .group_key(&item("Exit_Town", Category::Npc))
            .is_none());
        assert!(MapExitGrouping
            .group_key(&item("123", Category::MapExit))
            .is_none());
    }

    #[test]
    fn test_same_name_key_is_per_category() {
        let strategy = SameNameGrouping;
        let chest = strategy.group_key(&item("Barrel", Category::Chest));
        let npc = strategy.group_key(&item("Barrel", Category::Npc));

        assert!(chest.is_some());
        assert_ne!(chest, npc);
        assert_eq!(chest, strategy.group_key(&item("Barrel", Category::Chest)));
    }

    #[test]
    fn test_keys_are_namespaced() {
        let exit = item("Gate", Category::MapExit);
        assert_ne!(
            MapExitGrouping.group_key(&exit),
            SameNameGrouping.group_key(&exit)
        );
    }

    #[test]
    fn test_default_label_is_display_name() {
        let first = item("barrel_small", Category::Chest).with_display_name("Small Barrel");
        assert_eq!(SameNameGrouping.group_label(&first), "Small Barrel");
    }

    #[test]
    fn test_map_exit_label_names_destination() {
        let first = item("Exit_Town_1", Category::MapExit);
        let second = item("Exit_Town_2", Category::MapExit);

        assert_eq!(MapExitGrouping.group_label(&first), "Exit Town");
        assert_eq!(
            MapExitGrouping.group_label(&first),
            MapExitGrouping.group_label(&second)
        );
    }
}
