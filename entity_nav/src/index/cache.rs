//! The entity index: the authoritative live set of navigable items.
//!
//! Each scan diffs the world's live identities against the index. Vanished
//! identities run the remove path, unknown ones are built by the factory and
//! run the add path, and known ones only get their position refreshed.
//! Grouping strategies are consulted on every add, in registration order.

use indexmap::IndexMap;
use std::collections::HashSet;
use std::rc::Rc;
use tracing::{debug, info, warn};
use world_model::{EntityId, IndividualItem, ItemFactory, PositionProvider, Vector3, WorldSnapshot};

use super::{GroupEntity, GroupKey, GroupingStrategy, IndexEvent, IndexListener, ItemKey, NavigableItem};

/// Counters describing what a single scan changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub added: usize,
    pub removed: usize,
    pub refreshed: usize,
    pub rejected: usize,
}

impl ScanStats {
    /// True when the scan neither added nor removed anything.
    pub fn is_unchanged(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

/// Live map from raw identity to navigable item, with dynamic grouping.
pub struct EntityIndex {
    world: Rc<dyn WorldSnapshot>,
    factory: Rc<dyn ItemFactory>,
    positions: Rc<dyn PositionProvider>,

    /// Raw identity -> the one item that currently represents it.
    owners: IndexMap<EntityId, ItemKey>,

    /// Distinct items in insertion order.
    items: IndexMap<ItemKey, NavigableItem>,

    /// Enabled strategies; earlier entries win.
    strategies: Vec<Box<dyn GroupingStrategy>>,

    listeners: Vec<Box<dyn IndexListener>>,
}

impl EntityIndex {
    /// Create an empty index bound to its collaborators.
    pub fn new(
        world: Rc<dyn WorldSnapshot>,
        factory: Rc<dyn ItemFactory>,
        positions: Rc<dyn PositionProvider>,
    ) -> Self {
        Self {
            world,
            factory,
            positions,
            owners: IndexMap::new(),
            items: IndexMap::new(),
            strategies: Vec::new(),
            listeners: Vec::new(),
        }
    }

    /// Register a listener. Delivery follows registration order.
    pub fn add_listener(&mut self, listener: Box<dyn IndexListener>) {
        self.listeners.push(listener);
    }

    /// Reconcile the index with the current world.
    ///
    /// Returns `None` without touching the index when the world or the player
    /// position cannot be read. Events are appended to `events` and delivered
    /// to listeners before this returns.
    pub fn scan(&mut self, events: &mut Vec<IndexEvent>) -> Option<ScanStats> {
        let Some(live) = self.world.list_live_identities() else {
            warn!(cached = self.owners.len(), "scan_skipped_world_unavailable");
            return None;
        };
        let Some(player) = self.positions.current_position() else {
            warn!(cached = self.owners.len(), "scan_skipped_player_unavailable");
            return None;
        };

        let mut stats = ScanStats::default();
        let live_set: HashSet<EntityId> = live.iter().copied().collect();

        let vanished: Vec<EntityId> = self
            .owners
            .keys()
            .filter(|id| !live_set.contains(*id))
            .copied()
            .collect();
        for id in vanished {
            self.remove_identity(id, events);
            stats.removed += 1;
        }

        for id in live {
            if self.owners.contains_key(&id) {
                if let Some(position) = self.world.position_of(id) {
                    if self.refresh_position(id, position) {
                        stats.refreshed += 1;
                    }
                }
                continue;
            }

            match self.factory.try_build(id, player) {
                Some(item) if item.id == id => {
                    self.insert_item(item, events);
                    stats.added += 1;
                }
                Some(item) => {
                    warn!(requested = %id, built = %item.id, "factory_identity_mismatch");
                    stats.rejected += 1;
                }
                None => stats.rejected += 1,
            }
        }

        if !stats.is_unchanged() {
            debug!(
                added = stats.added,
                removed = stats.removed,
                refreshed = stats.refreshed,
                rejected = stats.rejected,
                items = self.items.len(),
                "scan_complete"
            );
        }
        Some(stats)
    }

    /// Enable a grouping strategy and regroup every currently ungrouped item.
    ///
    /// Returns false if a strategy with the same id is already enabled.
    pub fn enable_strategy(
        &mut self,
        strategy: Box<dyn GroupingStrategy>,
        events: &mut Vec<IndexEvent>,
    ) -> bool {
        if self.is_strategy_enabled(strategy.id()) {
            return false;
        }

        let regroup: Vec<(EntityId, GroupKey, String)> = self
            .items
            .values()
            .filter_map(|item| match item {
                NavigableItem::Individual(single) => strategy.group_key(single).map(|key| {
                    (
                        single.id,
                        GroupKey::new(strategy.id(), key),
                        strategy.group_label(single),
                    )
                }),
                NavigableItem::Group(_) => None,
            })
            .collect();

        info!(strategy = strategy.id(), regrouped = regroup.len(), "strategy_enabled");
        self.strategies.push(strategy);

        for (id, group_key, label) in regroup {
            let Some(removed) = self.items.shift_remove(&ItemKey::Individual(id)) else {
                continue;
            };
            let NavigableItem::Individual(single) = removed else {
                continue;
            };
            self.emit(IndexEvent::Removed(NavigableItem::Individual(single.clone())), events);
            self.join_group(single, group_key, label, events);
        }
        true
    }

    /// Disable a strategy, dissolving the groups it created.
    ///
    /// Surviving members go back through the add path with the remaining
    /// strategies. Returns false if no strategy with this id is enabled.
    pub fn disable_strategy(&mut self, id: &str, events: &mut Vec<IndexEvent>) -> bool {
        let Some(position) = self.strategies.iter().position(|s| s.id() == id) else {
            return false;
        };
        let strategy = self.strategies.remove(position);

        let doomed: Vec<ItemKey> = self
            .items
            .keys()
            .filter(|key| matches!(key, ItemKey::Group(group) if group.strategy == id))
            .cloned()
            .collect();

        info!(strategy = id, dissolved = doomed.len(), "strategy_disabled");

        for key in doomed {
            let Some(NavigableItem::Group(group)) = self.items.shift_remove(&key) else {
                continue;
            };
            for member in group.members() {
                if strategy.group_key(member).as_deref() != Some(group.key.key.as_str()) {
                    warn!(entity = %member.id, group = %group.key, "group_member_key_mismatch");
                }
            }

            let members = group.members().to_vec();
            self.emit(IndexEvent::Removed(NavigableItem::Group(group)), events);

            for member in members {
                self.owners.shift_remove(&member.id);
                self.insert_item(member, events);
            }
        }
        true
    }

    pub fn is_strategy_enabled(&self, id: &str) -> bool {
        self.strategies.iter().any(|s| s.id() == id)
    }

    /// Ids of enabled strategies in priority order.
    pub fn enabled_strategies(&self) -> impl Iterator<Item = &str> {
        self.strategies.iter().map(|s| s.id())
    }

    /// Get an item by key.
    pub fn get(&self, key: &ItemKey) -> Option<&NavigableItem> {
        match self.items.get(key) {
            Some(NavigableItem::Group(group)) if group.is_empty() => None,
            other => other,
        }
    }

    /// The item currently representing a raw identity.
    pub fn key_for(&self, id: EntityId) -> Option<&ItemKey> {
        self.owners.get(&id)
    }

    pub fn contains_identity(&self, id: EntityId) -> bool {
        self.owners.contains_key(&id)
    }

    /// Distinct items (individuals and groups) in insertion order.
    pub fn items(&self) -> impl Iterator<Item = &NavigableItem> {
        self.items.values()
    }

    /// Raw identities currently indexed.
    pub fn identities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.owners.keys().copied()
    }

    /// Number of distinct items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of raw identities.
    pub fn identity_count(&self) -> usize {
        self.owners.len()
    }

    fn classify(&self, item: &IndividualItem) -> Option<(GroupKey, String)> {
        self.strategies.iter().find_map(|strategy| {
            strategy
                .group_key(item)
                .map(|key| (GroupKey::new(strategy.id(), key), strategy.group_label(item)))
        })
    }

    fn insert_item(&mut self, item: IndividualItem, events: &mut Vec<IndexEvent>) {
        match self.classify(&item) {
            Some((group_key, label)) => self.join_group(item, group_key, label, events),
            None => {
                let id = item.id;
                let key = ItemKey::Individual(id);
                let entry = NavigableItem::Individual(item);
                self.owners.insert(id, key.clone());
                self.items.insert(key, entry.clone());
                self.emit(IndexEvent::Added(entry), events);
            }
        }
    }

    fn join_group(
        &mut self,
        item: IndividualItem,
        group_key: GroupKey,
        label: String,
        events: &mut Vec<IndexEvent>,
    ) {
        let key = ItemKey::Group(group_key.clone());
        self.owners.insert(item.id, key.clone());

        if let Some(NavigableItem::Group(group)) = self.items.get_mut(&key) {
            group.push(item);
            return;
        }

        let group = NavigableItem::Group(GroupEntity::new(group_key, label, item));
        self.items.insert(key, group.clone());
        self.emit(IndexEvent::Added(group), events);
    }

    fn remove_identity(&mut self, id: EntityId, events: &mut Vec<IndexEvent>) {
        let Some(key) = self.owners.shift_remove(&id) else {
            return;
        };

        match &key {
            ItemKey::Individual(_) => {
                if let Some(item) = self.items.shift_remove(&key) {
                    self.emit(IndexEvent::Removed(item), events);
                }
            }
            ItemKey::Group(group_key) => {
                let now_empty = match self.items.get_mut(&key) {
                    Some(NavigableItem::Group(group)) => {
                        group.remove(id);
                        group.is_empty()
                    }
                    _ => {
                        warn!(entity = %id, group = %group_key, "group_missing_for_member");
                        false
                    }
                };
                if now_empty {
                    if let Some(group) = self.items.shift_remove(&key) {
                        self.emit(IndexEvent::Removed(group), events);
                    }
                }
            }
        }
    }

    fn refresh_position(&mut self, id: EntityId, position: Vector3) -> bool {
        let Some(key) = self.owners.get(&id) else {
            return false;
        };
        let target = match self.items.get_mut(key) {
            Some(NavigableItem::Individual(item)) => Some(item),
            Some(NavigableItem::Group(group)) => group.member_mut(id),
            None => None,
        };
        match target {
            Some(item) if item.position != position => {
                item.position = position;
                true
            }
            _ => false,
        }
    }

    fn emit(&mut self, event: IndexEvent, events: &mut Vec<IndexEvent>) {
        for listener in &mut self.listeners {
            match &event {
                IndexEvent::Added(item) => listener.on_item_added(item),
                IndexEvent::Removed(item) => listener.on_item_removed(item),
            }
        }
        events.push(event);
    }
}

impl std::fmt::Debug for EntityIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityIndex")
            .field("identities", &self.owners.len())
            .field("items", &self.items.len())
            .field("strategies", &self.enabled_strategies().collect::<Vec<_>>())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
