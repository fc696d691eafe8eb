//! Entity Navigator - a cyclable, distance-ordered view over the index.
//!
//! The navigator works as follows:
//! 1. **Scan**: the host ticks the navigator, which rescans the index when due
//! 2. **Insert**: added items pass the `OnAdd` filters and are inserted in
//!    distance order
//! 3. **Cycle**: next/previous re-sorts by the player's current position, then
//!    walks circularly until an item passes the `OnCycle` filters
//! 4. **Announce**: consumers read the selection and its "N of M" position

mod filter;
mod scheduler;

pub use filter::*;
pub use scheduler::*;

use serde::{Deserialize, Serialize};
use std::rc::Rc;
use std::time::Instant;
use tracing::{debug, info, warn};
use world_model::{
    Category, EntityId, PathLookup, PathResult, PositionProvider, SharedWorld, Vector3,
};

use crate::config::NavigatorConfig;
use crate::index::{
    EntityIndex, GroupingStrategy, IndexEvent, IndexListener, ItemKey, MapExitGrouping,
    NavigableItem, ScanStats,
};

/// What an announcer needs to describe the current selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionSummary {
    pub name: String,
    pub category: Category,
    pub distance: f32,
    /// 1-based position in the browse list.
    pub position: usize,
    pub count: usize,
    pub is_group: bool,
}

impl SelectionSummary {
    /// Short spoken form, e.g. "Chest, 4 meters, 2 of 5".
    pub fn announcement(&self) -> String {
        format!(
            "{}, {:.0} meters, {} of {}",
            self.name, self.distance, self.position, self.count
        )
    }
}

/// Filtered, distance-sorted browse list with a single selection.
pub struct EntityNavigator {
    index: EntityIndex,
    positions: Rc<dyn PositionProvider>,
    paths: Option<Rc<dyn PathLookup>>,
    filters: FilterPipeline,

    browse_list: Vec<ItemKey>,
    selected: Option<ItemKey>,
    /// Raw identity behind the selection, used to follow it across regrouping.
    selected_anchor: Option<EntityId>,

    category: Category,
    /// Last position the provider reported.
    player_position: Vector3,

    scheduler: ScanScheduler,
    events: Vec<IndexEvent>,
    ranked: Vec<(f32, ItemKey)>,
}

impl EntityNavigator {
    /// Create a navigator over `index`.
    ///
    /// The category filter is always registered; the path filter is
    /// registered only when a path lookup is available.
    pub fn new(
        index: EntityIndex,
        positions: Rc<dyn PositionProvider>,
        paths: Option<Rc<dyn PathLookup>>,
        config: &NavigatorConfig,
    ) -> Self {
        let mut filters = FilterPipeline::new();
        filters.register(Box::new(CategoryFilter::new()));
        if let Some(lookup) = &paths {
            let mut path_filter = PathFilter::new(lookup.clone());
            path_filter.set_enabled(config.pathfinding_filter);
            filters.register(Box::new(path_filter));
        }

        let player_position = positions.current_position().unwrap_or_default();
        let mut navigator = Self {
            index,
            positions,
            paths,
            filters,
            browse_list: Vec::new(),
            selected: None,
            selected_anchor: None,
            category: config.default_category,
            player_position,
            scheduler: ScanScheduler::new(config.scan_interval()),
            events: Vec::new(),
            ranked: Vec::new(),
        };

        if config.group_map_exits {
            let mut events = std::mem::take(&mut navigator.events);
            navigator
                .index
                .enable_strategy(Box::new(MapExitGrouping), &mut events);
            events.clear();
            navigator.events = events;
        }
        navigator.rebuild();
        navigator
    }

    /// Wire a navigator straight to an in-memory world.
    pub fn for_world(world: &SharedWorld, config: &NavigatorConfig) -> Self {
        let shared = Rc::new(world.clone());
        let index = EntityIndex::new(shared.clone(), shared.clone(), shared.clone());
        Self::new(index, shared.clone(), Some(shared), config)
    }

    /// Rescan if the configured interval has elapsed. Call once per host tick.
    pub fn tick(&mut self, now: Instant) -> Option<ScanStats> {
        if !self.scheduler.poll(now) {
            return None;
        }
        self.scan_now()
    }

    /// Rescan immediately and apply the resulting events.
    pub fn force_rescan(&mut self) -> Option<ScanStats> {
        self.scheduler.mark_scanned(Instant::now());
        self.scan_now()
    }

    fn scan_now(&mut self) -> Option<ScanStats> {
        self.refresh_player_position();
        let had_selection = self.selected.is_some();

        let mut events = std::mem::take(&mut self.events);
        events.clear();
        let stats = self.index.scan(&mut events);
        for event in events.drain(..) {
            match event {
                IndexEvent::Added(item) => self.on_added(&item),
                IndexEvent::Removed(item) => self.on_removed(&item),
            }
        }
        self.events = events;

        // A batch that starts without a selection lands on the nearest item.
        if !had_selection && !self.browse_list.is_empty() {
            self.selected = self.browse_list.first().cloned();
            self.sync_anchor();
        }
        stats
    }

    /// Switch category and rebuild the browse list.
    pub fn set_category(&mut self, category: Category) {
        info!(from = %self.category, to = %category, "category_changed");
        self.category = category;
        self.rebuild();
    }

    /// Move to the next category and return it.
    pub fn next_category(&mut self) -> Category {
        self.set_category(self.category.next());
        self.category
    }

    /// Move to the previous category and return it.
    pub fn previous_category(&mut self) -> Category {
        self.set_category(self.category.previous());
        self.category
    }

    /// Rebuild the browse list from the index.
    ///
    /// Keeps the current selection when it survives; otherwise follows the
    /// selected entity into whatever item now represents it, and finally
    /// falls back to the nearest item.
    pub fn rebuild(&mut self) {
        let player = self.refresh_player_position();
        let mut context = FilterContext::new(FilterPhase::Add, player, self.category);

        self.ranked.clear();
        for item in self.index.items() {
            if self.filters.evaluate(item, &mut context) {
                self.ranked.push((item.distance_to(&player), item.key()));
            }
        }
        self.ranked.sort_by(|a, b| a.0.total_cmp(&b.0));

        self.browse_list.clear();
        self.browse_list
            .extend(self.ranked.drain(..).map(|(_, key)| key));

        let previous = self.selected.take();
        let anchor_key = self
            .selected_anchor
            .and_then(|id| self.index.key_for(id))
            .cloned();
        self.selected = previous
            .filter(|key| self.browse_list.contains(key))
            .or_else(|| anchor_key.filter(|key| self.browse_list.contains(key)))
            .or_else(|| self.browse_list.first().cloned());
        self.sync_anchor();

        debug!(
            category = %self.category,
            listed = self.browse_list.len(),
            rejected = context.rejected(),
            "browse_list_rebuilt"
        );
    }

    /// Index event handler: insert an added item in distance order.
    pub fn on_added(&mut self, item: &NavigableItem) {
        let key = item.key();
        if self.browse_list.contains(&key) {
            return;
        }

        let mut context = FilterContext::new(FilterPhase::Add, self.player_position, self.category);
        if !self.filters.evaluate(item, &mut context) {
            return;
        }

        let distance = item.distance_to(&self.player_position);
        let at = self
            .browse_list
            .iter()
            .position(|existing| self.distance_of(existing) > distance)
            .unwrap_or(self.browse_list.len());
        self.browse_list.insert(at, key.clone());

        if self.selected.is_none() {
            self.selected = Some(key);
            self.sync_anchor();
        }
    }

    /// Index event handler: drop a removed item from the list.
    pub fn on_removed(&mut self, item: &NavigableItem) {
        let key = item.key();
        let Some(at) = self.browse_list.iter().position(|k| *k == key) else {
            return;
        };
        self.browse_list.remove(at);

        if self.selected.as_ref() == Some(&key) {
            self.selected = self.browse_list.first().cloned();
            self.sync_anchor();
        }
    }

    /// Select the next eligible item, wrapping around.
    ///
    /// Returns false, leaving the selection unchanged, when nothing passes
    /// the cycle filters.
    pub fn cycle_next(&mut self) -> bool {
        self.cycle(true)
    }

    /// Select the previous eligible item, wrapping around.
    pub fn cycle_previous(&mut self) -> bool {
        self.cycle(false)
    }

    fn cycle(&mut self, forward: bool) -> bool {
        if self.browse_list.is_empty() {
            return false;
        }

        let player = self.refresh_player_position();
        self.resort(player);

        let len = self.browse_list.len() as isize;
        let start = match self.selected_position() {
            Some(position) => position as isize,
            None if forward => -1,
            None => len,
        };
        let step = if forward { 1 } else { -1 };

        let mut context = FilterContext::new(FilterPhase::Cycle, player, self.category);
        for attempt in 1..=len {
            let at = (start + step * attempt).rem_euclid(len) as usize;
            let key = &self.browse_list[at];
            let Some(item) = self.index.get(key) else {
                continue;
            };
            if self.filters.evaluate(item, &mut context) {
                let chosen = key.clone();
                self.selected = Some(chosen);
                self.sync_anchor();
                return true;
            }
        }

        debug!(
            listed = self.browse_list.len(),
            rejected = context.rejected(),
            "cycle_found_no_eligible_item"
        );
        false
    }

    /// Stable re-sort by current distance. The selection is a key, so it
    /// stays on the same entry wherever that entry moves.
    fn resort(&mut self, player: Vector3) {
        self.ranked.clear();
        for key in self.browse_list.drain(..) {
            let distance = self
                .index
                .get(&key)
                .map(|item| item.distance_to(&player))
                .unwrap_or(f32::INFINITY);
            self.ranked.push((distance, key));
        }
        self.ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
        self.browse_list
            .extend(self.ranked.drain(..).map(|(_, key)| key));
    }

    /// Turn the cycle-time path filter on or off. Returns the new state.
    pub fn toggle_pathfinding_filter(&mut self) -> bool {
        let Some(filter) = self.filters.get_mut(PathFilter::NAME) else {
            warn!("pathfinding_filter_unavailable");
            return false;
        };
        let enabled = !filter.is_enabled();
        filter.set_enabled(enabled);
        info!(enabled, "pathfinding_filter_toggled");
        enabled
    }

    pub fn is_pathfinding_filter_enabled(&self) -> bool {
        self.filters
            .get(PathFilter::NAME)
            .map(|f| f.is_enabled())
            .unwrap_or(false)
    }

    /// Collapse or expand map exits. Returns whether grouping is now on.
    pub fn toggle_group_map_exits(&mut self) -> bool {
        if self.index.is_strategy_enabled(MapExitGrouping::ID) {
            self.disable_grouping(MapExitGrouping::ID);
            false
        } else {
            self.enable_grouping(Box::new(MapExitGrouping));
            true
        }
    }

    pub fn is_grouping_map_exits(&self) -> bool {
        self.index.is_strategy_enabled(MapExitGrouping::ID)
    }

    /// Enable a grouping strategy on the index and rebuild.
    pub fn enable_grouping(&mut self, strategy: Box<dyn GroupingStrategy>) -> bool {
        let mut events = std::mem::take(&mut self.events);
        let changed = self.index.enable_strategy(strategy, &mut events);
        events.clear();
        self.events = events;
        if changed {
            self.rebuild();
        }
        changed
    }

    /// Disable a grouping strategy on the index and rebuild.
    pub fn disable_grouping(&mut self, id: &str) -> bool {
        let mut events = std::mem::take(&mut self.events);
        let changed = self.index.disable_strategy(id, &mut events);
        events.clear();
        self.events = events;
        if changed {
            self.rebuild();
        }
        changed
    }

    /// Add a filter after the built-in ones and rebuild.
    pub fn register_filter(&mut self, filter: Box<dyn EntityFilter>) {
        self.filters.register(filter);
        self.rebuild();
    }

    /// Forward index events to an additional consumer.
    pub fn add_index_listener(&mut self, listener: Box<dyn IndexListener>) {
        self.index.add_listener(listener);
    }

    pub fn current_item(&self) -> Option<&NavigableItem> {
        self.selected.as_ref().and_then(|key| self.index.get(key))
    }

    /// Position of the selection in the browse list, or -1.
    pub fn current_index(&self) -> isize {
        self.selected_position()
            .map(|position| position as isize)
            .unwrap_or(-1)
    }

    fn selected_position(&self) -> Option<usize> {
        let selected = self.selected.as_ref()?;
        self.browse_list.iter().position(|key| key == selected)
    }

    /// Number of listed items.
    pub fn count(&self) -> usize {
        self.browse_list.len()
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Listed items in browse order.
    pub fn items(&self) -> impl Iterator<Item = &NavigableItem> {
        self.browse_list.iter().filter_map(|key| self.index.get(key))
    }

    pub fn index(&self) -> &EntityIndex {
        &self.index
    }

    pub fn player_position(&self) -> Vector3 {
        self.player_position
    }

    /// Summary of the selection for announcers.
    pub fn describe_current(&self) -> Option<SelectionSummary> {
        let item = self.current_item()?;
        let position = self.selected_position()?;
        Some(SelectionSummary {
            name: item.display_name(),
            category: item.category(),
            distance: item.distance_to(&self.player_position),
            position: position + 1,
            count: self.browse_list.len(),
            is_group: item.is_group(),
        })
    }

    /// Ask the path lookup for a route to the selection.
    pub fn path_to_current(&self) -> Option<PathResult> {
        let lookup = self.paths.as_ref()?;
        let target = self.current_item()?.position()?;
        Some(lookup.find_path(self.player_position, target))
    }

    fn refresh_player_position(&mut self) -> Vector3 {
        if let Some(position) = self.positions.current_position() {
            self.player_position = position;
        }
        self.player_position
    }

    fn distance_of(&self, key: &ItemKey) -> f32 {
        self.index
            .get(key)
            .map(|item| item.distance_to(&self.player_position))
            .unwrap_or(f32::INFINITY)
    }

    fn sync_anchor(&mut self) {
        self.selected_anchor = self
            .selected
            .as_ref()
            .and_then(|key| self.index.get(key))
            .and_then(|item| item.anchor());
    }
}

impl IndexListener for EntityNavigator {
    fn on_item_added(&mut self, item: &NavigableItem) {
        self.on_added(item);
    }

    fn on_item_removed(&mut self, item: &NavigableItem) {
        self.on_removed(item);
    }
}

impl std::fmt::Debug for EntityNavigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityNavigator")
            .field("index", &self.index)
            .field("filters", &self.filters)
            .field("category", &self.category)
            .field("listed", &self.browse_list.len())
            .field("selected", &self.selected)
            .field("scan_interval", &self.scheduler.interval())
            .finish()
    }
}
