//! Filter pipeline for the navigator.
//!
//! Filters declare when they run. `OnAdd` filters gate membership in the
//! browse list, `OnCycle` filters only decide whether cycling may land on an
//! item, so an item can stay listed (and counted) while being skipped.

use serde::{Deserialize, Serialize};
use std::rc::Rc;
use world_model::{Category, PathLookup, Vector3};

use crate::index::NavigableItem;

/// When a filter is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterTiming {
    OnAdd,
    OnCycle,
    All,
}

impl FilterTiming {
    pub fn applies_to(self, phase: FilterPhase) -> bool {
        match self {
            FilterTiming::All => true,
            FilterTiming::OnAdd => phase == FilterPhase::Add,
            FilterTiming::OnCycle => phase == FilterPhase::Cycle,
        }
    }
}

/// The pass currently running the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPhase {
    /// Insertion into the browse list, including wholesale rebuilds.
    Add,
    /// Stepping to the next or previous item.
    Cycle,
}

/// Scratch state for one pipeline pass. Never reused across passes.
#[derive(Debug, Clone)]
pub struct FilterContext {
    pub phase: FilterPhase,
    pub player_position: Vector3,
    pub category: Category,
    evaluated: usize,
    rejected: usize,
}

impl FilterContext {
    pub fn new(phase: FilterPhase, player_position: Vector3, category: Category) -> Self {
        Self {
            phase,
            player_position,
            category,
            evaluated: 0,
            rejected: 0,
        }
    }

    /// Candidates evaluated during this pass.
    pub fn evaluated(&self) -> usize {
        self.evaluated
    }

    /// Candidates rejected during this pass.
    pub fn rejected(&self) -> usize {
        self.rejected
    }
}

/// A predicate gating list membership or cycle eligibility.
///
/// `passes` may be called several times per item per pass and must not
/// mutate anything except the context.
pub trait EntityFilter {
    fn name(&self) -> &str;
    fn timing(&self) -> FilterTiming;
    fn is_enabled(&self) -> bool;
    fn set_enabled(&mut self, enabled: bool);
    fn passes(&self, item: &NavigableItem, context: &mut FilterContext) -> bool;
}

/// Ordered set of filters evaluated with short-circuit semantics.
#[derive(Default)]
pub struct FilterPipeline {
    filters: Vec<Box<dyn EntityFilter>>,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter. Evaluation follows registration order.
    pub fn register(&mut self, filter: Box<dyn EntityFilter>) {
        self.filters.push(filter);
    }

    pub fn get(&self, name: &str) -> Option<&dyn EntityFilter> {
        self.filters
            .iter()
            .find(|f| f.name() == name)
            .map(|f| f.as_ref())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut (dyn EntityFilter + 'static)> {
        self.filters
            .iter_mut()
            .find(|f| f.name() == name)
            .map(|f| f.as_mut())
    }

    /// True when every enabled filter for the context's phase admits the item.
    pub fn evaluate(&self, item: &NavigableItem, context: &mut FilterContext) -> bool {
        context.evaluated += 1;
        let phase = context.phase;
        let admitted = self
            .filters
            .iter()
            .filter(|f| f.is_enabled() && f.timing().applies_to(phase))
            .all(|f| f.passes(item, context));
        if !admitted {
            context.rejected += 1;
        }
        admitted
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl std::fmt::Debug for FilterPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.filters.iter().map(|filter| filter.name()))
            .finish()
    }
}

/// Admits items of the navigator's current category. `All` admits everything.
#[derive(Debug, Clone)]
pub struct CategoryFilter {
    enabled: bool,
}

impl CategoryFilter {
    pub const NAME: &'static str = "category";

    pub fn new() -> Self {
        Self { enabled: true }
    }
}

impl Default for CategoryFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityFilter for CategoryFilter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn timing(&self) -> FilterTiming {
        FilterTiming::OnAdd
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn passes(&self, item: &NavigableItem, context: &mut FilterContext) -> bool {
        context.category == Category::All || item.category() == context.category
    }
}

/// Admits only items the player can walk to.
///
/// Path queries are expensive, so this runs while cycling only and starts
/// disabled.
pub struct PathFilter {
    lookup: Rc<dyn PathLookup>,
    enabled: bool,
}

impl PathFilter {
    pub const NAME: &'static str = "pathfinding";

    pub fn new(lookup: Rc<dyn PathLookup>) -> Self {
        Self {
            lookup,
            enabled: false,
        }
    }
}

impl EntityFilter for PathFilter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn timing(&self) -> FilterTiming {
        FilterTiming::OnCycle
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn passes(&self, item: &NavigableItem, context: &mut FilterContext) -> bool {
        match item.position() {
            Some(target) => self.lookup.find_path(context.player_position, target).success,
            None => false,
        }
    }
}
