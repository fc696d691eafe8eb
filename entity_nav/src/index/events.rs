//! Add/remove notifications emitted by the index.

use super::NavigableItem;

/// A change to the set of navigable items.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexEvent {
    Added(NavigableItem),
    Removed(NavigableItem),
}

/// Receives index events synchronously, in registration order.
///
/// Listeners get snapshots; they cannot reach into the index's collections.
pub trait IndexListener {
    fn on_item_added(&mut self, item: &NavigableItem);
    fn on_item_removed(&mut self, item: &NavigableItem);
}
