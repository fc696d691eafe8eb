//! Entity index - the live, diffed set of navigable items.
//!
//! The index consists of:
//! - **Items**: individuals built by the host's factory, or groups of them
//! - **Strategies**: pluggable rules that merge related items into groups
//! - **Events**: synchronous add/remove notifications for consumers

mod cache;
mod events;
mod grouping;
mod item;

pub use cache::*;
pub use events::*;
pub use grouping::*;
pub use item::*;
