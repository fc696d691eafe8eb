//! # World Model
//!
//! Plain data shared by the entity navigation core and the contracts it uses to
//! talk to the outside world. This crate knows nothing about indexing,
//! grouping or cycling; it only describes what a world entity looks like and
//! how the core asks the host about it.

pub mod entities;
pub mod providers;
pub mod world_state;

pub use entities::*;
pub use providers::*;
pub use world_state::*;
