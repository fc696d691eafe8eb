//! # Entity Nav
//!
//! Incremental entity indexing and navigation. This crate turns the host's
//! raw, frequently changing set of world objects into a stable, filterable,
//! distance-ordered list the user steps through one item at a time.
//!
//! ## Core Components
//!
//! - **index**: the diffing cache of navigable items, with live grouping
//! - **navigator**: filter pipeline, browse list, selection and cycling
//! - **config**: TOML-backed navigator settings
//!
//! ## Design Philosophy
//!
//! - **Host-Driven**: the core never decides when to scan; the host ticks it
//! - **Single-Threaded**: every operation runs to completion within the tick
//! - **Degrade, Don't Fail**: unavailable collaborators leave the last known
//!   state in place

pub mod config;
pub mod index;
pub mod navigator;

pub use config::*;
pub use index::*;
pub use navigator::*;
