//! Configuration loader and schema types.
//!
//! This module exposes the settings that drive a sync run (scan filters,
//! synchronized fields, transcoder, caches) and helpers to load them from disk.

mod load;
mod schema;

pub use schema::*;
