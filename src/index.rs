//! Tree indexes: identity key -> file location for one side of the sync.
//!
//! `scan` builds an index by walking directory trees and reading tags;
//! `cache` persists and restores a built index between runs.

mod cache;
mod model;
mod scan;

pub use cache::{CacheLoad, IndexCache};
pub use model::TreeIndex;
pub use scan::TreeIndexer;
