//! Track metadata, the synchronized field table and the tag capabilities.
//!
//! `TagReader` / `TagWriter` are the seams the indexer and executors go
//! through; `LoftyTags` is the on-disk implementation.

mod field;
mod model;
mod tags;

pub use field::SyncField;
pub use model::{FieldPatch, TrackMetadata};
pub use tags::{LoftyTags, TagReader, TagWriter};

#[cfg(test)]
mod tests;
