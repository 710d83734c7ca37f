//! Minimal tag patch between a matched source and destination.

use crate::metadata::{FieldPatch, SyncField, TrackMetadata};

/// Stage `field := source value` for every field in `fields` whose source value
/// is present and differs (exact string comparison) from the destination.
///
/// An absent source value never clears the destination. An empty patch means
/// the destination needs no write.
pub fn compute_patch(src: &TrackMetadata, dst: &TrackMetadata, fields: &[SyncField]) -> FieldPatch {
    let mut patch = FieldPatch::new();
    for &field in fields {
        if let Some(value) = src.get(field) {
            if dst.get(field) != Some(value) {
                patch.stage(field, value);
            }
        }
    }
    patch
}
