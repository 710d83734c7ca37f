//! Identity keys: the cross-tree notion of "the same logical track".

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::metadata::TrackMetadata;

/// Separator between key components.
const COMPONENT_SEPARATOR: char = '|';

/// Which side of the reconciliation a tree belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Role {
    Source,
    Destination,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Source => f.write_str("source"),
            Role::Destination => f.write_str("destination"),
        }
    }
}

/// Composite key built from album, disc number, track number and title.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityKey(String);

impl IdentityKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Rehydrate a key persisted in an index cache.
    pub fn from_cached(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the identity key of a track.
///
/// Pure in `meta`: absent components become empty strings so the key always
/// has four components. `role` only matters to the indexer's pre-filtering and
/// never changes the key itself.
pub fn build_key(meta: &TrackMetadata, _role: Role) -> IdentityKey {
    let parts = [
        meta.album.as_deref(),
        meta.disc_number.as_deref(),
        meta.track_number.as_deref(),
        meta.title.as_deref(),
    ];

    let mut key = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            key.push(COMPONENT_SEPARATOR);
        }
        key.push_str(part.unwrap_or(""));
    }
    IdentityKey(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(album: &str, disc: &str, track: &str, title: &str) -> TrackMetadata {
        TrackMetadata {
            album: Some(album.into()),
            disc_number: Some(disc.into()),
            track_number: Some(track.into()),
            title: Some(title.into()),
            ..TrackMetadata::default()
        }
    }

    #[test]
    fn key_joins_album_disc_track_title_in_order() {
        let key = build_key(&meta("Kind of Blue", "1", "2", "Freddie Freeloader"), Role::Source);
        assert_eq!(key.as_str(), "Kind of Blue|1|2|Freddie Freeloader");
    }

    #[test]
    fn absent_components_keep_the_key_shape() {
        let key = build_key(&TrackMetadata::default(), Role::Destination);
        assert_eq!(key.as_str(), "|||");

        let partial = TrackMetadata {
            title: Some("Untitled".into()),
            ..TrackMetadata::default()
        };
        assert_eq!(build_key(&partial, Role::Source).as_str(), "|||Untitled");
    }

    #[test]
    fn key_is_deterministic_and_role_independent() {
        let m = meta("A", "1", "3", "T");
        let first = build_key(&m, Role::Source);
        let second = build_key(&m.clone(), Role::Source);
        assert_eq!(first, second);
        assert_eq!(first, build_key(&m, Role::Destination));
    }

    #[test]
    fn fields_outside_the_key_do_not_affect_it() {
        let mut a = meta("A", "1", "3", "T");
        let b = a.clone();
        a.artist = Some("Someone".into());
        a.genre = Some("Rock".into());
        a.comment = Some("remastered".into());
        assert_eq!(build_key(&a, Role::Source), build_key(&b, Role::Source));
    }
}
