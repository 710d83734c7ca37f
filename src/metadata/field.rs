use lofty::tag::ItemKey;
use serde::{Deserialize, Serialize};

use super::model::TrackMetadata;

/// A metadata field that participates in synchronization.
///
/// The accessor table below is the single place mapping a field to its slot in
/// `TrackMetadata` and to the lofty item key used on disk.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncField {
    Album,
    AlbumArtist,
    Artist,
    Comment,
    Composer,
    DiscNumber,
    DiscTotal,
    Genre,
    Title,
    TrackNumber,
}

impl SyncField {
    pub const ALL: [SyncField; 10] = [
        SyncField::Album,
        SyncField::AlbumArtist,
        SyncField::Artist,
        SyncField::Comment,
        SyncField::Composer,
        SyncField::DiscNumber,
        SyncField::DiscTotal,
        SyncField::Genre,
        SyncField::Title,
        SyncField::TrackNumber,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SyncField::Album => "album",
            SyncField::AlbumArtist => "album-artist",
            SyncField::Artist => "artist",
            SyncField::Comment => "comment",
            SyncField::Composer => "composer",
            SyncField::DiscNumber => "disc-number",
            SyncField::DiscTotal => "disc-total",
            SyncField::Genre => "genre",
            SyncField::Title => "title",
            SyncField::TrackNumber => "track-number",
        }
    }

    pub fn item_key(self) -> ItemKey {
        match self {
            SyncField::Album => ItemKey::AlbumTitle,
            SyncField::AlbumArtist => ItemKey::AlbumArtist,
            SyncField::Artist => ItemKey::TrackArtist,
            SyncField::Comment => ItemKey::Comment,
            SyncField::Composer => ItemKey::Composer,
            SyncField::DiscNumber => ItemKey::DiscNumber,
            SyncField::DiscTotal => ItemKey::DiscTotal,
            SyncField::Genre => ItemKey::Genre,
            SyncField::Title => ItemKey::TrackTitle,
            SyncField::TrackNumber => ItemKey::TrackNumber,
        }
    }

    /// Numeric position fields, where a library value of `0` means "unset".
    pub fn is_numbering(self) -> bool {
        matches!(
            self,
            SyncField::DiscNumber | SyncField::DiscTotal | SyncField::TrackNumber
        )
    }

    pub fn get(self, meta: &TrackMetadata) -> Option<&str> {
        self.slot(meta).as_deref()
    }

    pub fn set(self, meta: &mut TrackMetadata, value: impl Into<String>) {
        *self.slot_mut(meta) = Some(value.into());
    }

    fn slot(self, meta: &TrackMetadata) -> &Option<String> {
        match self {
            SyncField::Album => &meta.album,
            SyncField::AlbumArtist => &meta.album_artist,
            SyncField::Artist => &meta.artist,
            SyncField::Comment => &meta.comment,
            SyncField::Composer => &meta.composer,
            SyncField::DiscNumber => &meta.disc_number,
            SyncField::DiscTotal => &meta.disc_total,
            SyncField::Genre => &meta.genre,
            SyncField::Title => &meta.title,
            SyncField::TrackNumber => &meta.track_number,
        }
    }

    fn slot_mut(self, meta: &mut TrackMetadata) -> &mut Option<String> {
        match self {
            SyncField::Album => &mut meta.album,
            SyncField::AlbumArtist => &mut meta.album_artist,
            SyncField::Artist => &mut meta.artist,
            SyncField::Comment => &mut meta.comment,
            SyncField::Composer => &mut meta.composer,
            SyncField::DiscNumber => &mut meta.disc_number,
            SyncField::DiscTotal => &mut meta.disc_total,
            SyncField::Genre => &mut meta.genre,
            SyncField::Title => &mut meta.title,
            SyncField::TrackNumber => &mut meta.track_number,
        }
    }
}
