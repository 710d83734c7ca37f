use super::*;
use crate::error::SyncError;
use std::fs;
use tempfile::tempdir;

#[test]
fn every_field_round_trips_through_its_slot() {
    let mut meta = TrackMetadata::default();
    for field in SyncField::ALL {
        assert_eq!(meta.get(field), None);
        meta.set(field, field.name());
    }
    for field in SyncField::ALL {
        assert_eq!(meta.get(field), Some(field.name()));
    }
    assert_eq!(meta.album_artist.as_deref(), Some("album-artist"));
    assert_eq!(meta.track_number.as_deref(), Some("track-number"));
}

#[test]
fn field_names_are_unique() {
    let mut names: Vec<&str> = SyncField::ALL.iter().map(|f| f.name()).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), SyncField::ALL.len());
}

#[test]
fn numbering_fields_are_disc_and_track_positions() {
    let numbering: Vec<SyncField> = SyncField::ALL
        .into_iter()
        .filter(|f| f.is_numbering())
        .collect();
    assert_eq!(
        numbering,
        vec![
            SyncField::DiscNumber,
            SyncField::DiscTotal,
            SyncField::TrackNumber
        ]
    );
}

#[test]
fn patch_applies_only_staged_fields() {
    let mut meta = TrackMetadata {
        album: Some("Old".into()),
        genre: Some("Jazz".into()),
        ..TrackMetadata::default()
    };
    let mut patch = FieldPatch::new();
    patch.stage(SyncField::Album, "New");
    patch.stage(SyncField::Title, "Song");
    patch.apply_to(&mut meta);

    assert_eq!(meta.album.as_deref(), Some("New"));
    assert_eq!(meta.title.as_deref(), Some("Song"));
    assert_eq!(meta.genre.as_deref(), Some("Jazz"));
    assert_eq!(patch.field_names(), vec!["album", "title"]);
}

#[test]
fn metadata_deserializes_camel_case_and_keeps_absent_fields_absent() {
    let meta: TrackMetadata =
        serde_json::from_str(r#"{"album":"A","albumArtist":"B","discNumber":""}"#).unwrap();
    assert_eq!(meta.album.as_deref(), Some("A"));
    assert_eq!(meta.album_artist.as_deref(), Some("B"));
    assert_eq!(meta.disc_number.as_deref(), Some(""));
    assert_eq!(meta.title, None);
}

#[test]
fn lofty_reader_reports_garbage_as_unreadable() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.mp3");
    fs::write(&path, b"not a real mp3").unwrap();

    let err = LoftyTags.read(&path).unwrap_err();
    assert!(matches!(err, SyncError::UnreadableFile { ref path, .. } if path.ends_with("broken.mp3")));
}

#[test]
fn lofty_writer_skips_empty_patch_without_touching_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.mp3");
    fs::write(&path, b"not a real mp3").unwrap();

    LoftyTags.write(&path, &FieldPatch::new()).unwrap();
    assert_eq!(fs::read(&path).unwrap(), b"not a real mp3");
}

/// A bare MPEG-1 Layer III stream (128 kbps, 44.1 kHz) with only an ID3v1 tag.
fn id3v1_only_mp3(album: &str, title: &str, track: u8, genre: u8) -> Vec<u8> {
    const FRAME_LEN: usize = 417;
    let mut bytes = Vec::new();
    for _ in 0..20 {
        let mut frame = vec![0u8; FRAME_LEN];
        frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0x64]);
        bytes.extend_from_slice(&frame);
    }

    let padded = |s: &str, len: usize| {
        let mut field = s.as_bytes().to_vec();
        field.resize(len, 0);
        field
    };
    bytes.extend_from_slice(b"TAG");
    bytes.extend_from_slice(&padded(title, 30));
    bytes.extend_from_slice(&padded("", 30));
    bytes.extend_from_slice(&padded(album, 30));
    bytes.extend_from_slice(&padded("1999", 4));
    bytes.extend_from_slice(&padded("", 28));
    bytes.push(0);
    bytes.push(track);
    bytes.push(genre);
    bytes
}

#[test]
fn lofty_patch_on_id3v1_only_file_keeps_unpatched_fields() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("old.mp3");
    // Genre 17 is Rock.
    fs::write(&path, id3v1_only_mp3("Album", "Title", 3, 17)).unwrap();

    let before = LoftyTags.read(&path).unwrap();
    assert_eq!(before.album.as_deref(), Some("Album"));
    assert_eq!(before.title.as_deref(), Some("Title"));
    assert_eq!(before.track_number.as_deref(), Some("3"));

    let mut patch = FieldPatch::new();
    patch.stage(SyncField::Composer, "Someone");
    LoftyTags.write(&path, &patch).unwrap();

    let after = LoftyTags.read(&path).unwrap();
    assert_eq!(after.composer.as_deref(), Some("Someone"));
    assert_eq!(after.album, before.album);
    assert_eq!(after.title, before.title);
    assert_eq!(after.track_number, before.track_number);
    assert_eq!(after.genre, before.genre);
    assert_eq!(
        crate::identity::build_key(&after, crate::identity::Role::Destination),
        crate::identity::build_key(&before, crate::identity::Role::Destination)
    );
}

#[test]
fn lofty_patch_overwrites_only_staged_fields() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("song.mp3");
    fs::write(&path, id3v1_only_mp3("Album", "Title", 3, 17)).unwrap();

    let mut first = FieldPatch::new();
    first.stage(SyncField::Title, "Renamed");
    first.stage(SyncField::AlbumArtist, "Band");
    LoftyTags.write(&path, &first).unwrap();

    let mut second = FieldPatch::new();
    second.stage(SyncField::Genre, "Jazz");
    LoftyTags.write(&path, &second).unwrap();

    let meta = LoftyTags.read(&path).unwrap();
    assert_eq!(meta.title.as_deref(), Some("Renamed"));
    assert_eq!(meta.album_artist.as_deref(), Some("Band"));
    assert_eq!(meta.album.as_deref(), Some("Album"));
    assert_eq!(meta.genre.as_deref(), Some("Jazz"));
}
