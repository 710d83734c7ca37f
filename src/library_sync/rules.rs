use crate::config::LibrarySettings;
use crate::metadata::SyncField;

/// What to do with a value the library has and the file lacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    /// Clear the library field and keep the credit in the library comment.
    MoveToComment { label: &'static str },
    /// Clear the library field.
    Clear,
    /// Leave both sides alone.
    Ignore,
    /// Copy the library value into the file.
    FillFile,
}

/// Decide how a missing file field is handled, given the file's genre.
///
/// Genre names are compared exactly.
pub fn resolve_missing(
    rules: &LibrarySettings,
    genre: &str,
    field: SyncField,
    library_value: &str,
) -> MissingField {
    let artistless = rules.artistless_genres.iter().any(|g| g == genre);
    match field {
        SyncField::Artist if artistless => MissingField::MoveToComment { label: "Artist" },
        SyncField::AlbumArtist if artistless => MissingField::MoveToComment {
            label: "Album artist",
        },
        SyncField::Composer if !rules.composer_genres.iter().any(|g| g == genre) => {
            MissingField::Clear
        }
        // Unnumbered tracks carry 0 in the library.
        f if f.is_numbering() && library_value == "0" => MissingField::Ignore,
        _ => MissingField::FillFile,
    }
}
