use std::fmt;

/// Per-run tallies, reported once the run finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub deleted: usize,
    /// Deletions only reported because the delete mode is `report`.
    pub reported: usize,
    /// Files skipped while indexing because their tags were unreadable.
    pub skipped: usize,
    /// Source files left out by the excluded-genre filter.
    pub excluded: usize,
    /// In-tree duplicate keys seen while indexing.
    pub collisions: usize,
    /// Destination entries without a source counterpart.
    pub unmatched: usize,
    pub errored: usize,
}

impl RunSummary {
    /// Whether this run changed anything under the destination root.
    pub fn touched_destination(&self) -> bool {
        self.created + self.updated + self.deleted > 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created {}, updated {}, unchanged {}, deleted {}",
            self.created, self.updated, self.unchanged, self.deleted
        )?;
        if self.reported > 0 {
            write!(f, " ({} more reported only)", self.reported)?;
        }
        write!(
            f,
            ", skipped {}, excluded {}, duplicates {}, unmatched in destination {}, errors {}",
            self.skipped, self.excluded, self.collisions, self.unmatched, self.errored
        )
    }
}
