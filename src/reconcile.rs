//! The diff between a source index and a destination index.
//!
//! Pure: no I/O happens here, the executors act on the returned actions.

use std::path::PathBuf;

use crate::identity::IdentityKey;
use crate::index::TreeIndex;

/// One corrective step, consumed exactly once by an executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// No destination counterpart: transcode the source into the destination tree.
    Create { source: PathBuf },
    /// Matched pair: align the destination's tags with the source.
    Update {
        source: PathBuf,
        destination: PathBuf,
    },
    /// Destination file with no source counterpart.
    Delete { destination: PathBuf },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub actions: Vec<Action>,
    /// Destination keys consumed by a source match.
    pub matched: Vec<IdentityKey>,
    /// Destination keys left over after the match pass.
    pub orphaned: Vec<IdentityKey>,
}

impl Reconciliation {
    pub fn creates(&self) -> usize {
        self.count(|a| matches!(a, Action::Create { .. }))
    }

    pub fn updates(&self) -> usize {
        self.count(|a| matches!(a, Action::Update { .. }))
    }

    pub fn deletes(&self) -> usize {
        self.count(|a| matches!(a, Action::Delete { .. }))
    }

    fn count(&self, pred: impl Fn(&Action) -> bool) -> usize {
        self.actions.iter().filter(|a| pred(a)).count()
    }
}

/// Match every source entry against `destination`, consuming matches.
///
/// Every destination entry ends up in exactly one of `matched` (removed while
/// matching) or `orphaned` (emitted as `Delete` after the source pass).
/// Output order follows key order, so equal inputs give equal outputs.
pub fn reconcile(source: &TreeIndex, mut destination: TreeIndex) -> Reconciliation {
    let mut out = Reconciliation::default();

    for entry in source.iter() {
        match destination.remove(&entry.key) {
            None => out.actions.push(Action::Create {
                source: entry.location.clone(),
            }),
            Some(dst) => {
                out.actions.push(Action::Update {
                    source: entry.location.clone(),
                    destination: dst.location,
                });
                out.matched.push(dst.key);
            }
        }
    }

    for orphan in destination {
        out.actions.push(Action::Delete {
            destination: orphan.location,
        });
        out.orphaned.push(orphan.key);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn index(entries: &[(&str, &str)]) -> TreeIndex {
        entries
            .iter()
            .map(|(k, p)| (IdentityKey::from_cached(*k), PathBuf::from(p)))
            .collect()
    }

    #[test]
    fn matched_source_updates_and_unmatched_source_creates() {
        let dst = index(&[("A", "/dst/a.mp3")]);
        let src = index(&[("A", "/src/a.m4a"), ("B", "/src/b.m4a")]);

        let r = reconcile(&src, dst);
        assert_eq!(
            r.actions,
            vec![
                Action::Update {
                    source: "/src/a.m4a".into(),
                    destination: "/dst/a.mp3".into(),
                },
                Action::Create {
                    source: "/src/b.m4a".into(),
                },
            ]
        );
        assert_eq!(r.deletes(), 0);
        assert!(r.orphaned.is_empty());
    }

    #[test]
    fn leftover_destination_entries_are_deleted() {
        let dst = index(&[("A", "/dst/a.mp3"), ("C", "/dst/c.mp3")]);
        let src = index(&[("A", "/src/a.m4a")]);

        let r = reconcile(&src, dst);
        assert_eq!(
            r.actions,
            vec![
                Action::Update {
                    source: "/src/a.m4a".into(),
                    destination: "/dst/a.mp3".into(),
                },
                Action::Delete {
                    destination: "/dst/c.mp3".into(),
                },
            ]
        );
        assert_eq!(r.orphaned, vec![IdentityKey::from_cached("C")]);
        assert_eq!((r.creates(), r.updates(), r.deletes()), (0, 1, 1));
    }

    #[test]
    fn reconcile_is_idempotent_over_equal_inputs() {
        let dst = index(&[("B", "/dst/b.mp3"), ("Z", "/dst/z.mp3"), ("A", "/dst/a.mp3")]);
        let src = index(&[("C", "/src/c.m4a"), ("A", "/src/a.m4a"), ("B", "/src/b.m4a")]);

        let first = reconcile(&src, dst.clone());
        let second = reconcile(&src, dst);
        assert_eq!(first, second);
    }

    #[test]
    fn every_destination_key_is_classified_exactly_once() {
        let dst = index(&[
            ("A", "/dst/a.mp3"),
            ("B", "/dst/b.mp3"),
            ("C", "/dst/c.mp3"),
            ("D", "/dst/d.mp3"),
        ]);
        let src = index(&[("B", "/src/b.m4a"), ("D", "/src/d.m4a"), ("E", "/src/e.m4a")]);
        let all: BTreeSet<IdentityKey> = dst.keys().cloned().collect();

        let r = reconcile(&src, dst);
        let matched: BTreeSet<IdentityKey> = r.matched.iter().cloned().collect();
        let orphaned: BTreeSet<IdentityKey> = r.orphaned.iter().cloned().collect();

        assert!(matched.is_disjoint(&orphaned));
        assert_eq!(matched.union(&orphaned).cloned().collect::<BTreeSet<_>>(), all);
        assert_eq!(r.deletes(), orphaned.len());
        assert_eq!(r.creates(), 1);
    }

    #[test]
    fn empty_source_orphans_everything() {
        let dst = index(&[("A", "/dst/a.mp3")]);
        let r = reconcile(&TreeIndex::new(), dst);
        assert_eq!(r.actions.len(), 1);
        assert_eq!(r.deletes(), 1);
    }
}
