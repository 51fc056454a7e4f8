use std::borrow::Cow;
use std::sync::Arc;

use tracing::debug;

use super::{card_count, clone_board};
use crate::types::Column;

/// Externally owned board contents. Identity, not content, decides whether a
/// snapshot is "new".
pub type BoardSnapshot = Arc<[Column]>;

#[derive(Debug, Clone)]
pub struct BoardStore {
    columns: Vec<Column>,
    revision: u64,
    source: Option<BoardSnapshot>,
}

impl BoardStore {
    pub fn seed(snapshot: BoardSnapshot) -> Self {
        Self {
            columns: clone_board(&snapshot),
            revision: 0,
            source: Some(snapshot),
        }
    }

    pub fn from_columns(columns: Vec<Column>) -> Self {
        Self {
            columns,
            revision: 0,
            source: None,
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn card_count(&self) -> usize {
        card_count(&self.columns)
    }

    /// Replaces local state with a fresh copy when `snapshot` is a different
    /// allocation than the one last seeded. Returns whether a reset happened.
    pub fn sync_snapshot(&mut self, snapshot: &BoardSnapshot) -> bool {
        if let Some(current) = self.source.as_ref()
            && Arc::ptr_eq(current, snapshot)
        {
            return false;
        }

        debug!(
            columns = snapshot.len(),
            discarded_revision = self.revision,
            "re-seeding board from new snapshot"
        );
        self.columns = clone_board(snapshot);
        self.source = Some(Arc::clone(snapshot));
        self.revision += 1;
        true
    }

    /// Runs a transformation against the current columns and commits an owned
    /// result. Borrowed results leave the revision untouched.
    pub fn apply<F>(&mut self, transform: F) -> bool
    where
        F: FnOnce(&[Column]) -> Cow<'_, [Column]>,
    {
        let next = match transform(&self.columns) {
            Cow::Borrowed(_) => return false,
            Cow::Owned(next) => next,
        };
        self.replace(next);
        true
    }

    pub fn replace(&mut self, columns: Vec<Column>) {
        self.columns = columns;
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{move_between_columns, reorder_within_column};
    use crate::types::Card;

    fn snapshot() -> BoardSnapshot {
        Arc::from(vec![
            Column::new("todo", "Para estudar")
                .with_cards(vec![Card::new("c1", "Heaps"), Card::new("c2", "Tries")]),
            Column::new("done", "Concluído"),
        ])
    }

    #[test]
    fn seed_copies_without_aliasing() {
        let source = snapshot();
        let mut store = BoardStore::seed(Arc::clone(&source));

        store.apply(|columns| move_between_columns(columns, "todo", "done", "c1", "done"));

        assert_eq!(source[0].cards.len(), 2);
        assert_eq!(store.columns()[1].card_ids(), vec!["c1"]);
    }

    #[test]
    fn borrowed_transform_does_not_bump_revision() {
        let mut store = BoardStore::seed(snapshot());
        assert!(!store.apply(|columns| reorder_within_column(columns, "todo", "c1", "c1")));
        assert_eq!(store.revision(), 0);

        assert!(store.apply(|columns| reorder_within_column(columns, "todo", "c1", "c2")));
        assert_eq!(store.revision(), 1);
        assert_eq!(store.columns()[0].card_ids(), vec!["c2", "c1"]);
    }

    #[test]
    fn sync_snapshot_resets_only_on_new_reference() {
        let source = snapshot();
        let mut store = BoardStore::seed(Arc::clone(&source));
        store.apply(|columns| move_between_columns(columns, "todo", "done", "c2", "done"));

        assert!(!store.sync_snapshot(&source));
        assert_eq!(store.columns()[1].card_ids(), vec!["c2"]);

        let same_content: BoardSnapshot = Arc::from(source.to_vec());
        assert!(store.sync_snapshot(&same_content));
        assert_eq!(store.columns(), &source[..]);
        assert_eq!(store.card_count(), 2);
    }
}
