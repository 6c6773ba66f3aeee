//! Snapshot-based undo/redo over a page's element list.

use crate::document::PageId;
use crate::elements::Element;
use std::collections::{HashMap, VecDeque};

/// Maximum number of snapshots kept per page.
pub const MAX_UNDO_HISTORY: usize = 50;

/// Linear history for one page.
///
/// The cursor points at the snapshot matching the live element list. Index 0
/// is the oldest state still reachable, so undo is only possible above it.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: VecDeque<Vec<Element>>,
    cursor: Option<usize>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_limit(MAX_UNDO_HISTORY)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            snapshots: VecDeque::new(),
            cursor: None,
            limit: limit.max(1),
        }
    }

    /// Record `elements` as the newest state, discarding any redo branch.
    pub fn snapshot(&mut self, elements: &[Element]) {
        if let Some(cursor) = self.cursor {
            self.snapshots.truncate(cursor + 1);
        }
        self.snapshots.push_back(elements.to_vec());

        while self.snapshots.len() > self.limit {
            self.snapshots.pop_front();
            log::debug!("history full, dropped oldest snapshot");
        }
        self.cursor = Some(self.snapshots.len() - 1);
    }

    /// Step back. Returns a copy of the state to restore.
    pub fn undo(&mut self) -> Option<Vec<Element>> {
        let cursor = self.cursor.filter(|&c| c > 0)?;
        self.cursor = Some(cursor - 1);
        self.snapshots.get(cursor - 1).cloned()
    }

    /// Step forward. Returns a copy of the state to restore.
    pub fn redo(&mut self) -> Option<Vec<Element>> {
        let cursor = self.cursor.filter(|&c| c + 1 < self.snapshots.len())?;
        self.cursor = Some(cursor + 1);
        self.snapshots.get(cursor + 1).cloned()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|c| c + 1 < self.snapshots.len())
    }

    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// State the cursor currently points at.
    pub fn current(&self) -> Option<&[Element]> {
        self.cursor
            .and_then(|c| self.snapshots.get(c))
            .map(Vec::as_slice)
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.cursor = None;
    }
}

/// One [`History`] per page, created lazily.
#[derive(Debug, Clone)]
pub struct HistoryBook {
    pages: HashMap<PageId, History>,
    limit: usize,
}

impl Default for HistoryBook {
    fn default() -> Self {
        Self::new(MAX_UNDO_HISTORY)
    }
}

impl HistoryBook {
    pub fn new(limit: usize) -> Self {
        Self {
            pages: HashMap::new(),
            limit,
        }
    }

    /// Seed a page's history with its current elements the first time it is seen.
    pub fn ensure(&mut self, page: PageId, elements: &[Element]) -> &mut History {
        let limit = self.limit;
        self.pages.entry(page).or_insert_with(|| {
            let mut history = History::with_limit(limit);
            history.snapshot(elements);
            history
        })
    }

    pub fn get(&self, page: PageId) -> Option<&History> {
        self.pages.get(&page)
    }

    pub fn get_mut(&mut self, page: PageId) -> Option<&mut History> {
        self.pages.get_mut(&page)
    }

    pub fn can_undo(&self, page: PageId) -> bool {
        self.get(page).is_some_and(History::can_undo)
    }

    pub fn can_redo(&self, page: PageId) -> bool {
        self.get(page).is_some_and(History::can_redo)
    }

    /// Forget a page's history, e.g. after the page is deleted.
    pub fn remove(&mut self, page: PageId) {
        self.pages.remove(&page);
    }

    pub fn clear(&mut self) {
        self.pages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{ElementDraft, SerializableColor, ShapeKind};
    use kurbo::Point;
    use uuid::Uuid;

    fn element(z: u64) -> Element {
        ElementDraft::shape(
            Point::new(z as f64, 0.0),
            ShapeKind::Rectangle,
            SerializableColor::black(),
            1.0,
        )
        .into_element(z)
    }

    #[test]
    fn test_empty_history() {
        let mut history = History::new();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_undo_redo_restores_states() {
        let mut history = History::new();
        let a = element(0);
        history.snapshot(&[]);
        history.snapshot(std::slice::from_ref(&a));

        assert!(history.can_undo());
        assert!(!history.can_redo());

        assert_eq!(history.undo(), Some(vec![]));
        assert!(!history.can_undo());
        assert!(history.can_redo());

        assert_eq!(history.redo(), Some(vec![a]));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_snapshot_discards_redo_branch() {
        let mut history = History::new();
        history.snapshot(&[]);
        history.snapshot(&[element(0)]);
        history.undo();
        history.snapshot(&[element(1)]);

        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
        assert_eq!(history.current().map(|e| e[0].z_index()), Some(1));
    }

    #[test]
    fn test_history_is_bounded() {
        let mut history = History::new();
        for z in 0..120 {
            history.snapshot(&[element(z)]);
            assert!(history.len() <= MAX_UNDO_HISTORY);
        }
        assert_eq!(history.len(), MAX_UNDO_HISTORY);
        assert_eq!(history.cursor(), Some(MAX_UNDO_HISTORY - 1));

        let mut undos = 0;
        while history.undo().is_some() {
            undos += 1;
        }
        assert_eq!(undos, MAX_UNDO_HISTORY - 1);
    }

    #[test]
    fn test_book_seeds_once() {
        let mut book = HistoryBook::default();
        let page = Uuid::new_v4();
        book.ensure(page, &[]);
        book.ensure(page, &[element(0)]);
        assert_eq!(book.get(page).map(History::len), Some(1));
        assert!(!book.can_undo(page));

        book.remove(page);
        assert!(book.get(page).is_none());
    }
}
