use crate::element::Element;

/// Linear undo/redo over full snapshots of the element collection.
///
/// The cursor always points at the snapshot matching the live collection.
/// Committing after an undo discards the redo branch.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Vec<Element>>,
    cursor: usize,
    /// Maximum number of snapshots kept; 0 means unbounded
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(0)
    }
}

impl History {
    /// Creates a history holding a single empty snapshot
    pub fn new(limit: usize) -> Self {
        Self {
            entries: vec![Vec::new()],
            cursor: 0,
            limit,
        }
    }

    /// Record a snapshot after the cursor, dropping anything that was undone
    pub fn commit(&mut self, snapshot: Vec<Element>) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(snapshot);
        self.cursor = self.entries.len() - 1;

        if self.limit > 0 && self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            self.entries.drain(..excess);
            self.cursor -= excess;
        }
        log::debug!("History commit, {} entries", self.entries.len());
    }

    /// Step back one snapshot
    pub fn undo(&mut self) -> Option<&[Element]> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(&self.entries[self.cursor])
    }

    /// Step forward one snapshot
    pub fn redo(&mut self) -> Option<&[Element]> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(&self.entries[self.cursor])
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Start over with `snapshot` as the only entry
    pub fn reset(&mut self, snapshot: Vec<Element>) {
        self.entries = vec![snapshot];
        self.cursor = 0;
    }

    /// The snapshot the cursor points at
    pub fn current(&self) -> &[Element] {
        &self.entries[self.cursor]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::factory;

    fn snapshot(n: usize) -> Vec<Element> {
        (0..n).map(|z| factory::heading().instantiate(z)).collect()
    }

    #[test]
    fn test_undo_redo_walks_cursor() {
        let mut history = History::new(0);
        history.commit(snapshot(1));
        history.commit(snapshot(2));

        assert_eq!(history.undo().map(|s| s.len()), Some(1));
        assert_eq!(history.undo().map(|s| s.len()), Some(0));
        assert!(history.undo().is_none());
        assert_eq!(history.redo().map(|s| s.len()), Some(1));
        assert!(history.can_redo());
    }

    #[test]
    fn test_commit_truncates_redo_branch() {
        let mut history = History::new(0);
        history.commit(snapshot(1));
        history.commit(snapshot(2));
        history.undo();
        history.commit(snapshot(3));

        assert!(!history.can_redo());
        assert_eq!(history.len(), 3);
        assert_eq!(history.current().len(), 3);
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = History::new(3);
        for n in 1..=5 {
            history.commit(snapshot(n));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), 2);
        assert_eq!(history.current().len(), 5);
        history.undo();
        history.undo();
        assert!(!history.can_undo());
        assert_eq!(history.current().len(), 3);
    }

    #[test]
    fn test_reset() {
        let mut history = History::new(0);
        history.commit(snapshot(1));
        history.reset(snapshot(4));
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }
}
