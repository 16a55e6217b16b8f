//! Selection state for alert tables and their batch actions.
//!
//! Each alert-bearing panel keeps a selection independent of the record
//! list. The two invariants the panels rely on are enforced here rather
//! than in the rendering layer: a terminal (already sent) row can never
//! enter the set, and any filter change or reload empties the set so no
//! stale id survives a change of visible rows.

use std::collections::HashSet;

/// 告警面板的勾选集合。
#[derive(Debug, Default, Clone)]
pub struct SelectionSet {
    ids: HashSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles one row. `terminal` rows (sent alerts) are rejected at the
    /// handler, not just greyed out: a toggle on a terminal row is a no-op
    /// and returns `false`.
    pub fn toggle(&mut self, id: &str, terminal: bool) -> bool {
        if terminal {
            return false;
        }
        if !self.ids.remove(id) {
            self.ids.insert(id.to_string());
        }
        true
    }

    /// Replaces the selection with exactly the currently visible,
    /// non-terminal rows. `visible` yields `(id, terminal)` pairs.
    pub fn select_all<'a, I>(&mut self, visible: I)
    where
        I: IntoIterator<Item = (&'a str, bool)>,
    {
        self.ids = visible
            .into_iter()
            .filter(|(_, terminal)| !terminal)
            .map(|(id, _)| id.to_string())
            .collect();
    }

    /// Called on every filter change or data reload.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drains the selection for a batch action. On failure the caller
    /// puts the ids back via [`SelectionSet::restore`] so the user can
    /// retry without re-selecting.
    pub fn take_all(&mut self) -> Vec<String> {
        let mut ids: Vec<String> = self.ids.drain().collect();
        ids.sort();
        ids
    }

    pub fn restore(&mut self, ids: Vec<String>) {
        self.ids.extend(ids);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
