use std::collections::BTreeSet;

/// Set of selected record IDs on the current page.
///
/// `selectable` is the set of IDs the user may select: the current page
/// minus protected records. The selection is always a subset of it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionTracker {
    selected: BTreeSet<i64>,
    selectable: BTreeSet<i64>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> &BTreeSet<i64> {
        &self.selected
    }

    pub fn selected_ids(&self) -> Vec<i64> {
        self.selected.iter().copied().collect()
    }

    pub fn selectable(&self) -> &BTreeSet<i64> {
        &self.selectable
    }

    pub fn is_selected(&self, id: i64) -> bool {
        self.selected.contains(&id)
    }

    pub fn is_selectable(&self, id: i64) -> bool {
        self.selectable.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Flip one ID; IDs outside the selectable set are ignored
    pub fn toggle(&mut self, id: i64) {
        if !self.selectable.contains(&id) {
            return;
        }
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    /// Checkbox-style setter used by row checkboxes
    pub fn set(&mut self, id: i64, checked: bool) {
        if !self.selectable.contains(&id) {
            return;
        }
        if checked {
            self.selected.insert(id);
        } else {
            self.selected.remove(&id);
        }
    }

    /// Select every selectable ID unless all are already selected, then clear
    pub fn toggle_all(&mut self) {
        if self.is_all_selected() {
            self.selected.clear();
        } else {
            self.selected = self.selectable.clone();
        }
    }

    /// Header checkbox state: set equality with a non-empty selectable set
    pub fn is_all_selected(&self) -> bool {
        !self.selectable.is_empty() && self.selected == self.selectable
    }

    /// Adopt the IDs of a freshly loaded page and intersect the selection
    /// with them. Returns how many selected IDs were dropped.
    pub fn reconcile(&mut self, selectable: impl IntoIterator<Item = i64>) -> usize {
        self.selectable = selectable.into_iter().collect();
        let before = self.selected.len();
        let selectable = &self.selectable;
        self.selected.retain(|id| selectable.contains(id));
        before - self.selected.len()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(ids: &[i64]) -> SelectionTracker {
        let mut t = SelectionTracker::new();
        t.reconcile(ids.iter().copied());
        t
    }

    #[test]
    fn reconcile_keeps_selection_inside_page() {
        let mut t = tracker(&[1, 2, 3, 4]);
        t.toggle(1);
        t.toggle(3);
        t.toggle(4);

        let dropped = t.reconcile([3, 5, 6]);
        assert_eq!(dropped, 2);
        assert_eq!(t.selected_ids(), vec![3]);
        assert!(t.selected().is_subset(t.selectable()));
    }

    #[test]
    fn unselectable_ids_are_ignored() {
        // 1 is protected: present on the page but not selectable
        let mut t = tracker(&[2, 3]);
        let before = t.clone();
        t.toggle(1);
        t.set(1, true);
        assert_eq!(t, before);

        t.toggle_all();
        assert!(!t.is_selected(1));
        assert_eq!(t.selected_ids(), vec![2, 3]);
    }

    #[test]
    fn toggle_all_twice_restores_selection() {
        let mut empty = tracker(&[1, 2, 3]);
        empty.toggle_all();
        assert!(empty.is_all_selected());
        empty.toggle_all();
        assert!(empty.is_empty());

        let mut full = tracker(&[1, 2, 3]);
        full.toggle_all();
        let snapshot = full.clone();
        full.toggle_all();
        full.toggle_all();
        assert_eq!(full, snapshot);
    }

    #[test]
    fn partial_selection_is_completed_first() {
        let mut t = tracker(&[1, 2, 3]);
        t.set(2, true);
        assert!(!t.is_all_selected());
        t.toggle_all();
        assert!(t.is_all_selected());
    }

    #[test]
    fn empty_page_is_never_all_selected() {
        let mut t = tracker(&[]);
        assert!(!t.is_all_selected());
        t.toggle_all();
        assert!(t.is_empty());
    }
}
