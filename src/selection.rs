// Marked record ids for bulk actions

use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<u64>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select if absent, deselect if present
    pub fn toggle(&mut self, id: u64) {
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
    }

    /// Header checkbox for one page
    ///
    /// If every id on the page is already selected they are all deselected,
    /// otherwise they are all selected. Ids from other pages are left alone.
    pub fn toggle_all(&mut self, page_ids: &[u64]) {
        if self.all_selected(page_ids) {
            for id in page_ids {
                self.ids.remove(id);
            }
        } else {
            self.ids.extend(page_ids.iter().copied());
        }
    }

    /// Whether the page's header checkbox shows as checked
    pub fn all_selected(&self, page_ids: &[u64]) -> bool {
        !page_ids.is_empty() && page_ids.iter().all(|id| self.ids.contains(id))
    }

    pub fn contains(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    /// Drop one id, e.g. after its record was deleted
    pub fn forget(&mut self, id: u64) {
        self.ids.remove(&id);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in ascending order
    pub fn ids(&self) -> Vec<u64> {
        self.ids.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        let mut selection = Selection::new();
        selection.toggle(3);
        selection.toggle(1);
        assert_eq!(selection.ids(), vec![1, 3]);

        selection.toggle(3);
        assert_eq!(selection.ids(), vec![1]);
        assert!(!selection.contains(3));
    }

    #[test]
    fn test_toggle_all_preserves_other_pages() {
        let mut selection = Selection::new();
        // Something selected on another page
        selection.toggle(42);

        let page = [1, 2, 3, 4, 5];
        selection.toggle_all(&page);
        assert_eq!(selection.len(), 6);
        assert!(page.iter().all(|id| selection.contains(*id)));
        assert!(selection.all_selected(&page));

        selection.toggle_all(&page);
        assert_eq!(selection.ids(), vec![42]);
    }

    #[test]
    fn test_toggle_all_partial_page_selects_rest() {
        let mut selection = Selection::new();
        selection.toggle(2);

        selection.toggle_all(&[1, 2, 3]);
        assert_eq!(selection.ids(), vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_page_is_never_all_selected() {
        let mut selection = Selection::new();
        assert!(!selection.all_selected(&[]));
        selection.toggle_all(&[]);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_clear_and_forget() {
        let mut selection = Selection::new();
        selection.toggle_all(&[1, 2, 3]);
        selection.forget(2);
        assert_eq!(selection.ids(), vec![1, 3]);

        selection.clear();
        assert!(selection.is_empty());
    }
}
