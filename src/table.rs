// Per-view table state: store, query, selection and the open form

use crate::filter::Filter;
use crate::kv::KeyValueStore;
use crate::models::{Column, Task};
use crate::query::{self, PageView, Query, Sort};
use crate::record::Record;
use crate::selection::Selection;
use crate::store::Store;
use eyre::Result;
use tracing::debug;

/// Asks the user to approve a destructive action
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// How a form closed
#[derive(Debug, Clone)]
pub enum FormOutcome<P> {
    Submit(P),
    Cancel,
}

/// Which record the open form is editing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditSession {
    New,
    Existing(u64),
}

/// State behind one table view
pub struct Table<T: Record, K: KeyValueStore> {
    store: Store<T, K>,
    query: Query,
    selection: Selection,
    editing: Option<EditSession>,
}

impl<T: Record, K: KeyValueStore> Table<T, K> {
    pub fn new(store: Store<T, K>) -> Self {
        Self {
            store,
            query: Query::for_record::<T>(),
            selection: Selection::new(),
            editing: None,
        }
    }

    pub fn store(&self) -> &Store<T, K> {
        &self.store
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn editing(&self) -> Option<EditSession> {
        self.editing
    }

    /// Recompute the current page from scratch
    pub fn view(&self) -> PageView<'_, T> {
        query::run(self.store.records(), &self.query)
    }

    /// Every row passing search and filters, sorted, across all pages
    pub fn matching(&self) -> Vec<&T> {
        query::filter_sorted(self.store.records(), &self.query)
    }

    // ========================================================================
    // Query parameters
    // ========================================================================

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.query.search = search.into();
        self.query.page = 1;
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.query.set_filter(filter);
        self.query.page = 1;
    }

    /// Column header click
    pub fn sort_by(&mut self, field: &str) {
        self.query.sort.toggle(field);
    }

    pub fn set_sort(&mut self, sort: Sort) {
        self.query.sort = sort;
    }

    /// Jump to a page, clamped to the pages that exist
    pub fn go_to_page(&mut self, page: usize) {
        let total = self.view().total;
        self.query.page = query::clamp_page(page, total, self.query.page_size);
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.query.page + 1);
    }

    pub fn prev_page(&mut self) {
        self.go_to_page(self.query.page.saturating_sub(1));
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn toggle_selected(&mut self, id: u64) {
        self.selection.toggle(id);
    }

    /// Header checkbox for the current page
    pub fn toggle_page_selected(&mut self) {
        let ids = self.view().ids();
        self.selection.toggle_all(&ids);
    }

    // ========================================================================
    // Form bridge
    // ========================================================================

    /// Open an empty form for a new record
    pub fn begin_add(&mut self) {
        self.editing = Some(EditSession::New);
    }

    /// Open a form prefilled from record `id`
    pub fn begin_edit(&mut self, id: u64) -> Option<T::Payload> {
        let payload = self.store.get(id)?.to_payload();
        self.editing = Some(EditSession::Existing(id));
        Some(payload)
    }

    /// Close the open form, applying a submitted payload
    ///
    /// Returns the id of the added or edited record; `None` for a cancel,
    /// for an edit whose record has vanished, or when no form was open.
    pub fn finish(&mut self, outcome: FormOutcome<T::Payload>) -> Result<Option<u64>> {
        let Some(session) = self.editing.take() else {
            return Ok(None);
        };

        let payload = match outcome {
            FormOutcome::Submit(payload) => payload,
            FormOutcome::Cancel => {
                debug!(key = T::storage_key(), ?session, "finish: form cancelled");
                return Ok(None);
            }
        };

        match session {
            EditSession::New => Ok(Some(self.store.add(payload)?)),
            EditSession::Existing(id) => Ok(self.store.update(id, payload)?.then_some(id)),
        }
    }

    // ========================================================================
    // Deletes
    // ========================================================================

    /// Delete one record after confirmation; declining changes nothing
    pub fn delete(&mut self, id: u64, confirm: &dyn Confirm) -> Result<bool> {
        let prompt = format!("Are you sure you want to delete this {}?", T::noun());
        if !confirm.confirm(&prompt) {
            return Ok(false);
        }

        let removed = self.store.remove(id)?;
        if removed {
            self.selection.forget(id);
            self.reclamp();
        }
        Ok(removed)
    }

    /// Delete every selected record after confirmation
    ///
    /// An empty selection returns 0 without prompting.
    pub fn bulk_delete(&mut self, confirm: &dyn Confirm) -> Result<usize> {
        if self.selection.is_empty() {
            return Ok(0);
        }

        let prompt = format!("Are you sure you want to delete {} {}?", self.selection.len(), T::plural());
        if !confirm.confirm(&prompt) {
            return Ok(0);
        }

        let removed = self.store.remove_many(&self.selection.ids())?;
        self.selection.clear();
        self.reclamp();
        Ok(removed)
    }

    fn reclamp(&mut self) {
        self.go_to_page(self.query.page);
    }
}

impl<K: KeyValueStore> Table<Task, K> {
    /// Move a kanban card to the bottom of another column
    ///
    /// Returns `false` when the task is unknown. Dropping a card on its own
    /// column changes nothing.
    pub fn move_task(&mut self, id: u64, column: Column) -> Result<bool> {
        let Some(task) = self.store.get(id) else {
            return Ok(false);
        };
        if task.column == column {
            return Ok(true);
        }

        let mut moved = task.clone();
        moved.column = column;
        let mut next: Vec<Task> = self.store.records().iter().filter(|t| t.id != id).cloned().collect();
        next.push(moved);
        self.store.replace_all(next)?;

        debug!(id, column = column.as_str(), "move_task: card moved");
        Ok(true)
    }

    /// Cards of one board column in collection order
    pub fn board_column(&self, column: Column) -> Vec<&Task> {
        self.store.records().iter().filter(|t| t.column == column).collect()
    }
}
