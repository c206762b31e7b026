//! In-memory collection view: the list state machine behind every resource
//! table.
//!
//! Holds the last successfully fetched superset and derives the visible rows
//! from it client-side: search, filters, a stable single-key sort, and
//! bounded pagination. Row mutations are reconciled in place (patch, splice,
//! insert) instead of forcing a full refetch, so a successful action never
//! drops scroll position or flickers the table.

use std::collections::{BTreeMap, HashSet};

use crate::models::ListRecord;

/// Load lifecycle of a view. `Failed` is reachable only from user-initiated
/// fetches; silent refreshes go through [`CollectionView::replace_records`]
/// and never flip the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Per-item result of a bulk mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkOutcome {
    pub id: String,
    pub error: Option<String>,
}

/// What a bulk reconciliation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkReport {
    pub removed: usize,
    pub failures: Vec<BulkOutcome>,
}

impl BulkReport {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct CollectionView<T: ListRecord> {
    records: Vec<T>,
    state: LoadState,
    search_term: String,
    active_filters: BTreeMap<String, String>,
    sort_key: Option<String>,
    sort_direction: SortDirection,
    current_page: usize,
    items_per_page: usize,
    selection: HashSet<String>,
}

impl<T: ListRecord> CollectionView<T> {
    #[must_use]
    pub fn new(items_per_page: usize) -> Self {
        Self {
            records: Vec::new(),
            state: LoadState::Loading,
            search_term: String::new(),
            active_filters: BTreeMap::new(),
            sort_key: None,
            sort_direction: SortDirection::Ascending,
            current_page: 1,
            items_per_page: items_per_page.max(1),
            selection: HashSet::new(),
        }
    }

    // --- load lifecycle ---------------------------------------------------

    pub fn begin_load(&mut self) {
        self.state = LoadState::Loading;
    }

    pub fn finish_load(&mut self, records: Vec<T>) {
        self.records = records;
        self.state = LoadState::Ready;
        self.clamp_page();
        self.prune_selection();
    }

    /// User-initiated fetch failed; the previous records are kept.
    pub fn fail_load(&mut self, message: impl Into<String>) {
        self.state = LoadState::Failed(message.into());
    }

    /// Silent refresh: swap the superset without touching the load state.
    pub fn replace_records(&mut self, records: Vec<T>) {
        self.records = records;
        self.clamp_page();
        self.prune_selection();
    }

    #[must_use]
    pub const fn state(&self) -> &LoadState {
        &self.state
    }

    // --- derived-state transitions -----------------------------------------

    /// Changing the search term always returns to page 1 and clears the
    /// selection, so bulk actions can never target off-screen rows.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into().trim().to_lowercase();
        self.current_page = 1;
        self.selection.clear();
    }

    pub fn set_filter(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.active_filters.insert(key.into(), value.into());
        self.current_page = 1;
        self.selection.clear();
    }

    pub fn remove_filter(&mut self, key: &str) {
        self.active_filters.remove(key);
        self.current_page = 1;
        self.selection.clear();
    }

    /// Toggle direction when re-sorting the current key, else sort ascending.
    /// Ties keep their input order (stable sort, no secondary key).
    pub fn toggle_sort(&mut self, key: impl Into<String>) {
        let key = key.into();
        if self.sort_key.as_deref() == Some(key.as_str()) {
            self.sort_direction = match self.sort_direction {
                SortDirection::Ascending => SortDirection::Descending,
                SortDirection::Descending => SortDirection::Ascending,
            };
        } else {
            self.sort_key = Some(key);
            self.sort_direction = SortDirection::Ascending;
        }
    }

    pub fn set_page(&mut self, page: usize) {
        let max_page = self.page_count().max(1);
        self.current_page = page.clamp(1, max_page);
        self.selection.clear();
    }

    #[must_use]
    pub const fn current_page(&self) -> usize {
        self.current_page
    }

    #[must_use]
    pub const fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    // --- derived views ------------------------------------------------------

    /// The filtered, sorted superset the pages are sliced from.
    #[must_use]
    pub fn filtered(&self) -> Vec<T> {
        let mut matching: Vec<T> = self
            .records
            .iter()
            .filter(|record| self.matches_search(*record))
            .filter(|record| self.matches_filters(*record))
            .cloned()
            .collect();

        if let Some(key) = &self.sort_key {
            // Records missing the field sort last in either direction.
            matching.sort_by(|a, b| {
                let left = a.field(key);
                let right = b.field(key);
                match (left, right) {
                    (None, None) => std::cmp::Ordering::Equal,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (Some(left), Some(right)) => match self.sort_direction {
                        SortDirection::Ascending => left.cmp(&right),
                        SortDirection::Descending => right.cmp(&left),
                    },
                }
            });
        }

        matching
    }

    /// Number of pages for the current filtered set.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.filtered().len().div_ceil(self.items_per_page)
    }

    /// Rows on the current page.
    #[must_use]
    pub fn visible_page(&self) -> Vec<T> {
        let filtered = self.filtered();
        let page = self.current_page.min(self.page_count().max(1));
        let start = (page - 1) * self.items_per_page;
        filtered
            .into_iter()
            .skip(start)
            .take(self.items_per_page)
            .collect()
    }

    /// Explicit empty state: loaded fine but nothing matches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state == LoadState::Ready && self.filtered().is_empty()
    }

    // --- reconciliation -----------------------------------------------------

    /// Patch a single record in place after a confirmed mutation.
    ///
    /// Returns false when the record is no longer in the superset.
    pub fn patch(&mut self, record: T) -> bool {
        let id = record.record_id();
        if let Some(slot) = self
            .records
            .iter_mut()
            .find(|existing| existing.record_id() == id)
        {
            *slot = record;
            true
        } else {
            false
        }
    }

    /// Splice a record out after a confirmed delete.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|record| record.record_id() != id);
        self.selection.remove(id);
        let removed = self.records.len() != before;
        if removed {
            self.clamp_page();
        }
        removed
    }

    /// Insert a freshly created record at the top of the superset.
    pub fn insert(&mut self, record: T) {
        self.records.insert(0, record);
    }

    /// All-or-nothing bulk-delete reconciliation: records are removed locally
    /// only when every per-item call succeeded. A partial server-side delete
    /// is picked up by the next sync pass instead.
    pub fn reconcile_bulk_delete(&mut self, outcomes: Vec<BulkOutcome>) -> BulkReport {
        let failures: Vec<BulkOutcome> = outcomes
            .iter()
            .filter(|outcome| outcome.error.is_some())
            .cloned()
            .collect();

        if !failures.is_empty() {
            return BulkReport {
                removed: 0,
                failures,
            };
        }

        let mut removed = 0;
        for outcome in outcomes {
            if self.remove(&outcome.id) {
                removed += 1;
            }
        }
        self.selection.clear();
        BulkReport {
            removed,
            failures: Vec::new(),
        }
    }

    // --- selection ------------------------------------------------------------

    /// Toggle membership; unknown ids are ignored.
    pub fn toggle_select(&mut self, id: &str) -> bool {
        let known = self.records.iter().any(|record| record.record_id() == id);
        if !known {
            return false;
        }
        if !self.selection.remove(id) {
            self.selection.insert(id.to_string());
        }
        self.selection.contains(id)
    }

    #[must_use]
    pub fn selected_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.selection.iter().cloned().collect();
        ids.sort();
        ids
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // --- internals --------------------------------------------------------------

    fn matches_search(&self, record: &T) -> bool {
        if self.search_term.is_empty() {
            return true;
        }
        record
            .search_text()
            .to_lowercase()
            .contains(&self.search_term)
    }

    fn matches_filters(&self, record: &T) -> bool {
        self.active_filters.iter().all(|(key, value)| {
            record
                .field(key)
                .is_some_and(|field| field.eq_ignore_ascii_case(value.trim()))
        })
    }

    fn clamp_page(&mut self) {
        let max_page = self.page_count().max(1);
        if self.current_page > max_page {
            self.current_page = max_page;
        }
    }

    fn prune_selection(&mut self) {
        let known: HashSet<String> = self
            .records
            .iter()
            .map(ListRecord::record_id)
            .collect();
        self.selection.retain(|id| known.contains(id));
    }
}
