//! Table controller state.
//!
//! The single owner of interactive table state for one (session, event)
//! pair: pagination, global and per-column filters, the multi-sort
//! chain, row selection, and per-row mode/in-flight flags. Initialized
//! empty on first touch and discarded on reset or session expiry.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared::pagination::PageRequest;

use crate::models::flattened::RowMode;
use crate::models::participant::ParticipantId;
use crate::table::columns::ColumnKey;

/// Errors raised by row state transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("Row {0} has a mutation in flight")]
    MutationInFlight(ParticipantId),

    #[error("Column {0} is not sortable")]
    NotSortable(ColumnKey),
}

/// Sort direction for one column in the multi-sort chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Active filter on a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum ColumnFilterState {
    /// Row value must be a member of the chosen set.
    Discrete { values: BTreeSet<String> },
    /// Row value must contain the text, case-insensitively.
    Substring { text: String },
}

/// Ephemeral per-row UI flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowFlags {
    pub mode: RowMode,
    pub in_flight: bool,
    pub was_expanded: bool,
}

/// Interactive table state for one (session, event) pair.
#[derive(Debug, Clone)]
pub struct TableController {
    page: PageRequest,
    sort: Vec<(ColumnKey, SortDirection)>,
    filters: BTreeMap<ColumnKey, ColumnFilterState>,
    global_filter: String,
    selection: BTreeSet<ParticipantId>,
    rows: BTreeMap<ParticipantId, RowFlags>,
}

impl TableController {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: PageRequest::new(0, page_size),
            sort: Vec::new(),
            filters: BTreeMap::new(),
            global_filter: String::new(),
            selection: BTreeSet::new(),
            rows: BTreeMap::new(),
        }
    }

    pub fn page(&self) -> PageRequest {
        self.page
    }

    pub fn sort(&self) -> &[(ColumnKey, SortDirection)] {
        &self.sort
    }

    pub fn filters(&self) -> &BTreeMap<ColumnKey, ColumnFilterState> {
        &self.filters
    }

    pub fn global_filter(&self) -> &str {
        &self.global_filter
    }

    pub fn selection(&self) -> &BTreeSet<ParticipantId> {
        &self.selection
    }

    pub fn row_flags(&self, id: ParticipantId) -> RowFlags {
        self.rows.get(&id).copied().unwrap_or_default()
    }

    /// Cycle a column's sort state: none → asc → desc → none.
    ///
    /// With `append`, the column is added to the multi-sort chain,
    /// preserving existing keys' relative order; cycling back to none
    /// removes it from the chain. Without `append`, the chain is
    /// replaced by this column alone.
    pub fn toggle_sort(&mut self, column: ColumnKey, append: bool) -> Result<(), TableError> {
        if column == ColumnKey::Selection {
            return Err(TableError::NotSortable(column));
        }

        let current = self
            .sort
            .iter()
            .find(|(key, _)| *key == column)
            .map(|(_, dir)| *dir);
        let next = match current {
            None => Some(SortDirection::Asc),
            Some(SortDirection::Asc) => Some(SortDirection::Desc),
            Some(SortDirection::Desc) => None,
        };

        if append {
            match next {
                Some(direction) => {
                    if let Some(entry) = self.sort.iter_mut().find(|(key, _)| *key == column) {
                        entry.1 = direction;
                    } else {
                        self.sort.push((column, direction));
                    }
                }
                None => self.sort.retain(|(key, _)| *key != column),
            }
        } else {
            self.sort = match next {
                Some(direction) => vec![(column, direction)],
                None => Vec::new(),
            };
        }
        Ok(())
    }

    /// Set the global filter text. Any filter change resets to page 0.
    pub fn set_global_filter(&mut self, text: impl Into<String>) {
        self.global_filter = text.into();
        self.reset_page();
    }

    /// Restrict a column to a discrete value set. An empty set clears
    /// the filter.
    pub fn set_discrete_filter(&mut self, column: ColumnKey, values: BTreeSet<String>) {
        if values.is_empty() {
            self.filters.remove(&column);
        } else {
            self.filters
                .insert(column, ColumnFilterState::Discrete { values });
        }
        self.reset_page();
    }

    /// Apply a substring filter to a column. Empty text clears it.
    pub fn set_substring_filter(&mut self, column: ColumnKey, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            self.filters.remove(&column);
        } else {
            self.filters
                .insert(column, ColumnFilterState::Substring { text });
        }
        self.reset_page();
    }

    /// Drop one column's filter, or every filter including the global
    /// text when `column` is `None`.
    pub fn clear_filters(&mut self, column: Option<ColumnKey>) {
        match column {
            Some(column) => {
                self.filters.remove(&column);
            }
            None => {
                self.filters.clear();
                self.global_filter.clear();
            }
        }
        self.reset_page();
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = PageRequest::new(page, self.page.page_size);
    }

    fn reset_page(&mut self) {
        self.page = PageRequest::new(0, self.page.page_size);
    }

    pub fn toggle_selection(&mut self, id: ParticipantId) {
        if !self.selection.remove(&id) {
            self.selection.insert(id);
        }
    }

    pub fn select_all(&mut self, ids: impl IntoIterator<Item = ParticipantId>) {
        self.selection.extend(ids);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn deselect(&mut self, id: ParticipantId) {
        self.selection.remove(&id);
    }

    /// Switch a row into edit mode.
    ///
    /// Rejected while the row's mutation is in flight, which gates the
    /// edit control against mid-flight re-entry.
    pub fn begin_edit(&mut self, id: ParticipantId) -> Result<(), TableError> {
        let flags = self.rows.entry(id).or_default();
        if flags.in_flight {
            return Err(TableError::MutationInFlight(id));
        }
        flags.mode = RowMode::Edit;
        Ok(())
    }

    /// Discard in-memory edits and revert the row to view mode.
    pub fn cancel_edit(&mut self, id: ParticipantId) {
        if let Some(flags) = self.rows.get_mut(&id) {
            flags.mode = RowMode::View;
        }
    }

    /// Complete a successful save: the row returns to view mode.
    pub fn finish_edit(&mut self, id: ParticipantId) {
        if let Some(flags) = self.rows.get_mut(&id) {
            flags.mode = RowMode::View;
        }
    }

    /// Mark a row's mutation as dispatched.
    ///
    /// Must be called before the backend call goes out; a second
    /// mutation (or an edit) on the same row is rejected until
    /// [`finish_mutation`](Self::finish_mutation) clears the flag.
    pub fn begin_mutation(&mut self, id: ParticipantId) -> Result<(), TableError> {
        let flags = self.rows.entry(id).or_default();
        if flags.in_flight {
            return Err(TableError::MutationInFlight(id));
        }
        flags.in_flight = true;
        Ok(())
    }

    /// Clear a row's in-flight flag.
    ///
    /// A no-op for unknown rows, so a mutation resolving after the
    /// state was reset never errors.
    pub fn finish_mutation(&mut self, id: ParticipantId) {
        if let Some(flags) = self.rows.get_mut(&id) {
            flags.in_flight = false;
        }
    }

    /// Mark a row's detail as having been opened at least once.
    pub fn mark_expanded(&mut self, id: ParticipantId) {
        self.rows.entry(id).or_default().was_expanded = true;
    }

    /// Forget a row's flags and selection, after it was deleted.
    pub fn forget_row(&mut self, id: ParticipantId) {
        self.rows.remove(&id);
        self.selection.remove(&id);
    }

    /// Discard all state, back to the initial empty controller.
    pub fn reset(&mut self) {
        let page_size = self.page.page_size;
        *self = Self::new(page_size);
    }
}
