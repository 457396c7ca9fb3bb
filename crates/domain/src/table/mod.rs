//! Table semantics: column generation, controller state, view projection.

pub mod columns;
pub mod controller;
pub mod view;

pub use columns::{generate_columns, ColumnDef, ColumnFilter, ColumnKey, EditorKind};
pub use controller::{ColumnFilterState, RowFlags, SortDirection, TableController, TableError};
pub use view::{project, RowView, SelectionState, TableView};
