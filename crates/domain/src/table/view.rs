//! Table view projection.
//!
//! Pure function from (columns, flattened rows, controller state) to a
//! renderable grid: filter, stable multi-sort, then pagination over the
//! filtered result. No I/O and no mutation of its inputs.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use shared::pagination::PageInfo;

use crate::models::attribute::AttributeId;
use crate::models::flattened::{FlattenedParticipant, RowMode};
use crate::models::participant::{AttributeValue, ParticipantId};
use crate::table::columns::{ColumnDef, ColumnKey};
use crate::table::controller::{ColumnFilterState, SortDirection, TableController};

/// Empty-state message shown when no row survives the filters.
pub const EMPTY_MESSAGE: &str = "Nie znaleziono wyników";

/// Tri-state of the selection header checkbox over the visible rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionState {
    All,
    Some,
    None,
}

/// One rendered row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowView {
    pub id: ParticipantId,
    pub slug: String,
    pub email: String,
    pub values: std::collections::BTreeMap<AttributeId, AttributeValue>,
    pub mode: RowMode,
    pub in_flight: bool,
    pub was_expanded: bool,
    pub selected: bool,
}

/// A renderable grid: columns, the current page of rows, and state echoes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub columns: Vec<ColumnDef>,
    pub rows: Vec<RowView>,
    pub page: PageInfo,
    pub sort: Vec<(ColumnKey, SortDirection)>,
    pub selection: SelectionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<String>,
}

/// Project the flattened rows through the controller state.
pub fn project(
    columns: &[ColumnDef],
    rows: &[FlattenedParticipant],
    controller: &TableController,
) -> TableView {
    let visible: Vec<&FlattenedParticipant> = rows
        .iter()
        .filter(|row| accepts(row, columns, controller))
        .collect();

    let mut sorted = visible;
    sort_rows(&mut sorted, controller.sort());

    let page = PageInfo::compute(controller.page(), sorted.len(), rows.len());
    let (start, end) = page.bounds();

    let page_rows: Vec<RowView> = sorted[start..end]
        .iter()
        .map(|row| {
            let flags = controller.row_flags(row.id);
            RowView {
                id: row.id,
                slug: row.slug.clone(),
                email: row.email.clone(),
                values: row.values.clone(),
                mode: flags.mode,
                in_flight: flags.in_flight,
                was_expanded: flags.was_expanded,
                selected: controller.selection().contains(&row.id),
            }
        })
        .collect();

    let selection = selection_state(&sorted, controller);
    let empty_message = if sorted.is_empty() {
        Some(EMPTY_MESSAGE.to_string())
    } else {
        None
    };

    TableView {
        columns: columns.to_vec(),
        rows: page_rows,
        page,
        sort: controller.sort().to_vec(),
        selection,
        empty_message,
    }
}

/// A row is shown only if every active filter accepts it: AND across
/// columns, OR within one discrete filter's selected set.
fn accepts(
    row: &FlattenedParticipant,
    columns: &[ColumnDef],
    controller: &TableController,
) -> bool {
    for (column, filter) in controller.filters() {
        let passed = match filter {
            ColumnFilterState::Discrete { values } => values
                .iter()
                .any(|option| cell_matches_option(row, *column, option)),
            ColumnFilterState::Substring { text } => cell_display(row, *column)
                .map(|cell| contains_ci(&cell, text))
                .unwrap_or(false),
        };
        if !passed {
            return false;
        }
    }

    let global = controller.global_filter();
    if !global.is_empty() {
        let hit = columns.iter().any(|column| {
            cell_display(row, column.key)
                .map(|cell| contains_ci(&cell, global))
                .unwrap_or(false)
        });
        if !hit {
            return false;
        }
    }

    true
}

fn cell_display(row: &FlattenedParticipant, column: ColumnKey) -> Option<String> {
    match column {
        ColumnKey::Selection => None,
        ColumnKey::Email => Some(row.email.clone()),
        // Missing keys and explicit nulls are both invisible to filters.
        ColumnKey::Attribute(id) => row.values.get(&id).and_then(AttributeValue::as_display),
    }
}

fn cell_matches_option(row: &FlattenedParticipant, column: ColumnKey, option: &str) -> bool {
    match column {
        ColumnKey::Selection => false,
        ColumnKey::Email => row.email == option,
        ColumnKey::Attribute(id) => row
            .values
            .get(&id)
            .map(|value| value.matches_option(option))
            .unwrap_or(false),
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Stable multi-sort: later chain entries only break ties left by
/// earlier ones. Missing and explicitly cleared values order after all
/// present values regardless of direction.
fn sort_rows(rows: &mut [&FlattenedParticipant], chain: &[(ColumnKey, SortDirection)]) {
    if chain.is_empty() {
        return;
    }
    rows.sort_by(|a, b| {
        for (column, direction) in chain {
            let ordering = compare_cell(a, b, *column, *direction);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

fn compare_cell(
    a: &FlattenedParticipant,
    b: &FlattenedParticipant,
    column: ColumnKey,
    direction: SortDirection,
) -> Ordering {
    match column {
        ColumnKey::Selection => Ordering::Equal,
        ColumnKey::Email => apply_direction(
            a.email.to_lowercase().cmp(&b.email.to_lowercase()),
            direction,
        ),
        ColumnKey::Attribute(id) => {
            let left = a.values.get(&id);
            let right = b.values.get(&id);
            match (present(left), present(right)) {
                (Some(lv), Some(rv)) => apply_direction(compare_values(lv, rv), direction),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        }
    }
}

fn present(value: Option<&AttributeValue>) -> Option<&AttributeValue> {
    value.filter(|v| !matches!(v, AttributeValue::Empty))
}

fn compare_values(a: &AttributeValue, b: &AttributeValue) -> Ordering {
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => {
            let x = a.as_display().unwrap_or_default().to_lowercase();
            let y = b.as_display().unwrap_or_default().to_lowercase();
            x.cmp(&y)
        }
    }
}

fn apply_direction(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

fn selection_state(visible: &[&FlattenedParticipant], controller: &TableController) -> SelectionState {
    if visible.is_empty() {
        return SelectionState::None;
    }
    let selected = visible
        .iter()
        .filter(|row| controller.selection().contains(&row.id))
        .count();
    if selected == 0 {
        SelectionState::None
    } else if selected == visible.len() {
        SelectionState::All
    } else {
        SelectionState::Some
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attribute::{Attribute, AttributeLabel, AttributeType};
    use crate::models::flattened::flatten;
    use crate::models::participant::{Participant, ParticipantAttribute};
    use crate::table::columns::generate_columns;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeSet;

    const DIET: AttributeId = AttributeId(3);
    const AGE: AttributeId = AttributeId(5);

    fn schema() -> Vec<Attribute> {
        vec![
            Attribute {
                id: DIET,
                slug: "diet".to_string(),
                name: AttributeLabel::Plain("Dieta".to_string()),
                attribute_type: AttributeType::Select,
                options: Some(vec![
                    "mięsna".to_string(),
                    "wege".to_string(),
                    "vegan".to_string(),
                ]),
                show_in_list: true,
            },
            Attribute {
                id: AGE,
                slug: "age".to_string(),
                name: AttributeLabel::Plain("Wiek".to_string()),
                attribute_type: AttributeType::Number,
                options: None,
                show_in_list: true,
            },
        ]
    }

    fn participant(id: i64, email: &str, diet: Option<&str>, age: Option<f64>) -> Participant {
        let mut attributes = Vec::new();
        if let Some(diet) = diet {
            attributes.push(ParticipantAttribute {
                attribute_id: DIET,
                value: AttributeValue::Text(diet.to_string()),
            });
        }
        if let Some(age) = age {
            attributes.push(ParticipantAttribute {
                attribute_id: AGE,
                value: AttributeValue::Number(age),
            });
        }
        Participant {
            id: ParticipantId(id),
            slug: format!("p-{}", id),
            email: email.to_string(),
            attributes,
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap(),
        }
    }

    fn fixture() -> (Vec<ColumnDef>, Vec<FlattenedParticipant>) {
        let schema = schema();
        let columns = generate_columns(&schema, &[], "pl");
        let participants = vec![
            participant(1, "ala@pwr.edu.pl", Some("wege"), Some(21.0)),
            participant(2, "bartek@pwr.edu.pl", Some("mięsna"), Some(19.0)),
            participant(3, "celina@gmail.com", Some("vegan"), None),
            participant(4, "darek@gmail.com", None, Some(25.0)),
        ];
        (columns, flatten(&participants))
    }

    #[test]
    fn test_unfiltered_projection_shows_all_rows() {
        let (columns, rows) = fixture();
        let controller = TableController::new(25);
        let view = project(&columns, &rows, &controller);
        assert_eq!(view.rows.len(), 4);
        assert_eq!(view.page.total, 4);
        assert!(view.empty_message.is_none());
    }

    #[test]
    fn test_discrete_filter_membership() {
        let (columns, rows) = fixture();
        let mut controller = TableController::new(25);
        controller.set_discrete_filter(
            ColumnKey::Attribute(DIET),
            BTreeSet::from(["wege".to_string(), "vegan".to_string()]),
        );
        let view = project(&columns, &rows, &controller);
        let emails: Vec<_> = view.rows.iter().map(|r| r.email.as_str()).collect();
        // "mięsna" and the row with no diet value are both excluded.
        assert_eq!(emails, vec!["ala@pwr.edu.pl", "celina@gmail.com"]);
    }

    #[test]
    fn test_global_filter_is_case_insensitive_substring() {
        let (columns, rows) = fixture();
        let mut controller = TableController::new(25);
        controller.set_global_filter("PWR.EDU");
        let view = project(&columns, &rows, &controller);
        assert_eq!(view.rows.len(), 2);
    }

    #[test]
    fn test_global_filter_searches_attribute_columns() {
        let (columns, rows) = fixture();
        let mut controller = TableController::new(25);
        controller.set_global_filter("vegan");
        let view = project(&columns, &rows, &controller);
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].email, "celina@gmail.com");
    }

    #[test]
    fn test_filters_combine_with_and() {
        let (columns, rows) = fixture();
        let mut controller = TableController::new(25);
        controller.set_discrete_filter(
            ColumnKey::Attribute(DIET),
            BTreeSet::from(["wege".to_string(), "mięsna".to_string()]),
        );
        controller.set_substring_filter(ColumnKey::Email, "gmail");
        let view = project(&columns, &rows, &controller);
        assert!(view.rows.is_empty());
        assert_eq!(view.empty_message.as_deref(), Some(EMPTY_MESSAGE));
    }

    #[test]
    fn test_sort_by_email_desc() {
        let (columns, rows) = fixture();
        let mut controller = TableController::new(25);
        controller.toggle_sort(ColumnKey::Email, false).unwrap();
        controller.toggle_sort(ColumnKey::Email, false).unwrap();
        let view = project(&columns, &rows, &controller);
        assert_eq!(view.rows[0].email, "darek@gmail.com");
        assert_eq!(view.rows[3].email, "ala@pwr.edu.pl");
    }

    #[test]
    fn test_numeric_sort_missing_values_last() {
        let (columns, rows) = fixture();
        let mut controller = TableController::new(25);
        controller
            .toggle_sort(ColumnKey::Attribute(AGE), false)
            .unwrap();
        let view = project(&columns, &rows, &controller);
        let emails: Vec<_> = view.rows.iter().map(|r| r.email.as_str()).collect();
        // 19, 21, 25, then the row with no age.
        assert_eq!(
            emails,
            vec![
                "bartek@pwr.edu.pl",
                "ala@pwr.edu.pl",
                "darek@gmail.com",
                "celina@gmail.com"
            ]
        );
    }

    #[test]
    fn test_missing_values_last_even_descending() {
        let (columns, rows) = fixture();
        let mut controller = TableController::new(25);
        controller
            .toggle_sort(ColumnKey::Attribute(AGE), false)
            .unwrap();
        controller
            .toggle_sort(ColumnKey::Attribute(AGE), false)
            .unwrap();
        let view = project(&columns, &rows, &controller);
        assert_eq!(view.rows[0].email, "darek@gmail.com"); // 25 first
        assert_eq!(view.rows[3].email, "celina@gmail.com"); // Missing still last
    }

    #[test]
    fn test_multi_sort_breaks_ties_in_chain_order() {
        let schema = schema();
        let columns = generate_columns(&schema, &[], "pl");
        let participants = vec![
            participant(1, "b@x.pl", Some("wege"), Some(20.0)),
            participant(2, "a@x.pl", Some("wege"), Some(20.0)),
            participant(3, "c@x.pl", Some("wege"), Some(18.0)),
        ];
        let rows = flatten(&participants);
        let mut controller = TableController::new(25);
        controller
            .toggle_sort(ColumnKey::Attribute(AGE), false)
            .unwrap();
        controller.toggle_sort(ColumnKey::Email, true).unwrap();
        let view = project(&columns, &rows, &controller);
        let emails: Vec<_> = view.rows.iter().map(|r| r.email.as_str()).collect();
        assert_eq!(emails, vec!["c@x.pl", "a@x.pl", "b@x.pl"]);
    }

    #[test]
    fn test_pagination_over_filtered_result() {
        let schema = schema();
        let columns = generate_columns(&schema, &[], "pl");
        let participants: Vec<_> = (1..=60)
            .map(|i| participant(i, &format!("p{}@x.pl", i), Some("wege"), None))
            .collect();
        let rows = flatten(&participants);
        let mut controller = TableController::new(25);
        controller.set_page(2);
        let view = project(&columns, &rows, &controller);
        assert_eq!(view.page.page, 2);
        assert_eq!(view.page.page_count, 3);
        assert_eq!(view.rows.len(), 10);
    }

    #[test]
    fn test_out_of_range_page_clamped() {
        let (columns, rows) = fixture();
        let mut controller = TableController::new(25);
        controller.set_page(9);
        let view = project(&columns, &rows, &controller);
        assert_eq!(view.page.page, 0);
        assert_eq!(view.rows.len(), 4);
    }

    #[test]
    fn test_empty_dataset_renders_empty_state_with_base_columns() {
        let columns = generate_columns(&[], &[], "pl");
        let controller = TableController::new(25);
        let view = project(&columns, &[], &controller);
        assert_eq!(view.columns.len(), 2);
        assert!(view.rows.is_empty());
        assert_eq!(view.empty_message.as_deref(), Some(EMPTY_MESSAGE));
        assert_eq!(view.selection, SelectionState::None);
    }

    #[test]
    fn test_selection_header_tri_state() {
        let (columns, rows) = fixture();
        let mut controller = TableController::new(25);
        assert_eq!(
            project(&columns, &rows, &controller).selection,
            SelectionState::None
        );

        controller.toggle_selection(ParticipantId(1));
        assert_eq!(
            project(&columns, &rows, &controller).selection,
            SelectionState::Some
        );

        for id in 2..=4 {
            controller.toggle_selection(ParticipantId(id));
        }
        assert_eq!(
            project(&columns, &rows, &controller).selection,
            SelectionState::All
        );
    }

    #[test]
    fn test_selection_state_counts_visible_rows_only() {
        let (columns, rows) = fixture();
        let mut controller = TableController::new(25);
        controller.toggle_selection(ParticipantId(1));
        controller.set_discrete_filter(
            ColumnKey::Attribute(DIET),
            BTreeSet::from(["wege".to_string()]),
        );
        // Only row 1 is visible and it is selected.
        let view = project(&columns, &rows, &controller);
        assert_eq!(view.selection, SelectionState::All);
    }

    #[test]
    fn test_row_flags_carried_into_view() {
        let (columns, rows) = fixture();
        let mut controller = TableController::new(25);
        controller.begin_edit(ParticipantId(1)).unwrap();
        controller.begin_mutation(ParticipantId(2)).unwrap();
        controller.mark_expanded(ParticipantId(3));
        let view = project(&columns, &rows, &controller);
        let by_email = |email: &str| view.rows.iter().find(|r| r.email == email).unwrap();
        assert_eq!(by_email("ala@pwr.edu.pl").mode, RowMode::Edit);
        assert!(by_email("bartek@pwr.edu.pl").in_flight);
        assert!(by_email("celina@gmail.com").was_expanded);
    }
}
