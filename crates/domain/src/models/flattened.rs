//! Participant flattening layer.
//!
//! Converts the nested participant+attribute-list representation into
//! flat, keyed records the table layer consumes. The values map is keyed
//! by [`AttributeId`], which serializes to the stringified id — exactly
//! the key form column accessors use.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::attribute::AttributeId;
use crate::models::participant::{AttributeValue, Participant, ParticipantId};

/// Whether a row is actively being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowMode {
    #[default]
    View,
    Edit,
}

/// A participant prepared for tabular display.
///
/// Derived, rebuilt whenever the underlying participant list changes;
/// never persisted. Attributes absent on the source participant are
/// omitted from `values` — an explicit null is kept as
/// [`AttributeValue::Empty`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenedParticipant {
    pub id: ParticipantId,
    pub slug: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub values: BTreeMap<AttributeId, AttributeValue>,
    pub mode: RowMode,
    pub was_expanded: bool,
}

/// Flatten a participant list for table consumption.
///
/// Total and lossless for scalar data: every attribute id recorded on a
/// source participant appears as a key on the flattened record. Produces
/// a new vector each call and never mutates its input; flattening the
/// same list twice yields structurally equal output.
pub fn flatten(participants: &[Participant]) -> Vec<FlattenedParticipant> {
    participants
        .iter()
        .map(|p| {
            let values = p
                .attributes
                .iter()
                .map(|pa| (pa.attribute_id, pa.value.clone()))
                .collect();
            FlattenedParticipant {
                id: p.id,
                slug: p.slug.clone(),
                email: p.email.clone(),
                created_at: p.created_at,
                updated_at: p.updated_at,
                values,
                mode: RowMode::View,
                was_expanded: false,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::participant::ParticipantAttribute;
    use chrono::TimeZone;

    fn participant(id: i64, attrs: Vec<(i64, AttributeValue)>) -> Participant {
        Participant {
            id: ParticipantId(id),
            slug: format!("participant-{}", id),
            email: format!("p{}@example.com", id),
            attributes: attrs
                .into_iter()
                .map(|(aid, value)| ParticipantAttribute {
                    attribute_id: AttributeId(aid),
                    value,
                })
                .collect(),
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 3, 2, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_flatten_is_lossless_for_recorded_attributes() {
        let source = vec![participant(
            1,
            vec![
                (3, AttributeValue::Text("wege".to_string())),
                (5, AttributeValue::Number(25.0)),
                (9, AttributeValue::Empty),
            ],
        )];
        let rows = flatten(&source);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.values.len(), 3);
        assert_eq!(
            row.values.get(&AttributeId(3)),
            Some(&AttributeValue::Text("wege".to_string()))
        );
        assert_eq!(
            row.values.get(&AttributeId(9)),
            Some(&AttributeValue::Empty)
        );
    }

    #[test]
    fn test_flatten_omits_absent_attributes() {
        let source = vec![participant(1, vec![(3, AttributeValue::Bool(true))])];
        let rows = flatten(&source);
        assert!(rows[0].values.contains_key(&AttributeId(3)));
        assert!(!rows[0].values.contains_key(&AttributeId(4)));
    }

    #[test]
    fn test_flatten_defaults_ui_fields() {
        let rows = flatten(&[participant(1, vec![])]);
        assert_eq!(rows[0].mode, RowMode::View);
        assert!(!rows[0].was_expanded);
    }

    #[test]
    fn test_flatten_is_idempotent() {
        let source = vec![
            participant(1, vec![(3, AttributeValue::Text("a".to_string()))]),
            participant(2, vec![(3, AttributeValue::Text("b".to_string()))]),
        ];
        let first = flatten(&source);
        let second = flatten(&source);
        assert_eq!(first, second);
    }

    #[test]
    fn test_flatten_does_not_mutate_input() {
        let source = vec![participant(1, vec![(3, AttributeValue::Bool(true))])];
        let snapshot = source.clone();
        let _ = flatten(&source);
        assert_eq!(source, snapshot);
    }

    #[test]
    fn test_values_serialize_with_stringified_id_keys() {
        let rows = flatten(&[participant(
            1,
            vec![(3, AttributeValue::Text("wege".to_string()))],
        )]);
        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["values"]["3"], "wege");
    }

    #[test]
    fn test_row_mode_wire_form() {
        assert_eq!(serde_json::to_string(&RowMode::View).unwrap(), "\"view\"");
        assert_eq!(serde_json::to_string(&RowMode::Edit).unwrap(), "\"edit\"");
    }
}
