//! Participant model and mutation request payloads.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::attribute::AttributeId;

/// Typed key for a participant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ParticipantId(pub i64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A recorded attribute value.
///
/// `Empty` is an explicit null ("explicitly cleared"); a value that was
/// never recorded is simply absent from the participant's attribute list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
    Empty,
}

impl AttributeValue {
    /// Stringify for filtering and sorting; `None` for an explicit null.
    pub fn as_display(&self) -> Option<String> {
        match self {
            AttributeValue::Text(s) => Some(s.clone()),
            AttributeValue::Number(n) => Some(format_number(*n)),
            AttributeValue::Bool(b) => Some(b.to_string()),
            AttributeValue::List(items) => Some(items.join(", ")),
            AttributeValue::Empty => None,
        }
    }

    /// Membership test against one discrete filter option.
    ///
    /// A list value matches if any element matches; `Empty` matches
    /// nothing.
    pub fn matches_option(&self, option: &str) -> bool {
        match self {
            AttributeValue::Text(s) => s == option,
            AttributeValue::Bool(b) => b.to_string() == option,
            AttributeValue::Number(n) => format_number(*n) == option,
            AttributeValue::List(items) => items.iter().any(|i| i == option),
            AttributeValue::Empty => false,
        }
    }

    /// Numeric view, for numeric sort comparisons.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// Render whole numbers without a trailing ".0".
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// One (attribute, value) pair recorded on a participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantAttribute {
    pub attribute_id: AttributeId,
    pub value: AttributeValue,
}

/// One registrant for an event, as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: ParticipantId,
    pub slug: String,
    pub email: String,
    #[serde(default)]
    pub attributes: Vec<ParticipantAttribute>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for registering a participant.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateParticipantRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Initial attribute values, keyed by attribute id.
    #[serde(default)]
    pub values: BTreeMap<AttributeId, AttributeValue>,
}

/// Request payload for saving a row's inline edits.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParticipantRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    /// Changed attribute values, keyed by attribute id. An explicit null
    /// clears the value.
    #[serde(default)]
    pub values: BTreeMap<AttributeId, AttributeValue>,
}
