//! Event attribute schema model.
//!
//! Attributes are per-event custom field definitions fetched from the
//! backend. They are read-only input to column generation and value
//! validation; the panel never mutates them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use validator::ValidationError;

use crate::models::participant::AttributeValue;

/// Typed key for an event attribute.
///
/// Used everywhere an attribute value is keyed, so flattened records and
/// column accessors can never disagree on the key form.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AttributeId(pub i64);

impl fmt::Display for AttributeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Attribute kind, fixed at creation.
///
/// The kind determines both the inline editor widget and the runtime
/// representation of the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    Text,
    Number,
    Textarea,
    File,
    Select,
    Multiselect,
    Block,
    Date,
    Time,
    Datetime,
    Email,
    Tel,
    Color,
    Checkbox,
}

impl AttributeType {
    /// Whether this kind carries an enumerated option list.
    pub fn has_options(&self) -> bool {
        matches!(
            self,
            AttributeType::Select | AttributeType::Multiselect | AttributeType::Checkbox
        )
    }
}

/// Display label for an attribute: a plain string or a locale map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeLabel {
    Plain(String),
    Localized(BTreeMap<String, String>),
}

impl AttributeLabel {
    /// Resolve the label for a locale.
    ///
    /// Falls back from the exact locale to `pl`, then to any entry.
    pub fn display(&self, locale: &str) -> &str {
        match self {
            AttributeLabel::Plain(s) => s,
            AttributeLabel::Localized(map) => map
                .get(locale)
                .or_else(|| map.get("pl"))
                .or_else(|| map.values().next())
                .map(String::as_str)
                .unwrap_or(""),
        }
    }
}

/// A per-event custom field definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub id: AttributeId,
    pub slug: String,
    pub name: AttributeLabel,
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
    /// Ordered choices; present only for select/multiselect/checkbox.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// Whether this attribute renders as a table column.
    #[serde(default)]
    pub show_in_list: bool,
}

impl Attribute {
    /// Validate a recorded value against this attribute's kind.
    ///
    /// `Empty` is always accepted: an explicit null means "explicitly
    /// cleared" and is a legal state for every kind.
    pub fn validate_value(&self, value: &AttributeValue) -> Result<(), ValidationError> {
        if matches!(value, AttributeValue::Empty) {
            return Ok(());
        }

        match self.attribute_type {
            AttributeType::Text | AttributeType::Textarea | AttributeType::File => {
                expect_text(value).map(|_| ())
            }
            AttributeType::Number => match value {
                AttributeValue::Number(n) => shared::validation::validate_number(*n),
                _ => Err(type_mismatch("number")),
            },
            AttributeType::Email => {
                shared::validation::validate_email(expect_text(value)?)
            }
            AttributeType::Tel => shared::validation::validate_tel(expect_text(value)?),
            AttributeType::Color => shared::validation::validate_color(expect_text(value)?),
            AttributeType::Date => shared::validation::validate_date(expect_text(value)?),
            AttributeType::Time => shared::validation::validate_time(expect_text(value)?),
            AttributeType::Datetime => {
                shared::validation::validate_datetime(expect_text(value)?)
            }
            AttributeType::Select => {
                let text = expect_text(value)?;
                match &self.options {
                    Some(options) => {
                        shared::validation::validate_option_membership(text, options)
                    }
                    None => Ok(()),
                }
            }
            AttributeType::Multiselect => match value {
                AttributeValue::List(items) => {
                    if let Some(options) = &self.options {
                        for item in items {
                            shared::validation::validate_option_membership(item, options)?;
                        }
                    }
                    Ok(())
                }
                AttributeValue::Text(text) => match &self.options {
                    Some(options) => {
                        shared::validation::validate_option_membership(text, options)
                    }
                    None => Ok(()),
                },
                _ => Err(type_mismatch("list")),
            },
            AttributeType::Checkbox => match (value, &self.options) {
                (AttributeValue::Bool(_), _) => Ok(()),
                (AttributeValue::Text(text), Some(options)) => {
                    shared::validation::validate_option_membership(text, options)
                }
                _ => Err(type_mismatch("boolean")),
            },
            // Block assignment values are block names resolved by the backend.
            AttributeType::Block => expect_text(value).map(|_| ()),
        }
    }
}

fn expect_text(value: &AttributeValue) -> Result<&str, ValidationError> {
    match value {
        AttributeValue::Text(s) => Ok(s),
        _ => Err(type_mismatch("text")),
    }
}

fn type_mismatch(expected: &str) -> ValidationError {
    let mut err = ValidationError::new("value_type");
    err.message = Some(format!("Expected a {} value", expected).into());
    err
}

/// Attributes that render as table columns, in their listed order.
///
/// All attributes remain addressable for row-detail rendering; this is
/// only the default column projection.
pub fn listed(attributes: &[Attribute]) -> Vec<&Attribute> {
    attributes.iter().filter(|a| a.show_in_list).collect()
}
