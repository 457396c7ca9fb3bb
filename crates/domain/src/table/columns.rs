//! Column generation.
//!
//! Maps the attribute schema into table column definitions. Pure and
//! deterministic given the same attributes, blocks and locale; performs
//! no I/O.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::models::attribute::{listed, Attribute, AttributeId, AttributeType};
use crate::models::block::Block;

/// Identifies a table column.
///
/// The attribute form serializes as the stringified attribute id, the
/// same key the flattened values map uses, so controller wire payloads
/// and row values can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColumnKey {
    Selection,
    Email,
    Attribute(AttributeId),
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKey::Selection => f.write_str("selection"),
            ColumnKey::Email => f.write_str("email"),
            ColumnKey::Attribute(id) => write!(f, "{}", id),
        }
    }
}

impl FromStr for ColumnKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "selection" => Ok(ColumnKey::Selection),
            "email" => Ok(ColumnKey::Email),
            other => other
                .parse::<i64>()
                .map(|id| ColumnKey::Attribute(AttributeId(id)))
                .map_err(|_| format!("unknown column key: {}", other)),
        }
    }
}

impl Serialize for ColumnKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ColumnKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Per-column filter behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "options")]
pub enum ColumnFilter {
    /// No per-column filter; the column relies on the global filter.
    None,
    /// Case-insensitive substring match.
    Substring,
    /// Membership in a chosen subset of the listed options.
    Discrete(Vec<String>),
}

/// Inline editor widget rendered when a row is in edit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditorKind {
    Text,
    Number,
    Textarea,
    File,
    Select,
    Multiselect,
    Block,
    Date,
    Time,
    DatetimeLocal,
    Email,
    Tel,
    Color,
    Checkbox,
}

impl From<AttributeType> for EditorKind {
    fn from(attribute_type: AttributeType) -> Self {
        match attribute_type {
            AttributeType::Text => EditorKind::Text,
            AttributeType::Number => EditorKind::Number,
            AttributeType::Textarea => EditorKind::Textarea,
            AttributeType::File => EditorKind::File,
            AttributeType::Select => EditorKind::Select,
            AttributeType::Multiselect => EditorKind::Multiselect,
            AttributeType::Block => EditorKind::Block,
            AttributeType::Date => EditorKind::Date,
            AttributeType::Time => EditorKind::Time,
            AttributeType::Datetime => EditorKind::DatetimeLocal,
            AttributeType::Email => EditorKind::Email,
            AttributeType::Tel => EditorKind::Tel,
            AttributeType::Color => EditorKind::Color,
            AttributeType::Checkbox => EditorKind::Checkbox,
        }
    }
}

/// One renderable column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    pub key: ColumnKey,
    pub header: String,
    pub sortable: bool,
    pub hideable: bool,
    pub filter: ColumnFilter,
    /// Editor for edit-mode cells; absent on the selection column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor: Option<EditorKind>,
}

/// Generate the column set for an event.
///
/// Always emits the selection column first, then email, then one column
/// per listed attribute in the attribute's order, keyed by the attribute
/// id.
pub fn generate_columns(
    attributes: &[Attribute],
    blocks: &[Block],
    locale: &str,
) -> Vec<ColumnDef> {
    let mut columns = Vec::with_capacity(2 + attributes.len());

    columns.push(ColumnDef {
        key: ColumnKey::Selection,
        header: String::new(),
        sortable: false,
        hideable: false,
        filter: ColumnFilter::None,
        editor: None,
    });

    columns.push(ColumnDef {
        key: ColumnKey::Email,
        header: "Email".to_string(),
        sortable: true,
        hideable: true,
        filter: ColumnFilter::Substring,
        editor: Some(EditorKind::Email),
    });

    for attribute in listed(attributes) {
        columns.push(ColumnDef {
            key: ColumnKey::Attribute(attribute.id),
            header: attribute.name.display(locale).to_string(),
            sortable: true,
            hideable: true,
            filter: filter_for(attribute, blocks),
            editor: Some(EditorKind::from(attribute.attribute_type)),
        });
    }

    columns
}

fn filter_for(attribute: &Attribute, blocks: &[Block]) -> ColumnFilter {
    match attribute.attribute_type {
        AttributeType::Select | AttributeType::Multiselect => match &attribute.options {
            Some(options) if !options.is_empty() => ColumnFilter::Discrete(options.clone()),
            _ => ColumnFilter::None,
        },
        AttributeType::Checkbox => match &attribute.options {
            Some(options) if !options.is_empty() => ColumnFilter::Discrete(options.clone()),
            // A bare checkbox filters on its two implicit states.
            _ => ColumnFilter::Discrete(vec!["true".to_string(), "false".to_string()]),
        },
        AttributeType::Block => {
            ColumnFilter::Discrete(blocks.iter().map(|b| b.name.clone()).collect())
        }
        _ => ColumnFilter::None,
    }
}
