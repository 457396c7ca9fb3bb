//! Block model.
//!
//! A block is a capacity-limited grouping participants can be assigned
//! to, such as a workshop slot. The panel only reads blocks: their names
//! feed the discrete filter of block-typed columns, and a row's block
//! assignments are fetched lazily when the row detail is expanded.

use serde::{Deserialize, Serialize};

/// Typed key for a block.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BlockId(pub i64);

/// A capacity-limited participant grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: BlockId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
}
