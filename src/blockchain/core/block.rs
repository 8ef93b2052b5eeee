use crate::error::ChainError;
use serde::{Deserialize, Serialize};

use super::hash::calculate_hash;

/// One immutable ledger record, linked to its predecessor by hash.
///
/// Serialized field names follow the wire format: `Index`, `Timestamp`,
/// `Value`, `Hash`, `PrevHash`. The legacy payload name `BPM` is accepted on
/// input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Block {
    pub index: u64,
    pub timestamp: String,
    #[serde(alias = "BPM")]
    pub value: i64,
    pub hash: String,
    pub prev_hash: String,
}

impl Block {
    /// Genesis block stamped with the current time.
    pub fn genesis() -> Self {
        Self::genesis_at(current_timestamp())
    }

    /// Genesis block with a caller-chosen timestamp. Index 0, value 0 and an
    /// empty previous hash; the hash itself is computed like any other block.
    pub fn genesis_at(timestamp: impl Into<String>) -> Self {
        let timestamp = timestamp.into();
        let hash = calculate_hash(0, &timestamp, 0, "");
        Block {
            index: 0,
            timestamp,
            value: 0,
            hash,
            prev_hash: String::new(),
        }
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }

    /// Recompute the digest over this block's non-hash fields.
    pub fn calculate_hash(&self) -> String {
        calculate_hash(self.index, &self.timestamp, self.value, &self.prev_hash)
    }

    /// True when the stored hash matches a fresh recomputation.
    pub fn has_valid_hash(&self) -> bool {
        self.hash == self.calculate_hash()
    }
}

/// Current wall-clock time in the format stored on blocks.
pub fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Build the successor of `prev` carrying `value`, stamped with the current time.
pub fn generate_block(prev: &Block, value: i64) -> Result<Block, ChainError> {
    generate_block_at(prev, value, current_timestamp())
}

/// Build the successor of `prev` with an explicit timestamp.
///
/// Construction is pure; the caller decides whether the block is kept.
pub fn generate_block_at(
    prev: &Block,
    value: i64,
    timestamp: impl Into<String>,
) -> Result<Block, ChainError> {
    let index = prev.index.checked_add(1).ok_or(ChainError::IndexOverflow)?;
    let timestamp = timestamp.into();
    let prev_hash = prev.hash.clone();
    let hash = calculate_hash(index, &timestamp, value, &prev_hash);

    Ok(Block {
        index,
        timestamp,
        value,
        hash,
        prev_hash,
    })
}
