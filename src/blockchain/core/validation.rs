use crate::error::ChainError;

use super::block::Block;

/// Check `candidate` against `predecessor`, reporting the first failed rule.
///
/// Rules, in order: the index advances by exactly one, the previous hash
/// points at the predecessor, and the stored hash matches a recomputation.
pub fn check_block(candidate: &Block, predecessor: &Block) -> Result<(), ChainError> {
    let expected_index = predecessor
        .index
        .checked_add(1)
        .ok_or(ChainError::IndexOverflow)?;
    if candidate.index != expected_index {
        return Err(ChainError::InvalidIndex {
            expected: expected_index,
            got: candidate.index,
        });
    }

    if candidate.prev_hash != predecessor.hash {
        return Err(ChainError::PrevHashMismatch {
            expected: predecessor.hash.clone(),
            got: candidate.prev_hash.clone(),
        });
    }

    let recomputed = candidate.calculate_hash();
    if recomputed != candidate.hash {
        return Err(ChainError::HashMismatch {
            expected: recomputed,
            got: candidate.hash.clone(),
        });
    }

    Ok(())
}

/// Boolean form of [`check_block`].
pub fn is_block_valid(candidate: &Block, predecessor: &Block) -> bool {
    check_block(candidate, predecessor).is_ok()
}

/// Check that `genesis` is a well-formed first block.
pub fn check_genesis(genesis: &Block) -> Result<(), ChainError> {
    if genesis.index != 0 {
        return Err(ChainError::InvalidGenesis(format!(
            "index must be 0, got {}",
            genesis.index
        )));
    }
    if !genesis.prev_hash.is_empty() {
        return Err(ChainError::InvalidGenesis(
            "previous hash must be empty".to_string(),
        ));
    }
    if !genesis.has_valid_hash() {
        return Err(ChainError::InvalidGenesis(format!(
            "hash mismatch: computed {}, stored {}",
            genesis.calculate_hash(),
            genesis.hash
        )));
    }
    Ok(())
}

/// Audit a whole sequence: a valid genesis followed by valid links.
pub fn validate_chain(blocks: &[Block]) -> Result<(), ChainError> {
    let genesis = blocks.first().ok_or(ChainError::EmptyChain)?;
    check_genesis(genesis)?;

    for pair in blocks.windows(2) {
        check_block(&pair[1], &pair[0])?;
    }
    Ok(())
}

/// Like [`validate_chain`] but collects every problem instead of stopping at
/// the first one.
pub fn audit_chain(blocks: &[Block]) -> Vec<String> {
    let mut errors = Vec::new();

    match blocks.first() {
        None => errors.push(ChainError::EmptyChain.to_string()),
        Some(genesis) => {
            if let Err(e) = check_genesis(genesis) {
                errors.push(e.to_string());
            }
        }
    }

    for pair in blocks.windows(2) {
        if let Err(e) = check_block(&pair[1], &pair[0]) {
            errors.push(format!("block {}: {}", pair[1].index, e));
        }
    }
    errors
}
