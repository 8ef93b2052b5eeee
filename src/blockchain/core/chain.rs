use crate::error::ChainError;

use super::block::Block;
use super::validation::{check_block, validate_chain};

/// Result of offering a candidate chain to [`Blockchain::replace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    /// The candidate was strictly longer and is now canonical.
    Replaced,
    /// The candidate was not longer; the current chain is unchanged.
    KeptCurrent,
}

/// The canonical, hash-linked sequence of accepted blocks.
///
/// Never empty: it starts as `[genesis]` and only ever changes by adopting a
/// strictly longer chain rooted at the same genesis block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blockchain {
    blocks: Vec<Block>,
}

impl Blockchain {
    /// Create a chain holding only `genesis`.
    pub fn new(genesis: Block) -> Result<Self, ChainError> {
        Self::from_blocks(vec![genesis])
    }

    /// Create a chain from an existing sequence, validating every link.
    pub fn from_blocks(blocks: Vec<Block>) -> Result<Self, ChainError> {
        validate_chain(&blocks)?;
        Ok(Blockchain { blocks })
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// A chain always holds its genesis block, so this is false.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn genesis(&self) -> &Block {
        &self.blocks[0]
    }

    pub fn latest(&self) -> &Block {
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn get_block(&self, index: u64) -> Option<&Block> {
        usize::try_from(index).ok().and_then(|i| self.blocks.get(i))
    }

    /// The candidate sequence formed by the current chain plus `block`.
    ///
    /// Does not touch the store; pass the result to [`Blockchain::replace`].
    pub fn append(&self, block: Block) -> Vec<Block> {
        let mut candidate = Vec::with_capacity(self.blocks.len() + 1);
        candidate.extend_from_slice(&self.blocks);
        candidate.push(block);
        candidate
    }

    /// Adopt `candidate` iff it is strictly longer than the current chain.
    ///
    /// Equal or shorter candidates leave the chain unchanged. A longer
    /// candidate must be a valid chain rooted at the same genesis block,
    /// otherwise it is rejected with an error and nothing changes.
    ///
    /// When the candidate holds the current tip at the tip's position, only
    /// the blocks past it are checked and they are appended to this chain's
    /// own blocks. Any other candidate is audited in full.
    pub fn replace(&mut self, candidate: Vec<Block>) -> Result<ReplaceOutcome, ChainError> {
        let current = self.blocks.len();
        if candidate.len() <= current {
            return Ok(ReplaceOutcome::KeptCurrent);
        }

        if candidate[current - 1] == *self.latest() {
            for pair in candidate[current - 1..].windows(2) {
                check_block(&pair[1], &pair[0])?;
            }
            self.blocks.extend(candidate.into_iter().skip(current));
            return Ok(ReplaceOutcome::Replaced);
        }

        validate_chain(&candidate)?;
        if candidate[0] != self.blocks[0] {
            return Err(ChainError::ForeignGenesis);
        }

        self.blocks = candidate;
        Ok(ReplaceOutcome::Replaced)
    }
}
