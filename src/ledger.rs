//! Shared, lock-guarded owner of the canonical chain.
//!
//! Every write (build, validate, append, replace) runs under a single write
//! lock, so concurrent appends are serialized and none is lost. Reads take
//! the read lock and clone, so they always see a complete chain.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::blockchain::{check_block, generate_block, Block, Blockchain, ReplaceOutcome};
use crate::error::ChainError;

/// Cloneable handle to the process-wide ledger.
#[derive(Clone)]
pub struct Ledger {
    chain: Arc<RwLock<Blockchain>>,
}

impl Ledger {
    /// Create a ledger holding only `genesis`.
    pub fn new(genesis: Block) -> Result<Self, ChainError> {
        Ok(Self::from_chain(Blockchain::new(genesis)?))
    }

    /// Create a ledger seeded with a genesis block stamped now.
    pub fn with_genesis() -> Result<Self, ChainError> {
        Self::new(Block::genesis())
    }

    pub fn from_chain(chain: Blockchain) -> Self {
        Self {
            chain: Arc::new(RwLock::new(chain)),
        }
    }

    /// Consistent copy of the canonical chain.
    pub async fn snapshot(&self) -> Vec<Block> {
        self.chain.read().await.blocks().to_vec()
    }

    pub async fn height(&self) -> usize {
        self.chain.read().await.len()
    }

    pub async fn latest(&self) -> Block {
        self.chain.read().await.latest().clone()
    }

    pub async fn get_block(&self, index: u64) -> Option<Block> {
        self.chain.read().await.get_block(index).cloned()
    }

    /// Build a block carrying `value` on top of the current tip and make it
    /// canonical. Returns the accepted block.
    pub async fn append_value(&self, value: i64) -> Result<Block, ChainError> {
        let mut chain = self.chain.write().await;
        let block = generate_block(chain.latest(), value)?;
        Self::accept(&mut chain, block)
    }

    /// Accept a block built elsewhere if it extends the current tip.
    pub async fn submit_block(&self, block: Block) -> Result<Block, ChainError> {
        let mut chain = self.chain.write().await;
        Self::accept(&mut chain, block)
    }

    /// Offer a whole candidate chain to the replacement rule.
    pub async fn replace_chain(&self, candidate: Vec<Block>) -> Result<ReplaceOutcome, ChainError> {
        let mut chain = self.chain.write().await;
        let outcome = chain.replace(candidate)?;
        if outcome == ReplaceOutcome::Replaced {
            info!(height = chain.len(), "ledger.chain_replaced");
        }
        Ok(outcome)
    }

    fn accept(chain: &mut Blockchain, block: Block) -> Result<Block, ChainError> {
        if let Err(e) = check_block(&block, chain.latest()) {
            warn!(index = block.index, error = %e, "ledger.block_rejected");
            return Err(e);
        }

        let candidate = chain.append(block.clone());
        if let Err(e) = chain.replace(candidate) {
            warn!(index = block.index, error = %e, "ledger.block_rejected");
            return Err(e);
        }

        info!(
            index = block.index,
            value = block.value,
            hash = %block.hash,
            "ledger.block_appended"
        );
        debug!(chain = ?chain.blocks(), "ledger.chain");
        Ok(block)
    }
}
