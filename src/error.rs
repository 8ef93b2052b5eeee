//! Error types for hashledger

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("Invalid block index: expected {expected}, got {got}")]
    InvalidIndex { expected: u64, got: u64 },

    #[error("Invalid previous hash: expected {expected}, got {got}")]
    PrevHashMismatch { expected: String, got: String },

    #[error("Block hash mismatch: computed {expected}, stored {got}")]
    HashMismatch { expected: String, got: String },

    #[error("Invalid genesis block: {0}")]
    InvalidGenesis(String),

    #[error("Chain is empty")]
    EmptyChain,

    #[error("Candidate chain does not share this ledger's genesis block")]
    ForeignGenesis,

    #[error("Block index overflow")]
    IndexOverflow,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ChainError {
    fn from(err: serde_json::Error) -> Self {
        ChainError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for ChainError {
    fn from(err: toml::de::Error) -> Self {
        ChainError::Config(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
