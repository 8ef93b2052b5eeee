//! hashledger - A minimal hash-linked append-only ledger served over HTTP
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Chain Integrity Core
//! - [`blockchain`] - Block hashing, construction, validation and the
//!   longest-chain replacement rule
//! - [`ledger`] - Lock-guarded shared owner of the canonical chain
//!
//! ## Node & HTTP
//! - [`node`] - Startup orchestration and lifecycle state
//! - `api` - HTTP routes (behind the `api` feature)
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Chain Integrity Core
// ============================================================================
pub mod blockchain;
pub mod ledger;

// ============================================================================
// Node & HTTP
// ============================================================================
#[cfg(feature = "api")]
pub mod api;
pub mod node;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;
