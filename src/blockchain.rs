// Thin re-export module: implementation lives under `blockchain/core` and is
// split by responsibility (hashing, block construction, validation, chain
// storage).

pub mod core;
pub use core::*;
