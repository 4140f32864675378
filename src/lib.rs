//! Lua Auth key console
//!
//! Operator tool for issuing access keys to Lua scripts:
//! - Batch generation with per-batch length, quantity, note and validity
//! - A persisted key store with search, revoke and wipe
//! - Plain-text export
//! - A validation simulator that mimics a remote key check

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
