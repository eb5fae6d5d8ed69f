//! Chunkio Common - Shared types and utilities
//!
//! This crate provides the types, error definitions and configuration
//! structures used across all chunkio components.

pub mod config;
pub mod error;
pub mod types;

pub use config::StoreConfig;
pub use error::{Error, Result};
pub use types::*;
