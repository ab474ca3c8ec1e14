//! QuietCut Common Utilities
//!
//! Shared infrastructure for all QuietCut crates:
//! - Error types and result aliases
//! - Tracing/logging initialization
//! - Configuration loading
//! - External tool discovery

pub mod config;
pub mod error;
pub mod logging;
pub mod tools;

pub use config::*;
pub use error::*;
