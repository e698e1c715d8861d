//! CubeCap Common Utilities
//!
//! Shared infrastructure for all CubeCap crates:
//! - Error types and result aliases
//! - Capture and application configuration
//! - Tracing/logging initialization

pub mod config;
pub mod error;
pub mod logging;

pub use config::*;
pub use error::*;
