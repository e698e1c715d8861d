//! CubeCap Storage Index
//!
//! Owns the mapping from a captured object's identity to its output folder
//! and metadata record:
//! - **Record:** the persistent per-object metadata (folder path, capture
//!   history, source-type flag)
//! - **Index:** path-invariant enforcement, folder synthesis, and history
//!   tracking across captures
//! - **Probe:** write-once export of supplementary probe parameters

pub mod index;
pub mod probe;
pub mod record;

pub use index::*;
pub use probe::*;
pub use record::*;
