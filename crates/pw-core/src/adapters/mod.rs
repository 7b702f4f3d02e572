//! Implementations of the [`crate::ports`] capabilities.
//!
//! - `memory`: in-process store and evaluator, with failure injection
//! - `file`: JSON document on disk (feature `fs`)

#[cfg(feature = "fs")]
mod file;
mod memory;

#[cfg(feature = "fs")]
pub use file::JsonFileStore;
pub use memory::{MemoryEvaluator, MemoryStore};
