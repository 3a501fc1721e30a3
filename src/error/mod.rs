//! Error module orchestrator.
//!
//! The variants live in `types`; downstream code imports them from here.

mod types;

pub use types::{MosaicError, Result};
