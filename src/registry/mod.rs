//! Registry module orchestrator.

mod core;

pub use self::core::{TileRegistry, TileState, layout_fingerprint};
