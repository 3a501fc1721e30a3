//! Tile module orchestrator.
//!
//! Tile descriptions and the position variants they carry; the engine in
//! `layout` consumes these.

mod core;

pub use self::core::{Position, TileId, TilePosition, TileSpec};
