//! Layout module orchestrator.
//!
//! Downstream code imports the placement engine and its result types from
//! here while the implementation details live in the private `core` module.

mod core;

pub use self::core::{
    LayoutParams, LayoutResult, MAX_EXPLICIT_ROW, PlacementEngine, TilePlacement, UnplacedReason,
};
