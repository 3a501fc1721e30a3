//! Breakpoint module orchestrator.
//!
//! Threshold tables and the selector that tracks which entry is active as the
//! caller reports new measurements.

mod core;

pub use self::core::{
    BASE_THRESHOLD, Breakpoint, BreakpointSelector, BreakpointTable, initial_index, reselect,
};
