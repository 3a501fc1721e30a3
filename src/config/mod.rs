//! Configuration module orchestrator.
//!
//! Options mirror the keys accepted from JSON (`columns`, `rows`, `gutter`,
//! `colWidth`, `rowHeight`, `tileModel`, `sizingUnit`/`layoutInPercent`,
//! `heightFromWidth`, `breakpoints`).

mod core;

pub use self::core::{BreakpointOptions, ConfigOverrides, Length, MosaicConfig, SizingUnit};
