//! Render module orchestrator.
//!
//! Converts layout results into offsets for a style sink, resolves track
//! sizes from configuration, and draws text previews.

mod core;
pub mod preview;
pub mod sizing;

pub use self::core::{MemoryStyleSink, OffsetRenderer, StyleSink, TileOffset};
pub use preview::{PreviewSettings, render_text};
pub use sizing::{CellMetrics, TrackSizes};
