//! Mosaic tile grid layout.
//!
//! Rectangular tiles spanning whole cells are laid out onto a fixed-width
//! grid of implicit (or capped) height. Pinned tiles are committed first,
//! everything else flows into the first gap that fits. The modules follow
//! the `mod.rs` orchestrator plus `core.rs` pattern; the `runtime` module
//! ties them together behind the [`Mosaic`] handle.

pub mod breakpoints;
pub mod config;
pub mod cursor;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod registry;
pub mod render;
pub mod runtime;
pub mod tile;
pub mod width;

pub use breakpoints::{Breakpoint, BreakpointSelector, BreakpointTable, initial_index, reselect};
pub use config::{BreakpointOptions, ConfigOverrides, Length, MosaicConfig, SizingUnit};
pub use cursor::PlacementCursor;
pub use error::{MosaicError, Result};
pub use geometry::{Axis, Cell, CellRect, Span};
pub use grid::OccupancyGrid;
pub use layout::{
    LayoutParams, LayoutResult, MAX_EXPLICIT_ROW, PlacementEngine, TilePlacement, UnplacedReason,
};
pub use logging::{
    LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult, MemorySink,
    NullSink, WriterSink,
};
pub use metrics::{LayoutMetrics, MetricSnapshot};
pub use registry::{TileRegistry, TileState, layout_fingerprint};
pub use render::{
    CellMetrics, MemoryStyleSink, OffsetRenderer, PreviewSettings, StyleSink, TileOffset,
    TrackSizes, render_text,
};
pub use runtime::audit::{
    BufferedAudit, MosaicAudit, MosaicAuditEvent, MosaicAuditEventBuilder, MosaicAuditStage,
    NullMosaicAudit,
};
pub use runtime::{Container, Mosaic, MosaicOptions};
pub use tile::{Position, TileId, TilePosition, TileSpec};
pub use width::{display_width, fit_to_width};
