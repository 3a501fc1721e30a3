use thiserror::Error;

use crate::logging::LoggingError;
use crate::tile::TileId;

/// Unified result type for the mosaic crate.
pub type Result<T> = std::result::Result<T, MosaicError>;

/// Errors surfaced at the edges of the layout engine.
///
/// Placement itself never fails; these cover configuration input, style
/// sinks and log sinks.
#[derive(Debug, Error)]
pub enum MosaicError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("tile {0} is not registered")]
    UnknownTile(TileId),
    #[error("style sink failure: {0}")]
    Style(String),
    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
