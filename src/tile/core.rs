use std::collections::BTreeMap;
use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::geometry::{Cell, Span};

/// Stable tile identity, assigned in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileId(pub u64);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Requested position along one axis.
///
/// JSON accepts a number (`Fixed`), an object keyed by breakpoint index
/// (`PerBreakpoint`), `null` (`Auto`) or the attribute string syntax.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(untagged)]
pub enum Position {
    Fixed(u32),
    PerBreakpoint(BTreeMap<usize, u32>),
    #[default]
    Auto,
}

impl Position {
    /// Resolve against the active breakpoint index. With breakpoints disabled
    /// the mapping is read at index 0.
    pub fn resolve(&self, breakpoint: Option<usize>) -> Option<usize> {
        match self {
            Position::Fixed(value) => Some(*value as usize),
            Position::PerBreakpoint(map) => map
                .get(&breakpoint.unwrap_or(0))
                .map(|value| *value as usize),
            Position::Auto => None,
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Position::Auto)
    }

    /// Parse the attribute syntax: `"3"` or `"0:2, 1:4"`.
    ///
    /// Returns `None` for anything else so the caller can warn and fall back
    /// to auto-flow.
    pub fn parse(raw: &str) -> Option<Position> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Some(Position::Auto);
        }
        if is_plain_index(raw) {
            return raw.parse().ok().map(Position::Fixed);
        }

        let mut map = BTreeMap::new();
        for pair in raw.split(',') {
            let (key, value) = pair.split_once(':')?;
            let (key, value) = (key.trim(), value.trim());
            if !is_plain_index(key) || !is_plain_index(value) {
                return None;
            }
            map.insert(key.parse().ok()?, value.parse().ok()?);
        }
        Some(Position::PerBreakpoint(map))
    }
}

impl TryFrom<Value> for Position {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(Position::Auto),
            Value::Number(number) => number
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .map(Position::Fixed)
                .ok_or_else(|| format!("position `{number}` is not a non-negative index")),
            Value::String(raw) => {
                Position::parse(&raw).ok_or_else(|| format!("unparseable position `{raw}`"))
            }
            Value::Object(entries) => {
                let mut map = BTreeMap::new();
                for (key, value) in entries {
                    let index = key
                        .trim()
                        .parse::<usize>()
                        .map_err(|_| format!("breakpoint key `{key}` is not an index"))?;
                    let at = value
                        .as_u64()
                        .and_then(|n| u32::try_from(n).ok())
                        .ok_or_else(|| format!("position for breakpoint {index} is not an index"))?;
                    map.insert(index, at);
                }
                Ok(Position::PerBreakpoint(map))
            }
            other => Err(format!("unsupported position value `{other}`")),
        }
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Position::try_from(value).map_err(D::Error::custom)
    }
}

fn is_plain_index(text: &str) -> bool {
    match text.as_bytes() {
        [b'0'] => true,
        [first, rest @ ..] => (b'1'..=b'9').contains(first) && rest.iter().all(u8::is_ascii_digit),
        [] => false,
    }
}

/// Row and column requests for one item.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TilePosition {
    #[serde(default)]
    pub row: Position,
    #[serde(default)]
    pub col: Position,
}

impl TilePosition {
    pub fn auto() -> Self {
        Self::default()
    }

    pub fn fixed(row: u32, col: u32) -> Self {
        Self {
            row: Position::Fixed(row),
            col: Position::Fixed(col),
        }
    }

    pub fn resolve(&self, breakpoint: Option<usize>) -> (Option<usize>, Option<usize>) {
        (self.row.resolve(breakpoint), self.col.resolve(breakpoint))
    }
}

/// One item to lay out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSpec {
    pub id: TileId,
    pub width: usize,
    pub height: usize,
    pub position: TilePosition,
}

impl TileSpec {
    pub fn new(id: TileId, span: Span) -> Self {
        Self {
            id,
            width: span.width,
            height: span.height,
            position: TilePosition::auto(),
        }
    }

    pub fn with_position(mut self, position: TilePosition) -> Self {
        self.position = position;
        self
    }

    pub fn pinned(self, row: u32, col: u32) -> Self {
        self.with_position(TilePosition::fixed(row, col))
    }

    pub fn span(&self) -> Span {
        Span::new(self.width, self.height)
    }

    /// Footprint clamped to the grid: width to `columns`, height to the row
    /// cap when one is set.
    pub fn effective_span(&self, columns: usize, row_cap: Option<usize>) -> Span {
        let width = self.width.min(columns);
        let height = match row_cap {
            Some(cap) => self.height.min(cap),
            None => self.height,
        };
        Span::new(width, height)
    }

    /// Explicit anchor when both axes resolve for the active breakpoint.
    pub fn explicit_cell(&self, breakpoint: Option<usize>) -> Option<Cell> {
        match self.position.resolve(breakpoint) {
            (Some(row), Some(col)) => Some(Cell::new(row, col)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_fixed_and_mapped_positions() {
        assert_eq!(Position::parse("0"), Some(Position::Fixed(0)));
        assert_eq!(Position::parse(" 12 "), Some(Position::Fixed(12)));

        let mapped = Position::parse("0:2, 2:0").unwrap();
        assert_eq!(mapped.resolve(Some(0)), Some(2));
        assert_eq!(mapped.resolve(Some(2)), Some(0));
        assert_eq!(mapped.resolve(Some(1)), None);
        assert_eq!(mapped.resolve(None), Some(2));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(Position::parse("01"), None);
        assert_eq!(Position::parse("-1"), None);
        assert_eq!(Position::parse("left"), None);
        assert_eq!(Position::parse("0:a"), None);
        assert_eq!(Position::parse(""), Some(Position::Auto));
    }

    #[test]
    fn position_json_forms() {
        let fixed: Position = serde_json::from_str("4").unwrap();
        assert_eq!(fixed, Position::Fixed(4));

        let mapped: Position = serde_json::from_str(r#"{"0": 1, "3": 2}"#).unwrap();
        assert_eq!(mapped.resolve(Some(3)), Some(2));

        let auto: Position = serde_json::from_str("null").unwrap();
        assert!(auto.is_auto());

        let attribute: Position = serde_json::from_str(r#""1:3""#).unwrap();
        assert_eq!(attribute.resolve(Some(1)), Some(3));

        assert!(serde_json::from_str::<Position>("-2").is_err());
    }

    #[test]
    fn effective_span_clamps() {
        let tile = TileSpec::new(TileId(0), Span::new(5, 3));
        assert_eq!(tile.effective_span(3, None), Span::new(3, 3));
        assert_eq!(tile.effective_span(8, Some(2)), Span::new(5, 2));
    }

    #[test]
    fn explicit_cell_needs_both_axes() {
        let mut tile = TileSpec::new(TileId(1), Span::unit()).pinned(2, 1);
        assert_eq!(tile.explicit_cell(None), Some(Cell::new(2, 1)));

        tile.position.col = Position::Auto;
        assert_eq!(tile.explicit_cell(None), None);
    }
}
