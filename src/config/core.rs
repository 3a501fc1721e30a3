use std::num::NonZeroUsize;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::breakpoints::BreakpointTable;
use crate::error::{MosaicError, Result};
use crate::layout::LayoutParams;
use crate::logging::{Logger, TARGET_CONFIG, json_kv, json_str};

/// Unit that track sizes and offsets are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizingUnit {
    #[default]
    Percent,
    Absolute,
}

impl SizingUnit {
    pub fn suffix(&self) -> &'static str {
        match self {
            SizingUnit::Percent => "%",
            SizingUnit::Absolute => "px",
        }
    }

    pub fn is_percent(&self) -> bool {
        matches!(self, SizingUnit::Percent)
    }
}

/// A length given directly in the active unit or by a selector whose
/// measured size is used instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Length {
    Value(f64),
    Selector(String),
}

impl Default for Length {
    fn default() -> Self {
        Length::Value(0.0)
    }
}

/// Options a breakpoint may override. `None` keeps the base value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigOverrides {
    pub columns: Option<usize>,
    pub rows: Option<usize>,
    pub gutter: Option<Length>,
    pub col_width: Option<Length>,
    pub row_height: Option<Length>,
    pub tile_model: Option<String>,
    pub sizing_unit: Option<SizingUnit>,
    pub height_from_width: Option<bool>,
}

impl ConfigOverrides {
    pub fn columns(mut self, columns: usize) -> Self {
        self.columns = Some(columns);
        self
    }

    pub fn rows(mut self, rows: usize) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn gutter(mut self, gutter: Length) -> Self {
        self.gutter = Some(gutter);
        self
    }

    pub fn sizing_unit(mut self, unit: SizingUnit) -> Self {
        self.sizing_unit = Some(unit);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakpointOptions {
    /// Measurement at which these overrides become active.
    pub size: i64,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MosaicConfig {
    pub columns: usize,
    /// Row cap; `None` grows without bound.
    pub rows: Option<usize>,
    pub gutter: Length,
    pub col_width: Option<Length>,
    pub row_height: Option<Length>,
    /// Selector of an element whose size defines one cell.
    pub tile_model: Option<String>,
    pub sizing_unit: SizingUnit,
    /// Row sizes derive from the container's width (padding-based heights).
    pub height_from_width: bool,
    /// Empty when breakpoints are disabled.
    pub breakpoints: Vec<BreakpointOptions>,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            columns: 1,
            rows: None,
            gutter: Length::default(),
            col_width: None,
            row_height: None,
            tile_model: None,
            sizing_unit: SizingUnit::default(),
            height_from_width: false,
            breakpoints: Vec::new(),
        }
    }
}

impl MosaicConfig {
    pub fn new(columns: usize) -> Self {
        Self {
            columns: columns.max(1),
            ..Self::default()
        }
    }

    pub fn with_rows(mut self, rows: Option<usize>) -> Self {
        self.rows = rows.filter(|rows| *rows > 0);
        self
    }

    pub fn with_gutter(mut self, gutter: f64) -> Self {
        self.gutter = Length::Value(gutter);
        self
    }

    pub fn with_sizing_unit(mut self, unit: SizingUnit) -> Self {
        self.sizing_unit = unit;
        self
    }

    pub fn with_col_width(mut self, width: Length) -> Self {
        self.col_width = Some(width);
        self
    }

    pub fn with_row_height(mut self, height: Length) -> Self {
        self.row_height = Some(height);
        self
    }

    pub fn with_breakpoint(mut self, size: i64, overrides: ConfigOverrides) -> Self {
        self.breakpoints.push(BreakpointOptions { size, overrides });
        self
    }

    pub fn breakpoints_enabled(&self) -> bool {
        !self.breakpoints.is_empty()
    }

    /// Base options with `overrides` applied on top. Breakpoints are dropped
    /// from the result.
    pub fn merged(&self, overrides: &ConfigOverrides) -> MosaicConfig {
        let mut merged = MosaicConfig {
            breakpoints: Vec::new(),
            ..self.clone()
        };
        if let Some(columns) = overrides.columns.filter(|columns| *columns > 0) {
            merged.columns = columns;
        }
        if let Some(rows) = overrides.rows.filter(|rows| *rows > 0) {
            merged.rows = Some(rows);
        }
        if let Some(gutter) = &overrides.gutter {
            merged.gutter = gutter.clone();
        }
        if let Some(width) = &overrides.col_width {
            merged.col_width = Some(width.clone());
        }
        if let Some(height) = &overrides.row_height {
            merged.row_height = Some(height.clone());
        }
        if let Some(model) = &overrides.tile_model {
            merged.tile_model = Some(model.clone());
        }
        if let Some(unit) = overrides.sizing_unit {
            merged.sizing_unit = unit;
        }
        if let Some(flag) = overrides.height_from_width {
            merged.height_from_width = flag;
        }
        merged
    }

    pub fn for_breakpoint(&self, breakpoint: &BreakpointOptions) -> MosaicConfig {
        self.merged(&breakpoint.overrides)
    }

    /// Threshold table of fully merged configurations, or `None` when
    /// breakpoints are disabled.
    pub fn breakpoint_table(&self) -> Option<BreakpointTable<MosaicConfig>> {
        if !self.breakpoints_enabled() {
            return None;
        }
        let base = self.merged(&ConfigOverrides::default());
        let entries = self
            .breakpoints
            .iter()
            .map(|breakpoint| (breakpoint.size, self.for_breakpoint(breakpoint)));
        Some(BreakpointTable::new(base, entries))
    }

    pub fn layout_params(&self, breakpoint: Option<usize>) -> LayoutParams {
        LayoutParams::new(self.columns)
            .with_row_cap(self.rows)
            .with_breakpoint(breakpoint)
    }

    pub fn from_json_str(raw: &str, logger: &Logger) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_json(&value, logger)
    }

    /// Lenient parse: bad values fall back with a warning instead of failing.
    /// Only a non-object root is an error.
    pub fn from_json(value: &Value, logger: &Logger) -> Result<Self> {
        let Some(map) = value.as_object() else {
            return Err(MosaicError::Config(
                "configuration root must be an object".to_string(),
            ));
        };

        let overrides = parse_overrides(map, logger, "base");
        let mut config = MosaicConfig::default().merged(&overrides);
        config.breakpoints = parse_breakpoints(map.get("breakpoints"), logger);
        Ok(config)
    }
}

fn parse_overrides(map: &Map<String, Value>, logger: &Logger, scope: &str) -> ConfigOverrides {
    let columns = field::<NonZeroUsize>(map, "columns", logger, scope).map(NonZeroUsize::get);
    if map.get("columns").is_some_and(|raw| !raw.is_null()) && columns.is_none() {
        logger.warn(
            TARGET_CONFIG,
            "columns_fallback",
            [json_str("scope", scope), json_kv("columns", json!(1))],
        );
    }

    let sizing_unit = field::<SizingUnit>(map, "sizingUnit", logger, scope).or_else(|| {
        field::<bool>(map, "layoutInPercent", logger, scope).map(|percent| {
            if percent {
                SizingUnit::Percent
            } else {
                SizingUnit::Absolute
            }
        })
    });

    ConfigOverrides {
        columns,
        rows: field::<NonZeroUsize>(map, "rows", logger, scope).map(NonZeroUsize::get),
        gutter: field(map, "gutter", logger, scope),
        col_width: field(map, "colWidth", logger, scope),
        row_height: field(map, "rowHeight", logger, scope),
        tile_model: field(map, "tileModel", logger, scope),
        sizing_unit,
        height_from_width: field(map, "heightFromWidth", logger, scope),
    }
}

fn parse_breakpoints(raw: Option<&Value>, logger: &Logger) -> Vec<BreakpointOptions> {
    let Some(raw) = raw.filter(|raw| !raw.is_null()) else {
        return Vec::new();
    };

    let disabled = |reason: &str| {
        logger.warn(
            TARGET_CONFIG,
            "breakpoints_disabled",
            [json_str("reason", reason)],
        );
        Vec::new()
    };

    let Some(items) = raw.as_array() else {
        return disabled("breakpoints must be an array");
    };

    let mut parsed = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let Some(map) = item.as_object() else {
            return disabled("breakpoint entries must be objects");
        };
        let Some(size) = map.get("size").and_then(Value::as_i64) else {
            return disabled("breakpoint entries need an integer size");
        };
        let scope = format!("breakpoints[{index}]");
        parsed.push(BreakpointOptions {
            size,
            overrides: parse_overrides(map, logger, &scope),
        });
    }
    parsed
}

fn field<T: DeserializeOwned>(
    map: &Map<String, Value>,
    key: &str,
    logger: &Logger,
    scope: &str,
) -> Option<T> {
    let raw = map.get(key).filter(|raw| !raw.is_null())?;
    match serde_json::from_value(raw.clone()) {
        Ok(value) => Some(value),
        Err(err) => {
            logger.warn(
                TARGET_CONFIG,
                "invalid_option",
                [
                    json_str("scope", scope),
                    json_str("key", key),
                    json_str("error", err.to_string()),
                ],
            );
            None
        }
    }
}
