//! Track size resolution.
//!
//! Turns the active configuration plus container measurements into the size
//! of one column and one row (gutter included) in the configured unit, and
//! into absolute cell metrics used to measure items.

use serde_json::json;

use crate::config::{Length, MosaicConfig, SizingUnit};
use crate::geometry::{Axis, Cell};
use crate::logging::{Logger, TARGET_RENDER, json_kv, json_str};
use crate::runtime::Container;

use super::core::TileOffset;

/// Full extent of the container when working in percentages.
const PERCENT_EXTENT: f64 = 100.0;

/// Absolute cell metrics handed to geometry providers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    pub col_size: f64,
    pub row_size: f64,
    pub gutter: f64,
    pub columns: usize,
}

/// Column and row pitch in the configured unit. Both include one gutter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSizes {
    pub unit: SizingUnit,
    pub gutter: f64,
    pub col_size: f64,
    pub row_size: f64,
    pub columns: usize,
    /// Axis the row pitch is measured against.
    pub row_axis: Axis,
}

impl TrackSizes {
    pub fn resolve<C: Container + ?Sized>(
        config: &MosaicConfig,
        container: &C,
        logger: &Logger,
    ) -> Self {
        let unit = config.sizing_unit;
        let row_axis = if config.height_from_width {
            Axis::Width
        } else {
            Axis::Height
        };
        let resolver = LengthResolver {
            unit,
            container,
            logger,
        };

        let gutter = resolver.resolve(&config.gutter, Axis::Width);
        let columns = config.columns.max(1);

        let model = config
            .tile_model
            .as_deref()
            .and_then(|selector| resolver.model_sizes(selector, row_axis, gutter));

        let (col_size, row_size) = match model {
            Some(sizes) => sizes,
            None => {
                let col_size = match &config.col_width {
                    Some(width) => resolver.resolve(width, Axis::Width) + gutter,
                    None => (resolver.full_extent(Axis::Width) - gutter) / columns as f64,
                };
                let row_size = match (&config.row_height, config.rows) {
                    (Some(height), _) => resolver.resolve(height, Axis::Height) + gutter,
                    (None, Some(rows)) => (resolver.full_extent(row_axis) - gutter) / rows as f64,
                    (None, None) => col_size,
                };
                (col_size, row_size)
            }
        };

        let sizes = Self {
            unit,
            gutter,
            col_size: sanitize(col_size),
            row_size: sanitize(row_size),
            columns,
            row_axis,
        };
        if sizes.col_size == 0.0 || sizes.row_size == 0.0 {
            logger.warn(
                TARGET_RENDER,
                "degenerate_track_size",
                [
                    json_kv("col_size", json!(sizes.col_size)),
                    json_kv("row_size", json!(sizes.row_size)),
                ],
            );
        }
        sizes
    }

    /// Offset of a cell's top-left corner.
    pub fn offset(&self, cell: Cell) -> TileOffset {
        TileOffset {
            top: cell.row as f64 * self.row_size + self.gutter,
            left: cell.col as f64 * self.col_size + self.gutter,
            unit: self.unit,
        }
    }

    /// Convert to absolute units using the container's measured extents.
    pub fn cell_metrics<C: Container + ?Sized>(&self, container: &C) -> CellMetrics {
        let scale = |axis: Axis| match self.unit {
            SizingUnit::Absolute => 1.0,
            SizingUnit::Percent => container
                .extent(axis)
                .filter(|extent| extent.is_finite() && *extent > 0.0)
                .map_or(1.0, |extent| extent / PERCENT_EXTENT),
        };
        let width_scale = scale(Axis::Width);
        CellMetrics {
            col_size: self.col_size * width_scale,
            row_size: self.row_size * scale(self.row_axis),
            gutter: self.gutter * width_scale,
            columns: self.columns,
        }
    }
}

fn sanitize(size: f64) -> f64 {
    if size.is_finite() && size > 0.0 {
        size
    } else {
        0.0
    }
}

struct LengthResolver<'a, C: Container + ?Sized> {
    unit: SizingUnit,
    container: &'a C,
    logger: &'a Logger,
}

impl<C: Container + ?Sized> LengthResolver<'_, C> {
    fn resolve(&self, length: &Length, axis: Axis) -> f64 {
        match length {
            Length::Value(value) if value.is_finite() => *value,
            Length::Value(value) => {
                self.logger.warn(
                    TARGET_RENDER,
                    "non_finite_length",
                    [json_str("value", value.to_string())],
                );
                0.0
            }
            Length::Selector(selector) => self.measure(selector, axis).unwrap_or(0.0),
        }
    }

    /// Measured size of a selector converted into the active unit.
    fn measure(&self, selector: &str, axis: Axis) -> Option<f64> {
        let Some(absolute) = self.container.measure_selector(selector, axis) else {
            self.logger.warn(
                TARGET_RENDER,
                "selector_unresolved",
                [json_str("selector", selector), json_kv("axis", json!(axis))],
            );
            return None;
        };
        match self.unit {
            SizingUnit::Absolute => Some(absolute),
            SizingUnit::Percent => {
                let extent = self.container_extent(axis)?;
                Some(absolute * PERCENT_EXTENT / extent)
            }
        }
    }

    fn full_extent(&self, axis: Axis) -> f64 {
        match self.unit {
            SizingUnit::Percent => PERCENT_EXTENT,
            SizingUnit::Absolute => self.container_extent(axis).unwrap_or(0.0),
        }
    }

    fn container_extent(&self, axis: Axis) -> Option<f64> {
        let extent = self
            .container
            .extent(axis)
            .filter(|extent| extent.is_finite() && *extent > 0.0);
        if extent.is_none() {
            self.logger.warn(
                TARGET_RENDER,
                "container_extent_unavailable",
                [json_kv("axis", json!(axis))],
            );
        }
        extent
    }

    /// Column and row pitch taken from a model element.
    fn model_sizes(&self, selector: &str, row_axis: Axis, gutter: f64) -> Option<(f64, f64)> {
        let width = self.container.measure_selector(selector, Axis::Width);
        let height = self.container.measure_selector(selector, Axis::Height);
        let (Some(width), Some(height)) = (width, height) else {
            self.logger.warn(
                TARGET_RENDER,
                "tile_model_unresolved",
                [json_str("selector", selector)],
            );
            return None;
        };
        let (col_scale, row_scale) = match self.unit {
            SizingUnit::Absolute => (1.0, 1.0),
            SizingUnit::Percent => (
                PERCENT_EXTENT / self.container_extent(Axis::Width)?,
                PERCENT_EXTENT / self.container_extent(row_axis)?,
            ),
        };
        Some((width * col_scale + gutter, height * row_scale + gutter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Span;
    use crate::logging::MemorySink;
    use std::collections::HashMap;

    struct Frame {
        width: f64,
        height: f64,
        selectors: HashMap<&'static str, (f64, f64)>,
    }

    impl Frame {
        fn new(width: f64, height: f64) -> Self {
            Self {
                width,
                height,
                selectors: HashMap::new(),
            }
        }
    }

    impl Container for Frame {
        fn item_count(&self) -> usize {
            0
        }

        fn span(&self, _index: usize, _metrics: &CellMetrics) -> Option<Span> {
            None
        }

        fn extent(&self, axis: Axis) -> Option<f64> {
            Some(match axis {
                Axis::Width => self.width,
                Axis::Height => self.height,
            })
        }

        fn measure_selector(&self, selector: &str, axis: Axis) -> Option<f64> {
            self.selectors.get(selector).map(|(w, h)| match axis {
                Axis::Width => *w,
                Axis::Height => *h,
            })
        }
    }

    #[test]
    fn percent_columns_split_the_full_width() {
        let config = MosaicConfig::new(4).with_gutter(4.0);
        let sizes = TrackSizes::resolve(&config, &Frame::new(800.0, 600.0), &Logger::null());
        assert_eq!(sizes.col_size, 24.0);
        // No rows and no row height: rows are as tall as columns are wide.
        assert_eq!(sizes.row_size, 24.0);

        let offset = sizes.offset(Cell::new(1, 2));
        assert_eq!(offset.top, 28.0);
        assert_eq!(offset.left, 52.0);
        assert_eq!(offset.unit.suffix(), "%");
    }

    #[test]
    fn absolute_rows_split_the_container_height() {
        let config = MosaicConfig::new(2)
            .with_rows(Some(3))
            .with_sizing_unit(SizingUnit::Absolute);
        let sizes = TrackSizes::resolve(&config, &Frame::new(400.0, 300.0), &Logger::null());
        assert_eq!(sizes.col_size, 200.0);
        assert_eq!(sizes.row_size, 100.0);

        let metrics = sizes.cell_metrics(&Frame::new(400.0, 300.0));
        assert_eq!(metrics.col_size, 200.0);
        assert_eq!(metrics.columns, 2);
    }

    #[test]
    fn explicit_widths_and_selectors() {
        let mut frame = Frame::new(500.0, 500.0);
        frame.selectors.insert(".cell", (50.0, 25.0));
        let config = MosaicConfig::new(3)
            .with_gutter(1.0)
            .with_col_width(Length::Selector(".cell".into()))
            .with_row_height(Length::Value(8.0));

        let sizes = TrackSizes::resolve(&config, &frame, &Logger::null());
        assert_eq!(sizes.col_size, 11.0);
        assert_eq!(sizes.row_size, 9.0);

        let metrics = sizes.cell_metrics(&frame);
        assert_eq!(metrics.col_size, 55.0);
        assert_eq!(metrics.row_size, 45.0);
        assert_eq!(metrics.gutter, 5.0);
    }

    #[test]
    fn tile_model_supplies_both_tracks() {
        let mut frame = Frame::new(1000.0, 200.0);
        frame.selectors.insert("#model", (100.0, 50.0));
        let mut config = MosaicConfig::new(3).with_sizing_unit(SizingUnit::Absolute);
        config.tile_model = Some("#model".into());

        let sizes = TrackSizes::resolve(&config, &frame, &Logger::null());
        assert_eq!((sizes.col_size, sizes.row_size), (100.0, 50.0));
    }

    #[test]
    fn unresolved_selector_warns_and_uses_zero() {
        let sink = MemorySink::new();
        let config = MosaicConfig::new(2)
            .with_sizing_unit(SizingUnit::Absolute)
            .with_col_width(Length::Selector(".missing".into()));

        let sizes = TrackSizes::resolve(
            &config,
            &Frame::new(300.0, 300.0),
            &Logger::new(sink.clone()),
        );
        assert_eq!(sizes.col_size, 0.0);
        let messages = sink.messages();
        assert!(messages.contains(&"selector_unresolved".to_string()));
        assert!(messages.contains(&"degenerate_track_size".to_string()));
    }

    #[test]
    fn height_from_width_measures_rows_against_width() {
        let config = MosaicConfig::new(2).with_rows(Some(2));
        let mut config = config.with_sizing_unit(SizingUnit::Percent);
        config.height_from_width = true;

        let frame = Frame::new(600.0, 100.0);
        let sizes = TrackSizes::resolve(&config, &frame, &Logger::null());
        assert_eq!(sizes.row_axis, Axis::Width);
        let metrics = sizes.cell_metrics(&frame);
        assert_eq!(metrics.row_size, 300.0);
    }
}
