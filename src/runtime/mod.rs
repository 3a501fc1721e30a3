//! Lifecycle handle tying configuration, breakpoints, placement and styles
//! together for one container.
//!
//! Every change (build, reconfigure, breakpoint crossing) triggers a full
//! relayout: track sizes are resolved, each item is measured into cells, a
//! fresh placement pass runs and the registry works out which tiles moved.
//! Styles are only pushed when the caller asks via [`Mosaic::apply`].

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::json;

use crate::breakpoints::BreakpointSelector;
use crate::config::MosaicConfig;
use crate::error::Result;
use crate::geometry::{Axis, Span};
use crate::layout::{LayoutResult, PlacementEngine};
use crate::logging::{LogLevel, Logger, TARGET_BREAKPOINTS, TARGET_RUNTIME, json_kv, json_str};
use crate::metrics::{LayoutMetrics, MetricSnapshot};
use crate::registry::TileRegistry;
use crate::render::{CellMetrics, OffsetRenderer, StyleSink, TrackSizes};
use crate::tile::{TileId, TilePosition, TileSpec};

pub mod audit;

use audit::{MosaicAudit, MosaicAuditEventBuilder, MosaicAuditStage, NullMosaicAudit};

/// The element hosting the tiles, as seen by the layout engine.
///
/// Items are addressed by their index in container order.
pub trait Container {
    fn item_count(&self) -> usize;

    /// Footprint of an item in cells, `None` when it cannot be measured.
    fn span(&self, index: usize, metrics: &CellMetrics) -> Option<Span>;

    fn position(&self, _index: usize) -> TilePosition {
        TilePosition::auto()
    }

    /// Inner size of the container along `axis`, in absolute units.
    fn extent(&self, axis: Axis) -> Option<f64>;

    /// Size of the first element matching `selector` along `axis`.
    fn measure_selector(&self, _selector: &str, _axis: Axis) -> Option<f64> {
        None
    }
}

/// Knobs for a [`Mosaic`] handle that are not part of the layout config.
#[derive(Clone)]
pub struct MosaicOptions {
    pub logger: Logger,
    pub audit: Arc<dyn MosaicAudit>,
    /// Target field used when emitting metrics snapshots.
    pub metrics_target: String,
}

impl Default for MosaicOptions {
    fn default() -> Self {
        Self {
            logger: Logger::null(),
            audit: Arc::new(NullMosaicAudit),
            metrics_target: "mosaic::runtime.metrics".to_string(),
        }
    }
}

impl MosaicOptions {
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_audit<A>(mut self, audit: A) -> Self
    where
        A: MosaicAudit + 'static,
    {
        self.audit = Arc::new(audit);
        self
    }
}

pub struct Mosaic<C: Container> {
    container: C,
    config: MosaicConfig,
    selector: Option<BreakpointSelector<MosaicConfig>>,
    registry: TileRegistry,
    layout: LayoutResult,
    sizes: Option<TrackSizes>,
    /// Tiles that currently carry a style in the caller's sink.
    styled: BTreeSet<TileId>,
    metrics: LayoutMetrics,
    options: MosaicOptions,
}

impl<C: Container> Mosaic<C> {
    pub fn build(container: C, config: MosaicConfig, measurement: i64) -> Result<Self> {
        Self::build_with(container, config, measurement, MosaicOptions::default())
    }

    /// Pick the breakpoint for `measurement`, register every item and run
    /// the first full relayout.
    pub fn build_with(
        container: C,
        config: MosaicConfig,
        measurement: i64,
        options: MosaicOptions,
    ) -> Result<Self> {
        let selector = Self::selector_for(&config, measurement, &options.logger);
        let params = config.layout_params(selector.as_ref().map(BreakpointSelector::current));
        let mut mosaic = Self {
            container,
            config,
            selector,
            registry: TileRegistry::new(),
            layout: LayoutResult::empty(params),
            sizes: None,
            styled: BTreeSet::new(),
            metrics: LayoutMetrics::new(),
            options,
        };
        mosaic.relayout()?;

        let mut builder = MosaicAuditEventBuilder::new(MosaicAuditStage::Built);
        builder
            .detail("tiles", json!(mosaic.registry.len()))
            .detail("breakpoint", json!(mosaic.breakpoint()));
        mosaic.options.audit.record(builder.finish());
        Ok(mosaic)
    }

    /// Replace the configuration (and with it the breakpoint table) and
    /// relayout from scratch.
    pub fn reconfigure(&mut self, config: MosaicConfig, measurement: i64) -> Result<&LayoutResult> {
        self.selector = Self::selector_for(&config, measurement, &self.options.logger);
        self.config = config;
        self.relayout()
    }

    /// Explicit resize trigger. Relayouts only when the measurement crosses
    /// into another breakpoint; returns the new layout in that case.
    pub fn resize(&mut self, measurement: i64) -> Result<Option<&LayoutResult>> {
        let changed = self
            .selector
            .as_mut()
            .and_then(|selector| selector.select(measurement));
        self.metrics.record_resize_check(changed.is_some());

        let Some(index) = changed else {
            return Ok(None);
        };

        self.options.logger.emit(
            LogLevel::Info,
            TARGET_BREAKPOINTS,
            "breakpoint_changed",
            [
                json_kv("measurement", json!(measurement)),
                json_kv("breakpoint", json!(index)),
            ],
        );
        let mut builder = MosaicAuditEventBuilder::new(MosaicAuditStage::BreakpointChanged);
        builder
            .detail("measurement", json!(measurement))
            .detail("breakpoint", json!(index));
        self.options.audit.record(builder.finish());

        self.relayout().map(Some)
    }

    /// Full relayout with the current configuration and breakpoint, e.g.
    /// after items were added to or removed from the container.
    pub fn relayout(&mut self) -> Result<&LayoutResult> {
        let config = self.active_config().clone();
        let breakpoint = self.breakpoint();
        let logger = self.options.logger.clone();

        let sizes = TrackSizes::resolve(&config, &self.container, &logger);
        let cell_metrics = sizes.cell_metrics(&self.container);
        let ids = self.registry.sync_items(self.container.item_count());
        let tiles: Vec<TileSpec> = ids
            .iter()
            .enumerate()
            .map(|(index, id)| self.tile_spec(index, *id, &cell_metrics))
            .collect();

        let engine =
            PlacementEngine::new(config.layout_params(breakpoint)).with_logger(logger.clone());
        let result = engine.run(&tiles);
        let changed = self.registry.sync_layout(&result)?;
        if self.sizes.is_some_and(|previous| previous != sizes) {
            self.registry.mark_all_dirty();
        }

        let placed = result.placed_count();
        let unplaced = result.len() - placed;
        self.metrics.record_relayout(placed, unplaced);

        for (id, reason) in result.unplaced() {
            let mut builder = MosaicAuditEventBuilder::new(MosaicAuditStage::TileDropped);
            builder
                .detail("tile", json!(id.0))
                .detail("reason", json!(reason.as_str()));
            self.options.audit.record(builder.finish());
        }
        let mut builder = MosaicAuditEventBuilder::new(MosaicAuditStage::RelayoutCompleted);
        builder
            .detail("placed", json!(placed))
            .detail("unplaced", json!(unplaced))
            .detail("changed", json!(changed));
        self.options.audit.record(builder.finish());

        logger.emit(
            LogLevel::Info,
            TARGET_RUNTIME,
            "relayout_completed",
            [
                json_kv("breakpoint", json!(breakpoint)),
                json_kv("columns", json!(result.params.columns)),
                json_kv("placed", json!(placed)),
                json_kv("unplaced", json!(unplaced)),
                json_kv("changed", json!(changed)),
            ],
        );

        self.sizes = Some(sizes);
        self.layout = result;
        Ok(&self.layout)
    }

    /// Push offsets of tiles whose placement changed and clear styles of
    /// tiles that became unplaced or left the container. Returns how many
    /// offsets were applied.
    pub fn apply<S>(&mut self, sink: &mut S) -> Result<usize>
    where
        S: StyleSink + ?Sized,
    {
        let Some(sizes) = self.sizes else {
            return Ok(0);
        };

        let released: Vec<TileId> = self
            .styled
            .iter()
            .copied()
            .filter(|id| self.registry.state(*id).is_none())
            .collect();
        for id in released {
            sink.clear(id)?;
            self.styled.remove(&id);
        }

        let dirty = self.registry.take_dirty();
        if dirty.is_empty() {
            return Ok(0);
        }

        // A tile enters `styled` as soon as its offset lands. On a sink error
        // the failed tile and everything after it are flagged dirty again.
        let renderer = OffsetRenderer::new(sizes).with_logger(self.options.logger.clone());
        let mut applied = 0;
        for (position, (id, placement)) in dirty.iter().enumerate() {
            match renderer.render_tile(sink, *id, placement) {
                Ok(true) => {
                    self.styled.insert(*id);
                    applied += 1;
                }
                Ok(false) => {
                    self.styled.remove(id);
                }
                Err(err) => {
                    let pending = &dirty[position..];
                    self.registry.mark_dirty(pending.iter().map(|(id, _)| *id));
                    self.metrics.record_styles(applied);
                    self.options.logger.warn(
                        TARGET_RUNTIME,
                        "style_sink_failed",
                        [
                            json_kv("tile", json!(id.0)),
                            json_kv("applied", json!(applied)),
                            json_kv("pending", json!(pending.len())),
                            json_str("error", err.to_string()),
                        ],
                    );
                    return Err(err);
                }
            }
        }
        self.metrics.record_styles(applied);

        let mut builder = MosaicAuditEventBuilder::new(MosaicAuditStage::StylesApplied);
        builder
            .detail("applied", json!(applied))
            .detail("dirty", json!(dirty.len()));
        self.options.audit.record(builder.finish());
        Ok(applied)
    }

    /// Clear every style this handle produced, release tile bookkeeping and
    /// hand the container back. Every clear is attempted even when the sink
    /// fails; the first failure is returned.
    pub fn teardown<S>(mut self, sink: &mut S) -> Result<C>
    where
        S: StyleSink + ?Sized,
    {
        let styled = std::mem::take(&mut self.styled);
        let mut first_error = None;
        for id in &styled {
            if let Err(err) = sink.clear(*id) {
                self.options.logger.warn(
                    TARGET_RUNTIME,
                    "style_clear_failed",
                    [json_kv("tile", json!(id.0)), json_str("error", err.to_string())],
                );
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
        let released = self.registry.clear();

        let mut builder = MosaicAuditEventBuilder::new(MosaicAuditStage::TornDown);
        builder
            .detail("cleared", json!(styled.len()))
            .detail("released", json!(released.len()));
        self.options.audit.record(builder.finish());
        self.emit_metrics();
        match first_error {
            Some(err) => Err(err),
            None => Ok(self.container),
        }
    }

    pub fn layout(&self) -> &LayoutResult {
        &self.layout
    }

    pub fn config(&self) -> &MosaicConfig {
        &self.config
    }

    /// Configuration in effect for the current breakpoint.
    pub fn active_config(&self) -> &MosaicConfig {
        match &self.selector {
            Some(selector) => &selector.active().config,
            None => &self.config,
        }
    }

    /// Active breakpoint index, `None` when breakpoints are disabled.
    pub fn breakpoint(&self) -> Option<usize> {
        self.selector.as_ref().map(BreakpointSelector::current)
    }

    pub fn track_sizes(&self) -> Option<&TrackSizes> {
        self.sizes.as_ref()
    }

    pub fn registry(&self) -> &TileRegistry {
        &self.registry
    }

    pub fn fingerprint(&self) -> Option<blake3::Hash> {
        self.registry.fingerprint()
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    /// Mutable access to the container. Call [`Mosaic::relayout`] afterwards
    /// if items changed.
    pub fn container_mut(&mut self) -> &mut C {
        &mut self.container
    }

    pub fn metrics(&self) -> MetricSnapshot {
        self.metrics.snapshot()
    }

    pub fn emit_metrics(&self) {
        let event = self
            .metrics
            .snapshot()
            .to_log_event(&self.options.metrics_target);
        let _ = self.options.logger.log_event(event);
    }

    fn selector_for(
        config: &MosaicConfig,
        measurement: i64,
        logger: &Logger,
    ) -> Option<BreakpointSelector<MosaicConfig>> {
        let selector = BreakpointSelector::new(config.breakpoint_table()?, measurement);
        logger.debug(
            TARGET_BREAKPOINTS,
            "breakpoint_selected",
            [
                json_kv("measurement", json!(measurement)),
                json_kv("breakpoint", json!(selector.current())),
                json_kv("threshold", json!(selector.active().threshold)),
            ],
        );
        Some(selector)
    }

    fn tile_spec(&self, index: usize, id: TileId, metrics: &CellMetrics) -> TileSpec {
        let span = match self.container.span(index, metrics) {
            Some(span) => span,
            None => {
                self.options.logger.warn(
                    TARGET_RUNTIME,
                    "tile_geometry_unavailable",
                    [json_kv("tile", json!(id.0)), json_kv("index", json!(index))],
                );
                Span::unit()
            }
        };
        TileSpec::new(id, span).with_position(self.container.position(index))
    }
}
