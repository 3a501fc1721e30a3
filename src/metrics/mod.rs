use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;

/// Counters accumulated by a [`crate::Mosaic`] handle over its lifetime.
#[derive(Debug, Default, Clone)]
pub struct LayoutMetrics {
    relayouts: u64,
    breakpoint_changes: u64,
    resize_checks: u64,
    tiles_placed: u64,
    tiles_unplaced: u64,
    styles_applied: u64,
}

impl LayoutMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_relayout(&mut self, placed: usize, unplaced: usize) {
        self.relayouts = self.relayouts.saturating_add(1);
        self.tiles_placed = self.tiles_placed.saturating_add(placed as u64);
        self.tiles_unplaced = self.tiles_unplaced.saturating_add(unplaced as u64);
    }

    pub fn record_resize_check(&mut self, changed: bool) {
        self.resize_checks = self.resize_checks.saturating_add(1);
        if changed {
            self.breakpoint_changes = self.breakpoint_changes.saturating_add(1);
        }
    }

    pub fn record_styles(&mut self, count: usize) {
        if count > 0 {
            self.styles_applied = self.styles_applied.saturating_add(count as u64);
        }
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            relayouts: self.relayouts,
            breakpoint_changes: self.breakpoint_changes,
            resize_checks: self.resize_checks,
            tiles_placed: self.tiles_placed,
            tiles_unplaced: self.tiles_unplaced,
            styles_applied: self.styles_applied,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub relayouts: u64,
    pub breakpoint_changes: u64,
    pub resize_checks: u64,
    pub tiles_placed: u64,
    pub tiles_unplaced: u64,
    pub styles_applied: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "layout_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("relayouts".to_string(), json!(self.relayouts));
        map.insert(
            "breakpoint_changes".to_string(),
            json!(self.breakpoint_changes),
        );
        map.insert("resize_checks".to_string(), json!(self.resize_checks));
        map.insert("tiles_placed".to_string(), json!(self.tiles_placed));
        map.insert("tiles_unplaced".to_string(), json!(self.tiles_unplaced));
        map.insert("styles_applied".to_string(), json!(self.styles_applied));
        map
    }
}
