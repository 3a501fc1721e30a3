//! Lifecycle audit hooks for the [`Mosaic`](super::Mosaic) handle.
//!
//! Records carry a stage identifier plus structured details so callers can
//! log, buffer, or assert on the handle's progression without touching the
//! layout pass itself.

use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use serde_json::Value;

/// Distinct lifecycle checkpoints emitted by `Mosaic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MosaicAuditStage {
    /// First layout of a freshly built handle finished.
    Built,
    /// A resize crossed a breakpoint threshold.
    BreakpointChanged,
    /// A full relayout finished.
    RelayoutCompleted,
    /// A tile could not be placed.
    TileDropped,
    /// Offsets were pushed into a style sink.
    StylesApplied,
    /// The handle released its container.
    TornDown,
}

/// Structured audit entry.
#[derive(Debug, Clone)]
pub struct MosaicAuditEvent {
    pub timestamp: SystemTime,
    pub stage: MosaicAuditStage,
    pub details: Vec<(String, Value)>,
}

impl MosaicAuditEvent {
    fn new(stage: MosaicAuditStage) -> Self {
        Self {
            timestamp: SystemTime::now(),
            stage,
            details: Vec::new(),
        }
    }

    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }
}

/// Builder helper to append fields ergonomically.
pub struct MosaicAuditEventBuilder {
    event: MosaicAuditEvent,
}

impl MosaicAuditEventBuilder {
    pub fn new(stage: MosaicAuditStage) -> Self {
        Self {
            event: MosaicAuditEvent::new(stage),
        }
    }

    pub fn detail(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.event.details.push((key.into(), value));
        self
    }

    pub fn finish(self) -> MosaicAuditEvent {
        self.event
    }
}

/// Trait implemented by any audit sink.
pub trait MosaicAudit: Send + Sync {
    fn record(&self, event: MosaicAuditEvent);
}

/// Default no-op implementation used when auditing is disabled.
#[derive(Debug, Default)]
pub struct NullMosaicAudit;

impl MosaicAudit for NullMosaicAudit {
    fn record(&self, _event: MosaicAuditEvent) {}
}

/// Keeps every record in memory. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct BufferedAudit {
    events: Arc<Mutex<Vec<MosaicAuditEvent>>>,
}

impl BufferedAudit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<MosaicAuditEvent> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn stages(&self) -> Vec<MosaicAuditStage> {
        self.events().iter().map(|event| event.stage).collect()
    }
}

impl MosaicAudit for BufferedAudit {
    fn record(&self, event: MosaicAuditEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event);
        }
    }
}
