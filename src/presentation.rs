use crate::analysis::CategoryBreakdown;
use crate::model::{AggregateGroup, BreachRecord};
use dashmap::DashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A chart region on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartSlot {
    Entities,
    YearTrend,
    Categories,
    Countries,
    DefenseMechanisms,
}

impl ChartSlot {
    pub const ALL: [ChartSlot; 5] = [
        ChartSlot::Entities,
        ChartSlot::YearTrend,
        ChartSlot::Categories,
        ChartSlot::Countries,
        ChartSlot::DefenseMechanisms,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ChartSlot::Entities => "Records exposed by entity",
            ChartSlot::YearTrend => "Records exposed by year",
            ChartSlot::Categories => "Breach method categories",
            ChartSlot::Countries => "Affected users by country",
            ChartSlot::DefenseMechanisms => "Incidents by defense mechanism",
        }
    }
}

impl fmt::Display for ChartSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Chart-ready data for one slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ChartView<'a> {
    Records(&'a [BreachRecord]),
    Groups(&'a [AggregateGroup]),
    Breakdown(&'a CategoryBreakdown),
}

/// Rendering boundary. The engine hands each slot its data once; everything
/// visual is the implementor's business. All methods default to no-ops.
pub trait ChartSink: Send + Sync {
    fn on_load_failed(&self, _reason: &str) {}
    fn render(&self, _slot: ChartSlot, _view: ChartView<'_>) {}
}

/// Sink that renders nothing.
pub struct SilentSink;

impl ChartSink for SilentSink {}

/// Slots already created. A trigger for a created slot is ignored, not queued.
#[derive(Debug, Default)]
pub struct SlotRegistry {
    created: DashSet<ChartSlot>,
}

impl SlotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// True the first time `slot` is claimed, false on every later trigger.
    pub fn claim(&self, slot: ChartSlot) -> bool {
        self.created.insert(slot)
    }

    pub fn is_created(&self, slot: ChartSlot) -> bool {
        self.created.contains(&slot)
    }
}
