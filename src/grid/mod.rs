//! Grid occupancy module orchestrator.

mod occupancy;

pub use occupancy::OccupancyGrid;
