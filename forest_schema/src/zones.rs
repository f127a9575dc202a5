use serde::{Deserialize, Serialize};

use crate::geometry::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptureZone {
    pub center: Coordinate,
    pub radius: f64,
}

impl CaptureZone {
    /// Closed point-in-circle test.
    pub fn contains(&self, coords: Coordinate) -> bool {
        self.center.distance_to(&coords) <= self.radius
    }
}

/// Published whenever a new capture zone epoch begins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneChangeEvent {
    pub change_block: u64,
    pub next_change_block: u64,
    pub zones: Vec<CaptureZone>,
}
