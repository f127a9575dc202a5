use std::fmt;

use serde::{Deserialize, Serialize};

/// Integer world coordinate. Hashing is only defined on integer pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i64,
    pub y: i64,
}

impl Coordinate {
    pub const ORIGIN: Coordinate = Coordinate { x: 0, y: 0 };

    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to the world origin.
    pub fn distance_from_origin(&self) -> f64 {
        (self.x as f64).hypot(self.y as f64)
    }

    /// Differences are taken in `i128`, so any two coordinates are comparable.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let dx = i128::from(self.x) - i128::from(other.x);
        let dy = i128::from(self.y) - i128::from(other.y);
        (dx as f64).hypot(dy as f64)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Square region of the world identified by its bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkFootprint {
    pub bottom_left: Coordinate,
    pub side_length: u32,
}

impl ChunkFootprint {
    pub fn new(bottom_left: Coordinate, side_length: u32) -> Self {
        Self {
            bottom_left,
            side_length,
        }
    }

    /// Footprint whose every cell is addressable, i.e. `bottom_left + side`
    /// stays within `i64` on both axes.
    pub fn checked_new(bottom_left: Coordinate, side_length: u32) -> Option<Self> {
        let side = i64::from(side_length);
        bottom_left.x.checked_add(side)?;
        bottom_left.y.checked_add(side)?;
        Some(Self::new(bottom_left, side_length))
    }

    /// Footprint whose center is `center`, bottom-left at `center - side / 2`.
    /// The corner saturates at the edge of the plane.
    pub fn centered(center: Coordinate, side_length: u32) -> Self {
        let half = i64::from(side_length / 2);
        Self {
            bottom_left: Coordinate::new(
                center.x.saturating_sub(half),
                center.y.saturating_sub(half),
            ),
            side_length,
        }
    }

    /// Like [`ChunkFootprint::centered`], but `None` unless the footprint
    /// fits in the plane.
    pub fn checked_centered(center: Coordinate, side_length: u32) -> Option<Self> {
        let half = i64::from(side_length / 2);
        let x = center.x.checked_sub(half)?;
        let y = center.y.checked_sub(half)?;
        Self::checked_new(Coordinate::new(x, y), side_length)
    }

    /// Integer geometric center; rounds toward the bottom-left for odd sides.
    pub fn center(&self) -> Coordinate {
        let half = i64::from(self.side_length / 2);
        Coordinate::new(
            self.bottom_left.x.saturating_add(half),
            self.bottom_left.y.saturating_add(half),
        )
    }

    pub fn key(&self) -> ChunkKey {
        ChunkKey {
            x: self.bottom_left.x,
            y: self.bottom_left.y,
            side_length: self.side_length,
        }
    }

    pub fn cell_count(&self) -> u64 {
        u64::from(self.side_length) * u64::from(self.side_length)
    }

    pub fn contains(&self, coords: Coordinate) -> bool {
        let side = i128::from(self.side_length);
        let within = |value: i64, start: i64| {
            let offset = i128::from(value) - i128::from(start);
            (0..side).contains(&offset)
        };
        within(coords.x, self.bottom_left.x) && within(coords.y, self.bottom_left.y)
    }
}

/// De-duplication identity of a footprint: `(bottomLeft.x, bottomLeft.y, sideLength)`.
///
/// Renders as `"x,y,side"`, the string key used by the ledger's reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkKey {
    pub x: i64,
    pub y: i64,
    pub side_length: u32,
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.side_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_footprint_round_trips_center() {
        let footprint = ChunkFootprint::centered(Coordinate::new(0, 0), 16);
        assert_eq!(footprint.bottom_left, Coordinate::new(-8, -8));
        assert_eq!(footprint.center(), Coordinate::new(0, 0));
        assert_eq!(footprint.cell_count(), 256);
    }

    #[test]
    fn chunk_key_renders_as_triple() {
        let footprint = ChunkFootprint::new(Coordinate::new(-8, 24), 16);
        assert_eq!(footprint.key().to_string(), "-8,24,16");
    }

    #[test]
    fn contains_is_half_open() {
        let footprint = ChunkFootprint::new(Coordinate::new(0, 0), 4);
        assert!(footprint.contains(Coordinate::new(0, 0)));
        assert!(footprint.contains(Coordinate::new(3, 3)));
        assert!(!footprint.contains(Coordinate::new(4, 0)));
        assert!(!footprint.contains(Coordinate::new(-1, 2)));
    }

    #[test]
    fn extreme_coordinates_stay_in_range() {
        let west = Coordinate::new(i64::MIN, 0);
        let east = Coordinate::new(i64::MAX, 0);
        assert_eq!(west.distance_to(&east), 2f64.powi(64));
        assert_eq!(east.distance_to(&west), 2f64.powi(64));

        let edge = ChunkFootprint::new(Coordinate::new(i64::MAX - 3, 0), 8);
        assert_eq!(edge.center(), Coordinate::new(i64::MAX, 4));
        assert!(edge.contains(Coordinate::new(i64::MAX, 7)));
        assert!(!edge.contains(west));
        assert!(!edge.contains(Coordinate::new(i64::MAX, 8)));

        let corner = ChunkFootprint::centered(Coordinate::new(i64::MIN, i64::MIN), 16);
        assert_eq!(corner.bottom_left, Coordinate::new(i64::MIN, i64::MIN));
    }

    #[test]
    fn checked_footprints_must_fit_the_plane() {
        let fits = ChunkFootprint::checked_centered(Coordinate::new(i64::MAX - 8, 0), 16)
            .expect("last full chunk before the edge");
        assert_eq!(fits.bottom_left, Coordinate::new(i64::MAX - 16, -8));

        assert!(ChunkFootprint::checked_centered(Coordinate::new(i64::MAX - 7, 0), 16).is_none());
        assert!(ChunkFootprint::checked_centered(Coordinate::new(0, i64::MIN), 16).is_none());
        assert!(ChunkFootprint::checked_new(Coordinate::new(0, i64::MAX), 1).is_none());
        assert!(ChunkFootprint::checked_new(Coordinate::new(i64::MIN, 0), 16).is_some());
    }

    #[test]
    fn footprint_serializes_camel_case() {
        let footprint = ChunkFootprint::new(Coordinate::new(1, 2), 8);
        let json = serde_json::to_value(footprint).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "bottomLeft": { "x": 1, "y": 2 }, "sideLength": 8 })
        );
    }
}
