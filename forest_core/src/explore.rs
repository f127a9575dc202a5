//! Footprint generators for bulk exploration.
//!
//! Patterns only decide *where* to look next; every footprint still goes
//! through [`ChunkMiner::discover`], so de-duplication and bounds policy stay
//! in one place.

use std::collections::VecDeque;
use std::f64::consts::PI;

use forest_schema::{Chunk, ChunkFootprint, Coordinate};
use serde::{Deserialize, Serialize};

use crate::discovery::{ChunkMiner, DiscoveryError, DiscoveryOutcome};
use crate::ledger::AgentId;

pub const DEFAULT_CHUNK_SIZE: u32 = 16;
const UNBOUNDED_CHUNK_BUDGET: usize = 100;
const RADIAL_STEPS: u32 = 16;

/// Number of newly mined chunks one exploration call may produce.
pub fn default_chunk_budget(radius: Option<f64>, chunk_size: u32) -> usize {
    match radius {
        Some(radius) if radius > 0.0 && chunk_size > 0 => {
            (radius / f64::from(chunk_size)).ceil() as usize * 8
        }
        _ => UNBOUNDED_CHUNK_BUDGET,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "pattern", rename_all = "snake_case")]
pub enum ExplorationPattern {
    Spiral {
        center: Coordinate,
        chunk_size: u32,
        /// Only sizes the default budget; the spiral itself is bounded by the world.
        #[serde(default)]
        radius: Option<f64>,
    },
    Rectangular {
        bottom_left: Coordinate,
        top_right: Coordinate,
        chunk_size: u32,
    },
    Radial {
        center: Coordinate,
        radius: f64,
        chunk_size: u32,
    },
}

impl ExplorationPattern {
    pub fn chunk_size(&self) -> u32 {
        match self {
            ExplorationPattern::Spiral { chunk_size, .. }
            | ExplorationPattern::Rectangular { chunk_size, .. }
            | ExplorationPattern::Radial { chunk_size, .. } => *chunk_size,
        }
    }

    pub fn default_budget(&self) -> usize {
        match *self {
            ExplorationPattern::Spiral {
                radius, chunk_size, ..
            } => default_chunk_budget(radius, chunk_size),
            ExplorationPattern::Radial {
                radius, chunk_size, ..
            } => default_chunk_budget(Some(radius), chunk_size),
            ExplorationPattern::Rectangular { chunk_size, .. } => {
                default_chunk_budget(None, chunk_size)
            }
        }
    }

    /// Footprints in visiting order. Spirals are cut off once a whole ring
    /// lies beyond `world_radius`. Every pattern ends where its next
    /// footprint would leave the `i64` plane.
    pub fn footprints(&self, world_radius: f64) -> Box<dyn Iterator<Item = ChunkFootprint> + Send> {
        match *self {
            ExplorationPattern::Spiral {
                center, chunk_size, ..
            } => {
                let reach = world_radius + center.distance_from_origin();
                let rings = (reach / f64::from(chunk_size.max(1))).ceil() as u64;
                let max_ring = rings.saturating_add(1);
                Box::new(SpiralPattern::new(center, chunk_size).take_rings(max_ring))
            }
            ExplorationPattern::Rectangular {
                bottom_left,
                top_right,
                chunk_size,
            } => Box::new(RectangularPattern::new(bottom_left, top_right, chunk_size)),
            ExplorationPattern::Radial {
                center,
                radius,
                chunk_size,
            } => Box::new(RadialPattern::new(center, radius, chunk_size)),
        }
    }
}

/// The chunk centered on `center`, then square rings of chunks around it.
#[derive(Debug, Clone)]
pub struct SpiralPattern {
    center: Coordinate,
    chunk_size: u32,
    ring: u64,
    max_ring: Option<u64>,
    exhausted: bool,
    pending: VecDeque<ChunkFootprint>,
}

impl SpiralPattern {
    pub fn new(center: Coordinate, chunk_size: u32) -> Self {
        let first = ChunkFootprint::checked_centered(center, chunk_size);
        Self {
            center,
            chunk_size,
            ring: 0,
            max_ring: None,
            exhausted: first.is_none(),
            pending: first.into_iter().collect(),
        }
    }

    /// Stops after ring `max_ring` (ring 0 is the center chunk).
    pub fn take_rings(mut self, max_ring: u64) -> Self {
        self.max_ring = Some(max_ring);
        self
    }

    fn offset(&self, i: i64, j: i64) -> Option<ChunkFootprint> {
        let step = i64::from(self.chunk_size);
        let x = self.center.x.checked_add(i.checked_mul(step)?)?;
        let y = self.center.y.checked_add(j.checked_mul(step)?)?;
        ChunkFootprint::checked_centered(Coordinate::new(x, y), self.chunk_size)
    }

    /// Queues the next ring, or returns false if any of its footprints
    /// falls off the plane.
    fn fill_next_ring(&mut self) -> bool {
        let Some(k) = i64::try_from(self.ring + 1).ok() else {
            return false;
        };
        // Counter-clockwise from the bottom-left corner of the ring.
        let bottom = (-k..=k).map(|i| (i, -k));
        let right = (-k + 1..=k).map(|j| (k, j));
        let top = (-k..k).rev().map(|i| (i, k));
        let left = (-k + 1..k).rev().map(|j| (-k, j));
        let ring: Option<Vec<_>> = bottom
            .chain(right)
            .chain(top)
            .chain(left)
            .map(|(i, j)| self.offset(i, j))
            .collect();

        match ring {
            Some(ring) => {
                self.ring += 1;
                self.pending.extend(ring);
                true
            }
            None => false,
        }
    }
}

impl Iterator for SpiralPattern {
    type Item = ChunkFootprint;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pending.is_empty() {
            if self.exhausted || self.max_ring.is_some_and(|max| self.ring >= max) {
                return None;
            }
            if !self.fill_next_ring() {
                self.exhausted = true;
                return None;
            }
        }
        self.pending.pop_front()
    }
}

/// Row-major tiling of `[bottom_left, top_right)`.
#[derive(Debug, Clone)]
pub struct RectangularPattern {
    bottom_left: Coordinate,
    top_right: Coordinate,
    chunk_size: u32,
    cursor: Coordinate,
    done: bool,
}

impl RectangularPattern {
    pub fn new(bottom_left: Coordinate, top_right: Coordinate, chunk_size: u32) -> Self {
        Self {
            bottom_left,
            top_right,
            chunk_size,
            cursor: bottom_left,
            done: chunk_size == 0
                || bottom_left.x >= top_right.x
                || bottom_left.x.checked_add(i64::from(chunk_size)).is_none(),
        }
    }
}

impl Iterator for RectangularPattern {
    type Item = ChunkFootprint;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let side = i64::from(self.chunk_size);
        // A column or row whose chunk would cross i64::MAX is never emitted.
        let fits = |start: i64| start.checked_add(side).is_some();

        if self.cursor.x >= self.top_right.x || !fits(self.cursor.x) {
            self.cursor.x = self.bottom_left.x;
            self.cursor.y += side;
        }
        if self.cursor.y >= self.top_right.y || !fits(self.cursor.y) {
            self.done = true;
            return None;
        }

        let footprint = ChunkFootprint::new(self.cursor, self.chunk_size);
        self.cursor.x += side;
        Some(footprint)
    }
}

/// The centered chunk, then rings one chunk apart sampled every 22.5°.
#[derive(Debug, Clone)]
pub struct RadialPattern {
    center: Coordinate,
    radius: f64,
    chunk_size: u32,
    ring: u32,
    step: u32,
    done: bool,
}

impl RadialPattern {
    pub fn new(center: Coordinate, radius: f64, chunk_size: u32) -> Self {
        Self {
            center,
            radius,
            chunk_size,
            ring: 0,
            step: 0,
            done: chunk_size == 0,
        }
    }
}

impl Iterator for RadialPattern {
    type Item = ChunkFootprint;

    fn next(&mut self) -> Option<Self::Item> {
        let size = f64::from(self.chunk_size);
        if self.done || f64::from(self.ring) * size > self.radius {
            return None;
        }
        if self.ring == 0 {
            self.ring = 1;
            let first = ChunkFootprint::checked_centered(self.center, self.chunk_size);
            self.done = first.is_none();
            return first;
        }

        let ring_radius = f64::from(self.ring) * size;
        let angle = f64::from(self.step) * PI / 8.0;
        let x = self.center.x as f64 + angle.cos() * ring_radius - size / 2.0;
        let y = self.center.y as f64 + angle.sin() * ring_radius - size / 2.0;

        self.step += 1;
        if self.step == RADIAL_STEPS {
            self.step = 0;
            self.ring += 1;
        }
        let footprint = plane_coordinate(x)
            .zip(plane_coordinate(y))
            .and_then(|(x, y)| {
                ChunkFootprint::checked_new(Coordinate::new(x, y), self.chunk_size)
            });
        self.done = footprint.is_none();
        footprint
    }
}

/// Rounds onto the `i64` plane, or `None` for samples past its edge.
fn plane_coordinate(value: f64) -> Option<i64> {
    let value = value.round();
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
    (value >= i64::MIN as f64 && value < i64::MAX as f64).then_some(value as i64)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorationReport {
    pub chunks: Vec<Chunk>,
    pub skipped_out_of_bounds: usize,
    pub skipped_already_mined: usize,
}

impl ExplorationReport {
    pub fn planet_count(&self) -> usize {
        self.chunks.iter().map(|chunk| chunk.entries.len()).sum()
    }
}

impl ChunkMiner {
    /// Mines footprints in pattern order until `max_chunks` new chunks have
    /// been produced or the pattern runs out.
    pub fn explore(
        &self,
        agent: &AgentId,
        pattern: &ExplorationPattern,
        max_chunks: Option<usize>,
    ) -> Result<ExplorationReport, DiscoveryError> {
        let budget = max_chunks.unwrap_or_else(|| pattern.default_budget());
        let mut report = ExplorationReport::default();
        if budget == 0 {
            return Ok(report);
        }

        for footprint in pattern.footprints(self.params().world_radius) {
            match self.discover(footprint, agent)? {
                DiscoveryOutcome::Mined(chunk) => {
                    report.chunks.push(chunk);
                    if report.chunks.len() >= budget {
                        break;
                    }
                }
                DiscoveryOutcome::AlreadyMined => report.skipped_already_mined += 1,
                DiscoveryOutcome::OutOfBounds => report.skipped_out_of_bounds += 1,
            }
        }

        tracing::info!(
            target: "forest::discovery",
            agent = %agent,
            chunks = report.chunks.len(),
            planets = report.planet_count(),
            skipped_out_of_bounds = report.skipped_out_of_bounds,
            skipped_already_mined = report.skipped_already_mined,
            "exploration.completed"
        );
        Ok(report)
    }
}
