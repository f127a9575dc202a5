//! Capture zones: a handful of circular regions re-derived from the block
//! number at every epoch boundary.

use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use forest_schema::{CaptureZone, Coordinate, ZoneChangeEvent};
use parking_lot::{Mutex, RwLock};
use thiserror::Error;

use crate::mulberry::Mulberry32;
use crate::zone_config::ZoneConfig;

const SEED_STRIDE: u64 = 1000;
const CENTER_SPREAD: f64 = 0.8;
const MIN_RADIUS_FRACTION: f64 = 0.05;
const MAX_RADIUS_FRACTION: f64 = 0.15;

#[derive(Debug, Error, PartialEq)]
pub enum ZoneError {
    #[error("zone change interval must be positive")]
    ZeroInterval,
    #[error("at least one zone must be generated per change")]
    NoZones,
    #[error("max zone radius {0} must be positive and finite")]
    MaxRadius(f64),
    #[error("world radius {0} must be positive and finite")]
    WorldRadius(f64),
}

/// Consistent view of the active epoch. Readers hold an `Arc` to a snapshot,
/// so a generation in progress is never observed half-written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneEpochState {
    pub last_change_block: Option<u64>,
    pub zones: Vec<CaptureZone>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ZoneGeneration {
    Changed(ZoneChangeEvent),
    NoChange,
}

impl ZoneGeneration {
    pub fn event(&self) -> Option<&ZoneChangeEvent> {
        match self {
            ZoneGeneration::Changed(event) => Some(event),
            ZoneGeneration::NoChange => None,
        }
    }
}

#[derive(Debug)]
pub struct CaptureZoneGenerator {
    config: ZoneConfig,
    world_radius: f64,
    state: RwLock<Arc<ZoneEpochState>>,
    subscribers: Mutex<Vec<Sender<ZoneChangeEvent>>>,
}

impl CaptureZoneGenerator {
    pub fn new(config: ZoneConfig, world_radius: f64) -> Result<Self, ZoneError> {
        config.validate()?;
        if !world_radius.is_finite() || world_radius <= 0.0 {
            return Err(ZoneError::WorldRadius(world_radius));
        }
        Ok(Self {
            config,
            world_radius,
            state: RwLock::new(Arc::new(ZoneEpochState::default())),
            subscribers: Mutex::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &ZoneConfig {
        &self.config
    }

    /// Start of the epoch containing `block`, or `None` before the start block.
    pub fn change_block_for(&self, block: u64) -> Option<u64> {
        let elapsed = block.checked_sub(self.config.start_block)?;
        let epoch = elapsed / self.config.change_interval;
        Some(self.config.start_block + epoch * self.config.change_interval)
    }

    pub fn next_change_block(&self, current_block: u64) -> u64 {
        match self.change_block_for(current_block) {
            Some(change_block) => change_block + self.config.change_interval,
            None => self.config.start_block,
        }
    }

    pub fn generate(&self, block: u64) -> ZoneGeneration {
        let Some(change_block) = self.change_block_for(block) else {
            return ZoneGeneration::NoChange;
        };
        if self.already_generated(&self.state.read(), change_block) {
            return ZoneGeneration::NoChange;
        }

        let mut state = self.state.write();
        if self.already_generated(&state, change_block) {
            return ZoneGeneration::NoChange;
        }
        let zones = self.derive_zones(change_block);
        *state = Arc::new(ZoneEpochState {
            last_change_block: Some(change_block),
            zones: zones.clone(),
        });
        let event = ZoneChangeEvent {
            change_block,
            next_change_block: change_block + self.config.change_interval,
            zones,
        };

        tracing::info!(
            target: "forest::zones",
            change_block,
            next_change_block = event.next_change_block,
            zones = event.zones.len(),
            "zones.generated"
        );
        // Published before the write lock drops so subscribers see epochs in order.
        self.publish(&event);
        drop(state);
        ZoneGeneration::Changed(event)
    }

    pub fn snapshot(&self) -> Arc<ZoneEpochState> {
        Arc::clone(&self.state.read())
    }

    pub fn zones(&self) -> Vec<CaptureZone> {
        self.snapshot().zones.clone()
    }

    pub fn contains(&self, coords: Coordinate) -> bool {
        self.zone_containing(coords).is_some()
    }

    pub fn zone_containing(&self, coords: Coordinate) -> Option<CaptureZone> {
        self.snapshot()
            .zones
            .iter()
            .find(|zone| zone.contains(coords))
            .copied()
    }

    /// Receives every change event published after this call.
    pub fn subscribe(&self) -> Receiver<ZoneChangeEvent> {
        let (sender, receiver) = unbounded();
        self.subscribers.lock().push(sender);
        receiver
    }

    /// Pure derivation of the zone set for an epoch start.
    pub fn derive_zones(&self, change_block: u64) -> Vec<CaptureZone> {
        let max_coord = self.world_radius * CENTER_SPREAD;
        let min_radius = self.world_radius * MIN_RADIUS_FRACTION;
        let max_radius = (self.world_radius * MAX_RADIUS_FRACTION).min(self.config.max_zone_radius);

        (0..self.config.zones_per_change as u64)
            .map(|index| {
                let seed = change_block.wrapping_add(index.wrapping_mul(SEED_STRIDE)) as u32;
                let mut rng = Mulberry32::new(seed);
                let x = (rng.next_unit() * 2.0 - 1.0) * max_coord;
                let y = (rng.next_unit() * 2.0 - 1.0) * max_coord;
                let radius = min_radius + rng.next_unit() * (max_radius - min_radius);
                CaptureZone {
                    center: Coordinate::new(x.round() as i64, y.round() as i64),
                    radius,
                }
            })
            .collect()
    }

    fn already_generated(&self, state: &ZoneEpochState, change_block: u64) -> bool {
        state
            .last_change_block
            .is_some_and(|last| change_block <= last)
    }

    fn publish(&self, event: &ZoneChangeEvent) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|sender| sender.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(start_block: u64) -> CaptureZoneGenerator {
        let config = ZoneConfig {
            start_block,
            ..ZoneConfig::default()
        };
        CaptureZoneGenerator::new(config, 5000.0).unwrap()
    }

    #[test]
    fn first_epoch_generates_at_start_block() {
        let zones = generator(0);
        let outcome = zones.generate(0);
        let event = outcome.event().expect("epoch zero should generate");
        assert_eq!(event.change_block, 0);
        assert_eq!(event.next_change_block, 500);
        assert_eq!(event.zones.len(), 3);
        assert_eq!(zones.generate(499), ZoneGeneration::NoChange);
    }

    #[test]
    fn blocks_before_start_do_nothing() {
        let zones = generator(1000);
        assert_eq!(zones.generate(999), ZoneGeneration::NoChange);
        assert!(zones.zones().is_empty());
        assert_eq!(zones.next_change_block(10), 1000);
        assert_eq!(zones.next_change_block(1000), 1500);
        assert_eq!(zones.next_change_block(1499), 1500);
    }

    #[test]
    fn zones_respect_world_bounds() {
        let zones = generator(0);
        for change_block in (0..20_000).step_by(500) {
            for zone in zones.derive_zones(change_block) {
                assert!(zone.center.x.abs() <= 4000);
                assert!(zone.center.y.abs() <= 4000);
                assert!(zone.radius >= 250.0);
                assert!(zone.radius <= 750.0);
            }
        }
    }

    #[test]
    fn earlier_epoch_never_replaces_later_one() {
        let zones = generator(0);
        let later = zones.generate(2000);
        assert!(later.event().is_some());
        assert_eq!(zones.generate(1000), ZoneGeneration::NoChange);
        assert_eq!(zones.snapshot().last_change_block, Some(2000));
    }

    #[test]
    fn lookups_use_current_snapshot() {
        let zones = generator(0);
        assert!(!zones.contains(Coordinate::ORIGIN));
        zones.generate(500);
        let zone = zones.zones()[0];
        assert!(zones.contains(zone.center));
        assert_eq!(zones.zone_containing(zone.center), Some(zone));
    }

    #[test]
    fn subscribers_see_each_change_once() {
        let zones = generator(0);
        let receiver = zones.subscribe();
        zones.generate(0);
        zones.generate(10);
        zones.generate(500);
        let events: Vec<_> = receiver.try_iter().collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].change_block, 0);
        assert_eq!(events[1].change_block, 500);
    }

    #[test]
    fn rejects_zero_interval() {
        let config = ZoneConfig {
            change_interval: 0,
            ..ZoneConfig::default()
        };
        assert_eq!(
            CaptureZoneGenerator::new(config, 5000.0).unwrap_err(),
            ZoneError::ZeroInterval
        );
    }
}
