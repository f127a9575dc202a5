use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::params::LEVEL_THRESHOLD_COUNT;

pub const LOCATION_ID_BYTES: usize = 32;

const LEVEL_WINDOW: (usize, usize) = (4, 7);
const BONUS_OFFSET: usize = 9;
const BONUS_COUNT: usize = 6;
const BONUS_CUTOFF: u8 = 16;

/// Canonical 32-byte big-endian encoding of a planet hash.
///
/// Byte order matches numeric order, so the derived `Ord` compares ids the
/// same way the field elements they encode compare.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocationId([u8; LOCATION_ID_BYTES]);

#[derive(Debug, Error, PartialEq)]
pub enum LocationIdError {
    #[error("location id must be {expected} hex characters, got {actual}")]
    Length { expected: usize, actual: usize },
    #[error("location id is not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

impl LocationId {
    pub const fn from_bytes(bytes: [u8; LOCATION_ID_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; LOCATION_ID_BYTES] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Big-endian integer value of bytes `[start, end)`. Windows wider than
    /// eight bytes keep only their low 64 bits.
    pub fn bytes(&self, start: usize, end: usize) -> u64 {
        let end = end.min(LOCATION_ID_BYTES);
        let start = start.min(end);
        self.0[start..end]
            .iter()
            .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte))
    }

    /// The sub-range of the hash that encodes planet level.
    pub fn level_window(&self) -> u32 {
        self.bytes(LEVEL_WINDOW.0, LEVEL_WINDOW.1) as u32
    }

    /// Highest level whose threshold the level window is still below.
    /// `None` when the window is not below the level-0 cutoff.
    pub fn planet_level(&self, thresholds: &[u32; LEVEL_THRESHOLD_COUNT]) -> Option<u8> {
        let window = self.level_window();
        thresholds
            .iter()
            .rposition(|threshold| window < *threshold)
            .map(|level| level as u8)
    }

    /// Stat bonus flags encoded in bytes 9..15.
    pub fn bonuses(&self) -> [bool; BONUS_COUNT] {
        let mut flags = [false; BONUS_COUNT];
        for (index, flag) in flags.iter_mut().enumerate() {
            *flag = self.0[BONUS_OFFSET + index] < BONUS_CUTOFF;
        }
        flags
    }
}

impl FromStr for LocationId {
    type Err = LocationIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.strip_prefix("0x").unwrap_or(value);
        if trimmed.len() != LOCATION_ID_BYTES * 2 {
            return Err(LocationIdError::Length {
                expected: LOCATION_ID_BYTES * 2,
                actual: trimmed.len(),
            });
        }
        let mut bytes = [0u8; LOCATION_ID_BYTES];
        hex::decode_to_slice(trimmed, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocationId({})", self.to_hex())
    }
}

impl Serialize for LocationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for LocationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
