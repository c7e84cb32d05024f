//! Geotagged locations and the key used to group observations by place.
//!
//! Observations are grouped by coordinate identity, never by distance. Two
//! strategies exist: exact floating-point equality and rounding to a fixed
//! number of decimal places. Every caller that needs "the same place" goes
//! through [`LocationGrouping::key`] so a different bucketing scheme can be
//! swapped in later without touching the pipeline.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Decimal places used when de-duplicating locations for prediction runs
/// (4 places is roughly 11 m at the equator).
pub const PREDICTION_KEY_DECIMALS: u32 = 4;

/// A point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Hashable identity of a location under some [`LocationGrouping`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationKey {
    /// Raw IEEE-754 bits of both coordinates.
    Exact(u64, u64),
    /// Coordinates scaled by `10^decimals` and rounded.
    Rounded { decimals: u32, lat: i64, lng: i64 },
}

/// How observations are matched to "the same place".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationGrouping {
    Exact,
    Rounded { decimals: u32 },
}

impl LocationGrouping {
    /// The grouping used by prediction runs.
    pub fn for_predictions() -> Self {
        LocationGrouping::Rounded {
            decimals: PREDICTION_KEY_DECIMALS,
        }
    }

    pub fn key(&self, location: &Location) -> LocationKey {
        match *self {
            LocationGrouping::Exact => LocationKey::Exact(
                exact_bits(location.latitude),
                exact_bits(location.longitude),
            ),
            LocationGrouping::Rounded { decimals } => {
                let scale = 10f64.powi(decimals as i32);
                LocationKey::Rounded {
                    decimals,
                    lat: (location.latitude * scale).round() as i64,
                    lng: (location.longitude * scale).round() as i64,
                }
            }
        }
    }

    /// De-duplicate locations under this grouping.
    ///
    /// Output order follows the first appearance of each key; when several
    /// inputs share a key the last one seen is kept as the representative.
    pub fn distinct<I>(&self, locations: I) -> Vec<Location>
    where
        I: IntoIterator<Item = Location>,
    {
        let mut index: HashMap<LocationKey, usize> = HashMap::new();
        let mut result: Vec<Location> = Vec::new();
        for location in locations {
            let key = self.key(&location);
            match index.get(&key) {
                Some(&slot) => result[slot] = location,
                None => {
                    index.insert(key, result.len());
                    result.push(location);
                }
            }
        }
        result
    }
}

// -0.0 and 0.0 compare equal as floats, so they must share a key.
fn exact_bits(value: f64) -> u64 {
    if value == 0.0 {
        0f64.to_bits()
    } else {
        value.to_bits()
    }
}
