//! Per-category hazard radius in meters

use bevy::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::category::HazardCategory;
use crate::error::OverlayError;
use crate::preferences::store::PreferenceStore;

/// Persistence key and seed value for every category drawn as a circle.
/// Park and TFR polygons have no radius.
const RADIUS_SEEDS: [(HazardCategory, &str, f64); 6] = [
    (HazardCategory::LargeAirport, "LargeCircleRadius", 16093.4),
    (HazardCategory::MediumAirport, "MediumCircleRadius", 8064.0),
    (HazardCategory::SmallAirport, "SmallCircleRadius", 3210.0),
    (HazardCategory::Heliport, "HeliCircleRadius", 2414.0),
    (HazardCategory::SeaplaneBase, "SeaplaneCircleRadius", 2414.0),
    (HazardCategory::AmaClub, "AMACircleRadius", 800.0),
];

pub fn radius_key(category: HazardCategory) -> Option<&'static str> {
    RADIUS_SEEDS
        .iter()
        .find(|(c, _, _)| *c == category)
        .map(|(_, key, _)| *key)
}

fn is_valid_radius(meters: f64) -> bool {
    meters.is_finite() && meters > 0.0
}

pub struct RadiusConfig {
    store: Arc<dyn PreferenceStore>,
    meters: BTreeMap<HazardCategory, f64>,
}

impl RadiusConfig {
    /// Read every radius key, writing the seed back for any that are missing.
    ///
    /// Read failures count as missing. After this returns the store holds all
    /// six keys, unless the backend itself is down.
    pub fn hydrate(store: Arc<dyn PreferenceStore>) -> Self {
        let mut meters = BTreeMap::new();

        for (category, key, seed) in RADIUS_SEEDS {
            let persisted = match store.get_number(key) {
                Ok(Some(value)) if is_valid_radius(value) => Some(value),
                Ok(Some(value)) => {
                    warn!("Ignoring invalid persisted radius {key}={value}, reseeding");
                    None
                }
                Ok(None) => None,
                Err(err) => {
                    warn!("Reading {key} failed, using default: {err}");
                    None
                }
            };

            let value = match persisted {
                Some(value) => value,
                None => {
                    if let Err(err) = store.set_number(key, seed) {
                        warn!("Seeding {key} failed: {err}");
                    }
                    seed
                }
            };
            meters.insert(category, value);
        }

        Self { store, meters }
    }

    pub fn get(&self, category: HazardCategory) -> Result<f64, OverlayError> {
        self.meters
            .get(&category)
            .copied()
            .ok_or_else(|| OverlayError::UnknownCategory(category.to_string()))
    }

    /// Persist first, then update memory, so a failed write changes nothing.
    pub fn set(&mut self, category: HazardCategory, meters: f64) -> Result<(), OverlayError> {
        let key =
            radius_key(category).ok_or_else(|| OverlayError::UnknownCategory(category.to_string()))?;
        if !is_valid_radius(meters) {
            return Err(OverlayError::InvalidRadius(meters));
        }
        self.store.set_number(key, meters)?;
        self.meters.insert(category, meters);
        Ok(())
    }
}
