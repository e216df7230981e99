//! Which hazard categories the user has switched on

use bevy::prelude::*;
use std::sync::Arc;

use crate::category::HazardCategory;
use crate::error::OverlayError;
use crate::preferences::store::{BoolMap, PreferenceStore};

pub const VISIBILITY_KEY: &str = "Show_NFZ";

/// Kept in the seeded map for older app builds; maps to no category.
pub const LEGACY_FLYING_SITES_KEY: &str = "flying_sites_260";

fn seeded_mapping() -> BoolMap {
    HazardCategory::ALL
        .iter()
        .map(|c| c.as_str())
        .chain(std::iter::once(LEGACY_FLYING_SITES_KEY))
        .map(|key| (key.to_string(), true))
        .collect()
}

/// In-memory mirror of the persisted `Show_NFZ` map
///
/// The map is seeded once. An existing map is adopted as-is: a category it
/// does not mention is hidden, even if the category is newer than the map.
pub struct VisibilityConfig {
    store: Arc<dyn PreferenceStore>,
    mapping: BoolMap,
}

impl VisibilityConfig {
    pub fn hydrate(store: Arc<dyn PreferenceStore>) -> Self {
        let mapping = match store.get_bool_map(VISIBILITY_KEY) {
            Ok(Some(mapping)) => mapping,
            Ok(None) => {
                let seeded = seeded_mapping();
                if let Err(err) = store.set_bool_map(VISIBILITY_KEY, &seeded) {
                    warn!("Seeding {VISIBILITY_KEY} failed: {err}");
                }
                info!("Seeded {VISIBILITY_KEY} with {} entries", seeded.len());
                seeded
            }
            Err(err) => {
                warn!("Reading {VISIBILITY_KEY} failed, showing everything: {err}");
                seeded_mapping()
            }
        };

        Self { store, mapping }
    }

    pub fn is_visible(&self, category: HazardCategory) -> bool {
        self.mapping.get(category.as_str()).copied().unwrap_or(false)
    }

    /// Replace the persisted map wholesale.
    ///
    /// An empty map is ignored and `Ok(false)` returned; an empty preference
    /// blob is never written. Memory only changes once the write succeeds.
    pub fn set_all(&mut self, mapping: BoolMap) -> Result<bool, OverlayError> {
        if mapping.is_empty() {
            debug!("Ignoring empty {VISIBILITY_KEY} update");
            return Ok(false);
        }
        self.store.set_bool_map(VISIBILITY_KEY, &mapping)?;
        self.mapping = mapping;
        Ok(true)
    }

    /// Flip one category, keeping every other key (legacy ones too)
    pub fn set_visible(
        &mut self,
        category: HazardCategory,
        visible: bool,
    ) -> Result<bool, OverlayError> {
        let mut mapping = self.mapping.clone();
        mapping.insert(category.as_str().to_string(), visible);
        self.set_all(mapping)
    }
}
