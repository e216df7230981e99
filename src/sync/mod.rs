//! Map style synchronization
//!
//! Keeps the live map style's sources and layers in line with the overlay
//! engine across style reloads, preference edits and viewport ticks.

use bevy::prelude::*;
use std::sync::Arc;

pub mod controller;
pub mod simulated;
pub mod systems;
pub mod types;
pub mod widget;

pub use controller::{LayerState, LayerSyncController, ReconcileReport};
pub use simulated::SimulatedMapWidget;
pub use systems::OverlayPlan;
pub use types::{
    MapEvent, MapEventChannels, OverlaysInvalidated, StyleReady, ViewportChangeReason,
    ViewportChanged,
};
pub use widget::{LayerDescriptor, LayerPaint, MapWidget, MapWidgetHandle};

use crate::config::NfzConfig;
use crate::datasets::{DatasetCatalog, DatasetIndex, apply_dataset_results, setup_dataset_worker};
use crate::overlay::OverlayEngine;
use crate::preferences::PreferenceStore;

/// Plugin wiring the overlay engine to a map widget.
///
/// The host inserts a `MapWidgetHandle` and pushes widget callbacks through
/// `MapEventChannels`. Preferences are hydrated from `store` while the
/// plugin builds, before any system can see the engine.
pub struct NoFlyZonePlugin {
    pub store: Arc<dyn PreferenceStore>,
}

impl Plugin for NoFlyZonePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NfzConfig>();
        if !app.world().contains_resource::<DatasetIndex>() {
            let root = app.world().resource::<NfzConfig>().datasets_dir.clone();
            app.insert_resource(DatasetIndex::new(DatasetCatalog::new(root)));
        }

        app.insert_resource(OverlayEngine::hydrate(self.store.clone()))
            .init_resource::<LayerSyncController>()
            .init_resource::<OverlayPlan>()
            .init_resource::<MapEventChannels>()
            .add_message::<StyleReady>()
            .add_message::<ViewportChanged>()
            .add_message::<OverlaysInvalidated>()
            .add_systems(Startup, setup_dataset_worker)
            .add_systems(
                Update,
                (
                    systems::drain_map_events,
                    apply_dataset_results,
                    systems::plan_overlays,
                    systems::apply_overlay_plan,
                    systems::apply_viewport_changes,
                )
                    .chain(),
            );
    }
}
