//! No-fly-zone overlays for an interactive map
//!
//! Hazard categories (airports, heliports, parks, TFRs, model flying
//! fields) are drawn as circle or polygon layers on a vector map style.
//! User preferences decide which categories show and how large the
//! circles are; the sync plugin keeps the live style in line with them.

pub mod category;
pub mod config;
pub mod datasets;
pub mod error;
pub mod overlay;
pub mod preferences;
pub mod sync;

pub use category::HazardCategory;
pub use config::NfzConfig;
pub use error::OverlayError;
pub use overlay::{OverlayEngine, OverlaySpec};
pub use preferences::{JsonFilePreferenceStore, MemoryPreferenceStore, PreferenceStore};
pub use sync::{MapEvent, MapEventChannels, MapWidget, MapWidgetHandle, NoFlyZonePlugin};
