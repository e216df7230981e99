//! Static hazard datasets
//!
//! The bundled GeoJSON files are opaque to the overlay core beyond their
//! existence; the loader only checks they parse and counts features so a
//! broken bundle shows up in the log instead of as a blank map.

pub mod catalog;
pub mod loader;
pub mod systems;
pub mod types;

pub use catalog::{DatasetCatalog, DatasetResolver};
pub use loader::{start_dataset_worker, summarize_feature_collection};
pub use systems::{DatasetIndex, apply_dataset_results, setup_dataset_worker};
pub use types::{DatasetChannels, DatasetLoadResult, DatasetName, DatasetRef, DatasetSummary};
