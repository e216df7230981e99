//! Overlay engine module
//!
//! Turns preferences plus the static category table into per-category
//! overlay descriptors, and converts meter radii into screen points.

pub mod engine;
pub mod registry;

pub use engine::{OverlayEngine, OverlaySpec, project_radius};
pub use registry::{
    CategoryRegistry, CategoryStyle, FeatureFilter, OverlayShape, STRIPE_PATTERN, Stroke,
};
