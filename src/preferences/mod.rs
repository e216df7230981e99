//! User preferences backing the overlay engine
//!
//! Both configs hydrate synchronously from an injected `PreferenceStore` and
//! fail open to their seeded defaults when the store is unavailable.

pub mod radius;
pub mod store;
pub mod visibility;

pub use radius::{RadiusConfig, radius_key};
pub use store::{BoolMap, JsonFilePreferenceStore, MemoryPreferenceStore, PreferenceStore};
pub use visibility::{LEGACY_FLYING_SITES_KEY, VISIBILITY_KEY, VisibilityConfig};
