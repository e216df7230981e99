//! Overlay engine: visible categories to overlay specs, meters to points

use bevy::color::Srgba;
use bevy::prelude::*;
use std::sync::Arc;

use crate::category::HazardCategory;
use crate::datasets::DatasetName;
use crate::error::OverlayError;
use crate::overlay::registry::{CategoryRegistry, FeatureFilter, OverlayShape, Stroke};
use crate::preferences::{BoolMap, PreferenceStore, RadiusConfig, VisibilityConfig};

/// Everything needed to draw one category. Recomputed on every request.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySpec {
    pub category: HazardCategory,
    pub source_id: &'static str,
    pub dataset: DatasetName,
    pub shape: OverlayShape,
    pub fill_color: Srgba,
    pub fill_pattern: Option<&'static str>,
    pub stroke: Option<Stroke>,
    pub opacity: f32,
    /// Real-world radius; 0 for polygons
    pub radius_meters: f64,
    pub filter: Option<FeatureFilter>,
    pub source_layer: Option<&'static str>,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl OverlaySpec {
    /// Layer id on the map style
    pub fn layer_id(&self) -> &'static str {
        self.category.as_str()
    }

    pub fn is_circle(&self) -> bool {
        self.shape == OverlayShape::Circle
    }
}

/// Convert a real-world distance to screen points.
///
/// `meters_per_point` comes from the map widget and depends on its
/// projection; it is evaluated once at `latitude`.
pub fn project_radius(
    meters: f64,
    latitude: f64,
    meters_per_point: impl FnOnce(f64) -> f64,
) -> Result<f64, OverlayError> {
    let scale = meters_per_point(latitude);
    if !scale.is_finite() || scale <= 0.0 {
        return Err(OverlayError::InvalidProjectionScale(scale));
    }
    Ok(meters / scale)
}

#[derive(Resource)]
pub struct OverlayEngine {
    radius: RadiusConfig,
    visibility: VisibilityConfig,
    registry: CategoryRegistry,
}

impl OverlayEngine {
    pub fn new(
        radius: RadiusConfig,
        visibility: VisibilityConfig,
        registry: CategoryRegistry,
    ) -> Self {
        Self {
            radius,
            visibility,
            registry,
        }
    }

    /// Hydrate both configs from `store` and use the standard registry
    pub fn hydrate(store: Arc<dyn PreferenceStore>) -> Self {
        let radius = RadiusConfig::hydrate(store.clone());
        let visibility = VisibilityConfig::hydrate(store);
        Self::new(radius, visibility, CategoryRegistry::standard())
    }

    /// One spec per visible category, in registry order
    pub fn build_overlay_specs(&self) -> Vec<OverlaySpec> {
        self.registry
            .iter()
            .filter(|style| self.visibility.is_visible(style.category))
            .map(|style| {
                let radius_meters = match style.shape {
                    OverlayShape::Circle => self.radius.get(style.category).unwrap_or_else(|err| {
                        warn!("{err}; drawing {} with zero radius", style.category);
                        0.0
                    }),
                    OverlayShape::Polygon => 0.0,
                };
                OverlaySpec {
                    category: style.category,
                    source_id: style.dataset.source_id(),
                    dataset: style.dataset,
                    shape: style.shape,
                    fill_color: style.fill_color,
                    fill_pattern: style.fill_pattern,
                    stroke: style.stroke,
                    opacity: style.opacity,
                    radius_meters,
                    filter: style.filter,
                    source_layer: style.source_layer,
                    min_zoom: style.min_zoom,
                    max_zoom: style.max_zoom,
                }
            })
            .collect()
    }

    pub fn set_radius(&mut self, category: HazardCategory, meters: f64) -> Result<(), OverlayError> {
        self.radius.set(category, meters)
    }

    pub fn set_visible(
        &mut self,
        category: HazardCategory,
        visible: bool,
    ) -> Result<bool, OverlayError> {
        self.visibility.set_visible(category, visible)
    }

    pub fn set_visibility(&mut self, mapping: BoolMap) -> Result<bool, OverlayError> {
        self.visibility.set_all(mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::MemoryPreferenceStore;

    fn engine_with(mapping: &[(&str, bool)]) -> OverlayEngine {
        let store = Arc::new(MemoryPreferenceStore::new());
        let mut engine = OverlayEngine::hydrate(store);
        let mapping: BoolMap = mapping.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        engine.set_visibility(mapping).unwrap();
        engine
    }

    #[test]
    fn test_all_visible_on_first_run() {
        let engine = OverlayEngine::hydrate(Arc::new(MemoryPreferenceStore::new()));
        let specs = engine.build_overlay_specs();
        let order: Vec<_> = specs.iter().map(|s| s.category).collect();
        assert_eq!(order, HazardCategory::ALL.to_vec());
    }

    #[test]
    fn test_hidden_category_is_skipped() {
        let mut entries: Vec<(&str, bool)> =
            HazardCategory::ALL.iter().map(|c| (c.as_str(), true)).collect();
        for entry in entries.iter_mut() {
            if entry.0 == "small_airport" {
                entry.1 = false;
            }
        }
        let engine = engine_with(&entries);

        let categories: Vec<_> = engine
            .build_overlay_specs()
            .into_iter()
            .map(|s| s.category)
            .collect();
        assert_eq!(categories.len(), 7);
        assert!(!categories.contains(&HazardCategory::SmallAirport));
    }

    #[test]
    fn test_nothing_visible_yields_no_specs() {
        let engine = engine_with(&[("large_airport", false), ("tfr", false)]);
        assert!(engine.build_overlay_specs().is_empty());
    }

    #[test]
    fn test_specs_carry_radius_and_style() {
        let engine = engine_with(&[("medium_airport", true), ("usnational_park", true)]);
        let specs = engine.build_overlay_specs();
        assert_eq!(specs.len(), 2);

        let medium = &specs[0];
        assert_eq!(medium.layer_id(), "medium_airport");
        assert_eq!(medium.source_id, "allPins");
        assert_eq!(medium.radius_meters, 8064.0);
        assert!(medium.is_circle());

        let park = &specs[1];
        assert_eq!(park.radius_meters, 0.0);
        assert_eq!(park.opacity, 0.6);
        assert!(!park.is_circle());
    }

    #[test]
    fn test_specs_are_stable_across_calls() {
        let engine = OverlayEngine::hydrate(Arc::new(MemoryPreferenceStore::new()));
        assert_eq!(engine.build_overlay_specs(), engine.build_overlay_specs());
    }

    #[test]
    fn test_radius_edit_flows_into_specs() {
        let mut engine = engine_with(&[("ama_club", true)]);
        engine.set_radius(HazardCategory::AmaClub, 1200.0).unwrap();
        assert_eq!(engine.build_overlay_specs()[0].radius_meters, 1200.0);
    }

    #[test]
    fn test_project_radius_divides_by_scale() {
        for scale in [0.25, 1.0, 2.0, 37.5, 1024.0] {
            let points = project_radius(16093.4, 40.7, |_| scale).unwrap();
            assert_eq!(points, 16093.4 / scale);
        }
    }

    #[test]
    fn test_project_radius_samples_given_latitude() {
        let points = project_radius(100.0, 51.5, |lat| {
            assert_eq!(lat, 51.5);
            4.0
        })
        .unwrap();
        assert_eq!(points, 25.0);
    }

    #[test]
    fn test_project_radius_rejects_degenerate_scale() {
        assert_eq!(
            project_radius(100.0, 0.0, |_| 0.0),
            Err(OverlayError::InvalidProjectionScale(0.0))
        );
        assert!(project_radius(100.0, 0.0, |_| -1.0).is_err());
        assert!(project_radius(100.0, 0.0, |_| f64::NAN).is_err());
        assert!(project_radius(100.0, 0.0, |_| f64::INFINITY).is_err());
    }
}
