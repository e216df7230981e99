//! In-memory map widget
//!
//! Stands in for a real slippy map in the demo binary and in tests: keeps a
//! style's sources, images and layers, a camera, and a tally of every
//! mutating call. Clones share state, so the host can keep one to drive the
//! camera while the app owns another.

use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::PI;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::datasets::DatasetRef;
use crate::error::OverlayError;
use crate::sync::widget::{LayerDescriptor, LayerPaint, MapWidget};

/// Equatorial circumference used by Web Mercator
const EARTH_CIRCUMFERENCE_M: f64 = 40_075_016.686;
/// Vector tiles are 512 points wide at zoom 0
const TILE_SIZE_POINTS: f64 = 512.0;

/// Web Mercator ground resolution in meters per point
pub fn mercator_meters_per_point(latitude: f64, zoom: f64) -> f64 {
    EARTH_CIRCUMFERENCE_M * (latitude * PI / 180.0).cos() / (TILE_SIZE_POINTS * 2f64.powf(zoom))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetCalls {
    pub add_source: usize,
    pub add_layer: usize,
    pub add_image: usize,
    pub set_visible: usize,
    pub set_radius: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedLayer {
    pub descriptor: LayerDescriptor,
    pub visible: bool,
}

impl SimulatedLayer {
    pub fn radius_points(&self) -> Option<f64> {
        match self.descriptor.paint {
            LayerPaint::Circle { radius_points, .. } => Some(radius_points),
            LayerPaint::Fill { .. } => None,
        }
    }
}

#[derive(Debug)]
struct SimulatedState {
    style_loaded: bool,
    sources: BTreeMap<String, DatasetRef>,
    images: BTreeMap<String, DatasetRef>,
    layers: Vec<SimulatedLayer>,
    center_latitude: f64,
    center_longitude: f64,
    zoom: f64,
    min_zoom: f64,
    fixed_scale: Option<f64>,
    failing_layers: BTreeSet<String>,
    calls: WidgetCalls,
    radius_patches: Vec<(String, f64)>,
}

#[derive(Clone)]
pub struct SimulatedMapWidget {
    state: Arc<Mutex<SimulatedState>>,
}

impl SimulatedMapWidget {
    /// Widget with no style loaded yet
    pub fn new(center_latitude: f64, center_longitude: f64, zoom: f64) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimulatedState {
                style_loaded: false,
                sources: BTreeMap::new(),
                images: BTreeMap::new(),
                layers: Vec::new(),
                center_latitude,
                center_longitude,
                zoom,
                min_zoom: 0.0,
                fixed_scale: None,
                failing_layers: BTreeSet::new(),
                calls: WidgetCalls::default(),
                radius_patches: Vec::new(),
            })),
        }
    }

    /// Refuse to zoom out past `min_zoom`, like the map view's minimum zoom level
    pub fn with_min_zoom(self, min_zoom: f64) -> Self {
        if let Ok(mut state) = self.lock() {
            state.min_zoom = min_zoom;
            state.zoom = state.zoom.max(min_zoom);
        }
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, SimulatedState>, OverlayError> {
        self.state
            .lock()
            .map_err(|_| OverlayError::MapWidgetPreconditionNotMet("widget state poisoned".into()))
    }

    fn lock_style(&self) -> Result<MutexGuard<'_, SimulatedState>, OverlayError> {
        let state = self.lock()?;
        if !state.style_loaded {
            return Err(OverlayError::MapWidgetPreconditionNotMet(
                "style not loaded".into(),
            ));
        }
        Ok(state)
    }

    /// Load (or reload) the style. Everything previously added is gone.
    pub fn load_style(&self) {
        if let Ok(mut state) = self.lock() {
            state.style_loaded = true;
            state.sources.clear();
            state.images.clear();
            state.layers.clear();
        }
    }

    pub fn pan_to(&self, latitude: f64, longitude: f64) {
        if let Ok(mut state) = self.lock() {
            state.center_latitude = latitude;
            state.center_longitude = longitude;
        }
    }

    /// Camera center as (latitude, longitude)
    pub fn center(&self) -> Option<(f64, f64)> {
        let state = self.lock().ok()?;
        Some((state.center_latitude, state.center_longitude))
    }

    pub fn set_zoom(&self, zoom: f64) {
        if let Ok(mut state) = self.lock() {
            state.zoom = zoom.max(state.min_zoom);
        }
    }

    /// Pin `meters_per_point` to a constant, ignoring latitude and zoom
    pub fn set_fixed_scale(&self, scale: Option<f64>) {
        if let Ok(mut state) = self.lock() {
            state.fixed_scale = scale;
        }
    }

    /// Make every `add_layer` for `id` fail until cleared
    pub fn fail_layer(&self, id: &str, failing: bool) {
        if let Ok(mut state) = self.lock() {
            if failing {
                state.failing_layers.insert(id.to_string());
            } else {
                state.failing_layers.remove(id);
            }
        }
    }

    pub fn calls(&self) -> WidgetCalls {
        self.lock().map(|s| s.calls.clone()).unwrap_or_default()
    }

    pub fn radius_patches(&self) -> Vec<(String, f64)> {
        self.lock().map(|s| s.radius_patches.clone()).unwrap_or_default()
    }

    pub fn layer(&self, id: &str) -> Option<SimulatedLayer> {
        let state = self.lock().ok()?;
        state.layers.iter().find(|l| l.descriptor.id == id).cloned()
    }

    /// Layer ids in insertion (draw) order
    pub fn layer_ids(&self) -> Vec<&'static str> {
        self.lock()
            .map(|s| s.layers.iter().map(|l| l.descriptor.id).collect())
            .unwrap_or_default()
    }

    pub fn source_ids(&self) -> Vec<String> {
        self.lock()
            .map(|s| s.sources.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl MapWidget for SimulatedMapWidget {
    fn style_loaded(&self) -> bool {
        self.lock().map(|s| s.style_loaded).unwrap_or(false)
    }

    fn has_source(&self, id: &str) -> bool {
        self.lock_style()
            .map(|s| s.sources.contains_key(id))
            .unwrap_or(false)
    }

    fn add_source(&mut self, id: &str, dataset: &DatasetRef) -> Result<(), OverlayError> {
        let mut state = self.lock_style()?;
        if state.sources.contains_key(id) {
            return Err(OverlayError::MapWidgetPreconditionNotMet(format!(
                "source {id} already exists"
            )));
        }
        state.calls.add_source += 1;
        state.sources.insert(id.to_string(), dataset.clone());
        Ok(())
    }

    fn has_layer(&self, id: &str) -> bool {
        self.lock_style()
            .map(|s| s.layers.iter().any(|l| l.descriptor.id == id))
            .unwrap_or(false)
    }

    fn add_layer(&mut self, layer: LayerDescriptor) -> Result<(), OverlayError> {
        let mut state = self.lock_style()?;
        state.calls.add_layer += 1;
        if state.failing_layers.contains(layer.id) {
            return Err(OverlayError::MapWidgetPreconditionNotMet(format!(
                "layer {} rejected",
                layer.id
            )));
        }
        if !state.sources.contains_key(layer.source_id) {
            return Err(OverlayError::MapWidgetPreconditionNotMet(format!(
                "source {} missing for layer {}",
                layer.source_id, layer.id
            )));
        }
        if state.layers.iter().any(|l| l.descriptor.id == layer.id) {
            return Err(OverlayError::MapWidgetPreconditionNotMet(format!(
                "layer {} already exists",
                layer.id
            )));
        }
        state.layers.push(SimulatedLayer {
            descriptor: layer,
            visible: true,
        });
        Ok(())
    }

    fn set_layer_visible(&mut self, id: &str, visible: bool) -> Result<(), OverlayError> {
        let mut state = self.lock_style()?;
        state.calls.set_visible += 1;
        let layer = state
            .layers
            .iter_mut()
            .find(|l| l.descriptor.id == id)
            .ok_or_else(|| OverlayError::MapWidgetPreconditionNotMet(format!("no layer {id}")))?;
        layer.visible = visible;
        Ok(())
    }

    fn set_layer_radius_points(&mut self, id: &str, radius: f64) -> Result<(), OverlayError> {
        let mut state = self.lock_style()?;
        state.calls.set_radius += 1;
        let layer = state
            .layers
            .iter_mut()
            .find(|l| l.descriptor.id == id)
            .ok_or_else(|| OverlayError::MapWidgetPreconditionNotMet(format!("no layer {id}")))?;
        match &mut layer.descriptor.paint {
            LayerPaint::Circle { radius_points, .. } => *radius_points = radius,
            LayerPaint::Fill { .. } => {
                return Err(OverlayError::MapWidgetPreconditionNotMet(format!(
                    "layer {id} has no radius"
                )));
            }
        }
        state.radius_patches.push((id.to_string(), radius));
        Ok(())
    }

    fn has_image(&self, name: &str) -> bool {
        self.lock_style()
            .map(|s| s.images.contains_key(name))
            .unwrap_or(false)
    }

    fn add_image(&mut self, name: &str, image: &DatasetRef) -> Result<(), OverlayError> {
        let mut state = self.lock_style()?;
        state.calls.add_image += 1;
        state.images.insert(name.to_string(), image.clone());
        Ok(())
    }

    fn center_latitude(&self) -> Result<f64, OverlayError> {
        Ok(self.lock()?.center_latitude)
    }

    fn meters_per_point(&self, latitude: f64) -> f64 {
        match self.lock() {
            Ok(state) => state
                .fixed_scale
                .unwrap_or_else(|| mercator_meters_per_point(latitude, state.zoom)),
            Err(_) => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6;

    #[test]
    fn test_mercator_scale_at_equator() {
        let scale = mercator_meters_per_point(0.0, 0.0);
        assert!((scale - 78_271.517).abs() < 1e-3);

        // Each zoom level halves the scale
        let z7 = mercator_meters_per_point(0.0, 7.0);
        assert!((z7 * 128.0 - scale).abs() < EPSILON);
    }

    #[test]
    fn test_mercator_scale_shrinks_with_latitude() {
        let equator = mercator_meters_per_point(0.0, 10.0);
        let sixty = mercator_meters_per_point(60.0, 10.0);
        assert!((sixty - equator * 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_mutations_need_a_style() {
        let mut widget = SimulatedMapWidget::new(40.0, -74.0, 7.0);
        let dataset = DatasetRef("airports.geojson".into());
        assert!(!widget.style_loaded());
        assert!(widget.add_source("allPins", &dataset).is_err());

        widget.load_style();
        widget.add_source("allPins", &dataset).unwrap();
        assert!(widget.has_source("allPins"));
        assert_eq!(widget.calls().add_source, 1);
    }

    #[test]
    fn test_reload_clears_style() {
        let mut widget = SimulatedMapWidget::new(40.0, -74.0, 7.0);
        widget.load_style();
        widget
            .add_source("ama_club", &DatasetRef("ama_club.geojson".into()))
            .unwrap();
        widget.load_style();
        assert!(!widget.has_source("ama_club"));
        assert!(widget.source_ids().is_empty());
    }

    #[test]
    fn test_zoom_is_clamped_to_minimum() {
        let widget = SimulatedMapWidget::new(40.0, -74.0, 2.0).with_min_zoom(4.0);
        let at_min = mercator_meters_per_point(40.0, 4.0);
        assert!((widget.meters_per_point(40.0) - at_min).abs() < EPSILON);

        widget.set_zoom(1.0);
        assert!((widget.meters_per_point(40.0) - at_min).abs() < EPSILON);

        widget.set_zoom(6.0);
        let at_six = mercator_meters_per_point(40.0, 6.0);
        assert!((widget.meters_per_point(40.0) - at_six).abs() < EPSILON);
    }

    #[test]
    fn test_fixed_scale_overrides_projection() {
        let widget = SimulatedMapWidget::new(40.0, -74.0, 7.0);
        widget.set_fixed_scale(Some(2.0));
        assert_eq!(widget.meters_per_point(10.0), 2.0);
        widget.set_fixed_scale(None);
        assert!(widget.meters_per_point(10.0) > 2.0);
    }
}
