//! Layer sync controller
//!
//! Reconciles overlay specs against whatever the live map style currently
//! holds. Each layer is either absent or added, and an added layer is
//! either shown or hidden. Hiding is always a visibility toggle, never a
//! removal. A style reload takes every layer back to absent, and the next
//! reconcile treats that exactly like a first load.

use bevy::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

use crate::category::HazardCategory;
use crate::datasets::DatasetResolver;
use crate::error::OverlayError;
use crate::overlay::{OverlayShape, OverlaySpec, project_radius};
use crate::sync::widget::{LayerDescriptor, MapWidget};

/// Mirror of one layer that has been successfully added to the style
#[derive(Debug, Clone, PartialEq)]
pub struct LayerState {
    pub shape: OverlayShape,
    pub visible: bool,
    /// Meter radius the layer was last built or patched from
    pub radius_meters: f64,
    /// Last radius pushed to the widget; `None` until a projection succeeded
    pub last_radius_points: Option<f64>,
}

/// Style mutations performed by one reconcile pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub sources_added: usize,
    pub layers_added: usize,
    pub layers_shown: usize,
    pub layers_hidden: usize,
    pub radii_patched: usize,
    /// Specs left absent this pass (dataset missing, widget refused, ...)
    pub skipped: usize,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Resource, Debug, Default)]
pub struct LayerSyncController {
    layers: BTreeMap<HazardCategory, LayerState>,
}

impl LayerSyncController {
    pub fn layer(&self, category: HazardCategory) -> Option<&LayerState> {
        self.layers.get(&category)
    }

    pub fn layers(&self) -> impl Iterator<Item = (HazardCategory, &LayerState)> {
        self.layers.iter().map(|(c, s)| (*c, s))
    }

    /// Style finished loading (first time or reload)
    pub fn on_style_ready(
        &mut self,
        specs: &[OverlaySpec],
        widget: &mut dyn MapWidget,
        datasets: &dyn DatasetResolver,
    ) -> ReconcileReport {
        self.reconcile(specs, widget, datasets)
    }

    /// Visibility or radius preferences changed, or more datasets became available
    pub fn on_preferences_changed(
        &mut self,
        specs: &[OverlaySpec],
        widget: &mut dyn MapWidget,
        datasets: &dyn DatasetResolver,
    ) -> ReconcileReport {
        self.reconcile(specs, widget, datasets)
    }

    /// Bring the style in line with `specs`, which must be in table order.
    ///
    /// Layers whose category is no longer in `specs` are hidden, not removed.
    pub fn reconcile(
        &mut self,
        specs: &[OverlaySpec],
        widget: &mut dyn MapWidget,
        datasets: &dyn DatasetResolver,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        if !widget.style_loaded() {
            debug!("Style not loaded; deferring overlay reconcile");
            return report;
        }

        // Anything the style no longer has was lost to a reload
        self.layers
            .retain(|category, _| widget.has_layer(category.as_str()));

        let latitude = widget.center_latitude().ok();
        for spec in specs {
            if let Err(err) = self.ensure_layer(spec, widget, datasets, latitude, &mut report) {
                debug!("Overlay {} left absent: {err}", spec.category);
                report.skipped += 1;
            }
        }

        let wanted: BTreeSet<HazardCategory> = specs.iter().map(|s| s.category).collect();
        for (category, state) in self.layers.iter_mut() {
            if wanted.contains(category) || !state.visible {
                continue;
            }
            match widget.set_layer_visible(category.as_str(), false) {
                Ok(()) => {
                    state.visible = false;
                    report.layers_hidden += 1;
                }
                Err(err) => debug!("Hiding {category} failed: {err}"),
            }
        }

        report
    }

    fn ensure_layer(
        &mut self,
        spec: &OverlaySpec,
        widget: &mut dyn MapWidget,
        datasets: &dyn DatasetResolver,
        latitude: Option<f64>,
        report: &mut ReconcileReport,
    ) -> Result<(), OverlayError> {
        if !widget.has_source(spec.source_id) {
            let dataset = datasets.resolve(spec.dataset).ok_or_else(|| {
                OverlayError::MapWidgetPreconditionNotMet(format!(
                    "dataset {} unavailable",
                    spec.dataset.file_stem()
                ))
            })?;
            widget.add_source(spec.source_id, &dataset)?;
            report.sources_added += 1;
        }

        let id = spec.layer_id();
        if widget.has_layer(id) {
            return self.refresh_layer(spec, widget, latitude, report);
        }

        let pattern = match spec.fill_pattern {
            Some(name) => ensure_image(name, widget, datasets).then_some(name),
            None => None,
        };
        // An unprojectable radius starts at zero and is fixed by the next viewport tick
        let radius_points = match (spec.shape, latitude) {
            (OverlayShape::Circle, Some(lat)) => {
                project_radius(spec.radius_meters, lat, |l| widget.meters_per_point(l)).ok()
            }
            _ => None,
        };

        widget.add_layer(LayerDescriptor::from_spec(
            spec,
            radius_points.unwrap_or(0.0),
            pattern,
        ))?;
        self.layers.insert(
            spec.category,
            LayerState {
                shape: spec.shape,
                visible: true,
                radius_meters: spec.radius_meters,
                last_radius_points: radius_points,
            },
        );
        report.layers_added += 1;
        Ok(())
    }

    /// Layer already on the style: make sure it is shown and has the current radius
    fn refresh_layer(
        &mut self,
        spec: &OverlaySpec,
        widget: &mut dyn MapWidget,
        latitude: Option<f64>,
        report: &mut ReconcileReport,
    ) -> Result<(), OverlayError> {
        let id = spec.layer_id();
        let known_visible = self.layers.get(&spec.category).is_some_and(|s| s.visible);
        if !known_visible {
            widget.set_layer_visible(id, true)?;
            report.layers_shown += 1;
        }

        let state = self.layers.entry(spec.category).or_insert(LayerState {
            shape: spec.shape,
            visible: true,
            radius_meters: spec.radius_meters,
            last_radius_points: None,
        });
        state.visible = true;

        if spec.shape == OverlayShape::Circle && state.radius_meters != spec.radius_meters {
            state.radius_meters = spec.radius_meters;
            if let Some(lat) = latitude
                && let Ok(points) =
                    project_radius(spec.radius_meters, lat, |l| widget.meters_per_point(l))
            {
                widget.set_layer_radius_points(id, points)?;
                state.last_radius_points = Some(points);
                report.radii_patched += 1;
            }
        }
        Ok(())
    }

    /// Re-project every added circle layer at the new viewport center.
    ///
    /// Only radius values are touched. Returns the number of layers patched.
    pub fn on_viewport_change(&mut self, widget: &mut dyn MapWidget) -> usize {
        if self.layers.is_empty() {
            return 0;
        }
        let latitude = match widget.center_latitude() {
            Ok(latitude) => latitude,
            Err(err) => {
                debug!("Viewport tick ignored: {err}");
                return 0;
            }
        };
        let scale = widget.meters_per_point(latitude);

        let mut patched = 0;
        for (category, state) in self.layers.iter_mut() {
            if state.shape != OverlayShape::Circle {
                continue;
            }
            let points = match project_radius(state.radius_meters, latitude, |_| scale) {
                Ok(points) => points,
                Err(err) => {
                    // Same scale for every layer; keep prior radii
                    debug!("Viewport tick ignored: {err}");
                    return patched;
                }
            };
            if state.last_radius_points == Some(points) {
                continue;
            }
            match widget.set_layer_radius_points(category.as_str(), points) {
                Ok(()) => {
                    state.last_radius_points = Some(points);
                    patched += 1;
                }
                Err(err) => debug!("Radius patch for {category} failed: {err}"),
            }
        }
        patched
    }
}

/// Register a fill-pattern image if the style lacks it. False when unavailable.
fn ensure_image(name: &str, widget: &mut dyn MapWidget, datasets: &dyn DatasetResolver) -> bool {
    if widget.has_image(name) {
        return true;
    }
    let Some(image) = datasets.resolve_pattern(name) else {
        warn!("Fill pattern {name} not bundled; using plain fill");
        return false;
    };
    match widget.add_image(name, &image) {
        Ok(()) => true,
        Err(err) => {
            debug!("Registering pattern {name} failed: {err}");
            false
        }
    }
}
