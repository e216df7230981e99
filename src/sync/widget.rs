//! The map widget as seen by the layer sync controller

use bevy::color::Srgba;
use bevy::prelude::*;

use crate::datasets::DatasetRef;
use crate::error::OverlayError;
use crate::overlay::{FeatureFilter, OverlaySpec, Stroke};

/// Style-mutation surface of a slippy-map widget.
///
/// All `&mut self` calls must happen on the widget's style context; inside
/// the app that is whichever system holds `ResMut<MapWidgetHandle>`.
pub trait MapWidget: Send + Sync {
    fn style_loaded(&self) -> bool;

    fn has_source(&self, id: &str) -> bool;
    fn add_source(&mut self, id: &str, dataset: &DatasetRef) -> Result<(), OverlayError>;

    fn has_layer(&self, id: &str) -> bool;
    fn add_layer(&mut self, layer: LayerDescriptor) -> Result<(), OverlayError>;
    fn set_layer_visible(&mut self, id: &str, visible: bool) -> Result<(), OverlayError>;
    fn set_layer_radius_points(&mut self, id: &str, radius: f64) -> Result<(), OverlayError>;

    fn has_image(&self, name: &str) -> bool;
    fn add_image(&mut self, name: &str, image: &DatasetRef) -> Result<(), OverlayError>;

    fn center_latitude(&self) -> Result<f64, OverlayError>;
    /// Projection scale at `latitude` for the current zoom
    fn meters_per_point(&self, latitude: f64) -> f64;
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayerPaint {
    Circle {
        color: Srgba,
        opacity: f32,
        radius_points: f64,
        stroke: Option<Stroke>,
        filter: Option<FeatureFilter>,
    },
    Fill {
        color: Srgba,
        /// Image name; takes precedence over `color` when set
        pattern: Option<&'static str>,
        opacity: f32,
        outline: Option<Srgba>,
        source_layer: Option<&'static str>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerDescriptor {
    pub id: &'static str,
    pub source_id: &'static str,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub paint: LayerPaint,
}

impl LayerDescriptor {
    /// `pattern` is the fill image actually registered on the style, if any
    pub fn from_spec(spec: &OverlaySpec, radius_points: f64, pattern: Option<&'static str>) -> Self {
        let paint = if spec.is_circle() {
            LayerPaint::Circle {
                color: spec.fill_color,
                opacity: spec.opacity,
                radius_points,
                stroke: spec.stroke,
                filter: spec.filter,
            }
        } else {
            LayerPaint::Fill {
                color: spec.fill_color,
                pattern,
                opacity: spec.opacity,
                outline: spec.stroke.map(|s| s.color),
                source_layer: spec.source_layer,
            }
        };

        Self {
            id: spec.layer_id(),
            source_id: spec.source_id,
            min_zoom: spec.min_zoom,
            max_zoom: spec.max_zoom,
            paint,
        }
    }
}

/// The app's one map widget
#[derive(Resource)]
pub struct MapWidgetHandle(pub Box<dyn MapWidget>);

impl MapWidgetHandle {
    pub fn new(widget: impl MapWidget + 'static) -> Self {
        Self(Box::new(widget))
    }

    pub fn widget_mut(&mut self) -> &mut dyn MapWidget {
        self.0.as_mut()
    }
}
