//! Overlay sync systems
//!
//! Runs as one chain every frame: ingest widget and loader events, compute
//! the overlay plan, then apply it and any viewport tick to the style.
//! Only the apply systems take `ResMut<MapWidgetHandle>`, so style
//! mutations never interleave.

use bevy::prelude::*;

use crate::datasets::DatasetIndex;
use crate::overlay::{OverlayEngine, OverlaySpec};
use crate::sync::controller::LayerSyncController;
use crate::sync::types::{
    MapEvent, MapEventChannels, OverlaysInvalidated, StyleReady, ViewportChanged,
};
use crate::sync::widget::MapWidgetHandle;

/// Output of the compute phase, waiting for the apply phase
#[derive(Resource, Default)]
pub struct OverlayPlan {
    pub pending: Option<Vec<OverlaySpec>>,
}

/// Forward widget callbacks as messages, keeping only the latest viewport change
pub fn drain_map_events(
    channels: Option<Res<MapEventChannels>>,
    mut style_ready: MessageWriter<StyleReady>,
    mut viewport: MessageWriter<ViewportChanged>,
) {
    let Some(channels) = channels else { return };
    let Ok(guard) = channels.event_rx.lock() else {
        return;
    };

    let mut latest_reason = None;
    while let Ok(event) = guard.try_recv() {
        match event {
            MapEvent::StyleReady => {
                style_ready.write(StyleReady);
            }
            MapEvent::ViewportChanged(reason) => latest_reason = Some(reason),
        }
    }
    if let Some(reason) = latest_reason {
        viewport.write(ViewportChanged { reason });
    }
}

/// Compute phase: rebuild specs on style load, invalidation, or preference edits
pub fn plan_overlays(
    mut style_ready: MessageReader<StyleReady>,
    mut invalidated: MessageReader<OverlaysInvalidated>,
    engine: Res<OverlayEngine>,
    mut plan: ResMut<OverlayPlan>,
) {
    let style_loaded = style_ready.read().count() > 0;
    let invalidated = invalidated.read().count() > 0;
    if !style_loaded && !invalidated && !engine.is_changed() {
        return;
    }
    plan.pending = Some(engine.build_overlay_specs());
}

/// Apply phase: reconcile the style against the latest plan
pub fn apply_overlay_plan(
    mut plan: ResMut<OverlayPlan>,
    mut controller: ResMut<LayerSyncController>,
    widget: Option<ResMut<MapWidgetHandle>>,
    datasets: Res<DatasetIndex>,
) {
    let Some(specs) = plan.pending.take() else {
        return;
    };
    let Some(mut widget) = widget else {
        debug!("No map widget; dropping overlay plan");
        return;
    };

    let report = controller.reconcile(&specs, widget.widget_mut(), &*datasets);
    if !report.is_noop() {
        info!(
            "[OVERLAYS] sources+{} layers+{} shown {} hidden {} radii {} skipped {}",
            report.sources_added,
            report.layers_added,
            report.layers_shown,
            report.layers_hidden,
            report.radii_patched,
            report.skipped
        );
    }
}

/// Apply phase: re-project circle radii for the newest viewport
pub fn apply_viewport_changes(
    mut viewport: MessageReader<ViewportChanged>,
    mut controller: ResMut<LayerSyncController>,
    widget: Option<ResMut<MapWidgetHandle>>,
) {
    let Some(latest) = viewport.read().last().copied() else {
        return;
    };
    let Some(mut widget) = widget else { return };

    let patched = controller.on_viewport_change(widget.widget_mut());
    if patched > 0 {
        debug!("Viewport {:?}: patched {patched} radii", latest.reason);
    }
}
