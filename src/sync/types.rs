//! Map events and the messages they become inside the app

use bevy::prelude::*;
use std::sync::{
    Arc, Mutex,
    mpsc::{self, Receiver, Sender},
};

/// Why the camera moved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportChangeReason {
    /// Moved by the host, not the user
    Programmatic,
    GesturePan,
    GestureZoom,
}

/// Callbacks from the map widget, as pushed by its host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapEvent {
    /// A style finished loading, first time or after a reload
    StyleReady,
    ViewportChanged(ViewportChangeReason),
}

/// Style finished loading; sources and layers must be (re)established
#[derive(Message, Debug, Clone, Copy)]
pub struct StyleReady;

/// Camera moved. At most one per frame; only the latest matters.
#[derive(Message, Debug, Clone, Copy)]
pub struct ViewportChanged {
    pub reason: ViewportChangeReason,
}

/// Something other than a style load changed what should be on the map
/// (dataset loading finished, for instance)
#[derive(Message, Debug, Clone, Copy)]
pub struct OverlaysInvalidated;

/// Channel the widget host pushes `MapEvent`s into from its callbacks
#[derive(Resource)]
pub struct MapEventChannels {
    pub event_tx: Sender<MapEvent>,
    pub event_rx: Arc<Mutex<Receiver<MapEvent>>>,
}

impl MapEventChannels {
    pub fn new() -> Self {
        let (event_tx, event_rx) = mpsc::channel();
        Self {
            event_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    /// Handle for the widget host; cheap to clone into callbacks
    pub fn sender(&self) -> Sender<MapEvent> {
        self.event_tx.clone()
    }
}

impl Default for MapEventChannels {
    fn default() -> Self {
        Self::new()
    }
}
