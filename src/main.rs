// Headless driver: runs the overlay plugin against a simulated map widget.

use bevy::app::{AppExit, ScheduleRunnerPlugin};
use bevy::log::LogPlugin;
use bevy::prelude::*;
use std::sync::Arc;
use std::time::Duration;

use nfzmap::sync::{LayerSyncController, SimulatedMapWidget, ViewportChangeReason};
use nfzmap::{
    JsonFilePreferenceStore, MapEvent, MapEventChannels, MapWidgetHandle, MemoryPreferenceStore,
    NfzConfig, NoFlyZonePlugin, PreferenceStore,
};

const FRAME_RATE: f64 = 30.0;

/// Host side of the simulated map
#[derive(Resource)]
struct DemoMap {
    widget: SimulatedMapWidget,
    frame: u32,
}

fn open_store(config: &NfzConfig) -> Arc<dyn PreferenceStore> {
    let opened = match &config.preferences_dir {
        Some(dir) => JsonFilePreferenceStore::open_in_dir(dir.clone()),
        None => JsonFilePreferenceStore::open(),
    };
    match opened {
        Ok(store) => {
            println!("[INIT] Preferences at {}", store.path().display());
            Arc::new(store)
        }
        Err(err) => {
            eprintln!("[INIT] Preferences unavailable ({err:#}), using in-memory defaults");
            Arc::new(MemoryPreferenceStore::new())
        }
    }
}

fn send(channels: &MapEventChannels, event: MapEvent) {
    if channels.sender().send(event).is_err() {
        warn!("Map event channel closed");
    }
}

// Scripted session: load the style, zoom in, pan across the country, report.
fn drive_demo(
    mut demo: ResMut<DemoMap>,
    channels: Res<MapEventChannels>,
    controller: Res<LayerSyncController>,
    mut exit: MessageWriter<AppExit>,
) {
    demo.frame += 1;
    match demo.frame {
        1 => {
            demo.widget.load_style();
            send(&channels, MapEvent::StyleReady);
        }
        30 => {
            demo.widget.set_zoom(10.0);
            send(
                &channels,
                MapEvent::ViewportChanged(ViewportChangeReason::GestureZoom),
            );
        }
        60 => {
            // Jump to Los Angeles, then nudge east
            demo.widget.pan_to(34.0522, -118.2437);
            send(
                &channels,
                MapEvent::ViewportChanged(ViewportChangeReason::Programmatic),
            );
        }
        61 => {
            demo.widget.pan_to(34.0522, -118.1);
            send(
                &channels,
                MapEvent::ViewportChanged(ViewportChangeReason::GesturePan),
            );
        }
        90 => {
            for (category, state) in controller.layers() {
                info!(
                    "{category}: visible={} radius={:.0} m -> {:?} pt",
                    state.visible, state.radius_meters, state.last_radius_points
                );
            }
            info!(
                "Style layers at {:?}: {:?}",
                demo.widget.center(),
                demo.widget.layer_ids()
            );
            exit.write(AppExit::Success);
        }
        _ => {}
    }
}

fn main() {
    let config = NfzConfig::default();
    let store = open_store(&config);
    let widget = SimulatedMapWidget::new(
        config.center_latitude,
        config.center_longitude,
        config.initial_zoom(),
    )
    .with_min_zoom(config.min_zoom);

    App::new()
        .add_plugins((
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / FRAME_RATE,
            ))),
            LogPlugin::default(),
        ))
        .insert_resource(config)
        .insert_resource(MapWidgetHandle::new(widget.clone()))
        .insert_resource(DemoMap { widget, frame: 0 })
        .add_plugins(NoFlyZonePlugin { store })
        .add_systems(Update, drive_demo)
        .run();
}
