//! Dataset index resource and the systems feeding it

use bevy::prelude::*;
use std::collections::BTreeMap;

use crate::datasets::catalog::{DatasetCatalog, DatasetResolver};
use crate::datasets::loader::start_dataset_worker;
use crate::datasets::types::{
    DatasetChannels, DatasetCommand, DatasetLoadResult, DatasetName, DatasetRef, DatasetSummary,
};
use crate::sync::OverlaysInvalidated;

/// Datasets that loaded and parsed; the only ones handed to the map
#[derive(Resource, Debug)]
pub struct DatasetIndex {
    catalog: DatasetCatalog,
    loaded: BTreeMap<DatasetName, DatasetSummary>,
    failed: BTreeMap<DatasetName, String>,
    complete: bool,
}

impl DatasetIndex {
    /// Empty index, to be filled by the loader worker
    pub fn new(catalog: DatasetCatalog) -> Self {
        Self {
            catalog,
            loaded: BTreeMap::new(),
            failed: BTreeMap::new(),
            complete: false,
        }
    }

    pub fn record(&mut self, result: DatasetLoadResult) {
        match result {
            DatasetLoadResult::Loaded(summary) => {
                info!(
                    "[DATASETS] {} loaded: {} features {:?}",
                    summary.name.file_stem(),
                    summary.feature_count,
                    summary.counts_by_type
                );
                self.failed.remove(&summary.name);
                self.loaded.insert(summary.name, summary);
            }
            DatasetLoadResult::Failed { name, error } => {
                warn!("[DATASETS] {} unavailable: {error}", name.file_stem());
                self.loaded.remove(&name);
                self.failed.insert(name, error);
            }
            DatasetLoadResult::Done => self.complete = true,
        }
    }

    pub fn catalog(&self) -> &DatasetCatalog {
        &self.catalog
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn summary(&self, name: DatasetName) -> Option<&DatasetSummary> {
        self.loaded.get(&name)
    }

    pub fn failure(&self, name: DatasetName) -> Option<&str> {
        self.failed.get(&name).map(String::as_str)
    }
}

impl DatasetResolver for DatasetIndex {
    fn resolve(&self, name: DatasetName) -> Option<DatasetRef> {
        self.loaded.get(&name).map(|s| s.reference.clone())
    }

    fn resolve_pattern(&self, pattern: &str) -> Option<DatasetRef> {
        self.catalog.resolve_pattern(pattern)
    }
}

/// Startup system: kick off the loader unless the index was filled up front
pub fn setup_dataset_worker(mut commands: Commands, index: Res<DatasetIndex>) {
    if index.is_complete() {
        return;
    }
    let channels = start_dataset_worker(index.catalog().clone());
    if channels.cmd_tx.send(DatasetCommand::LoadAll).is_err() {
        warn!("[DATASETS] loader exited before accepting work");
        return;
    }
    println!(
        "[INIT] Dataset loader started for {}",
        index.catalog().root().display()
    );
    commands.insert_resource(channels);
}

/// Drain loader results into the index; request a reconcile once all are in
pub fn apply_dataset_results(
    channels: Option<Res<DatasetChannels>>,
    mut index: ResMut<DatasetIndex>,
    mut invalidated: MessageWriter<OverlaysInvalidated>,
) {
    let Some(channels) = channels else { return };
    let Ok(guard) = channels.res_rx.lock() else {
        return;
    };
    while let Ok(msg) = guard.try_recv() {
        let done = matches!(msg, DatasetLoadResult::Done);
        index.record(msg);
        if done {
            invalidated.write(OverlaysInvalidated);
        }
    }
}
