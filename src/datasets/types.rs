//! Dataset identities and loader messages

use bevy::prelude::*;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{
    Arc, Mutex,
    mpsc::{Receiver, Sender},
};

/// Bundled GeoJSON feature collections, addressed by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DatasetName {
    Airports,
    AmaClub,
    Parks,
    UasRestrictions,
}

impl DatasetName {
    pub const ALL: [DatasetName; 4] = [
        DatasetName::Airports,
        DatasetName::AmaClub,
        DatasetName::Parks,
        DatasetName::UasRestrictions,
    ];

    /// File stem of the bundled asset
    pub const fn file_stem(self) -> &'static str {
        match self {
            DatasetName::Airports => "airports",
            DatasetName::AmaClub => "ama_club",
            DatasetName::Parks => "us_uk_canada_parks",
            DatasetName::UasRestrictions => "uas_reduced",
        }
    }

    /// Id the dataset is registered under as a map source.
    /// All five airport categories share one source.
    pub const fn source_id(self) -> &'static str {
        match self {
            DatasetName::Airports => "allPins",
            DatasetName::AmaClub => "ama_club",
            DatasetName::Parks => "usnational_park",
            DatasetName::UasRestrictions => "uas_restriction",
        }
    }
}

/// Loadable reference handed to the map widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRef(pub PathBuf);

/// What the loader learned about one dataset
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub name: DatasetName,
    pub reference: DatasetRef,
    pub feature_count: usize,
    /// Feature counts keyed by the `type` property; untyped features are not counted here
    pub counts_by_type: BTreeMap<String, usize>,
}

/// Commands for the dataset loader worker thread
#[derive(Debug)]
pub enum DatasetCommand {
    LoadAll,
}

/// Results from the dataset loader worker thread
#[derive(Debug)]
pub enum DatasetLoadResult {
    Loaded(DatasetSummary),
    Failed { name: DatasetName, error: String },
    /// Every dataset has been attempted
    Done,
}

/// Resource containing channels for communicating with the loader thread
#[derive(Resource)]
pub struct DatasetChannels {
    pub cmd_tx: Sender<DatasetCommand>,
    pub res_rx: Arc<Mutex<Receiver<DatasetLoadResult>>>,
}
