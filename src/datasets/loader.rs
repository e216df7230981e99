//! Dataset loader worker
//!
//! Reads the bundled GeoJSON off the main thread and reports a per-category
//! feature census. Nothing here touches the map style.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, mpsc};
use std::thread;

use crate::datasets::catalog::DatasetCatalog;
use crate::datasets::types::{
    DatasetChannels, DatasetCommand, DatasetLoadResult, DatasetName, DatasetRef, DatasetSummary,
};

#[derive(Deserialize)]
struct FeatureCollection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

/// Count features in a GeoJSON FeatureCollection, bucketed by `properties.type`
pub fn summarize_feature_collection(body: &str) -> Result<(usize, BTreeMap<String, usize>)> {
    let collection: FeatureCollection =
        serde_json::from_str(body).context("not a GeoJSON document")?;
    if collection.kind != "FeatureCollection" {
        anyhow::bail!("expected FeatureCollection, found {}", collection.kind);
    }

    let mut counts = BTreeMap::new();
    for feature in &collection.features {
        let kind = feature
            .properties
            .as_ref()
            .and_then(|p| p.get("type"))
            .and_then(Value::as_str);
        if let Some(kind) = kind {
            *counts.entry(kind.to_string()).or_insert(0) += 1;
        }
    }
    Ok((collection.features.len(), counts))
}

async fn load_dataset(catalog: &DatasetCatalog, name: DatasetName) -> Result<DatasetSummary> {
    let path = catalog.path_for(name);
    let body = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let (feature_count, counts_by_type) = summarize_feature_collection(&body)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(DatasetSummary {
        name,
        reference: DatasetRef(path),
        feature_count,
        counts_by_type,
    })
}

/// Start the background dataset loader thread
pub fn start_dataset_worker(catalog: DatasetCatalog) -> DatasetChannels {
    let (cmd_tx, cmd_rx) = mpsc::channel::<DatasetCommand>();
    let (res_tx, res_rx) = mpsc::channel::<DatasetLoadResult>();

    thread::spawn(move || {
        let rt = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(err) => {
                eprintln!("[DATASETS] failed to start runtime: {err}");
                return;
            }
        };
        let catalog = Arc::new(catalog);

        rt.block_on(async move {
            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    DatasetCommand::LoadAll => {
                        let mut tasks = tokio::task::JoinSet::new();
                        for name in DatasetName::ALL {
                            let catalog = catalog.clone();
                            tasks.spawn(async move {
                                match load_dataset(&catalog, name).await {
                                    Ok(summary) => DatasetLoadResult::Loaded(summary),
                                    Err(err) => DatasetLoadResult::Failed {
                                        name,
                                        error: format!("{err:#}"),
                                    },
                                }
                            });
                        }

                        while let Some(joined) = tasks.join_next().await {
                            match joined {
                                Ok(msg) => {
                                    let _ = res_tx.send(msg);
                                }
                                Err(err) => eprintln!("[DATASETS] load task aborted: {err}"),
                            }
                        }
                        let _ = res_tx.send(DatasetLoadResult::Done);
                    }
                }
            }
        });
    });

    DatasetChannels {
        cmd_tx,
        res_rx: Arc::new(Mutex::new(res_rx)),
    }
}
