//! Preference persistence
//!
//! A string-keyed store of numbers and string→bool maps. The overlay
//! configs only ever talk to the `PreferenceStore` trait; the app picks the
//! backend (JSON file on disk, or memory for tests and headless runs).

use bevy::log::warn;
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::OverlayError;

pub type BoolMap = BTreeMap<String, bool>;

/// Typed get/set over a key-value persistence backend
pub trait PreferenceStore: Send + Sync {
    fn get_number(&self, key: &str) -> Result<Option<f64>, OverlayError>;
    fn set_number(&self, key: &str, value: f64) -> Result<(), OverlayError>;
    fn get_bool_map(&self, key: &str) -> Result<Option<BoolMap>, OverlayError>;
    fn set_bool_map(&self, key: &str, value: &BoolMap) -> Result<(), OverlayError>;
}

/// Everything the store holds, as serialized to disk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreferenceDocument {
    #[serde(default)]
    pub numbers: BTreeMap<String, f64>,
    #[serde(default)]
    pub bool_maps: BTreeMap<String, BoolMap>,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

fn unavailable(reason: impl ToString) -> OverlayError {
    OverlayError::PreferencePersistenceUnavailable(reason.to_string())
}

// ================================ Memory store ================================

/// Process-local store. Counts writes so callers can check idempotence.
#[derive(Default)]
pub struct MemoryPreferenceStore {
    doc: Mutex<PreferenceDocument>,
    writes: AtomicUsize,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `set_*` calls since construction
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> PreferenceDocument {
        self.doc.lock().map(|d| d.clone()).unwrap_or_default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get_number(&self, key: &str) -> Result<Option<f64>, OverlayError> {
        let doc = self.doc.lock().map_err(unavailable)?;
        Ok(doc.numbers.get(key).copied())
    }

    fn set_number(&self, key: &str, value: f64) -> Result<(), OverlayError> {
        let mut doc = self.doc.lock().map_err(unavailable)?;
        doc.numbers.insert(key.to_string(), value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn get_bool_map(&self, key: &str) -> Result<Option<BoolMap>, OverlayError> {
        let doc = self.doc.lock().map_err(unavailable)?;
        Ok(doc.bool_maps.get(key).cloned())
    }

    fn set_bool_map(&self, key: &str, value: &BoolMap) -> Result<(), OverlayError> {
        let mut doc = self.doc.lock().map_err(unavailable)?;
        doc.bool_maps.insert(key.to_string(), value.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ================================= File store =================================

/// JSON document on disk, rewritten on every `set_*`
///
/// Resolves the platform config directory:
/// - macOS: ~/Library/Application Support/nfzmap/
/// - Linux: ~/.config/nfzmap/
/// - Windows: %APPDATA%\nfzmap\config\
pub struct JsonFilePreferenceStore {
    path: PathBuf,
    // Serializes read-modify-write cycles
    lock: Mutex<()>,
}

impl JsonFilePreferenceStore {
    pub const FILE_NAME: &'static str = "preferences.json";

    pub fn open() -> Result<Self, anyhow::Error> {
        let proj_dirs = ProjectDirs::from("", "", "nfzmap")
            .ok_or_else(|| anyhow::anyhow!("Failed to resolve config directory"))?;
        Self::open_in_dir(proj_dirs.config_dir().to_path_buf())
    }

    /// Store rooted at a specific directory (tests, portable installs)
    pub fn open_in_dir(dir: PathBuf) -> Result<Self, anyhow::Error> {
        fs::create_dir_all(&dir)?;
        Ok(Self {
            path: dir.join(Self::FILE_NAME),
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<String>, OverlayError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(unavailable(err)),
        }
    }

    fn load(&self) -> Result<PreferenceDocument, OverlayError> {
        match self.read()? {
            Some(contents) => serde_json::from_str(&contents).map_err(unavailable),
            None => Ok(PreferenceDocument::default()),
        }
    }

    /// Write to a sibling temp file, then rename over the real one
    fn save(&self, mut doc: PreferenceDocument) -> Result<(), OverlayError> {
        doc.saved_at = Some(Utc::now());
        let contents = serde_json::to_string_pretty(&doc).map_err(unavailable)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents).map_err(unavailable)?;
        fs::rename(&tmp, &self.path).map_err(unavailable)
    }

    /// Read-modify-write. A document that no longer parses is replaced.
    fn update(&self, apply: impl FnOnce(&mut PreferenceDocument)) -> Result<(), OverlayError> {
        let _guard = self.lock.lock().map_err(unavailable)?;
        let mut doc = match self.read()? {
            Some(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!(
                    "Replacing corrupt preferences file {}: {err}",
                    self.path.display()
                );
                PreferenceDocument::default()
            }),
            None => PreferenceDocument::default(),
        };
        apply(&mut doc);
        self.save(doc)
    }
}

impl PreferenceStore for JsonFilePreferenceStore {
    fn get_number(&self, key: &str) -> Result<Option<f64>, OverlayError> {
        let _guard = self.lock.lock().map_err(unavailable)?;
        Ok(self.load()?.numbers.get(key).copied())
    }

    fn set_number(&self, key: &str, value: f64) -> Result<(), OverlayError> {
        self.update(|doc| {
            doc.numbers.insert(key.to_string(), value);
        })
    }

    fn get_bool_map(&self, key: &str) -> Result<Option<BoolMap>, OverlayError> {
        let _guard = self.lock.lock().map_err(unavailable)?;
        Ok(self.load()?.bool_maps.remove(key))
    }

    fn set_bool_map(&self, key: &str, value: &BoolMap) -> Result<(), OverlayError> {
        self.update(|doc| {
            doc.bool_maps.insert(key.to_string(), value.clone());
        })
    }
}

/// Store whose backend is gone; every call fails
#[cfg(test)]
pub(crate) struct UnavailableStore;

#[cfg(test)]
impl PreferenceStore for UnavailableStore {
    fn get_number(&self, _key: &str) -> Result<Option<f64>, OverlayError> {
        Err(unavailable("backend offline"))
    }

    fn set_number(&self, _key: &str, _value: f64) -> Result<(), OverlayError> {
        Err(unavailable("backend offline"))
    }

    fn get_bool_map(&self, _key: &str) -> Result<Option<BoolMap>, OverlayError> {
        Err(unavailable("backend offline"))
    }

    fn set_bool_map(&self, _key: &str, _value: &BoolMap) -> Result<(), OverlayError> {
        Err(unavailable("backend offline"))
    }
}

#[cfg(test)]
pub(crate) fn unique_temp_dir(test_name: &str) -> PathBuf {
    use std::time::{SystemTime, UNIX_EPOCH};

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "nfzmap-{}-{}-{}",
        test_name,
        std::process::id(),
        nanos
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::HazardCategory;
    use crate::preferences::radius::{RadiusConfig, radius_key};
    use crate::preferences::visibility::{
        LEGACY_FLYING_SITES_KEY, VISIBILITY_KEY, VisibilityConfig,
    };
    use std::sync::Arc;

    #[test]
    fn test_memory_store_counts_writes() {
        let store = MemoryPreferenceStore::new();
        assert_eq!(store.get_number("LargeCircleRadius").unwrap(), None);

        store.set_number("LargeCircleRadius", 16093.4).unwrap();
        store
            .set_bool_map("Show_NFZ", &BoolMap::from([("tfr".to_string(), true)]))
            .unwrap();

        assert_eq!(store.writes(), 2);
        assert_eq!(store.get_number("LargeCircleRadius").unwrap(), Some(16093.4));
        assert_eq!(
            store.get_bool_map("Show_NFZ").unwrap().unwrap().get("tfr"),
            Some(&true)
        );
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = unique_temp_dir("prefs-persist");
        let store = JsonFilePreferenceStore::open_in_dir(dir.clone()).expect("open store");
        store.set_number("AMACircleRadius", 800.0).unwrap();
        store
            .set_bool_map(
                "Show_NFZ",
                &BoolMap::from([
                    ("heliport".to_string(), false),
                    ("flying_sites_260".to_string(), true),
                ]),
            )
            .unwrap();

        // Simulate app restart
        let reopened = JsonFilePreferenceStore::open_in_dir(dir).expect("reopen store");
        assert_eq!(reopened.get_number("AMACircleRadius").unwrap(), Some(800.0));
        let map = reopened.get_bool_map("Show_NFZ").unwrap().unwrap();
        assert_eq!(map.get("heliport"), Some(&false));
        assert_eq!(map.get("flying_sites_260"), Some(&true));
    }

    #[test]
    fn test_file_store_missing_file_reads_as_absent() {
        let dir = unique_temp_dir("prefs-missing");
        let store = JsonFilePreferenceStore::open_in_dir(dir).expect("open store");
        assert_eq!(store.get_number("SmallCircleRadius").unwrap(), None);
        assert_eq!(store.get_bool_map("Show_NFZ").unwrap(), None);
    }

    #[test]
    fn test_file_store_corrupt_file_is_unavailable() {
        let dir = unique_temp_dir("prefs-corrupt");
        let store = JsonFilePreferenceStore::open_in_dir(dir).expect("open store");
        fs::write(store.path(), "{ not json").unwrap();

        let err = store.get_number("LargeCircleRadius").unwrap_err();
        assert!(matches!(err, OverlayError::PreferencePersistenceUnavailable(_)));
    }

    #[test]
    fn test_file_store_write_replaces_corrupt_file() {
        let dir = unique_temp_dir("prefs-overwrite");
        let store = JsonFilePreferenceStore::open_in_dir(dir).expect("open store");
        fs::write(store.path(), "{ truncated").unwrap();

        store.set_number("MediumCircleRadius", 8064.0).unwrap();
        assert_eq!(store.get_number("MediumCircleRadius").unwrap(), Some(8064.0));
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_hydration_repairs_corrupt_file() {
        let dir = unique_temp_dir("prefs-repair");
        let store =
            Arc::new(JsonFilePreferenceStore::open_in_dir(dir.clone()).expect("open store"));
        fs::write(store.path(), "{ truncated").unwrap();

        let mut radius = RadiusConfig::hydrate(store.clone());
        VisibilityConfig::hydrate(store.clone());
        radius.set(HazardCategory::LargeAirport, 1000.0).unwrap();

        // Simulate app restart
        let reopened = JsonFilePreferenceStore::open_in_dir(dir).expect("reopen store");
        let keys: Vec<&str> = HazardCategory::ALL
            .iter()
            .filter_map(|c| radius_key(*c))
            .collect();
        assert_eq!(keys.len(), 6);
        for key in keys {
            assert!(reopened.get_number(key).unwrap().is_some(), "{key} missing");
        }
        assert_eq!(reopened.get_number("LargeCircleRadius").unwrap(), Some(1000.0));
        assert_eq!(reopened.get_bool_map(VISIBILITY_KEY).unwrap().unwrap().len(), 9);
    }

    #[test]
    fn test_configs_survive_restart_through_file_store() {
        let dir = unique_temp_dir("prefs-restart");
        let store =
            Arc::new(JsonFilePreferenceStore::open_in_dir(dir.clone()).expect("open store"));
        let mut radius = RadiusConfig::hydrate(store.clone());
        let mut visibility = VisibilityConfig::hydrate(store);
        radius.set(HazardCategory::AmaClub, 1200.0).unwrap();
        visibility.set_visible(HazardCategory::Heliport, false).unwrap();

        let reopened = Arc::new(JsonFilePreferenceStore::open_in_dir(dir).expect("reopen store"));
        let radius = RadiusConfig::hydrate(reopened.clone());
        let visibility = VisibilityConfig::hydrate(reopened.clone());

        assert_eq!(radius.get(HazardCategory::AmaClub).unwrap(), 1200.0);
        assert_eq!(radius.get(HazardCategory::LargeAirport).unwrap(), 16093.4);
        assert!(!visibility.is_visible(HazardCategory::Heliport));
        assert!(visibility.is_visible(HazardCategory::Tfr));
        let persisted = reopened.get_bool_map(VISIBILITY_KEY).unwrap().unwrap();
        assert_eq!(persisted.get(LEGACY_FLYING_SITES_KEY), Some(&true));
    }

    #[test]
    fn test_file_store_stamps_save_time() {
        let dir = unique_temp_dir("prefs-stamp");
        let store = JsonFilePreferenceStore::open_in_dir(dir).expect("open store");
        store.set_number("HeliCircleRadius", 2414.0).unwrap();

        let contents = fs::read_to_string(store.path()).unwrap();
        let doc: PreferenceDocument = serde_json::from_str(&contents).unwrap();
        assert!(doc.saved_at.is_some());
    }
}
