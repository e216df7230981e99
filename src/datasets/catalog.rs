//! Resolving dataset names to files on disk

use std::path::{Path, PathBuf};

use crate::datasets::types::{DatasetName, DatasetRef};

/// Resolves named datasets (and fill-pattern images) to loadable references
pub trait DatasetResolver {
    fn resolve(&self, name: DatasetName) -> Option<DatasetRef>;
    fn resolve_pattern(&self, pattern: &str) -> Option<DatasetRef>;
}

/// Bundled assets laid out flat in one directory:
/// `<root>/<stem>.geojson` and `<root>/<pattern>.png`
#[derive(Debug, Clone)]
pub struct DatasetCatalog {
    root: PathBuf,
}

impl DatasetCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, name: DatasetName) -> PathBuf {
        self.root.join(format!("{}.geojson", name.file_stem()))
    }

    pub fn pattern_path(&self, pattern: &str) -> PathBuf {
        self.root.join(format!("{pattern}.png"))
    }
}

impl DatasetResolver for DatasetCatalog {
    fn resolve(&self, name: DatasetName) -> Option<DatasetRef> {
        let path = self.path_for(name);
        path.is_file().then_some(DatasetRef(path))
    }

    fn resolve_pattern(&self, pattern: &str) -> Option<DatasetRef> {
        let path = self.pattern_path(pattern);
        path.is_file().then_some(DatasetRef(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::store::unique_temp_dir;
    use std::fs;

    #[test]
    fn test_resolves_only_existing_files() {
        let dir = unique_temp_dir("catalog");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("airports.geojson"), "{}").unwrap();
        fs::write(dir.join("stripe-pattern.png"), [0u8; 4]).unwrap();

        let catalog = DatasetCatalog::new(&dir);
        assert_eq!(
            catalog.resolve(DatasetName::Airports),
            Some(DatasetRef(dir.join("airports.geojson")))
        );
        assert_eq!(catalog.resolve(DatasetName::Parks), None);
        assert!(catalog.resolve_pattern("stripe-pattern").is_some());
        assert!(catalog.resolve_pattern("dots").is_none());
    }

    #[test]
    fn test_file_names_follow_dataset_stems() {
        let catalog = DatasetCatalog::new("/data");
        assert_eq!(
            catalog.path_for(DatasetName::Parks),
            PathBuf::from("/data/us_uk_canada_parks.geojson")
        );
        assert_eq!(
            catalog.path_for(DatasetName::UasRestrictions),
            PathBuf::from("/data/uas_reduced.geojson")
        );
    }
}
