use std::fs;
use std::path::PathBuf;

use log::{debug, warn};

use crate::error::CatalogLoadError;
use crate::model::{CatalogTiers, WordCatalog};

/// Where the engine gets its words. Retrying is the provider's business;
/// the engine only sees the final result.
pub trait WordCatalogProvider {
    fn load(&self) -> Result<WordCatalog, CatalogLoadError>;
}

/// Serves a catalog already in memory.
#[derive(Debug, Clone)]
pub struct StaticCatalogProvider {
    catalog: WordCatalog,
}

impl StaticCatalogProvider {
    pub fn new(catalog: WordCatalog) -> Self {
        Self { catalog }
    }

    pub fn builtin() -> Self {
        Self::new(WordCatalog::builtin())
    }
}

impl WordCatalogProvider for StaticCatalogProvider {
    fn load(&self) -> Result<WordCatalog, CatalogLoadError> {
        if self.catalog.is_empty() {
            return Err(CatalogLoadError::Empty);
        }
        Ok(self.catalog.clone())
    }
}

/// Reads `{"easy": {"animals": ["cat", ...]}, ...}` from disk.
#[derive(Debug, Clone)]
pub struct JsonFileCatalogProvider {
    path: PathBuf,
}

impl JsonFileCatalogProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `HANGWORD_CATALOG`, when set.
    pub fn from_env() -> Option<Self> {
        std::env::var_os("HANGWORD_CATALOG").map(Self::new)
    }
}

impl WordCatalogProvider for JsonFileCatalogProvider {
    fn load(&self) -> Result<WordCatalog, CatalogLoadError> {
        debug!(target: "catalog", "Loading catalog from {}", self.path.display());
        let contents = fs::read_to_string(&self.path)?;
        let tiers: CatalogTiers = serde_json::from_str(&contents)?;
        let catalog = WordCatalog::new(tiers);
        if catalog.is_empty() {
            warn!(target: "catalog", "{} holds no playable words", self.path.display());
            return Err(CatalogLoadError::Empty);
        }
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;
    use std::io::Write;

    #[test]
    fn test_static_provider() {
        let catalog = StaticCatalogProvider::builtin().load().unwrap();
        assert!(catalog.has_playable(Difficulty::Easy));
        assert_eq!(
            StaticCatalogProvider::new(WordCatalog::default()).load().unwrap_err(),
            CatalogLoadError::Empty
        );
    }

    #[test]
    fn test_json_file_provider() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"easy": {{"Birds": ["Owl", "emu", "c4t"]}}}}"#).unwrap();
        let catalog = JsonFileCatalogProvider::new(file.path()).load().unwrap();
        assert_eq!(
            catalog.words(Difficulty::Easy, "birds"),
            Some(&["owl".to_string(), "emu".to_string()][..])
        );
    }

    #[test]
    fn test_json_file_provider_failures() {
        let missing = JsonFileCatalogProvider::new("/nonexistent/hangword/catalog.json");
        assert!(matches!(missing.load(), Err(CatalogLoadError::Io(_))));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2").unwrap();
        let broken = JsonFileCatalogProvider::new(file.path());
        assert!(matches!(broken.load(), Err(CatalogLoadError::Parse(_))));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"hard": {{"science": ["123"]}}}}"#).unwrap();
        let empty = JsonFileCatalogProvider::new(file.path());
        assert_eq!(empty.load().unwrap_err(), CatalogLoadError::Empty);
    }
}
