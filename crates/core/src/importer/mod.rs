//! Catalog import from a local checkout of the pokemon-tcg-data layout:
//!
//! ```text
//! <data_dir>/sets/<lang>.json
//! <data_dir>/cards/<lang>/<set id>.json
//! ```
//!
//! Sets already present (same code) and cards already present (same set and
//! number) are skipped, so an import can be re-run safely.

mod source;

pub use source::{infer_era, language_name, SourceCard, SourceSet};

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::{CatalogError, CatalogStore};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Data directory not found: {0}")]
    DataDirNotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub sets_imported: u32,
    pub sets_skipped: u32,
    pub cards_imported: u32,
    pub cards_skipped: u32,
    /// Set ids whose card file was absent.
    pub missing_card_files: Vec<String>,
}

impl ImportReport {
    fn merge(&mut self, other: ImportReport) {
        self.sets_imported += other.sets_imported;
        self.sets_skipped += other.sets_skipped;
        self.cards_imported += other.cards_imported;
        self.cards_skipped += other.cards_skipped;
        self.missing_card_files.extend(other.missing_card_files);
    }
}

pub struct CatalogImporter {
    catalog: Arc<dyn CatalogStore>,
    data_dir: PathBuf,
}

impl CatalogImporter {
    pub fn new(catalog: Arc<dyn CatalogStore>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            catalog,
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Import every language in turn. Blocking; run it off the async runtime.
    pub fn import_languages(&self, languages: &[String]) -> Result<ImportReport, ImportError> {
        if !self.data_dir.is_dir() {
            return Err(ImportError::DataDirNotFound(self.data_dir.clone()));
        }

        let mut report = ImportReport::default();
        for language in languages {
            report.merge(self.import_language(language)?);
        }
        info!(
            sets_imported = report.sets_imported,
            sets_skipped = report.sets_skipped,
            cards_imported = report.cards_imported,
            cards_skipped = report.cards_skipped,
            missing_card_files = report.missing_card_files.len(),
            "Catalog import finished"
        );
        Ok(report)
    }

    pub fn import_language(&self, language: &str) -> Result<ImportReport, ImportError> {
        let sets_path = self.data_dir.join("sets").join(format!("{language}.json"));
        let sets: Vec<SourceSet> = read_json(&sets_path)?;
        info!(language, sets = sets.len(), "Importing catalog");

        let mut report = ImportReport::default();
        for source_set in &sets {
            let (set_id, created) = self.catalog.insert_set(source_set.to_new_set(language))?;
            if created {
                report.sets_imported += 1;
            } else {
                debug!(code = source_set.code(), "Set already present");
                report.sets_skipped += 1;
            }

            let cards_path = self
                .data_dir
                .join("cards")
                .join(language)
                .join(format!("{}.json", source_set.id));
            if !cards_path.exists() {
                warn!(set = %source_set.id, path = %cards_path.display(), "Card file missing");
                report.missing_card_files.push(source_set.id.clone());
                continue;
            }

            let cards: Vec<SourceCard> = read_json(&cards_path)?;
            for card in &cards {
                if self.catalog.insert_card(card.to_new_card(set_id))? {
                    report.cards_imported += 1;
                } else {
                    report.cards_skipped += 1;
                }
            }
            debug!(set = %source_set.id, cards = cards.len(), "Set cards processed");
        }
        Ok(report)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ImportError> {
    let file = File::open(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ImportError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SqliteCatalog;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, relative: &str, contents: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn data_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "sets/en.json",
            r#"[
                {"id": "base1", "name": "Base", "series": "Base", "ptcgoCode": "BS", "total": 102, "releaseDate": "1999/01/09"},
                {"id": "base2", "name": "Jungle", "series": "Base", "ptcgoCode": "JU", "total": 64, "releaseDate": "1999/06/16"}
            ]"#,
        );
        write(
            dir.path(),
            "cards/en/base1.json",
            r#"[
                {"id": "base1-1", "name": "Alakazam", "number": "1", "rarity": "Rare Holo", "types": ["Psychic"]},
                {"id": "base1-58", "name": "Pikachu", "number": "58", "rarity": "Common", "types": ["Lightning"]},
                {"id": "base1-91", "name": "Bill", "number": "91", "supertype": "Trainer"}
            ]"#,
        );
        dir
    }

    #[test]
    fn test_import_and_rerun() {
        let dir = data_dir();
        let catalog = Arc::new(SqliteCatalog::in_memory().unwrap());
        let importer = CatalogImporter::new(catalog.clone(), dir.path());

        let report = importer.import_languages(&["en".to_string()]).unwrap();
        assert_eq!(report.sets_imported, 2);
        assert_eq!(report.cards_imported, 3);
        assert_eq!(report.missing_card_files, vec!["base2".to_string()]);

        let sets = catalog.list_sets().unwrap();
        let base = sets.iter().find(|s| s.code == "BS").unwrap();
        assert_eq!(base.language, "English");
        assert_eq!(base.total_cards, Some(102));

        let cards = catalog.cards_in_set(base.id).unwrap();
        let bill = cards.iter().find(|c| c.name == "Bill").unwrap();
        assert_eq!(bill.rarity, "Common");
        assert_eq!(bill.card_type.as_deref(), Some("Trainer"));

        let again = importer.import_languages(&["en".to_string()]).unwrap();
        assert_eq!(again.sets_imported, 0);
        assert_eq!(again.sets_skipped, 2);
        assert_eq!(again.cards_imported, 0);
        assert_eq!(again.cards_skipped, 3);
        assert_eq!(catalog.stats().unwrap().cards, 3);
    }

    #[test]
    fn test_missing_directory_and_index() {
        let catalog = Arc::new(SqliteCatalog::in_memory().unwrap());
        let missing = CatalogImporter::new(catalog.clone(), "/nonexistent/binder-data");
        assert!(matches!(
            missing.import_languages(&["en".to_string()]),
            Err(ImportError::DataDirNotFound(_))
        ));

        let dir = data_dir();
        let importer = CatalogImporter::new(catalog, dir.path());
        assert!(matches!(
            importer.import_language("ja"),
            Err(ImportError::Io { .. })
        ));
    }

    #[test]
    fn test_malformed_file_is_reported() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "sets/en.json", "{ not json");
        let importer = CatalogImporter::new(Arc::new(SqliteCatalog::in_memory().unwrap()), dir.path());
        assert!(matches!(
            importer.import_language("en"),
            Err(ImportError::Parse { .. })
        ));
    }
}
