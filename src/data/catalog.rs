use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// One pre-packaged dataset: a stable file identifier and its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub label: String,
}

impl CatalogEntry {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
        }
    }
}

/// The fixed list of datasets offered in the file picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(vec![
            CatalogEntry::new("codigo_origen_df.xlsx", "Code - Origin"),
            CatalogEntry::new("hospital_year_purchases.xlsx", "Hospital year - Purchases"),
            CatalogEntry::new("year_money.xlsx", "Year - Money"),
            CatalogEntry::new("year_purchases.xlsx", "Year - Purchase"),
            CatalogEntry::new("year_tipo_average.xlsx", "Year - Average type"),
            CatalogEntry::new("year_tipo.xlsx", "Year - Type"),
        ])
    }
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Entries whose label or identifier contains `query`, ignoring case.
    /// An empty query matches everything.
    pub fn search<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a CatalogEntry> + 'a {
        let needle = query.trim().to_lowercase();
        self.entries.iter().filter(move |e| {
            needle.is_empty()
                || e.label.to_lowercase().contains(&needle)
                || e.id.to_lowercase().contains(&needle)
        })
    }

    /// Retrieval path for an identifier: `<root>/<id>`.
    ///
    /// Only a single plain file name is accepted.
    pub fn resolve(root: &Path, id: &str) -> Result<PathBuf, LoadError> {
        let mut components = Path::new(id).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => Ok(root.join(name)),
            _ => Err(LoadError::InvalidIdentifier(id.to_string())),
        }
    }
}
