use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::data::catalog::Catalog;

/// Directory the catalog identifiers are resolved against.
pub const DEFAULT_DATASETS_DIR: &str = "datasets";

/// Optional catalog override inside the datasets directory.
pub const CATALOG_FILE: &str = "catalog.json";

/// Rows shown in the data preview panel.
pub const DEFAULT_PREVIEW_ROWS: usize = 200;

/// Startup configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub datasets_dir: PathBuf,
    pub preview_rows: usize,
    pub catalog: Catalog,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            datasets_dir: PathBuf::from(DEFAULT_DATASETS_DIR),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            catalog: Catalog::default(),
        }
    }
}

impl AppConfig {
    /// Build the config for `datasets_dir`, picking up `catalog.json` if present.
    ///
    /// A missing catalog file is normal; a malformed one is logged and the
    /// built-in catalog is used instead.
    pub fn load(datasets_dir: &Path) -> Self {
        let mut config = Self {
            datasets_dir: datasets_dir.to_path_buf(),
            ..Self::default()
        };

        let catalog_path = datasets_dir.join(CATALOG_FILE);
        if catalog_path.is_file() {
            match read_catalog(&catalog_path) {
                Ok(catalog) => {
                    log::info!(
                        "Using {} catalog entries from {}",
                        catalog.entries().len(),
                        catalog_path.display()
                    );
                    config.catalog = catalog;
                }
                Err(e) => log::error!("Ignoring catalog file: {e:#}"),
            }
        }

        config
    }
}

fn read_catalog(path: &Path) -> Result<Catalog> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}
