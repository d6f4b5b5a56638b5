use std::path::PathBuf;

use crate::color::ColorMap;
use crate::config::AppConfig;
use crate::data::catalog::CatalogEntry;
use crate::data::fetch::{Fetcher, LoadOutcome};
use crate::data::model::{CellValue, Table};
use crate::data::reshape::{
    AxisSelection, DrawMode, GroupingState, Series, build_series, group_candidate,
};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    /// Text typed into the catalog search box.
    pub catalog_query: String,

    /// Catalog entry picked in the file selector.
    pub selected_entry: Option<CatalogEntry>,

    /// Background loads.
    pub fetcher: Fetcher,

    /// Loaded table (None until the first successful load).
    pub table: Option<Table>,

    /// Where `table` came from.
    pub source: Option<PathBuf>,

    /// Column bindings for X, Y and grouping.
    pub axes: AxisSelection,

    /// Grouping toggle, group value and draw mode.
    pub grouping: GroupingState,

    /// Series derived from the table and selections (cached).
    pub series: Vec<Series>,

    /// Colours per group value.
    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self::with_fetcher(config, Fetcher::default())
    }

    pub fn with_fetcher(config: AppConfig, fetcher: Fetcher) -> Self {
        Self {
            config,
            catalog_query: String::new(),
            selected_entry: None,
            fetcher,
            table: None,
            source: None,
            axes: AxisSelection::default(),
            grouping: GroupingState::default(),
            series: Vec::new(),
            color_map: None,
            status_message: None,
        }
    }

    /// Whether a load for the latest request is in flight.
    pub fn loading(&self) -> bool {
        self.fetcher.is_loading()
    }

    // -- Loading --

    /// "Load Data": start loading the selected catalog entry.
    pub fn load_selected(&mut self) {
        match self
            .fetcher
            .request(&self.config.datasets_dir, self.selected_entry.as_ref())
        {
            Ok(token) => {
                log::debug!("Requested load #{token}");
                self.status_message = None;
            }
            Err(e) => {
                log::warn!("Load rejected: {e}");
                self.status_message = Some(e.to_string());
            }
        }
    }

    /// Start loading an arbitrary file (File → Open…).
    pub fn load_path(&mut self, path: PathBuf) {
        self.fetcher.request_path(path);
        self.status_message = None;
    }

    /// Pick up a finished load, if any. Returns `true` when state changed.
    pub fn poll_loads(&mut self) -> bool {
        match self.fetcher.poll() {
            Some(outcome) => {
                self.apply_outcome(outcome);
                true
            }
            None => false,
        }
    }

    fn apply_outcome(&mut self, outcome: LoadOutcome) {
        match outcome.result {
            Ok(table) => {
                log::info!(
                    "Load #{}: {} rows with columns {:?} from {}",
                    outcome.token,
                    table.len(),
                    table.headers(),
                    outcome.source.display()
                );
                self.source = Some(outcome.source);
                self.set_table(table);
            }
            Err(e) => {
                // The current table stays as it was.
                log::error!("Failed to load {}: {e:#}", outcome.source.display());
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    // -- Selections --

    /// Ingest a newly loaded table: reset axes and the chosen group value
    /// to their defaults, then rebuild series.
    pub fn set_table(&mut self, table: Table) {
        self.axes = AxisSelection::defaults(&table);
        self.table = Some(table);
        self.status_message = None;
        self.grouping.value = None;
        self.regroup();
    }

    /// Bind X to `name`; unknown names reset X to the first header.
    pub fn set_x(&mut self, name: &str) {
        self.axes.x = self.checked_column(name, 0);
        self.regroup();
    }

    /// Bind Y to `name`; unknown names reset Y to the second header.
    pub fn set_y(&mut self, name: &str) {
        self.axes.y = self.checked_column(name, 1);
        self.regroup();
    }

    /// Toggle single-group mode.
    pub fn set_grouping(&mut self, enabled: bool) {
        self.grouping.enabled = enabled;
        self.reshape();
    }

    /// Choose which group value is shown in single-group mode.
    pub fn set_group_value(&mut self, value: CellValue) {
        if self.grouping.distinct.contains(&value) {
            self.grouping.value = Some(value);
            self.reshape();
        } else {
            log::warn!("Ignoring unknown group value {value}");
        }
    }

    pub fn set_mode(&mut self, mode: DrawMode) {
        self.grouping.mode = mode;
    }

    /// Grouping needs a third column.
    pub fn grouping_available(&self) -> bool {
        self.axes.group.is_some()
    }

    fn checked_column(&self, name: &str, default_idx: usize) -> Option<String> {
        let headers = self.table.as_ref().map(Table::headers).unwrap_or_default();
        if headers.iter().any(|h| h == name) {
            return Some(name.to_string());
        }
        let fallback = headers.get(default_idx).cloned();
        log::warn!("Column {name:?} not in headers, using {fallback:?}");
        fallback
    }

    /// Recompute the group column, its distinct values and colours, then
    /// the series. Runs after every table or axis change.
    fn regroup(&mut self) {
        let Some(table) = &self.table else {
            return;
        };

        self.axes.group = group_candidate(table, self.axes.x.as_deref(), self.axes.y.as_deref());
        self.grouping.distinct = match &self.axes.group {
            Some(group) => table.distinct_values(group.index),
            None => Default::default(),
        };

        let still_valid = self
            .grouping
            .value
            .as_ref()
            .is_some_and(|v| self.grouping.distinct.contains(v));
        if !still_valid {
            self.grouping.value = self.grouping.distinct.first().cloned();
        }

        self.color_map = Some(ColorMap::new(&self.grouping.distinct));
        self.reshape();
    }

    /// Recompute `series` after a selection change.
    pub fn reshape(&mut self) {
        self.series = match &self.table {
            Some(table) => build_series(table, &self.axes, &self.grouping),
            None => Vec::new(),
        };
    }
}
