use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};

use super::catalog::{Catalog, CatalogEntry};
use super::loader;
use super::model::Table;
use crate::error::LoadError;

/// Function used by the worker threads to turn a path into a table.
pub type LoadFn = Arc<dyn Fn(&Path) -> Result<Table, LoadError> + Send + Sync>;

/// A finished load, tagged with the request that produced it.
#[derive(Debug)]
pub struct LoadOutcome {
    pub token: u64,
    pub source: PathBuf,
    pub result: Result<Table, LoadError>,
}

struct Pending {
    token: u64,
    source: PathBuf,
    rx: Receiver<Result<Table, LoadError>>,
}

// ---------------------------------------------------------------------------
// Background dataset retrieval
// ---------------------------------------------------------------------------

/// Runs file loads off the UI thread.
///
/// Every request gets a token from a monotonically increasing counter.
/// Only the outcome of the most recent request is ever handed back;
/// older loads still run to completion but their results are dropped.
pub struct Fetcher {
    load: LoadFn,
    issued: u64,
    pending: Vec<Pending>,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::with_loader(Arc::new(loader::load_file))
    }
}

impl Fetcher {
    pub fn with_loader(load: LoadFn) -> Self {
        Self {
            load,
            issued: 0,
            pending: Vec::new(),
        }
    }

    /// Start loading a catalog entry from `<root>/<id>`.
    ///
    /// Fails immediately, without starting any work, when nothing is selected.
    pub fn request(
        &mut self,
        root: &Path,
        selection: Option<&CatalogEntry>,
    ) -> Result<u64, LoadError> {
        let entry = selection.ok_or(LoadError::NoSelection)?;
        let path = Catalog::resolve(root, &entry.id)?;
        Ok(self.request_path(path))
    }

    /// Start loading an arbitrary file.
    pub fn request_path(&mut self, path: PathBuf) -> u64 {
        self.issued += 1;
        let token = self.issued;
        let (tx, rx) = mpsc::channel();
        let load = Arc::clone(&self.load);
        let worker_path = path.clone();

        log::info!("Load #{token}: {}", path.display());
        std::thread::spawn(move || {
            // The receiver is gone if the app shut down meanwhile.
            let _ = tx.send(load(&worker_path));
        });

        self.pending.push(Pending {
            token,
            source: path,
            rx,
        });
        token
    }

    /// Whether the most recent request is still running.
    pub fn is_loading(&self) -> bool {
        self.pending.iter().any(|p| p.token == self.issued)
    }

    /// Collect finished loads without blocking.
    ///
    /// Returns the outcome of the latest request once it is done;
    /// results of superseded requests are discarded.
    pub fn poll(&mut self) -> Option<LoadOutcome> {
        let latest = self.issued;
        let mut current = None;

        self.pending.retain(|p| {
            let result = match p.rx.try_recv() {
                Ok(result) => result,
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => Err(LoadError::WorkerGone),
            };

            if p.token == latest {
                current = Some(LoadOutcome {
                    token: p.token,
                    source: p.source.clone(),
                    result,
                });
            } else {
                log::debug!(
                    "Discarding stale load #{} ({}), latest is #{latest}",
                    p.token,
                    p.source.display()
                );
            }
            false
        });

        current
    }
}
