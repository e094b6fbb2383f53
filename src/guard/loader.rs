//! Guard loading
//!
//! A [`GuardFileSet`] maps guard file paths to asynchronous module loaders.
//! [`load_guards`] runs every loader and keeps the modules that export a
//! guard, keyed by the route id derived from the file path.

use crate::error::{BoxError, LoadError};
use crate::guard::route_id::route_id_from_path;
use crate::guard::table::GuardTable;
use crate::guard::types::{GuardEntry, GuardModule};
use futures::future::{BoxFuture, FutureExt, try_join_all};
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use tracing::{debug, trace, warn};

/// Future returned by a module loader
pub type LoadFuture<R> = BoxFuture<'static, Result<Option<GuardModule<R>>, BoxError>>;

type ModuleLoader<R> = Box<dyn Fn() -> LoadFuture<R> + Send + Sync>;

/// Guard files keyed by logical path
///
/// A loader resolving to `None` stands for a file that has no module to
/// offer; it is skipped like a module without a guard.
pub struct GuardFileSet<R> {
    files: BTreeMap<String, ModuleLoader<R>>,
}

impl<R: 'static> GuardFileSet<R> {
    /// Create an empty file set
    pub fn new() -> Self {
        Self {
            files: BTreeMap::new(),
        }
    }

    /// Add a file with an asynchronous loader
    ///
    /// A file already present under the same path is replaced.
    pub fn insert<F, Fut>(&mut self, path: impl Into<String>, loader: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<GuardModule<R>>, BoxError>> + Send + 'static,
    {
        self.files
            .insert(path.into(), Box::new(move || loader().boxed()));
    }

    /// Add a file whose module is built synchronously
    pub fn insert_module<F>(&mut self, path: impl Into<String>, module: F)
    where
        F: Fn() -> GuardModule<R> + Send + Sync + 'static,
    {
        self.files.insert(
            path.into(),
            Box::new(move || futures::future::ready(Ok::<_, BoxError>(Some(module()))).boxed()),
        );
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with_loader<F, Fut>(mut self, path: impl Into<String>, loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<GuardModule<R>>, BoxError>> + Send + 'static,
    {
        self.insert(path, loader);
        self
    }

    /// Builder form of [`insert_module`](Self::insert_module)
    pub fn with_module<F>(mut self, path: impl Into<String>, module: F) -> Self
    where
        F: Fn() -> GuardModule<R> + Send + Sync + 'static,
    {
        self.insert_module(path, module);
        self
    }
}

impl<R> GuardFileSet<R> {
    /// Get all file paths, sorted
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(|s| s.as_str())
    }

    /// Get the number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if the file set is empty
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl<R: 'static> Default for GuardFileSet<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for GuardFileSet<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardFileSet")
            .field("paths", &self.files.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Load every file of the set into a guard table
///
/// All loaders run concurrently and are awaited together, so the table is
/// returned complete or not at all. The first loader failure fails the whole
/// load. When two files map to the same route id, the later path wins.
pub async fn load_guards<R>(files: &GuardFileSet<R>) -> Result<GuardTable<R>, LoadError> {
    let loads = files.files.iter().map(|(path, loader)| {
        let load = loader();
        async move {
            load.await
                .map(|module| (path.as_str(), module))
                .map_err(|e| LoadError::loader(path.clone(), e))
        }
    });

    let modules = try_join_all(loads).await?;

    let mut table = GuardTable::new();
    for (path, module) in modules {
        let Some(module) = module else {
            trace!(path, "Skipping file without module");
            continue;
        };

        let route_id = route_id_from_path(path);
        match GuardEntry::from_module(route_id, module) {
            Some(entry) => {
                debug!(
                    path,
                    route_id = %entry.route_id(),
                    redirect = ?entry.redirect_target(),
                    "Loaded guard"
                );
                if let Some(replaced) = table.insert(entry) {
                    warn!(
                        path,
                        route_id = %replaced.route_id(),
                        "Guard replaced an earlier guard for the same route"
                    );
                }
            }
            None => trace!(path, "Skipping module without guard"),
        }
    }

    debug!(files = files.len(), guards = table.len(), "Built guard table");
    Ok(table)
}
