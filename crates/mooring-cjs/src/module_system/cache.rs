// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module cache for require()

use crate::error::Result;
use crate::module_system::module::Module;
use crate::value::Value;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};

/// Thread-safe module cache.
///
/// Outside this crate the cache is read-only: `require.cache` and
/// [`ModuleLoader::cache`](crate::ModuleLoader::cache) expose lookups and
/// diagnostics, while inserting and evicting belong to the loader.
///
/// ```compile_fail
/// use mooring_cjs::ModuleCache;
/// use std::path::PathBuf;
///
/// let cache = ModuleCache::new();
/// let _ = cache.get_or_load(PathBuf::from("/forged.js"), None, |_| Ok(()));
/// ```
pub struct ModuleCache {
    /// Cache mapping load keys to modules
    modules: DashMap<PathBuf, Arc<Module>>,
}

impl ModuleCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self {
            modules: DashMap::new(),
        }
    }

    /// Get a cached module by load key
    pub fn get(&self, key: impl AsRef<Path>) -> Option<Arc<Module>> {
        self.modules.get(key.as_ref()).map(|entry| Arc::clone(entry.value()))
    }

    /// Current exports of a cached module
    pub fn exports(&self, key: impl AsRef<Path>) -> Option<Value> {
        self.get(key).map(|module| module.exports())
    }

    /// Check if a module is cached
    pub fn contains(&self, key: impl AsRef<Path>) -> bool {
        self.modules.contains_key(key.as_ref())
    }

    /// Get all cached load keys
    pub fn keys(&self) -> Vec<PathBuf> {
        self.modules.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Get the number of cached modules
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Return the exports for `key`, loading the module with `load` on a miss.
    pub(crate) fn get_or_load<F>(&self, key: PathBuf, parent: Option<&Arc<Module>>, load: F) -> Result<Value>
    where
        F: FnOnce(&Arc<Module>) -> Result<()>,
    {
        self.get_or_load_module(key, parent, load)
            .map(|module| module.exports())
    }

    /// Like [`get_or_load`](Self::get_or_load) but hands back the module record.
    ///
    /// On a miss the new module is inserted before `load` runs, so a cyclic
    /// require of the same key is a hit that observes the partial exports.
    /// If `load` fails the module is evicted and unlinked from its parent.
    pub(crate) fn get_or_load_module<F>(
        &self,
        key: PathBuf,
        parent: Option<&Arc<Module>>,
        load: F,
    ) -> Result<Arc<Module>>
    where
        F: FnOnce(&Arc<Module>) -> Result<()>,
    {
        // The entry guard holds the shard lock; it must be released before
        // `load` re-enters the cache.
        let module = match self.modules.entry(key) {
            Entry::Occupied(entry) => {
                let module = Arc::clone(entry.get());
                trace!("cache hit for {}", module.id().display());
                return Ok(module);
            }
            Entry::Vacant(entry) => {
                let module = Arc::new(Module::new(entry.key().clone(), parent));
                entry.insert(Arc::clone(&module));
                module
            }
        };

        debug!("loading {}", module.id().display());
        if let Some(parent) = parent {
            parent.add_child(&module);
        }

        match load(&module) {
            Ok(()) => {
                module.mark_loaded();
                Ok(module)
            }
            Err(e) => {
                debug!("evicting {} after failed load", module.id().display());
                self.modules
                    .remove_if(module.id(), |_, cached| Arc::ptr_eq(cached, &module));
                if let Some(parent) = parent {
                    parent.remove_child(&module);
                }
                Err(e)
            }
        }
    }

    /// Clear the entire cache
    pub(crate) fn clear(&self) {
        self.modules.clear();
    }
}

impl Default for ModuleCache {
    fn default() -> Self {
        Self::new()
    }
}
