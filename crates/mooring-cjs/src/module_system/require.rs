// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! CommonJS require() implementation

use crate::error::{ModuleError, Result};
use crate::module_system::cache::ModuleCache;
use crate::module_system::extensions::ExtensionRegistry;
use crate::module_system::loader::ModuleLoader;
use crate::module_system::module::Module;
use crate::value::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

/// A `require` function bound to one requesting location.
///
/// Each module gets its own handle, bound to its directory and recording it
/// as the parent of anything it loads first.
#[derive(Clone)]
pub struct Require {
    loader: ModuleLoader,
    base_dir: PathBuf,
    module: Option<Weak<Module>>,
}

impl Require {
    pub(crate) fn new(loader: ModuleLoader, base_dir: &Path, module: Option<&Arc<Module>>) -> Self {
        Self {
            loader,
            base_dir: base_dir.to_path_buf(),
            module: module.map(Arc::downgrade),
        }
    }

    /// `require(specifier)`
    pub fn call(&self, specifier: &str) -> Result<Value> {
        let parent = self.module.as_ref().and_then(Weak::upgrade);
        self.loader
            .require_from(specifier, &self.base_dir, parent.as_ref())
    }

    /// `require.resolve(specifier)` - get the resolved identity without loading
    pub fn resolve(&self, specifier: &str) -> Result<String> {
        self.loader
            .resolver()
            .resolve(specifier, &self.base_dir)
            .map(|resolution| resolution.id())
    }

    /// `require.cache`
    pub fn cache(&self) -> &ModuleCache {
        self.loader.cache()
    }

    /// `require.extensions`
    pub fn extensions(&self) -> &ExtensionRegistry {
        self.loader.extensions()
    }

    /// `require.main` - the entry module, if one was run
    pub fn main(&self) -> Option<Arc<Module>> {
        self.loader.main()
    }

    /// Add a lookup root for bare specifiers
    pub fn push_search_path(&self, path: impl Into<PathBuf>) {
        self.loader.resolver().push_search_path(path);
    }

    /// Current search paths
    pub fn search_paths(&self) -> Vec<PathBuf> {
        self.loader.resolver().search_paths()
    }

    /// Directory relative specifiers resolve against
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// This handle as a callable value taking the specifier as its first argument.
    ///
    /// The value holds the loader weakly, so a module may export its own
    /// `require` without keeping the loader and its cache alive.
    pub fn to_value(&self) -> Value {
        let loader = self.loader.downgrade();
        let base_dir = self.base_dir.clone();
        let module = self.module.clone();
        Value::function(move |args| match args.first() {
            Some(Value::String(specifier)) => {
                let loader = loader
                    .upgrade()
                    .ok_or_else(|| ModuleError::Engine("module loader has been dropped".to_string()))?;
                let parent = module.as_ref().and_then(Weak::upgrade);
                loader.require_from(specifier, &base_dir, parent.as_ref())
            }
            other => Err(ModuleError::type_error(format!(
                "The \"id\" argument must be of type string. Received {}",
                other.map(Value::type_of).unwrap_or("undefined")
            ))),
        })
    }
}

impl fmt::Debug for Require {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Require")
            .field("base_dir", &self.base_dir)
            .field(
                "module",
                &self
                    .module
                    .as_ref()
                    .and_then(Weak::upgrade)
                    .map(|m| m.id().to_path_buf()),
            )
            .finish()
    }
}
