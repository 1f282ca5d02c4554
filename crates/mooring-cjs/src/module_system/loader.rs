// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module loader - reads and runs modules

use crate::config::LoaderConfig;
use crate::engine::ScriptEngine;
use crate::error::{ModuleError, Result};
use crate::module_system::cache::ModuleCache;
use crate::module_system::extensions::{ExtensionRegistry, Handler};
use crate::module_system::module::Module;
use crate::module_system::native::{NativeRequire, NoNative};
use crate::module_system::require::Require;
use crate::module_system::resolver::{ModuleResolver, Resolution};
use crate::module_system::scope::ModuleScope;
use crate::namespace::{FsNamespace, Namespace};
use crate::value::Value;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::{Arc, Weak};
use tracing::{debug, instrument};

/// Module loader.
///
/// Owns the module cache and extension table for one embedding. Cloning is
/// cheap and every clone shares the same state; dropping the last clone
/// (or calling [`reset`](Self::reset)) ends the cache's lifetime.
#[derive(Clone)]
pub struct ModuleLoader {
    inner: Arc<LoaderInner>,
}

struct LoaderInner {
    config: LoaderConfig,
    namespace: Arc<dyn Namespace>,
    engine: Arc<dyn ScriptEngine>,
    extensions: Arc<ExtensionRegistry>,
    resolver: ModuleResolver,
    cache: ModuleCache,
    main: RwLock<Option<Arc<Module>>>,
}

/// Builder for [`ModuleLoader`]
pub struct LoaderBuilder {
    engine: Arc<dyn ScriptEngine>,
    namespace: Arc<dyn Namespace>,
    native: Arc<dyn NativeRequire>,
    extensions: ExtensionRegistry,
    config: LoaderConfig,
}

impl LoaderBuilder {
    /// Serve modules from `namespace` instead of the filesystem
    pub fn namespace(mut self, namespace: impl Namespace + 'static) -> Self {
        self.namespace = Arc::new(namespace);
        self
    }

    /// Host modules consulted before file resolution
    pub fn native(mut self, native: impl NativeRequire + 'static) -> Self {
        self.native = Arc::new(native);
        self
    }

    /// Start from `extensions` instead of the `.js`/`.json` defaults
    pub fn extensions(mut self, extensions: ExtensionRegistry) -> Self {
        self.extensions = extensions;
        self
    }

    /// Loader configuration
    pub fn config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the loader
    pub fn build(self) -> ModuleLoader {
        let extensions = Arc::new(self.extensions);
        let resolver = ModuleResolver::new(
            Arc::clone(&self.namespace),
            self.native,
            Arc::clone(&extensions),
            &self.config,
        );
        ModuleLoader {
            inner: Arc::new(LoaderInner {
                config: self.config,
                namespace: self.namespace,
                engine: self.engine,
                extensions,
                resolver,
                cache: ModuleCache::new(),
                main: RwLock::new(None),
            }),
        }
    }
}

impl ModuleLoader {
    /// Create a loader running code with `engine` against the filesystem
    pub fn new(engine: impl ScriptEngine + 'static) -> Self {
        Self::builder(engine).build()
    }

    /// Start configuring a loader
    pub fn builder(engine: impl ScriptEngine + 'static) -> LoaderBuilder {
        LoaderBuilder {
            engine: Arc::new(engine),
            namespace: Arc::new(FsNamespace),
            native: Arc::new(NoNative),
            extensions: ExtensionRegistry::new(),
            config: LoaderConfig::default(),
        }
    }

    /// `require(specifier)` from the root directory, with no parent module
    pub fn require(&self, specifier: &str) -> Result<Value> {
        self.root_require().call(specifier)
    }

    /// The root `require`, bound to the configured root directory
    pub fn root_require(&self) -> Require {
        Require::new(self.clone(), &self.inner.config.root_dir(), None)
    }

    /// Load `path` as the entry module and record it as `require.main`.
    pub fn run_main(&self, path: impl AsRef<Path>) -> Result<Arc<Module>> {
        let root = self.inner.config.root_dir();
        let specifier = root.join(path.as_ref()).to_string_lossy().into_owned();

        let filename = match self.inner.resolver.resolve(&specifier, &root)? {
            Resolution::File(filename) => filename,
            Resolution::Native(native) => {
                return Err(ModuleError::type_error(format!(
                    "cannot run native module '{}' as the main module",
                    native.id
                )))
            }
        };

        // Set before loading so the entry's own dependencies see it
        let result = self.inner.cache.get_or_load_module(filename, None, |module| {
            *self.inner.main.write() = Some(Arc::clone(module));
            self.load(module)
        });
        *self.inner.main.write() = result.as_ref().ok().cloned();
        result
    }

    /// Resolve and load `specifier` on behalf of `parent`
    pub(crate) fn require_from(
        &self,
        specifier: &str,
        base_dir: &Path,
        parent: Option<&Arc<Module>>,
    ) -> Result<Value> {
        match self.inner.resolver.resolve(specifier, base_dir)? {
            Resolution::Native(native) => Ok(native.exports),
            Resolution::File(filename) => self
                .inner
                .cache
                .get_or_load(filename, parent, |module| self.load(module)),
        }
    }

    /// Read `module.filename` and produce its exports with the registered handler
    #[instrument(level = "debug", skip_all, fields(filename = %module.filename().display()))]
    pub fn load(&self, module: &Arc<Module>) -> Result<()> {
        let content = self
            .inner
            .namespace
            .read_to_string(module.filename())
            .map_err(|source| ModuleError::Io {
                path: module.filename().to_path_buf(),
                source,
            })?;
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

        let handler = self.inner.extensions.handler_for(module.filename());
        debug!(?handler, "dispatching");
        match handler {
            Handler::Data => {
                let json: serde_json::Value = serde_json::from_str(content)
                    .map_err(|e| ModuleError::syntax(module.filename(), e.to_string()))?;
                module.set_exports(Value::from_json(&json));
                Ok(())
            }
            Handler::Code => self.compile(module, content),
            Handler::Custom(handler) => handler(self, module, content),
        }
    }

    /// Run `source` as the body of `module` in a fresh module scope
    pub fn compile(&self, module: &Arc<Module>, source: &str) -> Result<()> {
        let require = Require::new(self.clone(), module.dirname(), Some(module));
        let mut scope = ModuleScope::new(module, require);
        self.inner.engine.execute(strip_shebang(source), &mut scope)
    }

    /// The resolver
    pub fn resolver(&self) -> &ModuleResolver {
        &self.inner.resolver
    }

    /// Get the module cache
    pub fn cache(&self) -> &ModuleCache {
        &self.inner.cache
    }

    /// The extension table
    pub fn extensions(&self) -> &ExtensionRegistry {
        &self.inner.extensions
    }

    /// The configuration this loader was built with
    pub fn config(&self) -> &LoaderConfig {
        &self.inner.config
    }

    /// The entry module, once [`run_main`](Self::run_main) started it
    pub fn main(&self) -> Option<Arc<Module>> {
        self.inner.main.read().clone()
    }

    /// Forget every loaded module
    pub fn reset(&self) {
        self.inner.cache.clear();
        *self.inner.main.write() = None;
    }

    pub(crate) fn downgrade(&self) -> WeakLoader {
        WeakLoader(Arc::downgrade(&self.inner))
    }
}

/// A loader handle that does not keep the loader alive
#[derive(Clone)]
pub(crate) struct WeakLoader(Weak<LoaderInner>);

impl WeakLoader {
    pub(crate) fn upgrade(&self) -> Option<ModuleLoader> {
        self.0.upgrade().map(|inner| ModuleLoader { inner })
    }
}

/// Blank out a `#!` interpreter line, keeping line numbers intact
fn strip_shebang(source: &str) -> &str {
    if !source.starts_with("#!") {
        return source;
    }
    match source.find('\n') {
        Some(newline) => &source[newline..],
        None => "",
    }
}
