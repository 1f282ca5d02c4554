// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! `require.extensions` - the extension to handler table

use crate::error::Result;
use crate::module_system::loader::ModuleLoader;
use crate::module_system::module::Module;
use parking_lot::RwLock;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Embedder-supplied loader for a custom extension.
///
/// Receives the loader, the module being loaded and the file content; it
/// must leave the result in `module.exports`.
pub type CustomHandler = Arc<dyn Fn(&ModuleLoader, &Arc<Module>, &str) -> Result<()> + Send + Sync>;

/// How files with a given extension are turned into exports
#[derive(Clone)]
pub enum Handler {
    /// Run as script source in a module scope
    Code,
    /// Parse as JSON; the document becomes `module.exports`
    Data,
    /// Custom loader
    Custom(CustomHandler),
}

impl Handler {
    /// Wrap a closure as a custom handler
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&ModuleLoader, &Arc<Module>, &str) -> Result<()> + Send + Sync + 'static,
    {
        Handler::Custom(Arc::new(f))
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Code => write!(f, "Code"),
            Handler::Data => write!(f, "Data"),
            Handler::Custom(_) => write!(f, "Custom"),
        }
    }
}

/// Ordered extension registry.
///
/// Registration order is probing order during resolution.
pub struct ExtensionRegistry {
    handlers: RwLock<Vec<(String, Handler)>>,
}

impl ExtensionRegistry {
    /// Registry with `.js` (code) then `.json` (data)
    pub fn new() -> Self {
        let registry = Self::empty();
        registry.register(".js", Handler::Code);
        registry.register(".json", Handler::Data);
        registry
    }

    /// Registry with nothing registered
    pub fn empty() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
        }
    }

    /// Register `extension` (with its leading dot). An existing entry is
    /// replaced in place and keeps its priority; new entries go last.
    pub fn register(&self, extension: impl Into<String>, handler: Handler) {
        let extension = extension.into();
        let mut handlers = self.handlers.write();
        match handlers.iter_mut().find(|(ext, _)| *ext == extension) {
            Some(entry) => entry.1 = handler,
            None => handlers.push((extension, handler)),
        }
    }

    /// Unregister `extension`
    pub fn remove(&self, extension: &str) -> Option<Handler> {
        let mut handlers = self.handlers.write();
        let index = handlers.iter().position(|(ext, _)| ext == extension)?;
        Some(handlers.remove(index).1)
    }

    /// Handler registered for exactly `extension`
    pub fn get(&self, extension: &str) -> Option<Handler> {
        self.handlers
            .read()
            .iter()
            .find(|(ext, _)| ext == extension)
            .map(|(_, handler)| handler.clone())
    }

    /// Check if `extension` is registered
    pub fn contains(&self, extension: &str) -> bool {
        self.handlers.read().iter().any(|(ext, _)| ext == extension)
    }

    /// Registered extensions in probing order
    pub fn extensions(&self) -> Vec<String> {
        self.handlers.read().iter().map(|(ext, _)| ext.clone()).collect()
    }

    /// Handler for `path`, chosen by the longest registered extension
    /// (so `.test.js` beats `.js`). Unregistered files are treated as code.
    pub fn handler_for(&self, path: &Path) -> Handler {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return Handler::Code;
        };

        // A leading dot names a dotfile, not an extension
        for (index, _) in name.match_indices('.').filter(|(i, _)| *i > 0) {
            if let Some(handler) = self.get(&name[index..]) {
                return handler;
            }
        }
        Handler::Code
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.handlers.read().iter().map(|(e, h)| (e.clone(), h.clone())))
            .finish()
    }
}
