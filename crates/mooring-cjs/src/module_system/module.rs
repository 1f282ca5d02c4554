// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The `module` record

use crate::value::Value;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// One loaded (or loading) module, unique per load key
pub struct Module {
    /// Canonical absolute path; also the cache key
    filename: PathBuf,
    /// Directory relative requires resolve against
    dirname: PathBuf,
    /// Current `module.exports`
    exports: RwLock<Value>,
    /// Set once execution finished successfully
    loaded: AtomicBool,
    /// Module whose require caused this load
    parent: Option<Weak<Module>>,
    /// Modules this one caused to load, in first-require order
    children: Mutex<Vec<Arc<Module>>>,
}

impl Module {
    /// Create an unloaded module for `filename` with empty exports
    pub fn new(filename: PathBuf, parent: Option<&Arc<Module>>) -> Self {
        let dirname = filename
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));
        Self {
            filename,
            dirname,
            exports: RwLock::new(Value::object()),
            loaded: AtomicBool::new(false),
            parent: parent.map(Arc::downgrade),
            children: Mutex::new(Vec::new()),
        }
    }

    /// `module.id`
    pub fn id(&self) -> &Path {
        &self.filename
    }

    /// `module.filename`
    pub fn filename(&self) -> &Path {
        &self.filename
    }

    /// `module.dirname`, i.e. `__dirname`
    pub fn dirname(&self) -> &Path {
        &self.dirname
    }

    /// `module.exports`
    pub fn exports(&self) -> Value {
        self.exports.read().clone()
    }

    /// `module.exports = value`
    pub fn set_exports(&self, value: Value) {
        *self.exports.write() = value;
    }

    /// `module.loaded`
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    pub(crate) fn mark_loaded(&self) {
        self.loaded.store(true, Ordering::Release);
    }

    /// `module.parent`. `None` for entry modules, or once the parent is dropped.
    pub fn parent(&self) -> Option<Arc<Module>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// `module.children`
    pub fn children(&self) -> Vec<Arc<Module>> {
        self.children.lock().clone()
    }

    /// Append `child` unless it is already present
    pub(crate) fn add_child(&self, child: &Arc<Module>) {
        let mut children = self.children.lock();
        if !children.iter().any(|c| Arc::ptr_eq(c, child)) {
            children.push(Arc::clone(child));
        }
    }

    pub(crate) fn remove_child(&self, child: &Arc<Module>) {
        self.children.lock().retain(|c| !Arc::ptr_eq(c, child));
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("id", &self.filename)
            .field("loaded", &self.is_loaded())
            .field("parent", &self.parent().map(|p| p.filename.clone()))
            .field(
                "children",
                &self
                    .children()
                    .iter()
                    .map(|c| c.filename.clone())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
