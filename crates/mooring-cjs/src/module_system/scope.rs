// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Per-module execution context

use crate::error::Result;
use crate::module_system::module::Module;
use crate::module_system::require::Require;
use crate::value::Value;
use std::path::PathBuf;
use std::sync::Arc;

/// Parameter names of the module function, in order
pub const WRAPPER_PARAMS: [&str; 5] = ["exports", "require", "module", "__filename", "__dirname"];

/// Wrap source code in the CommonJS module function.
///
/// Engines that compile script text call the result with the scope's
/// bindings in [`WRAPPER_PARAMS`] order.
pub fn wrap_source(source: &str) -> String {
    format!(
        "(function ({}) {{\n{}\n}});",
        WRAPPER_PARAMS.join(", "),
        source
    )
}

/// The bindings a module body runs with
pub struct ModuleScope {
    /// Free `exports` binding. Starts as `module.exports`; reassigning it
    /// does not change what the module exports.
    pub exports: Value,
    /// `module`
    pub module: Arc<Module>,
    /// `require`, bound to the module's directory
    pub require: Require,
    /// `__filename`
    pub filename: PathBuf,
    /// `__dirname`
    pub dirname: PathBuf,
}

impl ModuleScope {
    pub(crate) fn new(module: &Arc<Module>, require: Require) -> Self {
        Self {
            exports: module.exports(),
            module: Arc::clone(module),
            require,
            filename: module.filename().to_path_buf(),
            dirname: module.dirname().to_path_buf(),
        }
    }

    /// Set a property on the free `exports` binding (`exports.name = value`)
    pub fn export(&self, name: &str, value: impl Into<Value>) {
        if let Some(exports) = self.exports.as_object() {
            exports.set(name, value);
        }
    }

    /// `require(specifier)` from this module
    pub fn require(&self, specifier: &str) -> Result<Value> {
        self.require.call(specifier)
    }
}
