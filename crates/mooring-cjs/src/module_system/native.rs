// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Host-provided (core/native) modules that bypass file resolution

use crate::value::Value;
use dashmap::DashMap;

/// A module supplied by the host rather than loaded from the namespace
#[derive(Debug, Clone)]
pub struct NativeModule {
    /// Identity reported by `require.resolve`
    pub id: String,
    /// Preloaded exports
    pub exports: Value,
}

/// The host's low-level require, consulted before any file probing.
pub trait NativeRequire: Send + Sync {
    /// Whether `specifier` may take the native path at all.
    ///
    /// Defaults to bare specifiers only.
    fn handles(&self, specifier: &str) -> bool {
        is_bare(specifier)
    }

    /// Look up a native module. `None` falls through to file resolution.
    fn lookup(&self, specifier: &str) -> Option<NativeModule>;
}

/// Returns true for specifiers without a relative or absolute path marker
pub fn is_bare(specifier: &str) -> bool {
    !(specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier.starts_with('/')
        || (cfg!(windows) && specifier.chars().nth(1) == Some(':')))
}

/// Host with no native modules
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNative;

impl NativeRequire for NoNative {
    fn lookup(&self, _specifier: &str) -> Option<NativeModule> {
        None
    }
}

/// Registry of named built-in modules
#[derive(Debug, Default)]
pub struct BuiltinModules {
    modules: DashMap<String, Value>,
}

impl BuiltinModules {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a built-in
    pub fn register(&self, name: impl Into<String>, exports: Value) {
        self.modules.insert(name.into(), exports);
    }

    /// Builder-style [`register`](Self::register)
    pub fn with_module(self, name: impl Into<String>, exports: Value) -> Self {
        self.register(name, exports);
        self
    }

    /// Check if a module is a built-in
    pub fn is_builtin(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.modules.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

impl NativeRequire for BuiltinModules {
    fn lookup(&self, specifier: &str) -> Option<NativeModule> {
        self.modules.get(specifier).map(|entry| NativeModule {
            id: specifier.to_string(),
            exports: entry.value().clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_bare() {
        assert!(is_bare("fs"));
        assert!(is_bare("lodash/get"));
        assert!(is_bare("@scope/pkg"));
        assert!(!is_bare("./x"));
        assert!(!is_bare("../x"));
        assert!(!is_bare("/abs/x"));
        assert!(!is_bare("."));
        assert!(!is_bare(".."));
    }

    #[test]
    fn test_builtins() {
        let builtins = BuiltinModules::new()
            .with_module("path", Value::object())
            .with_module("fs", Value::object());

        assert!(builtins.is_builtin("fs"));
        assert!(!builtins.is_builtin("lodash"));
        assert_eq!(builtins.names(), vec!["fs", "path"]);
        assert_eq!(builtins.lookup("path").unwrap().id, "path");
        assert!(builtins.lookup("lodash").is_none());
        assert!(NoNative.lookup("fs").is_none());
    }
}
