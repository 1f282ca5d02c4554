// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module path resolution.
//!
//! Order of attempts, first success wins:
//!
//! 1. native modules, for specifiers the host claims
//! 2. the literal path, relative to the requiring module's directory
//! 3. the path plus each registered extension, in registration order
//! 4. the path as a directory: package `main`, then `index` + extensions
//! 5. for bare specifiers, steps 2-4 under each `node_modules` folder up
//!    the tree, then under each configured search path

use crate::config::LoaderConfig;
use crate::error::{ModuleError, Result};
use crate::module_system::extensions::ExtensionRegistry;
use crate::module_system::native::{is_bare, NativeModule, NativeRequire};
use crate::namespace::{normalize, Namespace};
use parking_lot::RwLock;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Result of module resolution
#[derive(Debug, Clone)]
pub enum Resolution {
    /// Host-provided module, returned untouched
    Native(NativeModule),
    /// File module (canonical load key)
    File(PathBuf),
}

impl Resolution {
    /// The identity `require.resolve` reports
    pub fn id(&self) -> String {
        match self {
            Resolution::Native(native) => native.id.clone(),
            Resolution::File(path) => path.display().to_string(),
        }
    }
}

/// Module resolver
pub struct ModuleResolver {
    namespace: Arc<dyn Namespace>,
    native: Arc<dyn NativeRequire>,
    extensions: Arc<ExtensionRegistry>,
    /// Configured search paths followed by ones pushed at runtime
    search_paths: RwLock<Vec<PathBuf>>,
    /// Home-directory folders, consulted last
    global_paths: Vec<PathBuf>,
    node_modules: bool,
    package_file: String,
    index_name: String,
}

impl ModuleResolver {
    /// Create a resolver probing `extensions` on `namespace`
    pub fn new(
        namespace: Arc<dyn Namespace>,
        native: Arc<dyn NativeRequire>,
        extensions: Arc<ExtensionRegistry>,
        config: &LoaderConfig,
    ) -> Self {
        Self {
            namespace,
            native,
            extensions,
            search_paths: RwLock::new(config.search_paths.clone()),
            global_paths: config.home_dirs(),
            node_modules: config.node_modules,
            package_file: config.package_file.clone(),
            index_name: config.index_name.clone(),
        }
    }

    /// Append a search path for bare specifiers
    pub fn push_search_path(&self, path: impl Into<PathBuf>) {
        self.search_paths.write().push(path.into());
    }

    /// Current search paths, in lookup order
    pub fn search_paths(&self) -> Vec<PathBuf> {
        self.search_paths.read().clone()
    }

    /// Resolve `specifier` as required from a module in `base_dir`
    #[instrument(level = "trace", skip(self))]
    pub fn resolve(&self, specifier: &str, base_dir: &Path) -> Result<Resolution> {
        if specifier.is_empty() {
            return Err(ModuleError::not_found(specifier));
        }

        if self.native.handles(specifier) {
            if let Some(native) = self.native.lookup(specifier) {
                debug!("{} resolved to native module {}", specifier, native.id);
                return Ok(Resolution::Native(native));
            }
        }

        let extensions = self.extensions.extensions();
        let dir_only = specifier.ends_with('/');

        if let Some(path) = self.resolve_path(&base_dir.join(specifier), dir_only, &extensions) {
            debug!("{} resolved to {}", specifier, path.display());
            return Ok(Resolution::File(path));
        }

        if is_bare(specifier) {
            for dir in self.lookup_dirs(base_dir) {
                if let Some(path) = self.resolve_path(&dir.join(specifier), dir_only, &extensions) {
                    debug!("{} resolved to {} via {}", specifier, path.display(), dir.display());
                    return Ok(Resolution::File(path));
                }
            }
        }

        Err(ModuleError::not_found(specifier))
    }

    /// Folders a bare specifier is looked up in, nearest first
    fn lookup_dirs(&self, base_dir: &Path) -> Vec<PathBuf> {
        let mut dirs = Vec::new();

        if self.node_modules {
            for ancestor in base_dir.ancestors() {
                if ancestor.file_name().is_some_and(|name| name == "node_modules") {
                    continue;
                }
                dirs.push(ancestor.join("node_modules"));
            }
        }

        dirs.extend(self.search_paths.read().iter().cloned());
        dirs.extend(self.global_paths.iter().cloned());
        dirs
    }

    /// Steps 2-4 for one candidate path
    fn resolve_path(&self, path: &Path, dir_only: bool, extensions: &[String]) -> Option<PathBuf> {
        let path = normalize(path);

        if !dir_only {
            if let Some(found) = self.resolve_file(&path, extensions) {
                return Some(found);
            }
        }

        if self.namespace.is_dir(&path) {
            return self.resolve_directory(&path, extensions);
        }

        None
    }

    /// Exact file, then file + extension
    fn resolve_file(&self, path: &Path, extensions: &[String]) -> Option<PathBuf> {
        if self.namespace.is_file(path) {
            return Some(self.canonical(path));
        }

        extensions
            .iter()
            .map(|ext| with_suffix(path, ext))
            .find(|candidate| self.namespace.is_file(candidate))
            .map(|found| self.canonical(&found))
    }

    /// Resolve a directory (package main, then index files)
    fn resolve_directory(&self, dir: &Path, extensions: &[String]) -> Option<PathBuf> {
        if let Some(main) = self.package_main(dir) {
            let main_path = normalize(&dir.join(&main));
            if let Some(found) = self
                .resolve_file(&main_path, extensions)
                .or_else(|| self.resolve_index(&main_path, extensions))
            {
                return Some(found);
            }
            warn!(
                "{} has main '{}' which cannot be resolved, falling back to {}",
                dir.join(&self.package_file).display(),
                main,
                self.index_name
            );
        }

        self.resolve_index(dir, extensions)
    }

    fn resolve_index(&self, dir: &Path, extensions: &[String]) -> Option<PathBuf> {
        extensions
            .iter()
            .map(|ext| dir.join(format!("{}{}", self.index_name, ext)))
            .find(|candidate| self.namespace.is_file(candidate))
            .map(|found| self.canonical(&found))
    }

    /// The `main` field of the directory's package metadata, if usable
    fn package_main(&self, dir: &Path) -> Option<String> {
        let package_path = dir.join(&self.package_file);
        if !self.namespace.is_file(&package_path) {
            return None;
        }

        let content = match self.namespace.read_to_string(&package_path) {
            Ok(content) => content,
            Err(e) => {
                warn!("cannot read {}: {}", package_path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<PackageJson>(content.trim_start_matches('\u{feff}')) {
            Ok(pkg) => pkg.main.filter(|main| !main.is_empty()),
            Err(e) => {
                warn!("ignoring malformed {}: {}", package_path.display(), e);
                None
            }
        }
    }

    fn canonical(&self, path: &Path) -> PathBuf {
        self.namespace
            .canonicalize(path)
            .unwrap_or_else(|_| normalize(path))
    }
}

/// `path` with `suffix` appended to its final component
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw: OsString = path.as_os_str().to_owned();
    raw.push(suffix);
    PathBuf::from(raw)
}

/// Minimal package.json structure for resolution
#[derive(Debug, Deserialize)]
struct PackageJson {
    #[serde(default)]
    main: Option<String>,
}
