// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Loader configuration.

use crate::error::{ModuleError, Result};
use crate::namespace::normalize;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Environment variable holding extra search paths (platform path-list syntax)
pub const PATH_ENV: &str = "MOORING_PATH";

/// Environment variable overriding the root directory
pub const ROOT_ENV: &str = "MOORING_ROOT";

/// Prefix for per-key overrides, e.g. `MOORING_CONFIG_INDEX_NAME=main`
pub const CONFIG_ENV_PREFIX: &str = "MOORING_CONFIG_";

/// Configuration for a [`ModuleLoader`](crate::ModuleLoader).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Directory the root `require` resolves against (defaults to the
    /// current working directory)
    pub root: Option<PathBuf>,

    /// Extra lookup roots for bare specifiers, consulted in order
    pub search_paths: Vec<PathBuf>,

    /// Walk `node_modules` folders upward from the requiring module
    pub node_modules: bool,

    /// Consult `~/.mooring_modules` and `~/.mooring_libraries` last
    pub home_modules: bool,

    /// Package metadata file name inside module directories
    pub package_file: String,

    /// Base name probed inside directories without a usable `main`
    pub index_name: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            root: None,
            search_paths: Vec::new(),
            node_modules: true,
            home_modules: false,
            package_file: "package.json".to_string(),
            index_name: "index".to_string(),
        }
    }
}

impl LoaderConfig {
    /// Defaults overlaid with the process environment.
    pub fn load() -> Self {
        let mut config = Self::default();
        config.load_from_env();
        config
    }

    /// Read a JSON configuration file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ModuleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content)
            .map_err(|e| ModuleError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Apply `MOORING_ROOT`, `MOORING_PATH` and `MOORING_CONFIG_*`.
    pub fn load_from_env(&mut self) {
        self.apply_vars(std::env::vars());
    }

    /// Apply variables in the environment's format.
    ///
    /// Overrides that fail to parse are logged and skipped.
    pub fn apply_vars<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if key == ROOT_ENV {
                self.root = Some(PathBuf::from(value));
            } else if key == PATH_ENV {
                self.search_paths
                    .extend(std::env::split_paths(&value).filter(|p| !p.as_os_str().is_empty()));
            } else if let Some(config_key) = key.strip_prefix(CONFIG_ENV_PREFIX) {
                let config_key = config_key.to_lowercase().replace('_', "-");
                if let Err(e) = self.set(&config_key, &value) {
                    warn!("ignoring {}: {}", key, e);
                }
            }
        }
    }

    /// Set a configuration value by its dashed key name.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "root" => self.root = Some(PathBuf::from(value)),
            "search-paths" => {
                self.search_paths = std::env::split_paths(value)
                    .filter(|p| !p.as_os_str().is_empty())
                    .collect()
            }
            "node-modules" => self.node_modules = parse_bool(key, value)?,
            "home-modules" => self.home_modules = parse_bool(key, value)?,
            "package-file" => self.package_file = value.to_string(),
            "index-name" => self.index_name = value.to_string(),
            _ => return Err(ModuleError::Config(format!("unknown key '{}'", key))),
        }
        Ok(())
    }

    /// Absolute root directory. Relative roots are taken against the process
    /// working directory, which is also the fallback.
    pub fn root_dir(&self) -> PathBuf {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        match &self.root {
            Some(root) => normalize(&cwd.join(root)),
            None => cwd,
        }
    }

    /// Global folders under the user's home directory, when enabled.
    pub fn home_dirs(&self) -> Vec<PathBuf> {
        if !self.home_modules {
            return Vec::new();
        }
        dirs::home_dir()
            .map(|home| {
                vec![
                    home.join(".mooring_modules"),
                    home.join(".mooring_libraries"),
                ]
            })
            .unwrap_or_default()
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ModuleError::Config(format!(
            "'{}' expects true or false, got '{}'",
            key, value
        ))),
    }
}
