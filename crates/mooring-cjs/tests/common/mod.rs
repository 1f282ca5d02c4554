// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Shared fixtures for the integration tests

#![allow(dead_code)]

use mooring_cjs::{LoaderConfig, ModuleError, ModuleLoader, ModuleScope, Result, ScriptEngine};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

type Script = Arc<dyn Fn(&mut ModuleScope) -> Result<()> + Send + Sync>;

/// Engine whose "source code" is the name of a Rust closure to run
#[derive(Clone, Default)]
pub struct ScriptedEngine {
    scripts: HashMap<String, Script>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(&mut ModuleScope) -> Result<()> + Send + Sync + 'static,
    {
        self.scripts.insert(name.to_string(), Arc::new(f));
        self
    }
}

impl ScriptEngine for ScriptedEngine {
    fn execute(&self, source: &str, scope: &mut ModuleScope) -> Result<()> {
        match self.scripts.get(source.trim()) {
            Some(script) => script(scope),
            None => Err(ModuleError::syntax(
                scope.filename.clone(),
                format!("unexpected token in '{}'", source.trim()),
            )),
        }
    }
}

/// A temporary module tree
pub struct Fixture {
    _dir: TempDir,
    pub root: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        init_tracing();
        let dir = tempfile::tempdir().expect("tempdir");
        // Load keys are realpaths; the temp dir itself may sit behind a symlink
        let root = dir.path().canonicalize().expect("canonical tempdir");
        Self { _dir: dir, root }
    }

    pub fn file(&self, relative: &str, content: &str) -> &Self {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create dirs");
        }
        fs::write(&path, content).expect("write fixture");
        self
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn config(&self) -> LoaderConfig {
        LoaderConfig {
            root: Some(self.root.clone()),
            ..LoaderConfig::default()
        }
    }

    pub fn loader(&self, engine: ScriptedEngine) -> ModuleLoader {
        ModuleLoader::builder(engine).config(self.config()).build()
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn path_string(path: &Path) -> String {
    path.display().to_string()
}
