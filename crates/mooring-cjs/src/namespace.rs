// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Namespace accessors: where module sources come from.
//!
//! The resolver and loader only ever touch the namespace through the
//! [`Namespace`] trait, so modules can be served from disk ([`FsNamespace`])
//! or from memory ([`MemoryNamespace`]).

use dashmap::DashMap;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Host-provided access to a hierarchical namespace
pub trait Namespace: Send + Sync {
    /// Returns true if anything exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// Returns true if `path` is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Returns true if `path` exists and is not a directory
    fn is_file(&self, path: &Path) -> bool {
        self.exists(path) && !self.is_dir(path)
    }

    /// Read the full text content at `path`
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Canonical absolute identity for an existing `path`
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        Ok(normalize(path))
    }
}

/// Lexically resolve `.` and `..` components.
///
/// `..` at the root stays at the root, matching POSIX path semantics.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !path.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Namespace backed by the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsNamespace;

impl Namespace for FsNamespace {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        // realpath: symlinked modules share one load key with their target
        std::fs::canonicalize(path)
    }
}

/// In-memory namespace. Directories exist implicitly as ancestors of files.
#[derive(Debug, Default)]
pub struct MemoryNamespace {
    files: DashMap<PathBuf, String>,
}

impl MemoryNamespace {
    /// Create an empty namespace
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file
    pub fn insert(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.files.insert(normalize(path.as_ref()), content.into());
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with_file(self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    /// Remove a file
    pub fn remove(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files
            .remove(&normalize(path.as_ref()))
            .map(|(_, content)| content)
    }
}

impl Namespace for MemoryNamespace {
    fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.is_dir(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        let path = normalize(path);
        self.files
            .iter()
            .any(|entry| entry.key() != &path && entry.key().starts_with(&path))
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(&normalize(path))
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(&normalize(path))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no such file: {}", path.display()),
                )
            })
    }
}
