// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # mooring-cjs
//!
//! CommonJS module resolution and loading for embedded script engines.
//!
//! Given a specifier and the requesting module's directory, `require()`
//! finds one canonical file, runs it exactly once through a host
//! [`ScriptEngine`], and hands the same `module.exports` to every caller.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mooring_cjs::{ModuleLoader, ModuleScope, Result};
//!
//! let loader = ModuleLoader::new(|source: &str, scope: &mut ModuleScope| -> Result<()> {
//!     my_engine::run(&mooring_cjs::module_system::wrap_source(source), scope)
//! });
//! let exports = loader.require("./lib/outer")?;
//! ```
//!
//! The engine, the namespace (filesystem or in-memory) and the native
//! module provider are all injected; the cache lives as long as the
//! [`ModuleLoader`] that owns it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod engine;
pub mod error;
pub mod module_system;
pub mod namespace;
pub mod value;

// Re-exports
pub use config::LoaderConfig;
pub use engine::ScriptEngine;
pub use error::{ModuleError, Result};
pub use module_system::{
    BuiltinModules, ExtensionRegistry, Handler, Module, ModuleCache, ModuleLoader, ModuleScope,
    NativeModule, NativeRequire, Require, Resolution,
};
pub use namespace::{FsNamespace, MemoryNamespace, Namespace};
pub use value::{Array, Function, Object, Value};

/// Version of the mooring-cjs crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
