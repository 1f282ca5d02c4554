// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! CommonJS module system
//!
//! - `require()` resolution: extension probing, package `main`,
//!   directory `index` fallback, `node_modules` and search paths
//! - Load-once cache keyed by canonical path, populated before execution
//!   so circular requires see partial exports
//! - `require.extensions` handler table (code, JSON data, custom)
//! - Per-module scope: `exports`, `require`, `module`, `__filename`, `__dirname`

mod cache;
mod extensions;
mod loader;
mod module;
mod native;
mod require;
mod resolver;
mod scope;

pub use cache::ModuleCache;
pub use extensions::{CustomHandler, ExtensionRegistry, Handler};
pub use loader::{LoaderBuilder, ModuleLoader};
pub use module::Module;
pub use native::{is_bare, BuiltinModules, NativeModule, NativeRequire, NoNative};
pub use require::Require;
pub use resolver::{ModuleResolver, Resolution};
pub use scope::{wrap_source, ModuleScope, WRAPPER_PARAMS};
