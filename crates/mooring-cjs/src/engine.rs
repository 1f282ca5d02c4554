// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The script engine seam

use crate::error::Result;
use crate::module_system::ModuleScope;

/// Runs module source text.
///
/// An engine executes `source` as the body of a function whose parameters
/// are the scope's bindings (see [`wrap_source`](crate::module_system::wrap_source)).
/// Top-level declarations stay local to that call; the only result the
/// loader reads back is `scope.module.exports()`. Errors raised by the
/// code are returned as-is and reach the `require` caller unchanged.
pub trait ScriptEngine: Send + Sync {
    /// Execute one module body
    fn execute(&self, source: &str, scope: &mut ModuleScope) -> Result<()>;
}

impl<F> ScriptEngine for F
where
    F: Fn(&str, &mut ModuleScope) -> Result<()> + Send + Sync,
{
    fn execute(&self, source: &str, scope: &mut ModuleScope) -> Result<()> {
        self(source, scope)
    }
}
