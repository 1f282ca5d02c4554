// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for module resolution and loading

use crate::value::Value;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for module system operations
pub type Result<T> = std::result::Result<T, ModuleError>;

/// Errors that can cross a `require()` boundary
#[derive(Debug, Error)]
pub enum ModuleError {
    /// Module not found
    #[error("Cannot find module {specifier}")]
    NotFound {
        /// The specifier exactly as it was passed to `require()`
        specifier: String,
    },

    /// Malformed source or data document
    #[error("SyntaxError: {}: {message}", .filename.display())]
    Syntax {
        /// File that failed to parse
        filename: PathBuf,
        /// Parser message
        message: String,
    },

    /// A value thrown by loaded code
    #[error("Uncaught {0}")]
    Thrown(Value),

    /// Script engine failure
    #[error("{0}")]
    Engine(String),

    /// Type error (wrong value type)
    #[error("TypeError: {0}")]
    TypeError(String),

    /// Namespace read error
    #[error("Error reading '{}': {source}", .path.display())]
    Io {
        /// Path being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid loader configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ModuleError {
    /// Create a module not found error
    pub fn not_found(specifier: impl Into<String>) -> Self {
        Self::NotFound {
            specifier: specifier.into(),
        }
    }

    /// Create a syntax error for `filename`
    pub fn syntax(filename: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Syntax {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create a new TypeError
    pub fn type_error(msg: impl Into<String>) -> Self {
        Self::TypeError(msg.into())
    }

    /// Machine-readable error code, mirroring `err.code` in CommonJS hosts
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => Some("MODULE_NOT_FOUND"),
            Self::Syntax { .. } => Some("ERR_SYNTAX"),
            Self::Io { .. } => Some("ERR_IO"),
            Self::Config(_) => Some("ERR_INVALID_CONFIG"),
            Self::TypeError(_) => Some("ERR_INVALID_ARG_TYPE"),
            Self::Thrown(_) | Self::Engine(_) => None,
        }
    }

    /// Returns true if this is a `MODULE_NOT_FOUND` error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
