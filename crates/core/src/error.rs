//! Error types for dbforge
//!
//! This module provides unified error handling across the workspace:
//! configuration and driver resolution errors, scaffolding conflicts,
//! console input errors, seed lookup errors and SQL statement failures.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::ScaffoldKind;

/// Boxed error raised by a database client.
pub type BoxedSourceError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type for dbforge
#[derive(Debug, Error)]
pub enum ForgeError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Bad or missing connection settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No driver registered under the requested engine identifier
    #[error("Adapter \"{0}\" has not been registered")]
    UnsupportedDriver(String),

    // ========================================================================
    // Scaffolding Errors
    // ========================================================================
    /// Target directory is missing or not writable
    #[error("{kind} directory \"{}\" {reason}", .path.display())]
    Directory {
        kind: ScaffoldKind,
        path: PathBuf,
        reason: String,
    },

    /// Class name does not follow the CamelCase pattern
    #[error("The {} class name \"{name}\" is invalid. Please use CamelCase format.", .kind.noun())]
    InvalidName { kind: ScaffoldKind, name: String },

    /// A migration with the same normalized class name already exists
    #[error("The {} class name \"{name}\" already exists", .kind.noun())]
    DuplicateName { kind: ScaffoldKind, name: String },

    /// Refusing to overwrite an existing file
    #[error("The file \"{}\" already exists", .0.display())]
    FileExists(PathBuf),

    /// Template selection or loading failed
    #[error("{0}")]
    Template(String),

    /// No template generator registered under the requested name
    #[error("The template generator \"{0}\" is not registered")]
    GeneratorNotFound(String),

    // ========================================================================
    // Console Errors
    // ========================================================================
    /// Unknown argument or option name
    #[error("The \"{name}\" {kind} does not exist.")]
    NotFound { kind: &'static str, name: String },

    /// Input failed validation against its definition
    #[error("{0}")]
    InputValidation(String),

    // ========================================================================
    // Seed Errors
    // ========================================================================
    /// Requested seed is not registered
    #[error("The seed class \"{0}\" does not exist")]
    UnknownSeed(String),

    // ========================================================================
    // Database Errors
    // ========================================================================
    /// SQL execution failed; the client error is kept as the source
    #[error("{source}")]
    Statement {
        sql: String,
        #[source]
        source: BoxedSourceError,
    },

    // ========================================================================
    // IO Errors
    // ========================================================================
    /// File IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    /// File write error
    #[error("The file \"{path}\" could not be written to: {message}")]
    FileWrite { path: PathBuf, message: String },

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl ForgeError {
    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        ForgeError::Configuration(msg.into())
    }

    /// Create a configuration error for a missing key
    pub fn missing_config(key: &str) -> Self {
        ForgeError::Configuration(format!("missing required setting \"{}\"", key))
    }

    /// Create a directory error
    pub fn directory(kind: ScaffoldKind, path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ForgeError::Directory {
            kind,
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a template error
    pub fn template(msg: impl Into<String>) -> Self {
        ForgeError::Template(msg.into())
    }

    /// Create an unknown-argument error
    pub fn argument_not_found(name: impl Into<String>) -> Self {
        ForgeError::NotFound {
            kind: "argument",
            name: name.into(),
        }
    }

    /// Create an unknown-option error
    pub fn option_not_found(name: impl Into<String>) -> Self {
        ForgeError::NotFound {
            kind: "option",
            name: name.into(),
        }
    }

    /// Wrap a database client error together with the statement that raised it
    pub fn statement<E>(sql: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ForgeError::Statement {
            sql: sql.into(),
            source: Box::new(source),
        }
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        ForgeError::Internal(msg.into())
    }

    /// Create an error with context
    pub fn with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        ForgeError::WithContext {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Check if this error is a scaffolding name or path conflict
    pub fn is_scaffold_conflict(&self) -> bool {
        matches!(
            self,
            ForgeError::InvalidName { .. }
                | ForgeError::DuplicateName { .. }
                | ForgeError::FileExists(_)
        )
    }

    /// Check if this error comes from console input handling
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ForgeError::NotFound { .. } | ForgeError::InputValidation(_)
        )
    }

    /// Check if this error is an IO error
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            ForgeError::Io(_) | ForgeError::FileRead { .. } | ForgeError::FileWrite { .. }
        )
    }
}

/// Result type alias using ForgeError
pub type ForgeResult<T> = Result<T, ForgeError>;

// ============================================================================
// Tests
// ============================================================================
