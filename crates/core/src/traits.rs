//! Core traits for dbforge
//!
//! This module defines the small set of behaviours shared by schema
//! definitions, connection settings and registered seeds.

use crate::error::ForgeResult;

// ============================================================================
// Validatable Trait
// ============================================================================

/// Trait for types that can be validated
///
/// Types implementing this trait can check their internal consistency
/// and return an error describing the first problem found.
///
/// # Example
///
/// ```rust,ignore
/// use dbforge_core::{ForgeError, ForgeResult, Validatable};
///
/// struct Connection {
///     host: String,
/// }
///
/// impl Validatable for Connection {
///     fn validate(&self) -> ForgeResult<()> {
///         if self.host.is_empty() {
///             return Err(ForgeError::missing_config("host"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validatable {
    /// Validate the current state of the object
    ///
    /// Returns `Ok(())` if valid, or a `ForgeError` describing the problem.
    fn validate(&self) -> ForgeResult<()>;

    /// Check if the object is valid without returning error details
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Get all validation errors (for types that can have multiple errors)
    fn validation_errors(&self) -> Vec<String> {
        match self.validate() {
            Ok(()) => vec![],
            Err(e) => vec![e.to_string()],
        }
    }
}

// ============================================================================
// Named Trait
// ============================================================================

/// Trait for types identified by a name
pub trait Named {
    /// Get the name
    fn name(&self) -> &str;

    /// Check if the name matches (case-insensitive)
    fn name_matches(&self, other: &str) -> bool {
        self.name().eq_ignore_ascii_case(other)
    }
}

// ============================================================================
// Tests
// ============================================================================
