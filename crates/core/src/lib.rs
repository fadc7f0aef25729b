//! # dbforge Core
//!
//! Core types, traits, and error handling for dbforge.
//!
//! This crate provides the foundational building blocks shared by the
//! schema, driver, codegen and cli crates:
//!
//! - **Types**: column types, referential actions, console verbosity and format
//! - **Traits**: `Validatable` and `Named`
//! - **Errors**: unified error handling with `ForgeError` and `ForgeResult`
//!

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{ForgeError, ForgeResult};
pub use traits::{Named, Validatable};
pub use types::{ColumnType, OutputFormat, ReferentialAction, ScaffoldKind, Verbosity};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
