//! # dbforge Schema
//!
//! Definitions handed by migration code to a driver's SQL builder.
//!
//! ## Core Concepts
//!
//! - **Column**: a named, typed column with attribute flags, built through
//!   named constructors (`Column::string("email")`, `Column::unsigned_integer("age")`)
//! - **Index**: a plain, unique or fulltext key over one or more columns
//! - **ForeignKey**: a constraint referencing columns of another table
//! - **TableDefinition**: a table name, its pending columns, indexes,
//!   foreign keys and table options. It is built once, consumed once by
//!   `create_table`, then dropped.
//!

// Module declarations
pub mod column;
pub mod foreign_key;
pub mod index;
pub mod table;

// Re-export commonly used types at crate root
pub use column::{Column, ColumnDefault};
pub use foreign_key::ForeignKey;
pub use index::{Index, IndexKind};
pub use table::{IdOption, PrimaryKey, TableDefinition, TableOptions};

// Re-export core types that are commonly used with schema definitions
pub use dbforge_core::{ColumnType, ForgeError, ForgeResult, ReferentialAction, Validatable};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
