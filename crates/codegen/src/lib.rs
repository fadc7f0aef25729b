//! # dbforge Codegen
//!
//! File scaffolding for migrations and seeders.
//!
//! ## Features
//!
//! - **Templates**: `$token` substitution over embedded stubs or alternate files
//! - **Naming**: CamelCase validation, versioned migration file names
//! - **Generators**: named template producers with a post-creation hook
//! - **Scaffolder**: the create-file flow shared by `make:migration` and
//!   `make:seeder`
//!

// ============================================================================
// Modules
// ============================================================================

pub mod generator;
pub mod naming;
pub mod scaffold;
pub mod template;

// ============================================================================
// Re-exports
// ============================================================================

pub use generator::{CreateTableGenerator, GeneratorRegistry, TemplateGenerator};
pub use scaffold::{
    MIGRATION_BASE_CLASS, SEED_BASE_CLASS, ScaffoldOutcome, Scaffolder, TemplateSource,
};
pub use template::{TokenMap, render};
