//! # dbforge Driver
//!
//! The driver layer: everything that turns schema definitions and seed
//! data into SQL and runs it.
//!
//! ## Pieces
//!
//! - [`Driver`]: the capability trait every driver and wrapper implements
//! - [`ConnectionConfig`]: resolved connection settings, immutable once built
//! - [`MysqlDriver`]: MySQL driver with the `CREATE TABLE` defaults override
//! - [`TimedDriver`], [`PrefixDriver`]: wrappers adding timing output and
//!   table-name prefixing
//! - [`DriverFactory`]: adapter and wrapper registries, builds the wrapper chain
//! - [`io`]: the input/output contract drivers write progress to
//! - [`Seed`], [`SeedRegistry`], [`Migration`]: contracts for user code
//!
//! ## Wrapper chain
//!
//! ```text
//! ConnectionConfig
//!         │
//!         ▼
//!   adapter ("mysql")  ──►  timed  ──►  set_input/set_output  ──►  prefix (if configured)
//! ```

pub mod config;
pub mod factory;
pub mod io;
pub mod migration;
pub mod mysql;
pub mod seed;
pub mod traits;
pub mod value;
pub mod wrappers;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-exports
pub use config::{ConnectionConfig, VersionOrder};
pub use factory::{AdapterConstructor, DriverFactory, WrapperConstructor};
pub use io::{InputDefinition, InputInterface, OutputInterface, ParamValue};
pub use migration::Migration;
pub use mysql::MysqlDriver;
pub use seed::{Seed, SeedRegistration, SeedRegistry};
pub use traits::Driver;
pub use value::{Row, SqlValue};
pub use wrappers::{PrefixDriver, TimedDriver};

/// Register a seed for discovery by [`SeedRegistry::discover`].
pub use inventory::submit as register_seed;

pub use dbforge_core::{ForgeError, ForgeResult};
