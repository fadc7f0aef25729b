//! # dbforge CLI
//!
//! Console commands for dbforge, built on `clap`.
//!
//! ## Commands
//!
//! - `make:migration` - Create a new migration file
//! - `make:seeder` - Create a new seed file
//! - `db:seed` - Run all or selected seeds against the configured database
//!
//! ## Layout
//!
//! - [`console`]: command definitions, bound input, tagged output
//! - [`adapter`]: exposes the console to drivers through the driver io contract
//! - [`settings`]: `dbforge.toml` loading
//! - [`context`]: per-invocation state handed to a command
//! - [`runner`]: seed execution
//! - [`application`]: global options and dispatch
//!

pub mod adapter;
pub mod application;
pub mod commands;
pub mod console;
pub mod context;
pub mod runner;
pub mod settings;

use anyhow::Context as _;

pub use application::{Application, GlobalArgs};
pub use commands::{Command, DbSeed, MakeMigration, MakeSeeder, builtin_commands};
pub use console::{Definition, Input, Output};
pub use context::CommandContext;
pub use runner::SeedRunner;
pub use settings::{DEFAULT_CONFIG_FILE, Settings};

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Run the stock application in the current directory and return the
/// process exit code
pub async fn run(args: Vec<String>) -> anyhow::Result<i32> {
    let working_dir = std::env::current_dir().context("Failed to read the current directory")?;
    Ok(Application::new().in_dir(working_dir).run(args).await)
}
