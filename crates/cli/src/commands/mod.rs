//! # Commands
//!
//! | Command | Purpose |
//! |---|---|
//! | `make:migration` | scaffold a versioned migration file |
//! | `make:seeder` | scaffold a seed file |
//! | `db:seed` | run registered seeds |

use async_trait::async_trait;
use dbforge_core::ForgeResult;

use crate::console::Definition;
use crate::context::CommandContext;

mod db_seed;
mod make_migration;
mod make_seeder;

pub use db_seed::DbSeed;
pub use make_migration::MakeMigration;
pub use make_seeder::MakeSeeder;

#[async_trait]
pub trait Command: Send + Sync {
    /// Name typed on the command line, e.g. `make:migration`
    fn name(&self) -> &'static str;

    /// One-line summary for the command list
    fn description(&self) -> &'static str;

    /// Longer help text
    fn help(&self) -> &'static str {
        ""
    }

    fn definition(&self) -> Definition;

    async fn execute(&self, ctx: &mut CommandContext) -> ForgeResult<()>;
}

/// The stock command set
pub fn builtin_commands() -> Vec<Box<dyn Command>> {
    vec![
        Box::new(MakeMigration),
        Box::new(MakeSeeder),
        Box::new(DbSeed),
    ]
}
