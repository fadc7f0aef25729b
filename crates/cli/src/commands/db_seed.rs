use std::time::Instant;

use async_trait::async_trait;
use dbforge_core::ForgeResult;
use tracing::debug;

use super::Command;
use crate::console::{Definition, Opt, OptionMode};
use crate::context::CommandContext;
use crate::runner::{self, SeedRunner};

#[derive(Debug, Clone, Copy, Default)]
pub struct DbSeed;

#[async_trait]
impl Command for DbSeed {
    fn name(&self) -> &'static str {
        "db:seed"
    }

    fn description(&self) -> &'static str {
        "Run database seeders"
    }

    fn help(&self) -> &'static str {
        "The db:seed command runs all available or individual seeders\n\n  \
         dbforge db:seed\n  \
         dbforge db:seed -s UserSeeder\n  \
         dbforge db:seed -s UserSeeder -s PermissionSeeder -s LogSeeder\n  \
         dbforge db:seed -v"
    }

    fn definition(&self) -> Definition {
        Definition::new().option(Opt::new(
            "seed",
            Some('s'),
            OptionMode::REQUIRED | OptionMode::IS_ARRAY,
            "What is the name of the seeder?",
        ))
    }

    async fn execute(&self, ctx: &mut CommandContext) -> ForgeResult<()> {
        let output = ctx.output().clone();
        let names = ctx.input().option("seed")?.to_vec();

        let start = Instant::now();
        let seeds = runner::select(ctx.seeds(), &names)?;
        if seeds.is_empty() {
            debug!("No seeds to run");
        } else {
            let driver = ctx.driver()?;
            SeedRunner::new(driver, &output).run(&seeds).await?;
        }

        output.writeln("");
        output.writeln(&format!(
            "<comment>All Done. Took {:.4}s</comment>",
            start.elapsed().as_secs_f64()
        ));
        Ok(())
    }
}
