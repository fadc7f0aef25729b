use std::path::PathBuf;

use async_trait::async_trait;
use dbforge_codegen::Scaffolder;
use dbforge_core::{ForgeError, ForgeResult};

use super::Command;
use crate::console::{Argument, ArgumentMode, Definition, Opt, OptionMode};
use crate::context::CommandContext;

#[derive(Debug, Clone, Copy, Default)]
pub struct MakeSeeder;

#[async_trait]
impl Command for MakeSeeder {
    fn name(&self) -> &'static str {
        "make:seeder"
    }

    fn description(&self) -> &'static str {
        "Create a new database seeder"
    }

    fn help(&self) -> &'static str {
        "Creates a new database seeder"
    }

    fn definition(&self) -> Definition {
        Definition::new()
            .argument(Argument::new(
                "name",
                ArgumentMode::REQUIRED,
                "What is the name of the seeder?",
            ))
            .option(Opt::new(
                "path",
                None,
                OptionMode::REQUIRED,
                "Specify the path in which to create this seeder",
            ))
    }

    async fn execute(&self, ctx: &mut CommandContext) -> ForgeResult<()> {
        let input = ctx.input().clone();
        let output = ctx.output().clone();
        let settings = ctx.settings().migration.clone();

        let class_name = input
            .argument("name")?
            .non_empty()
            .map(str::to_string)
            .ok_or_else(|| ForgeError::InputValidation("Not enough arguments (missing: \"name\").".into()))?;

        let dir = match input.option("path")?.non_empty() {
            Some(path) => ctx.resolve_path(&PathBuf::from(path)),
            None => ctx.resolve_path(&settings.seed_path),
        };

        let outcome = Scaffolder::new(ctx.generators())
            .namespace(settings.namespace.clone())
            .relative_to(ctx.working_dir())
            .create_seed(&class_name, &dir, &mut |question| {
                output.confirm(&input, question, true)
            })?;

        for message in &outcome.messages {
            output.writeln(message);
        }
        Ok(())
    }
}
