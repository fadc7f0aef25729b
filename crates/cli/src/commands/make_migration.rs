use std::path::PathBuf;

use async_trait::async_trait;
use dbforge_codegen::{Scaffolder, TemplateSource};
use dbforge_core::{ForgeError, ForgeResult};

use super::Command;
use crate::console::{Argument, ArgumentMode, Definition, Opt, OptionMode};
use crate::context::CommandContext;

#[derive(Debug, Clone, Copy, Default)]
pub struct MakeMigration;

#[async_trait]
impl Command for MakeMigration {
    fn name(&self) -> &'static str {
        "make:migration"
    }

    fn description(&self) -> &'static str {
        "Create a new migration"
    }

    fn help(&self) -> &'static str {
        "Creates a new database migration"
    }

    fn definition(&self) -> Definition {
        Definition::new()
            .argument(Argument::new(
                "name",
                ArgumentMode::REQUIRED,
                "What is the name of the migration?",
            ))
            .option(Opt::new(
                "template",
                Some('t'),
                OptionMode::REQUIRED,
                "Use an alternative template",
            ))
            .option(Opt::new(
                "class",
                Some('l'),
                OptionMode::REQUIRED,
                "Use a registered template generator to produce the template",
            ))
            .option(Opt::new(
                "path",
                None,
                OptionMode::REQUIRED,
                "Specify the path in which to create this migration",
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
            None => ctx.resolve_path(&settings.path),
        };

        let source = TemplateSource::resolve(
            input.option("template")?.non_empty().map(|t| ctx.resolve_path(&PathBuf::from(t))),
            input.option("class")?.non_empty().map(str::to_string),
            settings.template.as_deref().map(|t| ctx.resolve_path(t)),
            settings.template_class.clone().filter(|c| !c.is_empty()),
        )?;

        let outcome = Scaffolder::new(ctx.generators())
            .namespace(settings.namespace.clone())
            .relative_to(ctx.working_dir())
            .create_migration(&class_name, &dir, &source, &mut |question| {
                output.confirm(&input, question, true)
            })?;

        for message in &outcome.messages {
            output.writeln(message);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::{Input, Output, OutputBuffer};
    use crate::settings::Settings;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn run(dir: &TempDir, settings: Settings, tokens: &[&str]) -> (ForgeResult<()>, OutputBuffer) {
        let input = Arc::new(Input::new(tokens.iter().copied()));
        input.set_interactive(false);
        input.bind(&MakeMigration.definition()).unwrap();
        let (output, buffer) = Output::buffered();
        let mut ctx = CommandContext::new(settings, input, Arc::new(output), dir.path());

        let result = MakeMigration.execute(&mut ctx).await;
        (result, buffer)
    }

    fn migration_files(dir: &std::path::Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_creates_migration_in_default_directory() {
        let dir = TempDir::new().unwrap();
        let (result, buffer) = run(&dir, Settings::default(), &["make:migration", "CreateUsersTable"]).await;
        result.unwrap();

        let files = migration_files(&dir.path().join("database/migrations"));
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("_create_users_table.rs"));

        let lines = buffer.lines();
        assert_eq!(lines[0], "using migration base class dbforge_driver::Migration");
        assert_eq!(lines[1], "using default template");
        assert_eq!(lines[2], format!("created database/migrations/{}", files[0]));
    }

    #[tokio::test]
    async fn test_template_and_class_together_fail() {
        let dir = TempDir::new().unwrap();
        let (result, _) = run(
            &dir,
            Settings::default(),
            &["make:migration", "CreateUsersTable", "-t", "a.stub", "-l", "create_table"],
        )
        .await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "Cannot use --template and --class at the same time"
        );
    }

    #[tokio::test]
    async fn test_path_option_and_configured_generator() {
        let dir = TempDir::new().unwrap();
        let mut settings = Settings::default();
        settings.migration.template_class = Some("create_table".into());

        let (result, buffer) = run(
            &dir,
            settings,
            &["make:migration", "CreatePostsTable", "--path", "db/schema"],
        )
        .await;
        result.unwrap();

        let files = migration_files(&dir.path().join("db/schema"));
        let contents = std::fs::read_to_string(dir.path().join("db/schema").join(&files[0])).unwrap();
        assert!(contents.contains("TableDefinition::new(\"posts\")"));
        assert_eq!(buffer.lines()[1], "using template creation class create_table");
    }

    #[tokio::test]
    async fn test_second_run_with_same_name_fails() {
        let dir = TempDir::new().unwrap();
        let (first, _) = run(&dir, Settings::default(), &["make:migration", "CreateUsersTable"]).await;
        first.unwrap();
        let (second, _) = run(&dir, Settings::default(), &["make:migration", "CreateUsersTable"]).await;
        assert!(second.unwrap_err().is_scaffold_conflict());
    }
}
