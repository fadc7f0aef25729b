//! # Application
//!
//! Builds the top-level `clap` command from the registered commands,
//! applies the global options, dispatches and turns the outcome into an
//! exit code.
//!
//! ```text
//! argv ──► clap (globals + subcommands) ──► Input (tokens from the command name on)
//!                                              │ bind + validate
//!                                              ▼
//!                     Settings ──► CommandContext ──► Command::execute
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{ArgAction, Args, FromArgMatches};
use dbforge_codegen::GeneratorRegistry;
use dbforge_core::{ForgeError, ForgeResult, Verbosity};
use dbforge_driver::{DriverFactory, SeedRegistry};
use tracing::{debug, error};

use crate::commands::{Command, builtin_commands};
use crate::console::{Input, Output};
use crate::context::CommandContext;
use crate::settings::Settings;

// ============================================================================
// Global options
// ============================================================================

/// Options accepted by every command
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Increase the verbosity of messages: 1 for normal output, 2 for more verbose output and 3 for debug
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Do not output any message
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Do not ask any interactive question
    #[arg(short = 'n', long = "no-interaction", global = true)]
    pub no_interaction: bool,

    /// Disable ANSI output
    #[arg(long = "no-ansi", global = true)]
    pub no_ansi: bool,

    /// Settings file (defaults to ./dbforge.toml)
    #[arg(long, env = "DBFORGE_CONFIG", global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print SQL statements instead of executing them
    #[arg(long = "dry-run", global = true)]
    pub dry_run: bool,

    /// Database password, replacing the configured one
    #[arg(long = "db-password", env = "DBFORGE_DB_PASSWORD", global = true, hide = true, hide_env_values = true)]
    pub db_password: Option<String>,
}

impl GlobalArgs {
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            Verbosity::from_occurrences(self.verbose)
        }
    }
}

// ============================================================================
// Application
// ============================================================================

pub struct Application {
    commands: Vec<Box<dyn Command>>,
    factory: DriverFactory,
    seeds: SeedRegistry,
    generators: GeneratorRegistry,
    output: Option<Arc<Output>>,
    working_dir: Option<PathBuf>,
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

impl Application {
    /// Stock commands, built-in drivers and generators, and every seed
    /// registered with `register_seed!`
    pub fn new() -> Self {
        Self {
            commands: builtin_commands(),
            factory: DriverFactory::with_builtins(),
            seeds: SeedRegistry::discover(),
            generators: GeneratorRegistry::with_builtins(),
            output: None,
            working_dir: None,
        }
    }

    pub fn with_seeds(mut self, seeds: SeedRegistry) -> Self {
        self.seeds = seeds;
        self
    }

    pub fn with_factory(mut self, factory: DriverFactory) -> Self {
        self.factory = factory;
        self
    }

    pub fn with_generators(mut self, generators: GeneratorRegistry) -> Self {
        self.generators = generators;
        self
    }

    /// Write to `output` instead of stdout
    pub fn with_output(mut self, output: Arc<Output>) -> Self {
        self.output = Some(output);
        self
    }

    /// Resolve relative paths against `dir` instead of the process directory
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Add a command, replacing one with the same name
    pub fn add_command(&mut self, command: Box<dyn Command>) -> &mut Self {
        self.commands.retain(|c| c.name() != command.name());
        self.commands.push(command);
        self
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.commands.iter().map(|c| c.name()).collect()
    }

    /// The top-level `clap` command
    pub fn cli(&self) -> clap::Command {
        let root = clap::Command::new("dbforge")
            .version(dbforge_core::VERSION)
            .about("MySQL migration scaffolding, schema builder and seed runner")
            .subcommand_required(true)
            .arg_required_else_help(true);
        let root = GlobalArgs::augment_args(root);

        root.subcommands(self.commands.iter().map(|command| {
            let mut sub = clap::Command::new(command.name())
                .about(command.description())
                .args(command.definition().to_clap_args());
            if !command.help().is_empty() {
                sub = sub.after_help(command.help());
            }
            sub
        }))
    }

    /// Run with the given arguments (program name first) and return the
    /// process exit code
    pub async fn run(self, args: Vec<String>) -> i32 {
        let matches = match self.cli().try_get_matches_from(&args) {
            Ok(matches) => matches,
            Err(err) => {
                let code = err.exit_code();
                if let Err(e) = err.print() {
                    error!(error = %e, "Failed to print usage");
                }
                return code;
            }
        };

        let output = self
            .output
            .clone()
            .unwrap_or_else(|| Arc::new(Output::stdout()));

        let globals = match GlobalArgs::from_arg_matches(&matches) {
            Ok(globals) => globals,
            Err(err) => {
                output.error(&err.to_string());
                return 1;
            }
        };

        output.set_verbosity(globals.verbosity());
        if globals.no_ansi {
            output.set_decorated(false);
        }
        colored::control::set_override(output.is_decorated());

        let Some((name, _)) = matches.subcommand() else {
            return 1;
        };
        let tokens = command_tokens(&args, name);

        match self.dispatch(name, tokens, &globals, output.clone()).await {
            Ok(()) => 0,
            Err(err) => {
                debug!(error = ?err, "Command failed");
                output.error(&err.to_string());
                1
            }
        }
    }

    async fn dispatch(
        self,
        name: &str,
        tokens: Vec<String>,
        globals: &GlobalArgs,
        output: Arc<Output>,
    ) -> ForgeResult<()> {
        let Application {
            commands,
            factory,
            seeds,
            generators,
            working_dir,
            ..
        } = self;

        let command = commands
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| ForgeError::InputValidation(format!("Command \"{}\" is not defined.", name)))?;

        let input = Arc::new(Input::new(tokens));
        input.set_interactive(!globals.no_interaction);
        input.bind(&command.definition())?;
        input.validate()?;

        let working_dir = match working_dir {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        let settings = Settings::load(globals.config.as_deref(), &working_dir)?;

        let mut ctx = CommandContext::new(settings, input, output, working_dir)
            .with_factory(factory)
            .with_seeds(seeds)
            .with_generators(generators)
            .dry_run(globals.dry_run)
            .password(globals.db_password.clone());

        debug!(command = name, "Executing command");
        command.execute(&mut ctx).await
    }
}

/// Tokens from the command name on, skipping the program name and any
/// global options placed before the command
fn command_tokens(args: &[String], name: &str) -> Vec<String> {
    let start = args
        .iter()
        .skip(1)
        .position(|arg| arg == name)
        .map(|index| index + 1)
        .unwrap_or(1);
    args.iter().skip(start).cloned().collect()
}
