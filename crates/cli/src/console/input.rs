//! Console input
//!
//! An [`Input`] keeps the raw command line tokens of one invocation, the
//! command name first. Raw tokens can be inspected before any definition is
//! known; [`Input::bind`] parses them against a [`Definition`] and keeps the
//! resulting argument and option values.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use clap::{Arg, ArgMatches, Args, value_parser};
use dbforge_core::{ForgeError, ForgeResult};
use tracing::debug;

use super::definition::Definition;
use crate::application::GlobalArgs;

/// Name of the argument holding the command name
pub const COMMAND_ARGUMENT: &str = "command";

// ============================================================================
// InputValue
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputValue {
    #[default]
    None,
    Flag(bool),
    Text(String),
    List(Vec<String>),
}

impl InputValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            InputValue::Text(text) => Some(text),
            InputValue::List(values) => values.first().map(String::as_str),
            _ => None,
        }
    }

    /// Text value, with empty text treated as absent
    pub fn non_empty(&self) -> Option<&str> {
        self.as_str().filter(|text| !text.is_empty())
    }

    pub fn to_vec(&self) -> Vec<String> {
        match self {
            InputValue::None | InputValue::Flag(_) => Vec::new(),
            InputValue::Text(text) => vec![text.clone()],
            InputValue::List(values) => values.clone(),
        }
    }

    pub fn is_set(&self) -> bool {
        match self {
            InputValue::None => false,
            InputValue::Flag(flag) => *flag,
            InputValue::Text(_) => true,
            InputValue::List(values) => !values.is_empty(),
        }
    }
}

impl From<&str> for InputValue {
    fn from(value: &str) -> Self {
        InputValue::Text(value.to_string())
    }
}

impl From<bool> for InputValue {
    fn from(value: bool) -> Self {
        InputValue::Flag(value)
    }
}

// ============================================================================
// Input
// ============================================================================

#[derive(Debug, Default)]
struct Bound {
    definition: Definition,
    arguments: BTreeMap<String, InputValue>,
    options: BTreeMap<String, InputValue>,
}

#[derive(Debug)]
pub struct Input {
    tokens: Vec<String>,
    interactive: AtomicBool,
    bound: Mutex<Bound>,
}

impl Input {
    pub fn new<I, T>(tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
            interactive: AtomicBool::new(true),
            bound: Mutex::new(Bound::default()),
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    fn bound(&self) -> MutexGuard<'_, Bound> {
        self.bound.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ====================================================================
    // Raw token inspection
    // ====================================================================

    /// First token that is not an option
    pub fn first_argument(&self) -> Option<String> {
        self.tokens
            .iter()
            .find(|token| !token.starts_with('-'))
            .cloned()
    }

    /// Whether any of `names` (e.g. `--seed`, `-s`) appears in the raw
    /// tokens. With `only_params`, scanning stops at `--`.
    pub fn has_parameter_option(&self, names: &[&str], only_params: bool) -> bool {
        for token in &self.tokens {
            if only_params && token == "--" {
                return false;
            }
            if names.iter().any(|name| matches_option(token, name)) {
                return true;
            }
        }
        false
    }

    /// Raw value of the first of `names` found in the tokens. Handles
    /// `--name=value`, `--name value`, `-s value` and `-svalue`.
    pub fn parameter_option(&self, names: &[&str], default: InputValue, only_params: bool) -> InputValue {
        let mut tokens = self.tokens.iter();
        while let Some(token) = tokens.next() {
            if only_params && token == "--" {
                return default;
            }
            for name in names {
                if token == name {
                    return match tokens.next() {
                        Some(value) => InputValue::Text(value.clone()),
                        None => InputValue::None,
                    };
                }
                let leading = if name.starts_with("--") {
                    format!("{}=", name)
                } else {
                    name.to_string()
                };
                if !leading.is_empty() && token.starts_with(&leading) {
                    return InputValue::Text(token[leading.len()..].to_string());
                }
            }
        }
        default
    }

    // ====================================================================
    // Binding
    // ====================================================================

    /// Parse the raw tokens against a definition. The command name and the
    /// global options are always accepted.
    pub fn bind(&self, definition: &Definition) -> ForgeResult<()> {
        let command = clap::Command::new("dbforge")
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .arg(Arg::new(COMMAND_ARGUMENT).value_parser(value_parser!(String)))
            .args(definition.to_clap_args());
        let command = GlobalArgs::augment_args(command);

        let matches = command
            .try_get_matches_from(&self.tokens)
            .map_err(|e| ForgeError::InputValidation(clap_message(&e)))?;

        let mut arguments = BTreeMap::new();
        arguments.insert(
            COMMAND_ARGUMENT.to_string(),
            read_value(&matches, COMMAND_ARGUMENT, false, &InputValue::None)?,
        );
        for argument in &definition.arguments {
            let value = read_value(&matches, &argument.name, argument.is_array(), &argument.default)?;
            arguments.insert(argument.name.clone(), value);
        }

        let mut options = BTreeMap::new();
        for option in &definition.options {
            let value = if option.mode.accepts_value() {
                read_value(&matches, &option.name, option.is_array(), &option.default)?
            } else {
                let flag = matches
                    .try_get_one::<bool>(&option.name)
                    .map_err(|e| ForgeError::internal(e.to_string()))?;
                InputValue::Flag(flag.copied().unwrap_or(false))
            };
            options.insert(option.name.clone(), value);
        }

        debug!(
            arguments = arguments.len(),
            options = options.len(),
            "Bound console input"
        );
        *self.bound() = Bound {
            definition: definition.clone(),
            arguments,
            options,
        };
        Ok(())
    }

    /// Check every required argument has a value
    pub fn validate(&self) -> ForgeResult<()> {
        let bound = self.bound();
        let missing: Vec<&str> = bound
            .definition
            .arguments
            .iter()
            .filter(|argument| argument.is_required())
            .filter(|argument| {
                !bound
                    .arguments
                    .get(&argument.name)
                    .is_some_and(InputValue::is_set)
            })
            .map(|argument| argument.name.as_str())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ForgeError::InputValidation(format!(
                "Not enough arguments (missing: \"{}\").",
                missing.join(", ")
            )))
        }
    }

    // ====================================================================
    // Arguments
    // ====================================================================

    pub fn arguments(&self) -> BTreeMap<String, InputValue> {
        self.bound().arguments.clone()
    }

    pub fn argument(&self, name: &str) -> ForgeResult<InputValue> {
        self.bound()
            .arguments
            .get(name)
            .cloned()
            .ok_or_else(|| ForgeError::argument_not_found(name))
    }

    pub fn set_argument(&self, name: &str, value: InputValue) -> ForgeResult<()> {
        let mut bound = self.bound();
        if !bound.arguments.contains_key(name) {
            return Err(ForgeError::argument_not_found(name));
        }
        bound.arguments.insert(name.to_string(), value);
        Ok(())
    }

    pub fn has_argument(&self, name: &str) -> bool {
        self.bound().arguments.contains_key(name)
    }

    // ====================================================================
    // Options
    // ====================================================================

    pub fn options(&self) -> BTreeMap<String, InputValue> {
        self.bound().options.clone()
    }

    pub fn option(&self, name: &str) -> ForgeResult<InputValue> {
        self.bound()
            .options
            .get(name)
            .cloned()
            .ok_or_else(|| ForgeError::option_not_found(name))
    }

    pub fn set_option(&self, name: &str, value: InputValue) -> ForgeResult<()> {
        let mut bound = self.bound();
        if !bound.options.contains_key(name) {
            return Err(ForgeError::option_not_found(name));
        }
        bound.options.insert(name.to_string(), value);
        Ok(())
    }

    pub fn has_option(&self, name: &str) -> bool {
        self.bound().options.contains_key(name)
    }

    // ====================================================================
    // Interactivity
    // ====================================================================

    pub fn is_interactive(&self) -> bool {
        self.interactive.load(Ordering::Relaxed)
    }

    pub fn set_interactive(&self, interactive: bool) {
        self.interactive.store(interactive, Ordering::Relaxed);
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn matches_option(token: &str, name: &str) -> bool {
    if token == name {
        return true;
    }
    if name.starts_with("--") {
        token.starts_with(&format!("{}=", name))
    } else {
        !name.is_empty() && !token.starts_with("--") && token.starts_with(name)
    }
}

fn read_value(
    matches: &ArgMatches,
    id: &str,
    is_array: bool,
    default: &InputValue,
) -> ForgeResult<InputValue> {
    if is_array {
        let values = matches
            .try_get_many::<String>(id)
            .map_err(|e| ForgeError::internal(e.to_string()))?;
        return Ok(match values {
            Some(values) => InputValue::List(values.cloned().collect()),
            None if default.is_set() => default.clone(),
            None => InputValue::List(Vec::new()),
        });
    }

    let value = matches
        .try_get_one::<String>(id)
        .map_err(|e| ForgeError::internal(e.to_string()))?;
    Ok(match value {
        Some(value) => InputValue::Text(value.clone()),
        None => default.clone(),
    })
}

/// First line of a clap error without the `error: ` prefix
fn clap_message(error: &clap::Error) -> String {
    let rendered = error.to_string();
    let line = rendered.lines().next().unwrap_or_default();
    line.strip_prefix("error: ").unwrap_or(line).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::definition::{Argument, ArgumentMode, Opt, OptionMode};
    use pretty_assertions::assert_eq;

    fn seed_definition() -> Definition {
        Definition::new().option(Opt::new(
            "seed",
            Some('s'),
            OptionMode::REQUIRED | OptionMode::IS_ARRAY,
            "What is the name of the seeder?",
        ))
    }

    fn migration_definition() -> Definition {
        Definition::new()
            .argument(Argument::new("name", ArgumentMode::REQUIRED, "What is the name of the migration?"))
            .option(Opt::new("template", Some('t'), OptionMode::REQUIRED, ""))
            .option(Opt::new("path", None, OptionMode::REQUIRED, ""))
    }

    #[test]
    fn test_raw_inspection() {
        let input = Input::new(["db:seed", "-sUserSeeder", "--path=db", "--", "--seed=Late"]);

        assert_eq!(input.first_argument().as_deref(), Some("db:seed"));
        assert!(input.has_parameter_option(&["--path"], false));
        assert!(input.has_parameter_option(&["-s"], true));
        assert!(!input.has_parameter_option(&["--seed"], true));
        assert!(input.has_parameter_option(&["--seed"], false));

        assert_eq!(
            input.parameter_option(&["-s", "--seed"], InputValue::None, true),
            InputValue::from("UserSeeder")
        );
        assert_eq!(
            input.parameter_option(&["--path"], InputValue::None, false),
            InputValue::from("db")
        );
        assert_eq!(
            input.parameter_option(&["--missing"], InputValue::from("x"), true),
            InputValue::from("x")
        );
    }

    #[test]
    fn test_parameter_option_separate_value() {
        let input = Input::new(["make:migration", "--template", "custom.stub", "Foo"]);
        assert_eq!(
            input.parameter_option(&["--template"], InputValue::None, true),
            InputValue::from("custom.stub")
        );
    }

    #[test]
    fn test_bind_arguments_and_options() {
        let input = Input::new(["make:migration", "CreateUsers", "-t", "a.stub", "-v"]);
        input.bind(&migration_definition()).unwrap();
        input.validate().unwrap();

        assert_eq!(input.argument("command").unwrap(), InputValue::from("make:migration"));
        assert_eq!(input.argument("name").unwrap(), InputValue::from("CreateUsers"));
        assert_eq!(input.option("template").unwrap(), InputValue::from("a.stub"));
        assert_eq!(input.option("path").unwrap(), InputValue::None);
        assert!(input.has_option("path"));
        assert!(!input.has_option("seed"));
    }

    #[test]
    fn test_array_option_collects_every_value() {
        let input = Input::new(["db:seed", "-s", "A", "--seed", "B", "-sC"]);
        input.bind(&seed_definition()).unwrap();
        assert_eq!(
            input.option("seed").unwrap().to_vec(),
            vec!["A".to_string(), "B".to_string(), "C".to_string()]
        );

        let input = Input::new(["db:seed"]);
        input.bind(&seed_definition()).unwrap();
        assert_eq!(input.option("seed").unwrap(), InputValue::List(Vec::new()));
    }

    #[test]
    fn test_missing_required_argument() {
        let input = Input::new(["make:migration"]);
        input.bind(&migration_definition()).unwrap();
        let err = input.validate().unwrap_err();
        assert_eq!(err.to_string(), "Not enough arguments (missing: \"name\").");
    }

    #[test]
    fn test_unknown_names_fail() {
        let input = Input::new(["db:seed"]);
        input.bind(&seed_definition()).unwrap();

        assert!(input.argument("nope").is_err());
        assert!(input.option("nope").is_err());
        let err = input.set_option("nope", InputValue::None).unwrap_err();
        assert_eq!(err.to_string(), "The \"nope\" option does not exist.");

        input.set_option("seed", InputValue::List(vec!["X".into()])).unwrap();
        assert_eq!(input.option("seed").unwrap().as_str(), Some("X"));
    }

    #[test]
    fn test_unknown_token_is_a_validation_error() {
        let input = Input::new(["db:seed", "--bogus"]);
        let err = input.bind(&seed_definition()).unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_interactive_flag() {
        let input = Input::new(["db:seed"]);
        assert!(input.is_interactive());
        input.set_interactive(false);
        assert!(!input.is_interactive());
    }
}
