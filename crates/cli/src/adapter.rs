//! # Console adapters
//!
//! Drivers talk to the console through the `dbforge_driver::io` contract.
//! These adapters present the host [`Input`] and [`Output`] through that
//! contract, and convert driver-side definitions into host definitions.
//!
//! Output options are a bitmask: the low group picks the format
//! (`OUTPUT_NORMAL`, `OUTPUT_RAW`, `OUTPUT_PLAIN`), the next group the
//! message verbosity. Missing or mixed bits in a group mean "normal".

use std::collections::BTreeMap;
use std::sync::Arc;

use dbforge_core::ForgeResult;
use dbforge_driver::io::{
    self, InputArgument, InputDefinition, InputInterface, InputOption, OutputInterface, ParamValue,
};

use crate::console::{Argument, ArgumentMode, Definition, Input, InputValue, Opt, OptionMode, Output};

// ============================================================================
// Values
// ============================================================================

fn to_param(value: InputValue) -> ParamValue {
    match value {
        InputValue::None => ParamValue::None,
        InputValue::Flag(flag) => ParamValue::Bool(flag),
        InputValue::Text(text) => ParamValue::Str(text),
        InputValue::List(values) => ParamValue::Array(values),
    }
}

fn to_input(value: ParamValue) -> InputValue {
    match value {
        ParamValue::None => InputValue::None,
        ParamValue::Bool(flag) => InputValue::Flag(flag),
        ParamValue::Str(text) => InputValue::Text(text),
        ParamValue::Array(values) => InputValue::List(values),
    }
}

fn to_params(values: BTreeMap<String, InputValue>) -> BTreeMap<String, ParamValue> {
    values
        .into_iter()
        .map(|(name, value)| (name, to_param(value)))
        .collect()
}

// ============================================================================
// Definition bridge
// ============================================================================

impl From<&InputArgument> for Argument {
    fn from(argument: &InputArgument) -> Self {
        Argument::new(
            argument.name.clone(),
            ArgumentMode::from_bits_retain(argument.mode),
            argument.description.clone(),
        )
        .with_default(to_input(argument.default.clone()))
    }
}

impl From<&InputOption> for Opt {
    fn from(option: &InputOption) -> Self {
        Opt::new(
            option.name.clone(),
            option.shortcut.as_deref().and_then(|s| s.chars().next()),
            OptionMode::from_bits_retain(option.mode),
            option.description.clone(),
        )
        .with_default(to_input(option.default.clone()))
    }
}

impl From<&InputDefinition> for Definition {
    fn from(definition: &InputDefinition) -> Self {
        Definition {
            arguments: definition.arguments.iter().map(Argument::from).collect(),
            options: definition.options.iter().map(Opt::from).collect(),
        }
    }
}

// ============================================================================
// OutputAdapter
// ============================================================================

#[derive(Debug, Clone)]
pub struct OutputAdapter {
    output: Arc<Output>,
}

impl OutputAdapter {
    pub fn new(output: Arc<Output>) -> Self {
        Self { output }
    }
}

impl OutputInterface for OutputAdapter {
    fn write(&self, messages: &[&str], newline: bool, options: u32) {
        self.output.write(
            messages,
            newline,
            io::output_format(options),
            io::message_verbosity(options),
        );
    }

    fn set_verbosity(&self, level: u32) {
        self.output.set_verbosity(io::verbosity_from_bits(level));
    }

    fn verbosity(&self) -> u32 {
        io::verbosity_bits(self.output.verbosity())
    }

    fn set_decorated(&self, decorated: bool) {
        self.output.set_decorated(decorated);
    }

    fn is_decorated(&self) -> bool {
        self.output.is_decorated()
    }
}

// ============================================================================
// InputAdapter
// ============================================================================

#[derive(Debug, Clone)]
pub struct InputAdapter {
    input: Arc<Input>,
}

impl InputAdapter {
    pub fn new(input: Arc<Input>) -> Self {
        Self { input }
    }
}

impl InputInterface for InputAdapter {
    fn first_argument(&self) -> Option<String> {
        self.input.first_argument()
    }

    fn has_parameter_option(&self, values: &[&str], only_params: bool) -> bool {
        self.input.has_parameter_option(values, only_params)
    }

    fn parameter_option(&self, values: &[&str], default: ParamValue, only_params: bool) -> ParamValue {
        to_param(self.input.parameter_option(values, to_input(default), only_params))
    }

    fn bind(&self, definition: &InputDefinition) -> ForgeResult<()> {
        self.input.bind(&Definition::from(definition))
    }

    fn validate(&self) -> ForgeResult<()> {
        self.input.validate()
    }

    fn arguments(&self) -> BTreeMap<String, ParamValue> {
        to_params(self.input.arguments())
    }

    fn argument(&self, name: &str) -> ForgeResult<ParamValue> {
        self.input.argument(name).map(to_param)
    }

    fn set_argument(&self, name: &str, value: ParamValue) -> ForgeResult<()> {
        self.input.set_argument(name, to_input(value))
    }

    fn has_argument(&self, name: &str) -> bool {
        self.input.has_argument(name)
    }

    fn options(&self) -> BTreeMap<String, ParamValue> {
        to_params(self.input.options())
    }

    fn option(&self, name: &str) -> ForgeResult<ParamValue> {
        self.input.option(name).map(to_param)
    }

    fn set_option(&self, name: &str, value: ParamValue) -> ForgeResult<()> {
        self.input.set_option(name, to_input(value))
    }

    fn has_option(&self, name: &str) -> bool {
        self.input.has_option(name)
    }

    fn is_interactive(&self) -> bool {
        self.input.is_interactive()
    }

    fn set_interactive(&self, interactive: bool) {
        self.input.set_interactive(interactive);
    }
}
