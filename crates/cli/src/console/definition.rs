//! Command definitions
//!
//! A [`Definition`] lists the positional arguments and the options a
//! command accepts. It is turned into `clap` arguments both for the
//! top-level parser and when an [`Input`](super::Input) is bound.

use bitflags::bitflags;
use clap::{Arg, ArgAction, value_parser};

use super::input::InputValue;

// ============================================================================
// Modes
// ============================================================================

bitflags! {
    /// Bit set describing a positional argument
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ArgumentMode: u32 {
        const REQUIRED = 1;
        const OPTIONAL = 1 << 1;
        const IS_ARRAY = 1 << 2;
    }
}

bitflags! {
    /// Bit set describing an option
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OptionMode: u32 {
        const NONE = 1;
        const REQUIRED = 1 << 1;
        const OPTIONAL = 1 << 2;
        const IS_ARRAY = 1 << 3;
    }
}

impl OptionMode {
    /// Whether the option takes a value at all
    pub const fn accepts_value(self) -> bool {
        self.intersects(Self::REQUIRED.union(Self::OPTIONAL))
    }
}

// ============================================================================
// Argument
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub name: String,
    pub mode: ArgumentMode,
    pub description: String,
    pub default: InputValue,
}

impl Argument {
    pub fn new(name: impl Into<String>, mode: ArgumentMode, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode,
            description: description.into(),
            default: InputValue::None,
        }
    }

    pub fn with_default(mut self, default: InputValue) -> Self {
        self.default = default;
        self
    }

    pub fn is_required(&self) -> bool {
        self.mode.contains(ArgumentMode::REQUIRED)
    }

    pub fn is_array(&self) -> bool {
        self.mode.contains(ArgumentMode::IS_ARRAY)
    }

    /// Positional `clap` argument. Requirement is checked by
    /// [`Input::validate`](super::Input::validate), not by clap.
    pub fn to_clap(&self) -> Arg {
        let mut arg = Arg::new(self.name.clone())
            .help(self.description.clone())
            .value_name(self.name.to_uppercase())
            .value_parser(value_parser!(String));
        arg = if self.is_array() {
            arg.num_args(1..).action(ArgAction::Append)
        } else {
            arg.num_args(1).action(ArgAction::Set)
        };
        arg
    }
}

// ============================================================================
// Opt
// ============================================================================

/// Command option (`--name`, `-s`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opt {
    pub name: String,
    pub shortcut: Option<char>,
    pub mode: OptionMode,
    pub description: String,
    pub default: InputValue,
}

impl Opt {
    pub fn new(
        name: impl Into<String>,
        shortcut: Option<char>,
        mode: OptionMode,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            shortcut,
            mode,
            description: description.into(),
            default: InputValue::None,
        }
    }

    pub fn with_default(mut self, default: InputValue) -> Self {
        self.default = default;
        self
    }

    pub fn is_array(&self) -> bool {
        self.mode.contains(OptionMode::IS_ARRAY)
    }

    pub fn to_clap(&self) -> Arg {
        let mut arg = Arg::new(self.name.clone())
            .long(self.name.clone())
            .help(self.description.clone());
        if let Some(short) = self.shortcut {
            arg = arg.short(short);
        }

        if !self.mode.accepts_value() {
            return arg.action(ArgAction::SetTrue);
        }

        arg = arg
            .value_name(self.name.to_uppercase())
            .value_parser(value_parser!(String));
        if self.mode.contains(OptionMode::OPTIONAL) {
            arg = arg.num_args(0..=1).default_missing_value("");
        } else {
            arg = arg.num_args(1);
        }
        if self.is_array() {
            arg.action(ArgAction::Append)
        } else {
            arg.action(ArgAction::Set)
        }
    }
}

// ============================================================================
// Definition
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Definition {
    pub arguments: Vec<Argument>,
    pub options: Vec<Opt>,
}

impl Definition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn argument(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn option(mut self, option: Opt) -> Self {
        self.options.push(option);
        self
    }

    pub fn find_argument(&self, name: &str) -> Option<&Argument> {
        self.arguments.iter().find(|a| a.name == name)
    }

    pub fn find_option(&self, name: &str) -> Option<&Opt> {
        self.options.iter().find(|o| o.name == name)
    }

    /// Find an option by its one-letter shortcut
    pub fn find_shortcut(&self, shortcut: char) -> Option<&Opt> {
        self.options.iter().find(|o| o.shortcut == Some(shortcut))
    }

    /// Every argument and option as `clap` arguments, positionals first
    pub fn to_clap_args(&self) -> Vec<Arg> {
        self.arguments
            .iter()
            .map(Argument::to_clap)
            .chain(self.options.iter().map(Opt::to_clap))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mode_bits() {
        let mode = OptionMode::REQUIRED | OptionMode::IS_ARRAY;
        assert_eq!(mode.bits(), 10);
        assert!(mode.accepts_value());
        assert!(!OptionMode::NONE.accepts_value());
        assert!((ArgumentMode::REQUIRED | ArgumentMode::IS_ARRAY).contains(ArgumentMode::IS_ARRAY));
    }

    #[test]
    fn test_mode_bits_match_driver_contract() {
        use dbforge_driver::io::{InputArgument, InputOption};

        assert_eq!(OptionMode::NONE.bits(), InputOption::VALUE_NONE);
        assert_eq!(OptionMode::REQUIRED.bits(), InputOption::VALUE_REQUIRED);
        assert_eq!(OptionMode::OPTIONAL.bits(), InputOption::VALUE_OPTIONAL);
        assert_eq!(OptionMode::IS_ARRAY.bits(), InputOption::VALUE_IS_ARRAY);
        assert_eq!(ArgumentMode::OPTIONAL.bits(), InputArgument::OPTIONAL);
        assert_eq!(
            OptionMode::from_bits_retain(InputOption::VALUE_REQUIRED | InputOption::VALUE_IS_ARRAY),
            OptionMode::REQUIRED | OptionMode::IS_ARRAY
        );
        assert_eq!(OptionMode::from_bits(64), None);
        assert_eq!(OptionMode::from_bits_retain(64).bits(), 64);
    }

    #[test]
    fn test_clap_shape() {
        let definition = Definition::new()
            .argument(Argument::new("name", ArgumentMode::REQUIRED, "Class name"))
            .option(Opt::new("seed", Some('s'), OptionMode::REQUIRED | OptionMode::IS_ARRAY, ""))
            .option(Opt::new("force", None, OptionMode::NONE, ""));
        let args = definition.to_clap_args();

        assert_eq!(args.len(), 3);
        assert!(args[0].is_positional());
        assert_eq!(args[1].get_short(), Some('s'));
        assert_eq!(args[1].get_long(), Some("seed"));
        assert!(matches!(args[1].get_action(), ArgAction::Append));
        assert!(matches!(args[2].get_action(), ArgAction::SetTrue));
        assert!(definition.find_shortcut('s').is_some());
    }
}
