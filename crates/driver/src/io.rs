//! Input/output contract
//!
//! Drivers and seeds never talk to the terminal directly. They write to an
//! [`OutputInterface`] and read from an [`InputInterface`], both of which
//! the host application implements over its own console types.
//!
//! Output options are a bitmask with two fixed groups: the format bits
//! (`OUTPUT_*`) and the verbosity bits (`VERBOSITY_*`). A write passes one
//! bit from each group, or zero for the normal default.

use std::collections::BTreeMap;

use dbforge_core::{ForgeResult, OutputFormat, Verbosity};

// ============================================================================
// Output option bits
// ============================================================================

pub const OUTPUT_NORMAL: u32 = 1;
pub const OUTPUT_RAW: u32 = 2;
pub const OUTPUT_PLAIN: u32 = 4;

pub const VERBOSITY_QUIET: u32 = 16;
pub const VERBOSITY_NORMAL: u32 = 32;
pub const VERBOSITY_VERBOSE: u32 = 64;
pub const VERBOSITY_VERY_VERBOSE: u32 = 128;
pub const VERBOSITY_DEBUG: u32 = 256;

const FORMAT_MASK: u32 = OUTPUT_NORMAL | OUTPUT_RAW | OUTPUT_PLAIN;
const VERBOSITY_MASK: u32 = VERBOSITY_QUIET
    | VERBOSITY_NORMAL
    | VERBOSITY_VERBOSE
    | VERBOSITY_VERY_VERBOSE
    | VERBOSITY_DEBUG;

/// Format group of an options bitmask. Zero or unknown bits mean normal.
pub fn output_format(options: u32) -> OutputFormat {
    match options & FORMAT_MASK {
        OUTPUT_RAW => OutputFormat::Raw,
        OUTPUT_PLAIN => OutputFormat::Plain,
        _ => OutputFormat::Normal,
    }
}

/// Verbosity group of an options bitmask. Zero or unknown bits mean normal.
pub fn message_verbosity(options: u32) -> Verbosity {
    verbosity_from_bits(options & VERBOSITY_MASK)
}

/// Map a single verbosity bit to a level
pub fn verbosity_from_bits(bits: u32) -> Verbosity {
    match bits {
        VERBOSITY_QUIET => Verbosity::Quiet,
        VERBOSITY_VERBOSE => Verbosity::Verbose,
        VERBOSITY_VERY_VERBOSE => Verbosity::VeryVerbose,
        VERBOSITY_DEBUG => Verbosity::Debug,
        _ => Verbosity::Normal,
    }
}

/// Map a level to its verbosity bit
pub fn verbosity_bits(verbosity: Verbosity) -> u32 {
    match verbosity {
        Verbosity::Quiet => VERBOSITY_QUIET,
        Verbosity::Normal => VERBOSITY_NORMAL,
        Verbosity::Verbose => VERBOSITY_VERBOSE,
        Verbosity::VeryVerbose => VERBOSITY_VERY_VERBOSE,
        Verbosity::Debug => VERBOSITY_DEBUG,
    }
}

// ============================================================================
// Interfaces
// ============================================================================

/// Where drivers and seeds write progress messages
pub trait OutputInterface: Send + Sync {
    /// Write messages, optionally each followed by a newline.
    /// Messages above the current verbosity are dropped.
    fn write(&self, messages: &[&str], newline: bool, options: u32);

    fn writeln(&self, messages: &[&str], options: u32) {
        self.write(messages, true, options);
    }

    /// Set the verbosity from a `VERBOSITY_*` bit
    fn set_verbosity(&self, level: u32);

    /// Current verbosity as a `VERBOSITY_*` bit
    fn verbosity(&self) -> u32;

    fn is_quiet(&self) -> bool {
        self.verbosity() == VERBOSITY_QUIET
    }

    fn is_verbose(&self) -> bool {
        self.verbosity() >= VERBOSITY_VERBOSE
    }

    fn is_very_verbose(&self) -> bool {
        self.verbosity() >= VERBOSITY_VERY_VERBOSE
    }

    fn is_debug(&self) -> bool {
        self.verbosity() >= VERBOSITY_DEBUG
    }

    fn set_decorated(&self, decorated: bool);

    fn is_decorated(&self) -> bool;
}

/// Value of an argument or option
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ParamValue {
    /// Not given and no default
    #[default]
    None,
    /// Flag option
    Bool(bool),
    /// Single value
    Str(String),
    /// Repeated value
    Array(Vec<String>),
}

impl ParamValue {
    /// The single value, or the first of a repeated one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            ParamValue::Array(values) => values.first().map(String::as_str),
            _ => None,
        }
    }

    /// All values as a list
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            ParamValue::None | ParamValue::Bool(_) => Vec::new(),
            ParamValue::Str(s) => vec![s.clone()],
            ParamValue::Array(values) => values.clone(),
        }
    }

    /// Whether the value counts as "given"
    pub fn is_set(&self) -> bool {
        match self {
            ParamValue::None => false,
            ParamValue::Bool(b) => *b,
            ParamValue::Str(_) => true,
            ParamValue::Array(values) => !values.is_empty(),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

/// Where drivers and seeds read command input
pub trait InputInterface: Send + Sync {
    /// First positional token of the raw input
    fn first_argument(&self) -> Option<String>;

    /// Whether any of the given option tokens appears in the raw input
    fn has_parameter_option(&self, values: &[&str], only_params: bool) -> bool;

    /// Value of the first given option token found in the raw input
    fn parameter_option(&self, values: &[&str], default: ParamValue, only_params: bool)
        -> ParamValue;

    /// Re-parse the raw input against a definition
    fn bind(&self, definition: &InputDefinition) -> ForgeResult<()>;

    /// Check required arguments are present
    fn validate(&self) -> ForgeResult<()>;

    fn arguments(&self) -> BTreeMap<String, ParamValue>;

    fn argument(&self, name: &str) -> ForgeResult<ParamValue>;

    fn set_argument(&self, name: &str, value: ParamValue) -> ForgeResult<()>;

    fn has_argument(&self, name: &str) -> bool;

    fn options(&self) -> BTreeMap<String, ParamValue>;

    fn option(&self, name: &str) -> ForgeResult<ParamValue>;

    fn set_option(&self, name: &str, value: ParamValue) -> ForgeResult<()>;

    fn has_option(&self, name: &str) -> bool;

    fn is_interactive(&self) -> bool;

    fn set_interactive(&self, interactive: bool);
}

// ============================================================================
// Definitions
// ============================================================================

/// Positional argument of an input definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputArgument {
    pub name: String,
    pub mode: u32,
    pub description: String,
    pub default: ParamValue,
}

impl InputArgument {
    pub const REQUIRED: u32 = 1;
    pub const OPTIONAL: u32 = 2;
    pub const IS_ARRAY: u32 = 4;

    pub fn new(name: impl Into<String>, mode: u32, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode,
            description: description.into(),
            default: ParamValue::None,
        }
    }

    pub fn with_default(mut self, default: ParamValue) -> Self {
        self.default = default;
        self
    }

    pub fn is_required(&self) -> bool {
        self.mode & Self::REQUIRED != 0
    }

    pub fn is_array(&self) -> bool {
        self.mode & Self::IS_ARRAY != 0
    }
}

/// Named option of an input definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputOption {
    pub name: String,
    pub shortcut: Option<String>,
    /// `VALUE_*` bits
    pub mode: u32,
    pub description: String,
    pub default: ParamValue,
}

impl InputOption {
    pub const VALUE_NONE: u32 = 1;
    pub const VALUE_REQUIRED: u32 = 2;
    pub const VALUE_OPTIONAL: u32 = 4;
    pub const VALUE_IS_ARRAY: u32 = 8;

    pub fn new(
        name: impl Into<String>,
        shortcut: Option<&str>,
        mode: u32,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            shortcut: shortcut.map(str::to_string),
            mode,
            description: description.into(),
            default: ParamValue::None,
        }
    }

    pub fn with_default(mut self, default: ParamValue) -> Self {
        self.default = default;
        self
    }

    pub fn accepts_value(&self) -> bool {
        self.mode & (Self::VALUE_REQUIRED | Self::VALUE_OPTIONAL) != 0
    }

    pub fn is_value_required(&self) -> bool {
        self.mode & Self::VALUE_REQUIRED != 0
    }

    pub fn is_array(&self) -> bool {
        self.mode & Self::VALUE_IS_ARRAY != 0
    }
}

/// Arguments and options a command accepts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputDefinition {
    pub arguments: Vec<InputArgument>,
    pub options: Vec<InputOption>,
}

impl InputDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn argument(mut self, argument: InputArgument) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn option(mut self, option: InputOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn find_argument(&self, name: &str) -> Option<&InputArgument> {
        self.arguments.iter().find(|a| a.name == name)
    }

    pub fn find_option(&self, name: &str) -> Option<&InputOption> {
        self.options.iter().find(|o| o.name == name)
    }
}
