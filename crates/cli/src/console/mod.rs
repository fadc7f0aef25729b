//! # Console
//!
//! The host console the commands run on: command definitions, raw and
//! bound input, and tagged output.

pub mod definition;
pub mod formatter;
pub mod input;
pub mod output;

pub use definition::{Argument, ArgumentMode, Definition, Opt, OptionMode};
pub use input::{COMMAND_ARGUMENT, Input, InputValue};
pub use output::{Output, OutputBuffer};
