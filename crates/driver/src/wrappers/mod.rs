//! Driver wrappers
//!
//! Each wrapper owns the next driver in the chain and forwards every
//! capability it does not augment.

pub mod prefix;
pub mod timed;

pub use prefix::PrefixDriver;
pub use timed::TimedDriver;
