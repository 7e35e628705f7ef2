//! Job search providers for jobscout.

mod command;

pub use command::CommandProvider;
