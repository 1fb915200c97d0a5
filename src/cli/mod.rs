//! Command-line interface module.

mod args;
pub mod preset;
pub mod preview;
pub mod run;
pub mod settings;

pub use args::{Cli, Commands, StyleArgs};
