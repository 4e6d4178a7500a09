//! Command-line interface module.

mod args;
pub mod extract;
pub mod store;

pub use args::{Cli, Commands, ExtractArgs};
