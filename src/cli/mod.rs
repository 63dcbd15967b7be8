//! Command-line interface
//!
//! This module contains the CLI commands and argument parsing
//! for the state transition tool.

pub mod commands;

pub use commands::{Command, HexArg, Opt};
