//! CLI module for polytally - command-line flags.

pub mod commands;

pub use commands::Cli;
