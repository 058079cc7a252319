//! CLI module for toolbelt - command-line interface and subcommands.

pub mod commands;

pub use commands::Cli;
