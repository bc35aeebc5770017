//! CLI module for rtlgen - command-line interface and subcommands.

pub mod commands;

pub use commands::Cli;
