//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - generate: one-shot generation for each test case
//! - rag: retrieval-augmented generation
//! - repair: agentic generate/validate/reflect loop
//! - serve: run the remote validation tool service

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// rtlgen - LLM-driven Verilog generation and repair
#[derive(Parser, Debug)]
#[command(name = "rtlgen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// One-shot generation for every test case under a directory
    Generate {
        /// Test case directory or dataset root
        dir: PathBuf,
    },

    /// Retrieval-augmented generation for every test case
    Rag {
        /// Test case directory or dataset root
        dir: PathBuf,
    },

    /// Agentic repair loop for every test case
    Repair {
        /// Test case directory or dataset root
        dir: PathBuf,

        /// Iteration budget per design
        #[arg(short = 'n', long, default_value_t = 3)]
        max_iterations: u32,

        /// Validate through the tool service at this address instead of
        /// invoking Icarus locally
        #[arg(long)]
        remote: Option<String>,

        /// Answer yes to every reflection confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Run the validation tool service
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:7171")]
        addr: String,
    },
}
