//! Command-line argument definitions for the gmdsl CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Global flags select the configuration file and logging
//! verbosity; the [`Command`] chooses what to do with the input.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command-line arguments for the gmdsl schema tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse, resolve and validate a schema
    Validate {
        /// Path to the input schema file
        input: PathBuf,

        /// Extra directory to search for imported namespaces
        #[arg(short = 'I', long = "include")]
        include: Vec<PathBuf>,
    },

    /// Validate a schema and run a generator over it
    Generate {
        /// Path to the input schema file
        input: PathBuf,

        /// Name of the generator to run
        #[arg(short, long)]
        generator: String,

        /// Directory the artifacts are written to
        #[arg(short, long, default_value = "out")]
        output: PathBuf,

        /// Extra directory to search for imported namespaces
        #[arg(short = 'I', long = "include")]
        include: Vec<PathBuf>,
    },

    /// Pretty-print a schema
    Fmt {
        /// Path to the input schema file
        input: PathBuf,

        /// Rewrite the file in place instead of printing to stdout
        #[arg(short, long)]
        write: bool,
    },

    /// List the available generators
    Generators,
}
