//! Command-line argument definitions for the bringlist CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the template file, the filter the list
//! is evaluated against, the output format, and logging verbosity.

use clap::{Parser, ValueEnum};

/// Command-line arguments for the bringlist tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the template file; omit to use the built-in template
    #[arg(help = "Path to the template file")]
    pub template: Option<String>,

    /// Trip length in nights
    #[arg(short, long, default_value_t = 7)]
    pub nights: i64,

    /// Activate a tag (repeatable)
    #[arg(short, long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Output format for the compiled list
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Compile and report warnings without printing the list
    #[arg(long)]
    pub check_only: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

/// How the compiled list is printed.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// The packing list visible under the filter, as plain text
    Text,
    /// The whole compiled document as JSON
    Json,
}
