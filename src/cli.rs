//! CLI argument parsing module for sqlmerge
//!
//! This module handles parsing command-line arguments using the clap crate.
//! Queries come from `-s` (repeatable) and/or a query file; each one is
//! translated independently and printed in the requested format.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::config::OutputFormat;

/// Command-line arguments for sqlmerge
#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "Translate SQL join queries into pandas merge code"
)]
pub struct SqlmergeArgs {
    /// SQL queries to translate
    ///
    /// Multiple queries can be provided; each is translated on its own.
    /// Example: -s "SELECT * FROM users u JOIN orders o ON u.id = o.user_id"
    #[clap(
        short,
        long,
        required_unless_present = "file",
        help = "SQL query to translate"
    )]
    pub sql: Vec<String>,

    /// Read one more query from a file
    #[clap(short, long, help = "File containing a SQL query to translate")]
    pub file: Option<PathBuf>,

    /// Output format
    #[clap(long, value_enum, default_value_t = OutputFormat::Pandas, help = "Output format")]
    pub format: OutputFormat,

    /// Enable verbose diagnostic output
    ///
    /// When enabled, logs each step of join resolution to stderr.
    #[clap(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

/// Parse command-line arguments into the SqlmergeArgs structure
pub fn parse_args() -> Result<SqlmergeArgs> {
    Ok(SqlmergeArgs::parse())
}
