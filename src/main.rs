//! sqlmerge - translate SQL join queries into dataframe operations
//!
//! This tool reads `SELECT ... FROM ... JOIN ... ON ... WHERE ...` queries and
//! prints the equivalent pandas code: one merge per join, then the row
//! filter, then the column projection.
//!
//! # Program Flow
//!
//! 1. Parse command-line arguments
//! 2. Initialize logging
//! 3. Translate each query in order
//! 4. Print each translation to stdout

mod cli;
mod config;

use std::fs;

use anyhow::{Context, Result};
use log::{debug, info};

use config::{AppConfig, OutputFormat};
use sqlmerge::translate;

fn main() -> Result<()> {
    let args = cli::parse_args()?;
    let config = AppConfig::new(args.verbose, args.format);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_filter()))
        .init();
    debug!("Arguments: {args:?}");

    let mut queries = args.sql.clone();
    if let Some(path) = &args.file {
        let sql = fs::read_to_string(path)
            .with_context(|| format!("Failed to read query file: {}", path.display()))?;
        queries.push(sql);
    }

    for sql in &queries {
        let sql = sql.trim();
        info!("Translating SQL: {sql}");

        let translation =
            translate(sql).with_context(|| format!("Failed to translate SQL: {sql}"))?;

        match config.output_format() {
            OutputFormat::Pandas => print!("{}", translation.to_pandas()),
            OutputFormat::Json => println!(
                "{}",
                translation
                    .to_json()
                    .context("Failed to serialize translation")?
            ),
        }
    }

    Ok(())
}
