//! Configuration module for sqlmerge
//!
//! This module provides a centralized configuration structure for the application.
//! It handles global settings that are passed down through the application rather
//! than using global state or passing individual settings.

use clap::ValueEnum;

/// How translations are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// A pandas script
    Pandas,
    /// The merge instructions, filters and join tree as JSON
    Json,
}

/// Application configuration
///
/// This struct encapsulates all global configuration settings for the application.
/// It is created at startup and passed to components that need access to configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Whether to show verbose output
    verbose: bool,

    /// Output format for each translated query
    output_format: OutputFormat,
}

impl AppConfig {
    /// Create a new application configuration
    ///
    /// # Arguments
    /// * `verbose` - Whether to show verbose output
    /// * `output_format` - How to print each translation
    pub fn new(verbose: bool, output_format: OutputFormat) -> Self {
        Self {
            verbose,
            output_format,
        }
    }

    /// Get the verbose flag
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Get the output format
    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    /// Default log filter for this configuration
    ///
    /// Verbose mode shows the resolver's debug trace; otherwise only warnings.
    pub fn log_filter(&self) -> String {
        let level = if self.verbose() { "debug" } else { "warn" };
        format!("sqlmerge={}", level)
    }
}
