//! Test helpers for sqlmerge integration tests
//!
//! This module provides helper functions and structs to simplify
//! writing integration tests for the sqlmerge binary.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Represents a test case for sqlmerge
pub struct SqlmergeTestCase {
    /// The SQL query to translate
    pub sql: String,
    /// Additional command line arguments
    pub args: Vec<String>,
    /// Expected strings in stdout
    pub expected_stdout: Vec<String>,
    /// Expected strings in stderr
    pub expected_stderr: Vec<String>,
    /// Whether the command is expected to succeed
    pub should_succeed: bool,
    /// Whether to use verbose mode
    pub verbose: bool,
}

impl Default for SqlmergeTestCase {
    fn default() -> Self {
        SqlmergeTestCase {
            sql: String::new(),
            args: Vec::new(),
            expected_stdout: Vec::new(),
            expected_stderr: Vec::new(),
            should_succeed: true,
            verbose: false,
        }
    }
}

/// Run sqlmerge with the test case's query and check its expectations
pub fn run_test_case(test_case: SqlmergeTestCase) -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("sqlmerge")?;

    cmd.arg("-s").arg(&test_case.sql);

    if test_case.verbose {
        cmd.arg("-v");
    }

    for arg in &test_case.args {
        cmd.arg(arg);
    }

    let mut assert = cmd.assert();

    if test_case.should_succeed {
        assert = assert.success();
    } else {
        assert = assert.failure();
    }

    for expected in test_case.expected_stdout {
        assert = assert.stdout(predicate::str::contains(expected));
    }

    for expected in test_case.expected_stderr {
        assert = assert.stderr(predicate::str::contains(expected));
    }

    Ok(())
}

/// Helper function to create a temp directory for tests, respecting CARGO_TARGET_TMPDIR if set
pub fn create_temp_dir() -> Result<TempDir, Box<dyn std::error::Error>> {
    if let Ok(cargo_target_tmpdir) = env::var("CARGO_TARGET_TMPDIR") {
        fs::create_dir_all(&cargo_target_tmpdir)?;
        let temp_dir = TempDir::new_in(cargo_target_tmpdir)?;
        Ok(temp_dir)
    } else {
        let temp_dir = TempDir::new()?;
        Ok(temp_dir)
    }
}

/// Helper function to write a query file for `--file` tests
pub fn create_query_file(
    dir: &Path,
    filename: &str,
    sql: &str,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let file_path = dir.join(filename);
    fs::write(&file_path, sql)?;
    Ok(file_path)
}

/// Helper function to get the path to the static example query
pub fn get_static_query_file() -> PathBuf {
    PathBuf::from("tests/data/left_join.sql")
}
