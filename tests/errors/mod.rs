//! Tests for queries sqlmerge refuses to translate
//!
//! Every error is fatal for the query: the binary exits non-zero and
//! prints no merge code.

use assert_cmd::Command;
use predicates::prelude::*;

use crate::helpers::{run_test_case, SqlmergeTestCase};

fn expect_failure(sql: &str, message: &str) -> Result<(), Box<dyn std::error::Error>> {
    run_test_case(SqlmergeTestCase {
        sql: sql.to_string(),
        should_succeed: false,
        expected_stderr: vec!["Failed to translate SQL".to_string(), message.to_string()],
        ..Default::default()
    })
}

#[test]
fn test_unsupported_relation() -> Result<(), Box<dyn std::error::Error>> {
    expect_failure(
        "SELECT * FROM t1 a FULL OUTER JOIN t2 b ON a.k = b.k",
        "Unsupported join relation: 'FULL OUTER JOIN' is not a supported join type",
    )
}

#[test]
fn test_missing_on_clause() -> Result<(), Box<dyn std::error::Error>> {
    expect_failure(
        "SELECT * FROM t1 a LEFT JOIN t2 b WHERE a.x = 1",
        "Incomplete join node",
    )
}

#[test]
fn test_non_equality_predicate() -> Result<(), Box<dyn std::error::Error>> {
    expect_failure(
        "SELECT * FROM t1 a JOIN t2 b ON a.x < b.y",
        "Malformed join predicate",
    )
}

#[test]
fn test_unqualified_predicate() -> Result<(), Box<dyn std::error::Error>> {
    expect_failure(
        "SELECT * FROM t1 a JOIN t2 b ON x = b.y",
        "is not qualified with a table",
    )
}

#[test]
fn test_comma_join() -> Result<(), Box<dyn std::error::Error>> {
    expect_failure("SELECT * FROM t1, t2", "Unsupported SQL feature")
}

#[test]
fn test_missing_from() -> Result<(), Box<dyn std::error::Error>> {
    expect_failure("SELECT a.x, a.y", "Query has no FROM clause")
}

#[test]
fn test_group_by_is_unsupported() -> Result<(), Box<dyn std::error::Error>> {
    expect_failure(
        "SELECT a.x FROM t1 a JOIN t2 b ON a.k = b.k GROUP BY a.x",
        "GROUP clauses",
    )
}

#[test]
fn test_column_read_through_two_tables() -> Result<(), Box<dyn std::error::Error>> {
    expect_failure(
        "SELECT a.id FROM t1 a JOIN t2 b ON a.k = b.k WHERE a.age > 1 AND b.age < 5",
        "column 'age' is read through both 'a' and 'b'",
    )
}

#[test]
fn test_frame_variable_clash() -> Result<(), Box<dyn std::error::Error>> {
    expect_failure(
        "SELECT * FROM a x JOIN b y ON x.k = y.k JOIN a_b z ON x.k = z.k",
        "both map to Python variable 'a_b'",
    )
}

#[test]
fn test_no_partial_output() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("sqlmerge")?;
    cmd.arg("-s")
        .arg("SELECT * FROM t1 a JOIN t2 b ON a.k = b.k JOIN t3 c");

    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("merge").not());

    Ok(())
}

#[test]
fn test_missing_query_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("sqlmerge")?;
    cmd.arg("--file").arg("tests/data/does_not_exist.sql");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read query file"));

    Ok(())
}

#[test]
fn test_sql_or_file_required() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("sqlmerge")?;
    cmd.assert().failure();
    Ok(())
}
