//! Tests for JOIN ... ON translation through the sqlmerge binary
//!
//! Each test feeds a query on the command line and checks the pandas
//! code printed to stdout.

use assert_cmd::Command;
use predicates::prelude::*;

use crate::helpers::{
    create_query_file, create_temp_dir, get_static_query_file, run_test_case, SqlmergeTestCase,
};

#[test]
fn test_left_join_two_keys() -> Result<(), Box<dyn std::error::Error>> {
    run_test_case(SqlmergeTestCase {
        sql: "select a.col_a, b.* from table_one a left join table_two b \
              on a.common_col = b.common_col and a.col2 = b.col2"
            .to_string(),
        expected_stdout: vec![
            "table_one_table_two = table_one.merge(table_two, how='left', \
             left_on=['common_col', 'col2'], right_on=['common_col', 'col2'])"
                .to_string(),
        ],
        ..Default::default()
    })
}

#[test]
fn test_reversed_predicate_orientation() -> Result<(), Box<dyn std::error::Error>> {
    // The right table is written first in the ON predicate
    let mut cmd = Command::cargo_bin("sqlmerge")?;
    cmd.arg("-s")
        .arg("SELECT * FROM users u INNER JOIN orders o ON o.user_id = u.id");

    cmd.assert().success().stdout(predicate::str::contains(
        "users_orders = users.merge(orders, how='inner', left_on=['id'], right_on=['user_id'])",
    ));

    Ok(())
}

#[test]
fn test_every_relation_keyword() -> Result<(), Box<dyn std::error::Error>> {
    let cases = [
        ("LEFT JOIN", "left"),
        ("RIGHT JOIN", "right"),
        ("INNER JOIN", "inner"),
        ("JOIN", "inner"),
        ("OUTER JOIN", "outer"),
    ];

    for (relation, how) in cases {
        let sql = format!("SELECT * FROM t1 a {} t2 b ON a.k = b.k", relation);
        let mut cmd = Command::cargo_bin("sqlmerge")?;
        cmd.arg("-s").arg(&sql);
        cmd.assert()
            .success()
            .stdout(predicate::str::contains(format!("how='{}'", how)));
    }

    Ok(())
}

#[test]
fn test_three_way_join() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("sqlmerge")?;
    cmd.arg("-s").arg(
        "SELECT users.name, products.price FROM users INNER JOIN orders ON users.id = orders.user_id \
         INNER JOIN products ON orders.product_id = products.product_id",
    );

    let output = cmd.output()?;
    assert!(output.status.success(), "Command failed");
    let stdout = String::from_utf8(output.stdout)?;
    let lines: Vec<&str> = stdout.lines().collect();

    // Innermost join first, then the join that consumes it
    assert_eq!(
        lines[0],
        "users_orders = users.merge(orders, how='inner', left_on=['id'], right_on=['user_id'])"
    );
    assert_eq!(
        lines[1],
        "users_orders_products = users_orders.merge(products, how='inner', \
         left_on=['product_id'], right_on=['product_id'])"
    );
    assert_eq!(
        lines[2],
        "users_orders_products = users_orders_products[['name', 'price']]"
    );

    Ok(())
}

#[test]
fn test_where_filters_after_merge() -> Result<(), Box<dyn std::error::Error>> {
    run_test_case(SqlmergeTestCase {
        sql: "SELECT * FROM people p JOIN cities c ON p.city_id = c.id \
              WHERE p.age > 6 AND c.name = 'Paris'"
            .to_string(),
        expected_stdout: vec![
            "people_cities = people_cities[(people_cities['age'] > 6) & \
             (people_cities['name'] == 'Paris')]"
                .to_string(),
        ],
        ..Default::default()
    })
}

#[test]
fn test_select_distinct_drops_duplicates() -> Result<(), Box<dyn std::error::Error>> {
    run_test_case(SqlmergeTestCase {
        sql: "SELECT DISTINCT a.x FROM t1 a JOIN t2 b ON a.k = b.k".to_string(),
        expected_stdout: vec!["t1_t2 = t1_t2[['x']].drop_duplicates()".to_string()],
        ..Default::default()
    })
}

#[test]
fn test_verbose_logs_resolution() -> Result<(), Box<dyn std::error::Error>> {
    run_test_case(SqlmergeTestCase {
        sql: "SELECT * FROM t1 a LEFT JOIN t2 b ON b.k = a.k".to_string(),
        verbose: true,
        expected_stderr: vec![
            "Join kind: Left".to_string(),
            "Join key: k = k".to_string(),
        ],
        ..Default::default()
    })
}

#[test]
fn test_json_output() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("sqlmerge")?;
    cmd.arg("--format")
        .arg("json")
        .arg("-s")
        .arg("SELECT * FROM t1 a RIGHT JOIN t2 b ON a.x = b.y");

    let output = cmd.output()?;
    assert!(output.status.success(), "Command failed");
    let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;

    assert_eq!(json["merges"][0]["target"], "t1-t2");
    assert_eq!(json["merges"][0]["how"], "right");
    assert_eq!(json["merges"][0]["left_on"][0], "x");
    assert_eq!(json["merges"][0]["right_on"][0], "y");

    Ok(())
}

#[test]
fn test_query_from_static_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("sqlmerge")?;
    cmd.arg("--file").arg(get_static_query_file());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("how='left'"))
        .stdout(predicate::str::contains("(table_one_table_two['sex'] == 'male')"));

    Ok(())
}

#[test]
fn test_query_from_temp_file_and_arg() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = create_temp_dir()?;
    let query_file = create_query_file(
        temp_dir.path(),
        "query.sql",
        "SELECT * FROM x p OUTER JOIN y q ON p.id = q.id;\n",
    )?;

    let mut cmd = Command::cargo_bin("sqlmerge")?;
    cmd.arg("-s")
        .arg("SELECT * FROM a m JOIN b n ON m.id = n.id")
        .arg("-f")
        .arg(&query_file);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("a_b = a.merge(b, how='inner'"))
        .stdout(predicate::str::contains("x_y = x.merge(y, how='outer'"));

    Ok(())
}
