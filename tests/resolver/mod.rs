//! Tests for the join resolver through the library API
//!
//! These drive `JoinNode` and `JoinTreeBuilder` with tokens produced by the
//! lexer, the same way the binary does.

use sqlmerge::builder::build_join_tree;
use sqlmerge::join::{JoinKey, JoinKind, JoinNode};
use sqlmerge::lexer::tokenize;
use sqlmerge::table_ref::{Operand, TableRef};
use sqlmerge::token::ClauseToken;
use sqlmerge::SqlmergeError;

/// Tokenize a query and return the tokens matching a predicate, in order
fn tokens_where(sql: &str, pred: fn(&ClauseToken) -> bool) -> Vec<ClauseToken> {
    tokenize(sql)
        .expect("query should tokenize")
        .into_iter()
        .filter(|t| pred(t))
        .collect()
}

fn root(sql: &str) -> JoinNode {
    let tokens = tokenize(sql).expect("query should tokenize");
    let tree = build_join_tree(&tokens).expect("query should resolve");
    match tree.source {
        Operand::Joined(node) => *node,
        other => panic!("Expected a join, got {:?}", other),
    }
}

#[test]
fn test_orientation_independent_of_written_order() {
    for predicate in ["a.x = b.y", "b.y = a.x"] {
        let node = root(&format!("SELECT * FROM ta a JOIN tb b ON {}", predicate));
        assert_eq!(node.keys(), &[JoinKey::new("x", "y")], "predicate {}", predicate);
    }
}

#[test]
fn test_manual_node_from_tokens() {
    // Add the right table first, the way a token-order driver might
    let sql = "select a.col_a, b.* from table_one a left join table_two b \
               on a.common_col = b.common_col and a.col2 = b.col2";
    let tables = tokens_where(sql, |t| t.as_identifier().is_some());
    let relations = tokens_where(sql, |t| t.is_keyword_text("LEFT JOIN"));
    let predicates = tokens_where(sql, |t| t.as_comparison().is_some());

    let mut node = JoinNode::new();
    node.add_table(&tables[1]).unwrap();
    node.add_table(&tables[0]).unwrap();
    node.set_relation(&relations[0]).unwrap();
    for predicate in &predicates {
        node.set_criteria(predicate).unwrap();
    }

    assert_eq!(node.name(), Some("table_two-table_one"));
    assert_eq!(node.kind(), Some(JoinKind::Left));
    // Symmetric column names, so orientation is invisible here
    assert_eq!(node.keys().len(), 2);
    assert!(node.keys().contains(&JoinKey::new("common_col", "common_col")));
    assert!(node.keys().contains(&JoinKey::new("col2", "col2")));
}

#[test]
fn test_end_to_end_left_join() {
    let node = root(
        "select a.col_a, b.* from table_one a left join table_two b \
         on a.common_col = b.common_col and a.col2 = b.col2 \
         where a.age > 6 and b.sex = 'male'",
    );

    assert_eq!(node.name(), Some("table_one-table_two"));
    assert_eq!(node.kind(), Some(JoinKind::Left));

    let instruction = node.merge_instruction().unwrap();
    assert_eq!(instruction.how.merge_how(), "left");
    let mut left_on = instruction.left_on.clone();
    left_on.sort();
    assert_eq!(left_on, vec!["col2", "common_col"]);
    let mut right_on = instruction.right_on.clone();
    right_on.sort();
    assert_eq!(right_on, vec!["col2", "common_col"]);
}

#[test]
fn test_full_node_never_overwrites_right() {
    let mut node = root("SELECT * FROM ta a JOIN tb b ON a.x = b.y");
    for name in ["tc", "td"] {
        let result = node.add_table(TableRef::new(name, None).unwrap());
        assert!(matches!(result, Err(SqlmergeError::NodeFull(_))));
    }
    assert_eq!(node.right().map(|o| o.name()), Some("tb"));
}

#[test]
fn test_nested_node_exposes_name_and_alias() {
    let inner = root("SELECT * FROM ta a JOIN tb b ON a.x = b.y");

    let mut outer = JoinNode::new();
    outer.add_table(inner).unwrap();
    let left = outer.left().expect("left operand set");
    assert_eq!(left.name(), "ta-tb");
    assert_eq!(left.alias(), "ta-tb");
    assert!(left.has_alias("a"));
    assert!(left.has_alias("b"));
    assert!(!left.has_alias("c"));
}

#[test]
fn test_serialize_only_when_complete() {
    let mut node = JoinNode::new();
    assert!(matches!(
        node.merge_instruction(),
        Err(SqlmergeError::IncompleteJoin(_))
    ));

    let sql = "SELECT * FROM ta a INNER JOIN tb b ON a.x = b.y";
    let tables = tokens_where(sql, |t| t.as_identifier().is_some());
    let relations = tokens_where(sql, |t| t.is_keyword_text("INNER JOIN"));
    let predicates = tokens_where(sql, |t| t.as_comparison().is_some());

    node.add_table(&tables[0]).unwrap();
    node.add_table(&tables[1]).unwrap();
    node.set_relation(&relations[0]).unwrap();
    assert!(matches!(
        node.merge_instruction(),
        Err(SqlmergeError::IncompleteJoin(_))
    ));

    node.set_criteria(&predicates[0]).unwrap();
    let instruction = node.merge_instruction().unwrap();
    assert_eq!(instruction.target, "ta-tb");
    assert_eq!(instruction.left, "ta");
    assert_eq!(instruction.right, "tb");
}
