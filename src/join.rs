//! Join module for sqlmerge
//!
//! This module implements the binary join node. A node is filled in
//! document order: two `add_table` calls (left, then right), one relation
//! keyword and one or more ON predicates. A complete node serializes into a
//! single merge instruction; a complete node can itself be the operand of
//! an enclosing node, which is how multi-table queries nest left-deep.

use std::fmt;

use log::debug;
use serde::Serialize;

use crate::error::{SqlmergeError, SqlmergeResult};
use crate::merge::MergeInstruction;
use crate::predicate;
use crate::table_ref::{IntoOperand, Operand};
use crate::token::ClauseToken;

/// Join types supported by sqlmerge
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKind {
    /// Inner join - keeps rows with a match on both sides
    Inner,
    /// Left join - keeps every row of the left table
    Left,
    /// Right join - keeps every row of the right table
    Right,
    /// Outer join - keeps every row of both tables
    Outer,
}

impl JoinKind {
    /// Map a normalized relation keyword to a join kind
    ///
    /// Exactly `LEFT JOIN`, `RIGHT JOIN`, `INNER JOIN`, `JOIN` and
    /// `OUTER JOIN` are accepted.
    pub fn from_relation(keyword: &str) -> Option<Self> {
        match keyword {
            "LEFT JOIN" => Some(JoinKind::Left),
            "RIGHT JOIN" => Some(JoinKind::Right),
            "INNER JOIN" | "JOIN" => Some(JoinKind::Inner),
            "OUTER JOIN" => Some(JoinKind::Outer),
            _ => None,
        }
    }

    /// The `how=` argument of `DataFrame.merge`
    pub fn merge_how(self) -> &'static str {
        match self {
            JoinKind::Inner => "inner",
            JoinKind::Left => "left",
            JoinKind::Right => "right",
            JoinKind::Outer => "outer",
        }
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.merge_how())
    }
}

/// One equality between a left-side column and a right-side column
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct JoinKey {
    pub left: String,
    pub right: String,
}

impl JoinKey {
    pub fn new(left: &str, right: &str) -> Self {
        JoinKey {
            left: left.to_string(),
            right: right.to_string(),
        }
    }
}

/// A binary join between two operands
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JoinNode {
    left: Option<Operand>,
    right: Option<Operand>,
    kind: Option<JoinKind>,
    keys: Vec<JoinKey>,
    name: Option<String>,
}

impl JoinNode {
    /// Create an empty join node
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an operand: the first call fills the left side, the second the right
    ///
    /// # Arguments
    /// * `value` - A table identifier token, a built table, or a complete join
    ///
    /// # Returns
    /// * `NodeFull` if both sides are already set
    pub fn add_table<T: IntoOperand>(&mut self, value: T) -> SqlmergeResult<()> {
        if self.is_full() {
            return Err(SqlmergeError::NodeFull(
                self.name.clone().unwrap_or_default(),
            ));
        }

        let operand = value.into_operand()?;
        if self.left.is_none() {
            debug!("Join left operand: {}", operand.name());
            self.left = Some(operand);
        } else {
            debug!("Join right operand: {}", operand.name());
            self.right = Some(operand);
        }

        if let (Some(left), Some(right)) = (&self.left, &self.right) {
            self.name = Some(format!("{}-{}", left.name(), right.name()));
        }
        Ok(())
    }

    /// Set the join kind from a relation keyword token
    pub fn set_relation(&mut self, token: &ClauseToken) -> SqlmergeResult<()> {
        let keyword = token.normalized().ok_or_else(|| {
            SqlmergeError::UnsupportedRelation(format!(
                "expected a join keyword, found {} '{}'",
                token.kind(),
                token
            ))
        })?;
        let kind = JoinKind::from_relation(keyword).ok_or_else(|| {
            SqlmergeError::UnsupportedRelation(format!("'{}' is not a supported join type", keyword))
        })?;

        debug!("Join kind: {:?}", kind);
        self.kind = Some(kind);
        Ok(())
    }

    /// Add a join key from an ON predicate
    ///
    /// The predicate's columns are stored as written when its first
    /// qualifier names the left operand or its second names the right
    /// operand; otherwise they are stored swapped. This is exact for two
    /// operands. Matching qualifiers against positional sides does not
    /// generalize to predicates spanning more than two tables.
    pub fn set_criteria(&mut self, token: &ClauseToken) -> SqlmergeResult<()> {
        let (left, right) = match (&self.left, &self.right) {
            (Some(left), Some(right)) => (left, right),
            _ => {
                return Err(SqlmergeError::IncompleteJoin(format!(
                    "ON predicate '{}' before both tables of the join",
                    token
                )))
            }
        };

        let resolved = predicate::resolve(token)?;
        let (first_table, second_table) = &resolved.qualifiers;
        let (first_column, second_column) = &resolved.columns;

        let key = if left.has_alias(first_table) || right.has_alias(second_table) {
            JoinKey::new(first_column, second_column)
        } else {
            JoinKey::new(second_column, first_column)
        };

        debug!("Join key: {} = {}", key.left, key.right);
        if !self.keys.contains(&key) {
            self.keys.push(key);
        }
        Ok(())
    }

    /// Whether neither operand is set
    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Whether both operands are set
    pub fn is_full(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    pub fn left(&self) -> Option<&Operand> {
        self.left.as_ref()
    }

    pub fn right(&self) -> Option<&Operand> {
        self.right.as_ref()
    }

    pub fn kind(&self) -> Option<JoinKind> {
        self.kind
    }

    pub fn keys(&self) -> &[JoinKey] {
        &self.keys
    }

    /// `left.name-right.name`, once both operands are set
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// A join result is qualified by its own name
    pub fn alias(&self) -> &str {
        self.name().unwrap_or_default()
    }

    /// The operands that are set, left first
    pub fn operands(&self) -> impl Iterator<Item = &Operand> {
        self.left.iter().chain(self.right.iter())
    }

    /// Take the operands out of the node
    pub fn into_operands(self) -> (Option<Operand>, Option<Operand>) {
        (self.left, self.right)
    }

    /// Serialize this node into one merge instruction
    ///
    /// # Returns
    /// * `IncompleteJoin` unless both operands, the kind and a key are set
    pub fn merge_instruction(&self) -> SqlmergeResult<MergeInstruction> {
        let (left, right, kind) = match (&self.left, &self.right, self.kind) {
            (Some(left), Some(right), Some(kind)) if !self.keys.is_empty() => (left, right, kind),
            _ => return Err(SqlmergeError::IncompleteJoin(self.missing_parts())),
        };

        Ok(MergeInstruction {
            target: self.alias().to_string(),
            left: left.name().to_string(),
            right: right.name().to_string(),
            how: kind,
            left_on: self.keys.iter().map(|k| k.left.clone()).collect(),
            right_on: self.keys.iter().map(|k| k.right.clone()).collect(),
        })
    }

    /// Merge instructions for this node and every nested join, innermost first
    pub fn merge_instructions(&self) -> SqlmergeResult<Vec<MergeInstruction>> {
        let mut instructions = Vec::new();
        for operand in self.operands() {
            instructions.extend(operand.merge_instructions()?);
        }
        instructions.push(self.merge_instruction()?);
        Ok(instructions)
    }

    /// Render this node as one line of pandas code
    pub fn serialize(&self) -> SqlmergeResult<String> {
        Ok(self.merge_instruction()?.to_string())
    }

    fn missing_parts(&self) -> String {
        let mut missing = Vec::new();
        if self.left.is_none() {
            missing.push("left table");
        }
        if self.right.is_none() {
            missing.push("right table");
        }
        if self.kind.is_none() {
            missing.push("join type");
        }
        if self.keys.is_empty() {
            missing.push("ON predicate");
        }

        let subject = match &self.left {
            Some(left) => format!("join on '{}'", left.name()),
            None => "join".to_string(),
        };
        format!("{} is missing {}", subject, missing.join(", "))
    }
}
