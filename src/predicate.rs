//! Join predicate resolution
//!
//! Extracts the (table qualifier, column name) pairs compared by an ON
//! predicate such as `a.common_col = b.common_col`. Deciding which column
//! belongs to which side of the join is left to `JoinNode`.

use crate::error::{SqlmergeError, SqlmergeResult};
use crate::token::{ClauseToken, Comparison, ComparisonOp, ComparisonOperand};

/// The qualifiers and columns of an equality predicate, in written order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPredicate {
    /// Table qualifiers of the left and right operand
    pub qualifiers: (String, String),
    /// Unqualified column names of the left and right operand
    pub columns: (String, String),
}

/// Resolve a comparison token into its qualifier and column pairs
pub fn resolve(token: &ClauseToken) -> SqlmergeResult<ResolvedPredicate> {
    let comparison = token.as_comparison().ok_or_else(|| {
        SqlmergeError::MalformedPredicate(format!(
            "expected a comparison, found {} '{}'",
            token.kind(),
            token
        ))
    })?;
    resolve_comparison(comparison)
}

/// Resolve a comparison into its qualifier and column pairs
///
/// Only `qualifier.column = qualifier.column` is accepted.
pub fn resolve_comparison(comparison: &Comparison) -> SqlmergeResult<ResolvedPredicate> {
    if comparison.operator != ComparisonOp::Eq {
        return Err(SqlmergeError::MalformedPredicate(format!(
            "'{}' is not an equality comparison",
            comparison
        )));
    }

    let [left, right] = comparison.operands();
    let (left_table, left_column) = qualified_column(left, comparison)?;
    let (right_table, right_column) = qualified_column(right, comparison)?;

    Ok(ResolvedPredicate {
        qualifiers: (left_table.to_string(), right_table.to_string()),
        columns: (left_column.to_string(), right_column.to_string()),
    })
}

fn qualified_column<'a>(
    operand: &'a ComparisonOperand,
    comparison: &Comparison,
) -> SqlmergeResult<(&'a str, &'a str)> {
    match operand {
        ComparisonOperand::Column(ident) if !ident.is_wildcard() => match ident.parent_name() {
            Some(parent) => Ok((parent, ident.real_name())),
            None => Err(SqlmergeError::MalformedPredicate(format!(
                "column '{}' in '{}' is not qualified with a table",
                ident, comparison
            ))),
        },
        other => Err(SqlmergeError::MalformedPredicate(format!(
            "'{}' in '{}' is not a column",
            other, comparison
        ))),
    }
}
