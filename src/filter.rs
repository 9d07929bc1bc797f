//! WHERE clause extraction
//!
//! Turns the grouped WHERE tokens into `(table, column, operator, value)`
//! conditions. Only conjunctions of column-versus-constant comparisons are
//! translated.

use serde::Serialize;

use crate::error::{SqlmergeError, SqlmergeResult};
use crate::token::{ClauseToken, Comparison, ComparisonOp, ComparisonOperand, Literal};

/// One row filter, always written column-first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterCondition {
    /// Table qualifier of the column, as written
    pub table: Option<String>,
    pub column: String,
    pub operator: ComparisonOp,
    pub value: Literal,
}

/// Extract filter conditions from WHERE clause tokens
///
/// # Arguments
/// * `tokens` - The tokens grouped under WHERE
///
/// # Returns
/// * One condition per comparison, in written order
pub fn extract_filters(tokens: &[ClauseToken]) -> SqlmergeResult<Vec<FilterCondition>> {
    if tokens.is_empty() {
        return Err(SqlmergeError::InvalidSqlQuery("Empty WHERE clause".to_string()));
    }

    let mut conditions = Vec::new();
    let mut expect_condition = true;

    for token in tokens {
        match token {
            ClauseToken::Comparison(comparison) if expect_condition => {
                conditions.push(condition(comparison)?);
                expect_condition = false;
            }
            ClauseToken::Keyword(keyword) if keyword == "AND" && !expect_condition => {
                expect_condition = true;
            }
            ClauseToken::Keyword(keyword) if keyword == "OR" || keyword == "NOT" => {
                return Err(SqlmergeError::UnsupportedSqlFeature(format!(
                    "{} in WHERE clauses",
                    keyword
                )))
            }
            other => {
                return Err(SqlmergeError::InvalidSqlQuery(format!(
                    "Unexpected '{}' in WHERE clause",
                    other
                )))
            }
        }
    }

    if expect_condition {
        return Err(SqlmergeError::InvalidSqlQuery(
            "WHERE clause ends with AND".to_string(),
        ));
    }
    Ok(conditions)
}

fn condition(comparison: &Comparison) -> SqlmergeResult<FilterCondition> {
    let (ident, operator, value) = match (&comparison.left, &comparison.right) {
        (ComparisonOperand::Column(ident), ComparisonOperand::Literal(value)) => {
            (ident, comparison.operator, value)
        }
        (ComparisonOperand::Literal(value), ComparisonOperand::Column(ident)) => {
            (ident, comparison.operator.flipped(), value)
        }
        _ => {
            return Err(SqlmergeError::UnsupportedSqlFeature(format!(
                "WHERE comparison '{}' must compare a column with a constant",
                comparison
            )))
        }
    };

    if ident.is_wildcard() {
        return Err(SqlmergeError::InvalidSqlQuery(format!(
            "Cannot filter on '{}'",
            ident
        )));
    }

    Ok(FilterCondition {
        table: ident.parent_name().map(str::to_string),
        column: ident.real_name().to_string(),
        operator,
        value: value.clone(),
    })
}
