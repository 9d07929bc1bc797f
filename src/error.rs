//! Error handling for sqlmerge
//!
//! This module defines custom error types for the sqlmerge library.
//! Every failure while resolving a query into merge instructions is fatal
//! for that query: there is no partial-result mode, so callers should
//! report any of these errors as "query cannot be translated".
//!
//! The module uses thiserror to minimize boilerplate code and create
//! a consistent error handling approach throughout the codebase.

use thiserror::Error;

/// SqlmergeError represents all possible errors that can occur while
/// translating a query
///
/// The first group of variants covers the join resolution core:
/// - Building table references from clause tokens
/// - Filling join nodes with operands, relation and keys
/// - Serializing join nodes into merge instructions
///
/// The remaining variants cover tokenizing and the overall query shape.
#[derive(Error, Debug)]
pub enum SqlmergeError {
    /// Error while lexing the raw query text with sqlparser
    #[error("SQL tokenizing error: {0}")]
    SqlTokenizeError(#[from] sqlparser::tokenizer::TokenizerError),

    /// A value used to build a table reference is not a table identifier
    #[error("Invalid table source: {0}")]
    InvalidTableSource(String),

    /// A third operand was offered to a join node that already has two
    #[error("Join node '{0}' already has two tables")]
    NodeFull(String),

    /// The relation keyword is missing, not a keyword, or not a supported join
    #[error("Unsupported join relation: {0}")]
    UnsupportedRelation(String),

    /// A join comparison does not have exactly two qualified column operands
    #[error("Malformed join predicate: {0}")]
    MalformedPredicate(String),

    /// Serialization was attempted before operands, kind and keys were all set
    #[error("Incomplete join node: {0}")]
    IncompleteJoin(String),

    /// Error for SQL features that are outside what sqlmerge translates
    #[error("Unsupported SQL feature: {0}")]
    UnsupportedSqlFeature(String),

    /// Error for structurally invalid SQL queries
    #[error("Invalid SQL query: {0}")]
    InvalidSqlQuery(String),
}

/// Result type alias for operations that can produce a SqlmergeError
pub type SqlmergeResult<T> = std::result::Result<T, SqlmergeError>;
