//! Sqlmerge library crate
//!
//! This is the library component of sqlmerge, which translates a relational
//! query into the equivalent sequence of dataframe operations. The library
//! provides:
//!
//! - Tokenizing SQL text into clause tokens (via sqlparser's tokenizer)
//! - Table references with alias tracking
//! - Join predicate resolution and key orientation
//! - Binary join nodes that nest left-deep for multi-table queries
//! - Merge instructions with pandas rendering
//! - WHERE clause extraction and a pandas code emitter
//!
//! The join resolver is the core: it builds the join tree from the token
//! stream and refuses to produce a merge from an incomplete join.

pub mod builder;
pub mod emitter;
pub mod error;
pub mod filter;
pub mod join;
pub mod lexer;
pub mod merge;
pub mod predicate;
pub mod table_ref;
pub mod token;
pub mod translator;

pub use error::{SqlmergeError, SqlmergeResult};
pub use translator::{translate, Translation};
