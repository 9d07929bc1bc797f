//! SQL to dataframe translation
//!
//! This module drives one query through the pipeline: tokenize, build the
//! join tree, serialize merges, extract filters. Each call works on its own
//! token vector and join tree, so nothing is shared between queries.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use log::debug;
use serde::Serialize;

use crate::builder::{build_join_tree, JoinTree, SelectedColumns};
use crate::emitter::PandasEmitter;
use crate::error::{SqlmergeError, SqlmergeResult};
use crate::filter::{extract_filters, FilterCondition};
use crate::lexer::tokenize;
use crate::merge::{python_identifier, MergeInstruction};

/// Everything resolved from one query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Translation {
    pub tree: JoinTree,
    /// One merge per join, innermost first
    pub merges: Vec<MergeInstruction>,
    pub filters: Vec<FilterCondition>,
}

impl Translation {
    /// Name of the frame holding the final result
    pub fn result_name(&self) -> &str {
        self.tree.result_name()
    }

    /// Render as a pandas script
    pub fn to_pandas(&self) -> String {
        PandasEmitter::new().emit(self)
    }

    /// Render as pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Translate one SQL query
///
/// # Arguments
/// * `sql` - A `SELECT ... FROM ... [JOIN ... ON ...] [WHERE ...]` query
///
/// # Returns
/// * The join tree, its merge instructions and the WHERE filters
pub fn translate(sql: &str) -> SqlmergeResult<Translation> {
    let tokens = tokenize(sql)?;
    debug!("Tokenized into {} clause tokens", tokens.len());

    let tree = build_join_tree(&tokens)?;
    let merges = tree.merge_instructions()?;
    debug!("Resolved {} merge instructions", merges.len());

    let filters = match &tree.filter {
        Some(tokens) => extract_filters(tokens)?,
        None => Vec::new(),
    };
    debug!("Extracted {} filter conditions", filters.len());

    check_frame_names(&merges)?;
    check_column_qualifiers(&tree.columns, &filters)?;

    Ok(Translation {
        tree,
        merges,
        filters,
    })
}

/// Every frame name must render as its own Python variable
///
/// A join named `a-b` and a table named `a_b` would both become `a_b`.
fn check_frame_names(merges: &[MergeInstruction]) -> SqlmergeResult<()> {
    let mut variables: HashMap<String, &str> = HashMap::new();
    let names = merges
        .iter()
        .flat_map(|m| [m.target.as_str(), m.left.as_str(), m.right.as_str()]);

    for name in names {
        match variables.entry(python_identifier(name)) {
            Entry::Occupied(entry) if *entry.get() != name => {
                return Err(SqlmergeError::UnsupportedSqlFeature(format!(
                    "frames '{}' and '{}' both map to Python variable '{}'",
                    entry.get(),
                    name,
                    entry.key()
                )))
            }
            Entry::Occupied(_) => {}
            Entry::Vacant(entry) => {
                entry.insert(name);
            }
        }
    }
    Ok(())
}

/// Reject a column name read through two different table qualifiers
///
/// After a merge the result frame holds one column per name (pandas suffixes
/// overlapping columns), so `a.age` and `b.age` cannot both be addressed as
/// `age`.
fn check_column_qualifiers(
    columns: &SelectedColumns,
    filters: &[FilterCondition],
) -> SqlmergeResult<()> {
    let mut qualifiers: HashMap<&str, &str> = HashMap::new();
    let references = columns
        .columns()
        .iter()
        .map(|c| (c.table_name.as_deref(), c.column_name.as_str()))
        .chain(filters.iter().map(|f| (f.table.as_deref(), f.column.as_str())));

    for (table, column) in references {
        let table = match table {
            Some(table) if column != "*" => table,
            _ => continue,
        };
        if let Some(previous) = qualifiers.insert(column, table) {
            if previous != table {
                return Err(SqlmergeError::UnsupportedSqlFeature(format!(
                    "column '{}' is read through both '{}' and '{}'",
                    column, previous, table
                )));
            }
        }
    }
    Ok(())
}
