//! Merge instructions
//!
//! The structured output of the join resolver: one dataframe merge per join
//! node. `Display` renders it as a line of pandas code.

use std::fmt;

use serde::Serialize;

use crate::join::JoinKind;

/// One dataframe merge: `target = left.merge(right, ...)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeInstruction {
    /// Name of the frame holding the merge result
    pub target: String,
    /// Name of the left frame
    pub left: String,
    /// Name of the right frame
    pub right: String,
    /// Which unmatched rows are kept
    pub how: JoinKind,
    /// Left key columns, paired by position with `right_on`
    pub left_on: Vec<String>,
    /// Right key columns
    pub right_on: Vec<String>,
}

impl fmt::Display for MergeInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {}.merge({}, how='{}', left_on=[{}], right_on=[{}])",
            python_identifier(&self.target),
            python_identifier(&self.left),
            python_identifier(&self.right),
            self.how.merge_how(),
            python_list(&self.left_on),
            python_list(&self.right_on)
        )
    }
}

/// Turn a table or join name into a valid Python variable name
///
/// Characters other than ASCII letters, digits and `_` become `_`.
pub fn python_identifier(name: &str) -> String {
    let mut ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

/// Quote a column name as a Python string literal
pub fn python_string(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn python_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| python_string(v))
        .collect::<Vec<_>>()
        .join(", ")
}
