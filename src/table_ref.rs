//! Table references for the join resolver
//!
//! A `TableRef` is one base table mentioned in FROM/JOIN. An `Operand` is
//! anything that can sit on either side of a join: a base table or the
//! result of another, already complete join.

use serde::Serialize;

use crate::error::{SqlmergeError, SqlmergeResult};
use crate::join::JoinNode;
use crate::token::{ClauseToken, Identifier};

/// A base table with the alias used to qualify its columns
///
/// The alias defaults to the table name when the query gives none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRef {
    name: String,
    alias: String,
}

impl TableRef {
    /// Create a table reference from a name and optional alias
    pub fn new(name: &str, alias: Option<&str>) -> SqlmergeResult<Self> {
        if name.is_empty() || name == "*" {
            return Err(SqlmergeError::InvalidTableSource(format!(
                "'{}' is not a table name",
                name
            )));
        }
        Ok(TableRef {
            name: name.to_string(),
            alias: alias.unwrap_or(name).to_string(),
        })
    }

    /// Create a table reference from a parsed identifier
    pub fn from_identifier(ident: &Identifier) -> SqlmergeResult<Self> {
        Self::new(ident.real_name(), ident.alias())
    }

    /// The underlying table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name used to qualify this table's columns
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Whether both references denote the same table in the query
    ///
    /// Aliases, not underlying names, identify tables: a self join has two
    /// references to one table under different aliases.
    pub fn same_table(&self, other: &TableRef) -> bool {
        self.alias == other.alias
    }
}

impl TryFrom<&ClauseToken> for TableRef {
    type Error = SqlmergeError;

    fn try_from(token: &ClauseToken) -> SqlmergeResult<Self> {
        match token {
            ClauseToken::Identifier(ident) => Self::from_identifier(ident),
            other => Err(SqlmergeError::InvalidTableSource(format!(
                "expected a table identifier, found {} '{}'",
                other.kind(),
                other
            ))),
        }
    }
}

/// One side of a join
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Operand {
    /// A table named in the query
    Base(TableRef),
    /// The result of a complete inner join
    Joined(Box<JoinNode>),
}

impl Operand {
    /// Name of the table, or of the joined result
    pub fn name(&self) -> &str {
        match self {
            Operand::Base(table) => table.name(),
            Operand::Joined(node) => node.name().unwrap_or_default(),
        }
    }

    /// Alias of the table; a joined result is aliased by its own name
    pub fn alias(&self) -> &str {
        match self {
            Operand::Base(table) => table.alias(),
            Operand::Joined(node) => node.alias(),
        }
    }

    /// Whether a column qualifier refers to this operand
    ///
    /// A joined operand answers for its own alias and for every table
    /// alias inside it.
    pub fn has_alias(&self, qualifier: &str) -> bool {
        match self {
            Operand::Base(table) => table.alias() == qualifier,
            Operand::Joined(node) => {
                node.alias() == qualifier || node.operands().any(|op| op.has_alias(qualifier))
            }
        }
    }

    /// Whether both operands denote the same table or join result
    pub fn same_table(&self, other: &Operand) -> bool {
        self.alias() == other.alias()
    }

    /// Merge instructions needed to materialize this operand, innermost first
    pub fn merge_instructions(&self) -> SqlmergeResult<Vec<crate::merge::MergeInstruction>> {
        match self {
            Operand::Base(_) => Ok(Vec::new()),
            Operand::Joined(node) => node.merge_instructions(),
        }
    }
}

/// Conversion into a join operand
///
/// Implemented for raw identifier tokens as well as already built tables
/// and joins, so `JoinNode::add_table` accepts either.
pub trait IntoOperand {
    fn into_operand(self) -> SqlmergeResult<Operand>;
}

impl IntoOperand for &ClauseToken {
    fn into_operand(self) -> SqlmergeResult<Operand> {
        TableRef::try_from(self).map(Operand::Base)
    }
}

impl IntoOperand for &Identifier {
    fn into_operand(self) -> SqlmergeResult<Operand> {
        TableRef::from_identifier(self).map(Operand::Base)
    }
}

impl IntoOperand for TableRef {
    fn into_operand(self) -> SqlmergeResult<Operand> {
        Ok(Operand::Base(self))
    }
}

impl IntoOperand for JoinNode {
    fn into_operand(self) -> SqlmergeResult<Operand> {
        if !self.is_full() {
            return Err(SqlmergeError::IncompleteJoin(
                "a join needs both tables before it can be joined again".to_string(),
            ));
        }
        Ok(Operand::Joined(Box::new(self)))
    }
}

impl IntoOperand for Operand {
    fn into_operand(self) -> SqlmergeResult<Operand> {
        Ok(self)
    }
}
