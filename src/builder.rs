//! Join tree construction for sqlmerge
//!
//! `JoinTreeBuilder` walks the clause token stream once, front to back:
//!
//! - Before FROM it records the projection's columns per table alias
//! - After FROM it feeds tables, relation keywords and ON predicates into
//!   the active join node, wrapping the node in a new enclosing node each
//!   time another join keyword follows a complete one (left-deep nesting)
//! - A WHERE clause, `;` or the end of the stream finishes the walk

use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;

use crate::error::{SqlmergeError, SqlmergeResult};
use crate::join::JoinNode;
use crate::merge::MergeInstruction;
use crate::table_ref::Operand;
use crate::token::{ClauseToken, Identifier};

/// Represents a column named in the projection
///
/// The table name is the qualifier as written, which is usually an alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnRef {
    /// Optional table qualifier
    pub table_name: Option<String>,
    /// Column name, or `*`
    pub column_name: String,
    /// Output name given with AS
    pub alias: Option<String>,
}

/// The projection's columns, in the order they were written
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectedColumns {
    columns: Vec<ColumnRef>,
    distinct: bool,
}

impl SelectedColumns {
    fn record(&mut self, idents: &[Identifier]) {
        for ident in idents {
            self.columns.push(ColumnRef {
                table_name: ident.parent_name().map(str::to_string),
                column_name: ident.real_name().to_string(),
                alias: ident.alias().map(str::to_string),
            });
        }
    }

    pub fn columns(&self) -> &[ColumnRef] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Whether the query selects DISTINCT rows
    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    /// Whether `*` or `t.*` was selected
    pub fn has_wildcard(&self) -> bool {
        self.columns.iter().any(|c| c.column_name == "*")
    }

    /// Column names selected through one table alias
    pub fn columns_for(&self, alias: &str) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.table_name.as_deref() == Some(alias))
            .map(|c| c.column_name.as_str())
            .collect()
    }

    /// Map of table alias to selected column names
    ///
    /// Unqualified columns are listed under the empty alias.
    pub fn by_table(&self) -> BTreeMap<String, Vec<String>> {
        let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for column in &self.columns {
            map.entry(column.table_name.clone().unwrap_or_default())
                .or_default()
                .push(column.column_name.clone());
        }
        map
    }
}

/// The resolved FROM clause plus what downstream emitters need
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinTree {
    /// A single base table, or the outermost join
    pub source: Operand,
    /// Columns named in the projection
    pub columns: SelectedColumns,
    /// Tokens of the WHERE clause, if the query has one
    pub filter: Option<Vec<ClauseToken>>,
}

impl JoinTree {
    /// Merge instructions for every join, innermost first
    pub fn merge_instructions(&self) -> SqlmergeResult<Vec<MergeInstruction>> {
        self.source.merge_instructions()
    }

    /// Name of the frame that holds the joined result
    pub fn result_name(&self) -> &str {
        self.source.name()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuildState {
    /// Before FROM
    SeekKeyword,
    /// Between FROM and WHERE
    CollectingJoins,
    Done,
}

/// Read position over a clause token slice
struct Cursor<'a> {
    tokens: &'a [ClauseToken],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [ClauseToken]) -> Self {
        Cursor { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'a ClauseToken> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a ClauseToken> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    /// Consume the next token if it is a comparison
    fn expect_comparison(&mut self, after: &str) -> SqlmergeResult<&'a ClauseToken> {
        match self.peek() {
            Some(token) if token.as_comparison().is_some() => {
                self.pos += 1;
                Ok(token)
            }
            Some(other) => Err(SqlmergeError::MalformedPredicate(format!(
                "expected a comparison after {}, found {} '{}'",
                after,
                other.kind(),
                other
            ))),
            None => Err(SqlmergeError::MalformedPredicate(format!(
                "expected a comparison after {}, found end of query",
                after
            ))),
        }
    }
}

/// Builds a join tree from a clause token stream
pub struct JoinTreeBuilder<'a> {
    cursor: Cursor<'a>,
    state: BuildState,
    active: JoinNode,
    in_on_clause: bool,
    columns: SelectedColumns,
    filter: Option<Vec<ClauseToken>>,
}

impl<'a> JoinTreeBuilder<'a> {
    pub fn new(tokens: &'a [ClauseToken]) -> Self {
        JoinTreeBuilder {
            cursor: Cursor::new(tokens),
            state: BuildState::SeekKeyword,
            active: JoinNode::new(),
            in_on_clause: false,
            columns: SelectedColumns::default(),
            filter: None,
        }
    }

    /// Consume the token stream and return the join tree
    pub fn build(mut self) -> SqlmergeResult<JoinTree> {
        while self.state != BuildState::Done {
            let token = match self.cursor.advance() {
                Some(token) => token,
                None => break,
            };

            match self.state {
                BuildState::SeekKeyword => self.seek_keyword(token),
                BuildState::CollectingJoins => self.collect_join(token)?,
                BuildState::Done => {}
            }
        }

        if self.state == BuildState::SeekKeyword {
            return Err(SqlmergeError::InvalidSqlQuery(
                "Query has no FROM clause".to_string(),
            ));
        }
        self.finish()
    }

    fn seek_keyword(&mut self, token: &ClauseToken) {
        match token {
            ClauseToken::IdentifierList(idents) => {
                debug!("Selected columns: {}", token);
                self.columns.record(idents);
            }
            ClauseToken::Keyword(keyword) if keyword == "DISTINCT" => {
                debug!("SELECT DISTINCT");
                self.columns.distinct = true;
            }
            ClauseToken::Keyword(keyword) if keyword == "FROM" => {
                debug!("FROM clause: collecting joins");
                self.state = BuildState::CollectingJoins;
            }
            _ => {}
        }
    }

    fn collect_join(&mut self, token: &'a ClauseToken) -> SqlmergeResult<()> {
        match token {
            ClauseToken::Identifier(_) => self.active.add_table(token),
            ClauseToken::Keyword(keyword) => match keyword.as_str() {
                "ON" => {
                    if !self.active.is_full() {
                        return Err(SqlmergeError::InvalidSqlQuery(
                            "ON must follow both tables of a join".to_string(),
                        ));
                    }
                    self.in_on_clause = true;
                    let predicate = self.cursor.expect_comparison("ON")?;
                    self.active.set_criteria(predicate)
                }
                "AND" if self.in_on_clause => {
                    let predicate = self.cursor.expect_comparison("AND")?;
                    self.active.set_criteria(predicate)
                }
                "OR" if self.in_on_clause => Err(SqlmergeError::UnsupportedSqlFeature(
                    "OR in ON clauses".to_string(),
                )),
                "USING" => Err(SqlmergeError::UnsupportedSqlFeature(
                    "USING clauses".to_string(),
                )),
                k if k.ends_with("JOIN") => self.relation(token),
                "GROUP" | "ORDER" | "HAVING" | "LIMIT" | "UNION" => Err(
                    SqlmergeError::UnsupportedSqlFeature(format!("{} clauses", keyword)),
                ),
                _ => Err(SqlmergeError::InvalidSqlQuery(format!(
                    "Unexpected keyword '{}' in FROM clause",
                    keyword
                ))),
            },
            ClauseToken::Where(tokens) => {
                debug!("WHERE clause: join collection done");
                self.filter = Some(tokens.clone());
                self.state = BuildState::Done;
                Ok(())
            }
            ClauseToken::Punctuation(';') => {
                self.state = BuildState::Done;
                Ok(())
            }
            ClauseToken::Punctuation(',') | ClauseToken::IdentifierList(_) => {
                Err(SqlmergeError::UnsupportedSqlFeature(
                    "comma separated tables in FROM, use JOIN ... ON".to_string(),
                ))
            }
            ClauseToken::Comparison(_) => Err(SqlmergeError::InvalidSqlQuery(format!(
                "Comparison '{}' outside of an ON clause",
                token
            ))),
            other => Err(SqlmergeError::InvalidSqlQuery(format!(
                "Unexpected '{}' in FROM clause",
                other
            ))),
        }
    }

    /// Apply a join keyword, nesting the active node when it is already full
    fn relation(&mut self, token: &ClauseToken) -> SqlmergeResult<()> {
        if self.active.is_empty() {
            return Err(SqlmergeError::InvalidSqlQuery(format!(
                "'{}' without a table before it",
                token
            )));
        }

        if self.active.is_full() {
            let inner = std::mem::take(&mut self.active);
            debug!("Nesting join '{}' as left operand", inner.alias());
            self.active.add_table(inner)?;
        } else if self.active.kind().is_some() {
            return Err(SqlmergeError::InvalidSqlQuery(format!(
                "'{}' follows another join keyword without a table",
                token
            )));
        }

        self.in_on_clause = false;
        self.active.set_relation(token)
    }

    fn finish(self) -> SqlmergeResult<JoinTree> {
        if self.active.is_empty() {
            return Err(SqlmergeError::InvalidSqlQuery(
                "FROM clause names no table".to_string(),
            ));
        }

        let source = if !self.active.is_full() && self.active.kind().is_none() {
            match self.active.into_operands() {
                (Some(table), _) => table,
                _ => {
                    return Err(SqlmergeError::InvalidSqlQuery(
                        "FROM clause names no table".to_string(),
                    ))
                }
            }
        } else {
            Operand::Joined(Box::new(self.active))
        };

        debug!("Join tree result: {}", source.name());
        Ok(JoinTree {
            source,
            columns: self.columns,
            filter: self.filter,
        })
    }
}

/// Build the join tree of a tokenized query
pub fn build_join_tree(tokens: &[ClauseToken]) -> SqlmergeResult<JoinTree> {
    JoinTreeBuilder::new(tokens).build()
}
