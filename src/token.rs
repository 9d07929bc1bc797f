//! Clause token model for sqlmerge
//!
//! The join resolution core never looks at raw query text. It consumes a
//! flat sequence of typed clause tokens: keywords, identifiers, identifier
//! lists, comparisons and a grouped WHERE clause. This module defines that
//! sequence; the `lexer` module produces it from SQL text.

use std::fmt;

use serde::Serialize;

use crate::merge::python_string;

/// One grouped token of a query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ClauseToken {
    /// A reserved word, upper-cased; multi-word join keywords are one token
    Keyword(String),
    /// A possibly qualified name with an optional alias
    Identifier(Identifier),
    /// Comma separated identifiers, as found in the projection
    IdentifierList(Vec<Identifier>),
    /// A binary comparison between two operands
    Comparison(Comparison),
    /// The grouped filter clause, without its leading WHERE keyword
    Where(Vec<ClauseToken>),
    /// Separator characters such as `,` and `;`
    Punctuation(char),
    /// Anything that has no meaning to the join resolver
    Other(String),
}

impl ClauseToken {
    /// Whether this token is a keyword
    pub fn is_keyword(&self) -> bool {
        matches!(self, ClauseToken::Keyword(_))
    }

    /// Normalized keyword text, or `None` for non-keywords
    pub fn normalized(&self) -> Option<&str> {
        match self {
            ClauseToken::Keyword(text) => Some(text),
            _ => None,
        }
    }

    /// Whether this token is the given keyword
    pub fn is_keyword_text(&self, text: &str) -> bool {
        self.normalized() == Some(text)
    }

    /// Borrow the identifier carried by this token, if any
    pub fn as_identifier(&self) -> Option<&Identifier> {
        match self {
            ClauseToken::Identifier(ident) => Some(ident),
            _ => None,
        }
    }

    /// Borrow the comparison carried by this token, if any
    pub fn as_comparison(&self) -> Option<&Comparison> {
        match self {
            ClauseToken::Comparison(cmp) => Some(cmp),
            _ => None,
        }
    }

    /// Short description of the token kind, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            ClauseToken::Keyword(_) => "keyword",
            ClauseToken::Identifier(_) => "identifier",
            ClauseToken::IdentifierList(_) => "identifier list",
            ClauseToken::Comparison(_) => "comparison",
            ClauseToken::Where(_) => "WHERE clause",
            ClauseToken::Punctuation(_) => "punctuation",
            ClauseToken::Other(_) => "token",
        }
    }
}

impl fmt::Display for ClauseToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClauseToken::Keyword(text) => write!(f, "{}", text),
            ClauseToken::Identifier(ident) => write!(f, "{}", ident),
            ClauseToken::IdentifierList(idents) => {
                let parts: Vec<String> = idents.iter().map(|i| i.to_string()).collect();
                write!(f, "{}", parts.join(", "))
            }
            ClauseToken::Comparison(cmp) => write!(f, "{}", cmp),
            ClauseToken::Where(tokens) => {
                let parts: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
                write!(f, "WHERE {}", parts.join(" "))
            }
            ClauseToken::Punctuation(c) => write!(f, "{}", c),
            ClauseToken::Other(text) => write!(f, "{}", text),
        }
    }
}

/// A possibly qualified name such as `table_one a`, `a.col` or `b.*`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identifier {
    real_name: String,
    parent_name: Option<String>,
    alias: Option<String>,
}

impl Identifier {
    /// Build an identifier from its dotted parts and optional alias
    ///
    /// The last part is the real name, the part before it (if any) the
    /// parent qualifier.
    pub fn new(real_name: &str, parent_name: Option<&str>, alias: Option<&str>) -> Self {
        Identifier {
            real_name: real_name.to_string(),
            parent_name: parent_name.map(str::to_string),
            alias: alias.map(str::to_string),
        }
    }

    /// The unqualified name
    pub fn real_name(&self) -> &str {
        &self.real_name
    }

    /// The qualifier in front of the name (`a` in `a.col`)
    pub fn parent_name(&self) -> Option<&str> {
        self.parent_name.as_deref()
    }

    /// The alias given with `AS x` or a bare trailing name
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Whether this identifier is a `*` or `t.*` wildcard
    pub fn is_wildcard(&self) -> bool {
        self.real_name == "*"
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = &self.parent_name {
            write!(f, "{}.", parent)?;
        }
        write!(f, "{}", self.real_name)?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {}", alias)?;
        }
        Ok(())
    }
}

/// Comparison operators understood in ON and WHERE clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComparisonOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl ComparisonOp {
    /// The operator with its operands swapped (`6 < a.age` is `a.age > 6`)
    pub fn flipped(self) -> Self {
        match self {
            ComparisonOp::Eq => ComparisonOp::Eq,
            ComparisonOp::NotEq => ComparisonOp::NotEq,
            ComparisonOp::Lt => ComparisonOp::Gt,
            ComparisonOp::LtEq => ComparisonOp::GtEq,
            ComparisonOp::Gt => ComparisonOp::Lt,
            ComparisonOp::GtEq => ComparisonOp::LtEq,
        }
    }

    /// Python spelling of the operator
    pub fn as_python(self) -> &'static str {
        match self {
            ComparisonOp::Eq => "==",
            ComparisonOp::NotEq => "!=",
            ComparisonOp::Lt => "<",
            ComparisonOp::LtEq => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::GtEq => ">=",
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::NotEq => "!=",
            ComparisonOp::Lt => "<",
            ComparisonOp::LtEq => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::GtEq => ">=",
        };
        write!(f, "{}", op)
    }
}

/// A constant in a comparison; quotes are already stripped from strings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    Number(f64),
    String(String),
}

impl Literal {
    /// Python source for the literal
    pub fn as_python(&self) -> String {
        match self {
            Literal::Number(n) => n.to_string(),
            Literal::String(s) => python_string(s),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{}", n),
            Literal::String(s) => write!(f, "'{}'", s),
        }
    }
}

/// One side of a comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ComparisonOperand {
    Column(Identifier),
    Literal(Literal),
}

impl fmt::Display for ComparisonOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonOperand::Column(ident) => write!(f, "{}", ident),
            ComparisonOperand::Literal(lit) => write!(f, "{}", lit),
        }
    }
}

/// A binary comparison such as `a.common_col = b.common_col`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub left: ComparisonOperand,
    pub operator: ComparisonOp,
    pub right: ComparisonOperand,
}

impl Comparison {
    pub fn new(left: ComparisonOperand, operator: ComparisonOp, right: ComparisonOperand) -> Self {
        Comparison {
            left,
            operator,
            right,
        }
    }

    /// The two operand sub-expressions, left first
    pub fn operands(&self) -> [&ComparisonOperand; 2] {
        [&self.left, &self.right]
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.operator, self.right)
    }
}
