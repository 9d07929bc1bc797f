//! Lexer module for sqlmerge
//!
//! This module turns raw query text into the clause token stream consumed by
//! the join resolver. Lexing itself is delegated to sqlparser's tokenizer;
//! this module only groups the raw tokens into clause-level units:
//!
//! - the projection after SELECT becomes one identifier list
//! - `LEFT OUTER JOIN` style keyword runs become one keyword token
//! - dotted names with an optional alias become identifiers
//! - `operand op operand` becomes a comparison
//! - everything from WHERE to the end of the filter becomes one WHERE group

use sqlparser::dialect::GenericDialect;
use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::{Token, Tokenizer};

use crate::error::{SqlmergeError, SqlmergeResult};
use crate::token::{ClauseToken, Comparison, ComparisonOp, ComparisonOperand, Identifier, Literal};

/// Words treated as keywords when grouping; any other word is a name
const CLAUSE_KEYWORDS: &[Keyword] = &[
    Keyword::SELECT,
    Keyword::DISTINCT,
    Keyword::FROM,
    Keyword::WHERE,
    Keyword::JOIN,
    Keyword::LEFT,
    Keyword::RIGHT,
    Keyword::INNER,
    Keyword::OUTER,
    Keyword::FULL,
    Keyword::CROSS,
    Keyword::NATURAL,
    Keyword::ON,
    Keyword::USING,
    Keyword::AND,
    Keyword::OR,
    Keyword::NOT,
    Keyword::AS,
    Keyword::GROUP,
    Keyword::ORDER,
    Keyword::BY,
    Keyword::HAVING,
    Keyword::LIMIT,
    Keyword::UNION,
];

/// Words that make up a join relation keyword
const JOIN_WORDS: &[Keyword] = &[
    Keyword::LEFT,
    Keyword::RIGHT,
    Keyword::INNER,
    Keyword::FULL,
    Keyword::CROSS,
    Keyword::NATURAL,
    Keyword::OUTER,
    Keyword::JOIN,
];

/// Keywords that end a WHERE group
const WHERE_TERMINATORS: &[Keyword] = &[
    Keyword::GROUP,
    Keyword::ORDER,
    Keyword::HAVING,
    Keyword::LIMIT,
    Keyword::UNION,
];

/// Tokenize a query into clause tokens
///
/// # Arguments
/// * `sql` - The raw query text
///
/// # Returns
/// * The grouped clause tokens in document order
pub fn tokenize(sql: &str) -> SqlmergeResult<Vec<ClauseToken>> {
    let dialect = GenericDialect {};
    let mut tokenizer = Tokenizer::new(&dialect, sql);
    let tokens = tokenizer
        .tokenize()?
        .into_iter()
        .filter(|t| !matches!(t, Token::Whitespace(_) | Token::EOF))
        .collect();

    Grouper { tokens, pos: 0 }.group()
}

/// Returns the keyword for a word that acts as a clause keyword
fn clause_keyword(token: &Token) -> Option<Keyword> {
    match token {
        Token::Word(w) if w.quote_style.is_none() && CLAUSE_KEYWORDS.contains(&w.keyword) => {
            Some(w.keyword)
        }
        _ => None,
    }
}

fn comparison_op(token: &Token) -> Option<ComparisonOp> {
    match token {
        Token::Eq | Token::DoubleEq => Some(ComparisonOp::Eq),
        Token::Neq => Some(ComparisonOp::NotEq),
        Token::Lt => Some(ComparisonOp::Lt),
        Token::LtEq => Some(ComparisonOp::LtEq),
        Token::Gt => Some(ComparisonOp::Gt),
        Token::GtEq => Some(ComparisonOp::GtEq),
        _ => None,
    }
}

fn parse_number(text: &str) -> SqlmergeResult<f64> {
    text.parse::<f64>()
        .map_err(|_| SqlmergeError::InvalidSqlQuery(format!("Invalid number literal '{}'", text)))
}

/// Groups a flat sqlparser token list into clause tokens
struct Grouper {
    tokens: Vec<Token>,
    pos: usize,
}

impl Grouper {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_keyword(&self) -> Option<Keyword> {
        self.peek().and_then(clause_keyword)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Consume the current word and return it upper-cased
    fn take_keyword_text(&mut self) -> String {
        match self.advance() {
            Some(Token::Word(w)) => w.value.to_uppercase(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }

    fn group(mut self) -> SqlmergeResult<Vec<ClauseToken>> {
        let mut out = Vec::new();

        while let Some(token) = self.peek().cloned() {
            if let Some(keyword) = clause_keyword(&token) {
                self.keyword(keyword, &mut out)?;
                continue;
            }

            match token {
                Token::Comma => {
                    self.pos += 1;
                    out.push(ClauseToken::Punctuation(','));
                }
                Token::SemiColon => {
                    self.pos += 1;
                    out.push(ClauseToken::Punctuation(';'));
                }
                _ => out.push(self.expression()?),
            }
        }

        Ok(out)
    }

    fn keyword(&mut self, keyword: Keyword, out: &mut Vec<ClauseToken>) -> SqlmergeResult<()> {
        match keyword {
            Keyword::SELECT => {
                out.push(ClauseToken::Keyword(self.take_keyword_text()));
                if self.peek_keyword() == Some(Keyword::DISTINCT) {
                    out.push(ClauseToken::Keyword(self.take_keyword_text()));
                }
                out.push(self.projection()?);
            }
            Keyword::WHERE => {
                self.pos += 1;
                out.push(self.where_clause()?);
            }
            k if JOIN_WORDS.contains(&k) => out.push(self.join_keyword()),
            _ => out.push(ClauseToken::Keyword(self.take_keyword_text())),
        }
        Ok(())
    }

    /// Collapse `LEFT OUTER JOIN` and friends into a single keyword
    fn join_keyword(&mut self) -> ClauseToken {
        let mut words = Vec::new();
        while let Some(keyword) = self.peek_keyword() {
            if !JOIN_WORDS.contains(&keyword) {
                break;
            }
            words.push(self.take_keyword_text());
            if keyword == Keyword::JOIN {
                break;
            }
        }
        ClauseToken::Keyword(words.join(" "))
    }

    fn projection(&mut self) -> SqlmergeResult<ClauseToken> {
        let mut items = Vec::new();
        loop {
            match self.expression()? {
                ClauseToken::Identifier(ident) => items.push(ident),
                other => {
                    return Err(SqlmergeError::UnsupportedSqlFeature(format!(
                        "Projection item '{}' is not a column reference",
                        other
                    )))
                }
            }

            match self.peek().cloned() {
                Some(Token::Comma) => self.pos += 1,
                None | Some(Token::SemiColon) => break,
                Some(t) if clause_keyword(&t) == Some(Keyword::FROM) => break,
                Some(t) => {
                    return Err(SqlmergeError::UnsupportedSqlFeature(format!(
                        "Projection expressions are not supported (near '{}')",
                        t
                    )))
                }
            }
        }
        Ok(ClauseToken::IdentifierList(items))
    }

    fn where_clause(&mut self) -> SqlmergeResult<ClauseToken> {
        let mut tokens = Vec::new();
        while let Some(token) = self.peek().cloned() {
            match clause_keyword(&token) {
                Some(k) if WHERE_TERMINATORS.contains(&k) => break,
                Some(_) => tokens.push(ClauseToken::Keyword(self.take_keyword_text())),
                None if token == Token::SemiColon => break,
                None => tokens.push(self.expression()?),
            }
        }
        Ok(ClauseToken::Where(tokens))
    }

    /// Group a name, a literal or a comparison starting at the cursor
    fn expression(&mut self) -> SqlmergeResult<ClauseToken> {
        let left = match self.operand()? {
            Some(operand) => operand,
            None => {
                let text = self.advance().map(|t| t.to_string()).unwrap_or_default();
                return Ok(ClauseToken::Other(text));
            }
        };

        if let Some(operator) = self.peek().and_then(comparison_op) {
            self.pos += 1;
            let right = self.operand()?.ok_or_else(|| {
                SqlmergeError::InvalidSqlQuery(format!(
                    "Missing right operand in comparison '{} {}'",
                    left, operator
                ))
            })?;
            return Ok(ClauseToken::Comparison(Comparison::new(left, operator, right)));
        }

        match left {
            ComparisonOperand::Column(ident) => Ok(ClauseToken::Identifier(self.with_alias(ident)?)),
            ComparisonOperand::Literal(lit) => Ok(ClauseToken::Other(lit.to_string())),
        }
    }

    /// Parse one comparison operand, or return `None` without consuming
    fn operand(&mut self) -> SqlmergeResult<Option<ComparisonOperand>> {
        let token = self.peek().cloned().ok_or_else(|| {
            SqlmergeError::InvalidSqlQuery("Unexpected end of query".to_string())
        })?;

        let is_name = clause_keyword(&token).is_none();
        let operand = match token {
            Token::Word(_) if is_name => {
                ComparisonOperand::Column(self.dotted_name()?)
            }
            Token::Mul => {
                self.pos += 1;
                ComparisonOperand::Column(Identifier::new("*", None, None))
            }
            Token::Number(text, _) => {
                self.pos += 1;
                ComparisonOperand::Literal(Literal::Number(parse_number(&text)?))
            }
            Token::Minus => match self.tokens.get(self.pos + 1) {
                Some(Token::Number(text, _)) => {
                    let value = parse_number(text)?;
                    self.pos += 2;
                    ComparisonOperand::Literal(Literal::Number(-value))
                }
                _ => return Ok(None),
            },
            Token::SingleQuotedString(text) => {
                self.pos += 1;
                ComparisonOperand::Literal(Literal::String(text))
            }
            _ => return Ok(None),
        };
        Ok(Some(operand))
    }

    /// Parse `name`, `parent.name` or `parent.*`
    fn dotted_name(&mut self) -> SqlmergeResult<Identifier> {
        let mut name = match self.advance() {
            Some(Token::Word(w)) => w.value,
            other => {
                return Err(SqlmergeError::InvalidSqlQuery(format!(
                    "Expected a name, found '{}'",
                    other.map(|t| t.to_string()).unwrap_or_default()
                )))
            }
        };
        let mut parent = None;

        while self.peek() == Some(&Token::Period) {
            self.pos += 1;
            let next = match self.advance() {
                Some(Token::Word(w)) => w.value,
                Some(Token::Mul) => "*".to_string(),
                _ => {
                    return Err(SqlmergeError::InvalidSqlQuery(format!(
                        "Expected a name after '{}.'",
                        name
                    )))
                }
            };
            parent = Some(name);
            name = next;
        }

        Ok(Identifier::new(&name, parent.as_deref(), None))
    }

    /// Attach an `AS alias` or bare trailing alias to an identifier
    fn with_alias(&mut self, ident: Identifier) -> SqlmergeResult<Identifier> {
        let alias = match self.peek().cloned() {
            Some(token) if clause_keyword(&token) == Some(Keyword::AS) => {
                self.pos += 1;
                match self.advance() {
                    Some(Token::Word(w)) => Some(w.value),
                    _ => {
                        return Err(SqlmergeError::InvalidSqlQuery(format!(
                            "Expected an alias after '{} AS'",
                            ident
                        )))
                    }
                }
            }
            Some(Token::Word(w)) if w.quote_style.is_some() || !CLAUSE_KEYWORDS.contains(&w.keyword) => {
                self.pos += 1;
                Some(w.value)
            }
            _ => None,
        };

        Ok(Identifier::new(
            ident.real_name(),
            ident.parent_name(),
            alias.as_deref(),
        ))
    }
}
