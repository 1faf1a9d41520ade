// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Guard expressions
//!
//! A guard is a small boolean predicate over a task's environment:
//!
//! - `VAR == value`, `VAR != "quoted value"`
//! - `VAR is empty`, `VAR is not empty`
//! - `value in VAR`, `value not in VAR` (substring)
//! - `VAR contains value`, `VAR not contains value`
//! - `VAR matches "^re.*gex$"`, `VAR not matches ...`
//! - `and`, `or`, `not` and parentheses
//!
//! Values are double-quoted, backtick-quoted (raw) or bare words.

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Errors raised while parsing or evaluating a guard
#[derive(Debug, Error, PartialEq)]
pub enum ExpressionError {
    #[error("unexpected character '{found}' at position {position}")]
    UnexpectedChar { found: char, position: usize },
    #[error("unterminated string starting at position {0}")]
    UnterminatedString(usize),
    #[error("expected {expected} at position {position}, found {found}")]
    Unexpected {
        expected: &'static str,
        found: String,
        position: usize,
    },
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),
    #[error("invalid pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Quoted(String),
    Eq,
    NotEq,
    LParen,
    RParen,
    End,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(w) => write!(f, "'{}'", w),
            Token::Quoted(s) => write!(f, "\"{}\"", s),
            Token::Eq => write!(f, "'=='"),
            Token::NotEq => write!(f, "'!='"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::End => write!(f, "end of expression"),
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | ':' | '/')
}

fn tokenize(input: &str) -> Result<Vec<(usize, Token)>, ExpressionError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '(' => tokens.push((pos, Token::LParen)),
            ')' => tokens.push((pos, Token::RParen)),
            '=' | '!' => match chars.peek() {
                Some((_, '=')) => {
                    chars.next();
                    let token = if c == '=' { Token::Eq } else { Token::NotEq };
                    tokens.push((pos, token));
                }
                _ => {
                    return Err(ExpressionError::UnexpectedChar { found: c, position: pos });
                }
            },
            '"' => {
                let mut value = String::new();
                let mut closed = false;
                while let Some((_, nc)) = chars.next() {
                    match nc {
                        '"' => {
                            closed = true;
                            break;
                        }
                        '\\' => match chars.next() {
                            Some((_, escaped)) => value.push(escaped),
                            None => break,
                        },
                        _ => value.push(nc),
                    }
                }
                if !closed {
                    return Err(ExpressionError::UnterminatedString(pos));
                }
                tokens.push((pos, Token::Quoted(value)));
            }
            '`' => {
                let mut value = String::new();
                let mut closed = false;
                for (_, nc) in chars.by_ref() {
                    if nc == '`' {
                        closed = true;
                        break;
                    }
                    value.push(nc);
                }
                if !closed {
                    return Err(ExpressionError::UnterminatedString(pos));
                }
                tokens.push((pos, Token::Quoted(value)));
            }
            c if is_word_char(c) => {
                let mut word = c.to_string();
                while let Some(&(_, nc)) = chars.peek() {
                    if !is_word_char(nc) {
                        break;
                    }
                    word.push(nc);
                    chars.next();
                }
                tokens.push((pos, Token::Word(word)));
            }
            other => {
                return Err(ExpressionError::UnexpectedChar {
                    found: other,
                    position: pos,
                })
            }
        }
    }

    tokens.push((input.len(), Token::End));
    Ok(tokens)
}

/// How a single selector is compared
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOp {
    Equal(String),
    NotEqual(String),
    IsEmpty,
    IsNotEmpty,
    In(String),
    NotIn(String),
    Contains(String),
    NotContains(String),
    Matches(Pattern),
    NotMatches(Pattern),
}

/// Compiled `matches` pattern, compared by its source text
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_str() == other.0.as_str()
    }
}

/// Parsed guard expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Match { selector: String, op: MatchOp },
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

const KEYWORDS: &[&str] = &["and", "or", "not", "in", "is", "empty", "contains", "matches"];

/// Recursive descent over the token stream; the last token is always `End`
struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos].1
    }

    fn position(&self) -> usize {
        self.tokens[self.pos].0
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Token::Word(w) if w == keyword)
    }

    fn unexpected(&self, expected: &'static str) -> ExpressionError {
        ExpressionError::Unexpected {
            expected,
            found: self.peek().to_string(),
            position: self.position(),
        }
    }

    fn expect_keyword(&mut self, keyword: &'static str) -> Result<(), ExpressionError> {
        if self.peek_keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(keyword))
        }
    }

    fn or(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.and()?;
        while self.peek_keyword("or") {
            self.advance();
            let right = self.and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.unary()?;
        while self.peek_keyword("and") {
            self.advance();
            let right = self.unary()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, ExpressionError> {
        if self.peek_keyword("not") {
            self.advance();
            return Ok(Expr::Not(Box::new(self.unary()?)));
        }
        if *self.peek() == Token::LParen {
            self.advance();
            let inner = self.or()?;
            if *self.peek() != Token::RParen {
                return Err(self.unexpected("')'"));
            }
            self.advance();
            return Ok(inner);
        }
        self.matcher()
    }

    fn selector(&mut self) -> Result<String, ExpressionError> {
        match self.peek() {
            Token::Word(w) if is_selector(w) => {
                let w = w.clone();
                self.advance();
                Ok(w)
            }
            _ => Err(self.unexpected("selector")),
        }
    }

    fn value(&mut self) -> Result<String, ExpressionError> {
        match self.peek() {
            Token::Quoted(s) => {
                let s = s.clone();
                self.advance();
                Ok(s)
            }
            Token::Word(w) if !KEYWORDS.contains(&w.as_str()) => {
                let w = w.clone();
                self.advance();
                Ok(w)
            }
            _ => Err(self.unexpected("value")),
        }
    }

    fn matcher(&mut self) -> Result<Expr, ExpressionError> {
        // `value in SELECTOR` starts with a value; look ahead for `in`/`not in`
        let is_membership = match self.tokens.get(self.pos + 1).map(|(_, t)| t) {
            Some(Token::Word(w)) if w == "in" => true,
            Some(Token::Word(w)) if w == "not" => {
                matches!(self.tokens.get(self.pos + 2).map(|(_, t)| t), Some(Token::Word(w)) if w == "in")
            }
            _ => false,
        };
        if is_membership {
            let value = self.value()?;
            let negated = self.peek_keyword("not");
            if negated {
                self.advance();
            }
            self.expect_keyword("in")?;
            let selector = self.selector()?;
            let op = if negated {
                MatchOp::NotIn(value)
            } else {
                MatchOp::In(value)
            };
            return Ok(Expr::Match { selector, op });
        }

        let selector = self.selector()?;
        if *self.peek() == Token::End {
            return Err(self.unexpected("operator"));
        }
        let op = match self.advance() {
            Token::Eq => MatchOp::Equal(self.value()?),
            Token::NotEq => MatchOp::NotEqual(self.value()?),
            Token::Word(w) if w == "is" => {
                if self.peek_keyword("not") {
                    self.advance();
                    self.expect_keyword("empty")?;
                    MatchOp::IsNotEmpty
                } else {
                    self.expect_keyword("empty")?;
                    MatchOp::IsEmpty
                }
            }
            Token::Word(w) if w == "contains" => MatchOp::Contains(self.value()?),
            Token::Word(w) if w == "matches" => MatchOp::Matches(self.pattern()?),
            Token::Word(w) if w == "not" => match self.advance() {
                Token::Word(w) if w == "contains" => MatchOp::NotContains(self.value()?),
                Token::Word(w) if w == "matches" => MatchOp::NotMatches(self.pattern()?),
                other => return Err(ExpressionError::UnknownOperator(format!("not {}", other))),
            },
            other => return Err(ExpressionError::UnknownOperator(other.to_string())),
        };
        Ok(Expr::Match { selector, op })
    }

    fn pattern(&mut self) -> Result<Pattern, ExpressionError> {
        let pattern = self.value()?;
        Regex::new(&pattern)
            .map(Pattern)
            .map_err(|e| ExpressionError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })
    }
}

fn is_selector(word: &str) -> bool {
    !KEYWORDS.contains(&word)
        && word
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && word.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

impl Expr {
    /// Parse a non-empty guard expression
    pub fn parse(input: &str) -> Result<Self, ExpressionError> {
        let tokens = tokenize(input)?;
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.or()?;
        if *parser.peek() != Token::End {
            return Err(parser.unexpected("end of expression"));
        }
        Ok(expr)
    }

    /// Evaluate against an environment; unset selectors read as absent
    pub fn evaluate(&self, env: &BTreeMap<String, String>) -> bool {
        match self {
            Expr::Not(inner) => !inner.evaluate(env),
            Expr::And(l, r) => l.evaluate(env) && r.evaluate(env),
            Expr::Or(l, r) => l.evaluate(env) || r.evaluate(env),
            Expr::Match { selector, op } => {
                let value = env.get(selector).map(String::as_str);
                match (op, value) {
                    (MatchOp::IsEmpty, v) => v.map_or(true, str::is_empty),
                    (MatchOp::IsNotEmpty, v) => v.is_some_and(|v| !v.is_empty()),
                    (
                        MatchOp::NotEqual(_)
                        | MatchOp::NotIn(_)
                        | MatchOp::NotContains(_)
                        | MatchOp::NotMatches(_),
                        None,
                    ) => true,
                    (_, None) => false,
                    (MatchOp::Equal(expected), Some(v)) => v == expected,
                    (MatchOp::NotEqual(expected), Some(v)) => v != expected,
                    (MatchOp::In(needle), Some(v)) | (MatchOp::Contains(needle), Some(v)) => {
                        v.contains(needle.as_str())
                    }
                    (MatchOp::NotIn(needle), Some(v)) | (MatchOp::NotContains(needle), Some(v)) => {
                        !v.contains(needle.as_str())
                    }
                    (MatchOp::Matches(Pattern(re)), Some(v)) => re.is_match(v),
                    (MatchOp::NotMatches(Pattern(re)), Some(v)) => !re.is_match(v),
                }
            }
        }
    }
}

/// Evaluate a guard against an environment
///
/// An empty (or blank) expression means "no guard" and is always true.
pub fn evaluate(expression: &str, env: &BTreeMap<String, String>) -> Result<bool, ExpressionError> {
    if expression.trim().is_empty() {
        return Ok(true);
    }
    Ok(Expr::parse(expression)?.evaluate(env))
}

#[cfg(test)]
#[path = "condition_tests.rs"]
mod tests;
