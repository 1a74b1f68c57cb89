//! The token registry (spec §4.1): "every language construct is a
//! registered token class carrying left/null binding powers and two
//! semantic actions." Modeled as a data table rather than a trait-object
//! hierarchy per spec §9 ("prefer the table: registering a token is
//! inserting into the registry with explicit binding powers").

use std::collections::HashMap;

use crate::ast::Ast;
use crate::common::Spanned;
use crate::error::XResult;
use crate::kernel::parser::Parser;
use crate::lexer::Token;

/// Null-denotation action: how a token parses when it starts an expression
/// (prefix position).
pub type Nud = fn(&mut Parser, Spanned<Token>) -> XResult<Spanned<Ast>>;

/// Left-denotation action: how a token parses when it follows an already-
/// parsed left operand (infix/postfix position).
pub type Led = fn(&mut Parser, Spanned<Ast>, Spanned<Token>) -> XResult<Spanned<Ast>>;

#[derive(Clone, Copy)]
pub struct InfixRule {
    pub lbp: u8,
    pub rbp: u8,
    pub led: Led,
}

/// A dialect's complete set of token registrations. Built fresh per parse
/// (spec §4.1: "dialect registries... constructed by walking a chain of
/// registrations") rather than as shared global state, so one process can
/// hold grammars for several XPath versions simultaneously without locking.
#[derive(Default)]
pub struct Grammar {
    nuds: HashMap<String, Nud>,
    infix: HashMap<String, InfixRule>,
}

impl Grammar {
    pub fn new() -> Grammar {
        Grammar::default()
    }

    /// Registers (or overrides) a prefix action for the token keyed by
    /// `key`. Additive across dialect layers: a later version calling this
    /// again with the same key replaces the earlier binding.
    pub fn nud(&mut self, key: &str, action: Nud) -> &mut Self {
        self.nuds.insert(key.to_string(), action);
        self
    }

    /// Registers an infix/postfix action with its binding powers. `rbp`
    /// equal to `lbp + 1` makes the operator left-associative; `rbp == lbp`
    /// makes it right-associative (spec §4.1's `expression(rbp)` primitive).
    pub fn led(&mut self, key: &str, lbp: u8, rbp: u8, action: Led) -> &mut Self {
        self.infix.insert(key.to_string(), InfixRule { lbp, rbp, led: action });
        self
    }

    pub fn lookup_nud(&self, key: &str) -> Option<Nud> {
        self.nuds.get(key).copied()
    }

    pub fn lookup_infix(&self, key: &str) -> Option<InfixRule> {
        self.infix.get(key).copied()
    }

    /// Left binding power of the token keyed by `key`; zero for tokens with
    /// no infix meaning, which ends the Pratt loop.
    pub fn left_binding_power(&self, key: &str) -> u8 {
        self.infix.get(key).map(|r| r.lbp).unwrap_or(0)
    }
}

/// The registry lookup key for a token. Operators and keywords key by their
/// literal spelling (so a dialect registers `"+"` or `"for"` directly);
/// every other token shares one nud across all dialects, keyed by kind.
pub fn token_key(token: &Token) -> String {
    match token {
        Token::Op(s) => s.clone(),
        Token::Keyword(s) => s.clone(),
        Token::LParen => "(".to_string(),
        Token::RParen => ")".to_string(),
        Token::LBracket => "[".to_string(),
        Token::RBracket => "]".to_string(),
        Token::LBrace => "{".to_string(),
        Token::RBrace => "}".to_string(),
        Token::Number(_) => "<number>".to_string(),
        Token::String(_) => "<string>".to_string(),
        Token::Name(_) => "<name>".to_string(),
        Token::Variable(_) => "<variable>".to_string(),
        Token::Eof => "<eof>".to_string(),
    }
}
