//! The generic Pratt loop (spec §4.1). Generalizes the teacher's
//! `compiler::parse::Parser::{expr, rule_prefix, rule_infix}` — which
//! dispatch on a hand-matched `ResOp`/`Prec` enum — into a data-driven
//! version keyed through [`crate::kernel::symbol::Grammar`], so the same
//! loop serves every XPath dialect registry.

use std::rc::Rc;

use crate::ast::Ast;
use crate::common::{Source, Span, Spanned};
use crate::error::{ErrorCode, XPathError, XResult};
use crate::kernel::symbol::{token_key, Grammar};
use crate::lexer::{Lexer, Token, Tokens};

pub struct Parser {
    grammar: Grammar,
    tokens: Tokens,
    pos: usize,
    source: Rc<Source>,
}

impl Parser {
    /// Lexes and parses a complete expression, requiring the whole source to
    /// be consumed. The parser never evaluates — every error it raises is
    /// static (spec §4.1).
    pub fn parse(grammar: Grammar, source: Rc<Source>) -> XResult<Spanned<Ast>> {
        let tokens = Lexer::lex(Rc::clone(&source))?;
        let mut parser = Parser { grammar, tokens, pos: 0, source };
        let ast = parser.expression(0)?;
        parser.expect_eof()?;
        Ok(ast)
    }

    fn peek_spanned(&self) -> Option<&Spanned<Token>> {
        self.tokens.get(self.pos)
    }

    pub fn peek(&self) -> Token {
        self.peek_spanned().map(|t| t.item.clone()).unwrap_or(Token::Eof)
    }

    pub fn peek_span(&self) -> Span {
        self.peek_spanned().map(|t| t.span.clone()).unwrap_or_else(|| {
            let end = self.source.contents.len();
            Span::new(&self.source, end, 0)
        })
    }

    /// Consumes and returns the current token (spec §4.1 `advance(symbol?)`
    /// primitive, unconditional form).
    pub fn advance(&mut self) -> Spanned<Token> {
        if let Some(tok) = self.tokens.get(self.pos).cloned() {
            self.pos += 1;
            tok
        } else {
            let end = self.source.contents.len();
            Spanned::new(Token::Eof, Span::new(&self.source, end, 0))
        }
    }

    /// Lookahead predicate (spec §4.1 `next_is(symbol)`).
    pub fn next_is(&self, key: &str) -> bool {
        token_key(&self.peek()) == key
    }

    /// Consumes the current token, asserting it matches `key`; the
    /// assertion form of `advance(symbol)`.
    pub fn expect(&mut self, key: &str) -> XResult<Spanned<Token>> {
        let tok = self.advance();
        if token_key(&tok.item) == key {
            Ok(tok)
        } else {
            Err(XPathError::new(
                ErrorCode::XPST0003,
                format!("expected `{}`, found {}", key, tok.item),
                &tok.span,
            ))
        }
    }

    fn expect_eof(&mut self) -> XResult<()> {
        if matches!(self.peek(), Token::Eof) {
            Ok(())
        } else {
            let tok = self.advance();
            Err(XPathError::new(
                ErrorCode::XPST0003,
                format!("unexpected {} after expression", tok.item),
                &tok.span,
            ))
        }
    }

    pub fn source(&self) -> &Rc<Source> {
        &self.source
    }

    /// `expression(rbp) → AST`: obtain the current token, call its `nud`,
    /// then while the next token's `lbp > rbp`, advance and call its `led`
    /// on the accumulating left operand (spec §4.1).
    pub fn expression(&mut self, rbp: u8) -> XResult<Spanned<Ast>> {
        let token = self.advance();
        let key = token_key(&token.item);
        let nud = self.grammar.lookup_nud(&key).ok_or_else(|| {
            XPathError::new(ErrorCode::XPST0003, format!("unexpected {}", token.item), &token.span)
        })?;
        let mut left = nud(self, token)?;

        loop {
            let key = token_key(&self.peek());
            if self.grammar.left_binding_power(&key) <= rbp {
                break;
            }
            let token = self.advance();
            let rule = self
                .grammar
                .lookup_infix(&key)
                .expect("left_binding_power > rbp implies a registered infix rule");
            left = (rule.led)(self, left, token)?;
        }

        Ok(left)
    }
}
