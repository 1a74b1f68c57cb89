//! Error taxonomy (spec §7). Every error the engine raises — whether caught
//! by the parser before a single node is touched, or raised mid-evaluation —
//! carries an [`ErrorCode`] straight out of the XPath/XQuery Functions &
//! Operators error namespace, a human message, one or more source-span
//! [`Note`]s, and, for dynamic errors, the evaluation stack that was active
//! when the error was raised.
//!
//! Modeled directly on the teacher's `compiler::syntax::{Syntax, Note}` (a
//! static parse-time error with notes) fused with its `vm::trace::Trace` (a
//! runtime error with an unwinding call stack) into one type, since XPath
//! has no separate link/codegen stage between parsing and evaluation for
//! the two to live apart.

use std::fmt::{self, Display, Formatter};

use crate::common::Span;

/// One XPath/XQuery F&O error code. Variant names match the spec's error
/// codes exactly so a reader can cross-reference the W3C errata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Syntax error encountered while parsing.
    XPST0003,
    /// Unknown function, or call with the wrong arity.
    XPST0017,
    /// Unbound namespace prefix.
    XPST0081,
    /// Undeclared variable referenced.
    XPST0008,
    /// Context item is absent where one is required (e.g. a bare step).
    XPDY0002,
    /// `treat as` dynamic type mismatch.
    XPDY0050,
    /// Bad operand type for an operator or function argument.
    XPTY0004,
    /// A path step's input was not a node sequence.
    XPTY0019,
    /// Generic bad-operand-shape error (e.g. effective boolean value of an
    /// invalid sequence).
    FORG0001,
    /// `fn:zero-or-one` called on a sequence of more than one item.
    FORG0003,
    /// `fn:one-or-more` called on an empty sequence.
    FORG0004,
    /// `fn:exactly-one` called on a sequence whose length is not 1.
    FORG0005,
    FORG0006,
    /// Invalid regular expression.
    FORX0002,
    /// Zero-width match in `tokenize`.
    FORX0003,
    /// Arithmetic error (division by zero on integer/decimal operands).
    FOAR0001,
    /// Overflow in numeric arithmetic.
    FOAR0002,
    /// Invalid lexical value for a cast, or invalid cast.
    FOCA0002,
    /// Date/time arithmetic overflow.
    FODT0001,
    /// Invalid namespace operation.
    FONS0004,
    /// `fn:doc` could not fetch or parse the requested resource.
    FODC0002,
    /// User-raised error via `fn:error`.
    FOER0000,
    /// Duplicate key rejected by `map:merge`'s `reject` policy.
    FOJS0003,
    /// Array index out of bounds (`array:get`/`array:put`/`array:subarray`/...).
    FOAY0001,
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A note attached to an error: a span with an optional hint, e.g. pointing
/// at both the opening and (mismatched) closing delimiter of a predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub span: Span,
    pub hint: Option<String>,
}

impl Note {
    pub fn new(span: Span) -> Note {
        Note { span, hint: None }
    }

    pub fn with_hint(span: Span, hint: &str) -> Note {
        Note { span, hint: Some(hint.to_string()) }
    }
}

/// One frame of the evaluation stack active when a dynamic error was raised
/// — the AST node symbol being evaluated and its span. Frames accumulate as
/// the error unwinds through nested function calls and path steps, innermost
/// first.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalFrame {
    pub description: String,
    pub span: Span,
}

/// The one error type the engine ever returns: static (parse/analysis) and
/// dynamic (evaluation) errors alike.
#[derive(Debug, Clone, PartialEq)]
pub struct XPathError {
    pub code: ErrorCode,
    pub message: String,
    pub notes: Vec<Note>,
    pub trace: Vec<EvalFrame>,
}

impl XPathError {
    pub fn new(code: ErrorCode, message: impl Into<String>, span: &Span) -> XPathError {
        XPathError {
            code,
            message: message.into(),
            notes: vec![Note::new(span.clone())],
            trace: Vec::new(),
        }
    }

    /// An error with no single anchoring span yet (e.g. raised deep inside a
    /// function body before unwinding has attached notes).
    pub fn no_span(code: ErrorCode, message: impl Into<String>) -> XPathError {
        XPathError { code, message: message.into(), notes: Vec::new(), trace: Vec::new() }
    }

    pub fn with_hint(mut self, hint: &str) -> XPathError {
        if let Some(last) = self.notes.last_mut() {
            last.hint = Some(hint.to_string());
        }
        self
    }

    pub fn add_note(mut self, note: Note) -> XPathError {
        self.notes.push(note);
        self
    }

    /// Records a frame while the error unwinds through an evaluation
    /// boundary (path step, function call, predicate).
    pub fn push_frame(mut self, description: impl Into<String>, span: &Span) -> XPathError {
        self.trace.push(EvalFrame { description: description.into(), span: span.clone() });
        self
    }
}

impl Display for XPathError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}] {}", self.code, self.message)?;
        for note in &self.notes {
            writeln!(f, "{}", note.span)?;
            if let Some(hint) = &note.hint {
                writeln!(f, "  hint: {}", hint)?;
            }
        }
        if !self.trace.is_empty() {
            writeln!(f, "evaluation stack (innermost last):")?;
            for frame in self.trace.iter().rev() {
                writeln!(f, "  while evaluating {}", frame.description)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for XPathError {}

pub type XResult<T> = Result<T, XPathError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Source;

    #[test]
    fn display_includes_code_and_message() {
        let source = Source::expr("1 div 0");
        let span = Span::new(&source, 2, 3);
        let err = XPathError::new(ErrorCode::FOAR0001, "division by zero", &span);
        let rendered = format!("{}", err);
        assert!(rendered.contains("FOAR0001"));
        assert!(rendered.contains("division by zero"));
    }

    #[test]
    fn trace_accumulates_innermost_first() {
        let source = Source::expr("f(g(1))");
        let span = Span::point(&source, 0);
        let err = XPathError::new(ErrorCode::XPTY0004, "bad type", &span)
            .push_frame("call to g", &span)
            .push_frame("call to f", &span);
        assert_eq!(err.trace.len(), 2);
        assert_eq!(err.trace[0].description, "call to g");
        assert_eq!(err.trace[1].description, "call to f");
    }
}
