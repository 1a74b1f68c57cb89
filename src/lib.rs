//! A Pratt-parsed, axis-walking XPath engine spanning the 1.0/2.0/3.0/3.1
//! dialects, evaluated generically over any in-memory tree that implements
//! [`value::node::XdmNode`] — this crate never depends on a concrete XML
//! library.
//!
//! The pipeline, end to end:
//!
//! ```text
//! source text
//!   -> lexer::Lexer            (context-sensitive tokenization, spec §4.2)
//!   -> dialect::grammar(v)      (version-layered nud/led registry, spec §4.1)
//!   -> kernel::Parser::parse    (generic Pratt loop over that registry)
//!   -> ast::Ast                 (one flat AST enum, spec §3/§9)
//!   -> eval::evaluate           (generic over value::node::XdmNode)
//!   -> value::sequence::Sequence
//! ```
//!
//! Each stage only knows about the stage below it: the kernel has no idea
//! what `for` or `::` mean, the evaluator has no idea what kind of tree it
//! is walking, and nothing above [`schema`] knows XSD exists.

pub mod ast;
pub mod axes;
pub mod common;
pub mod context;
pub mod dialect;
pub mod error;
pub mod eval;
pub mod functions;
pub mod kernel;
pub mod lexer;
pub mod schema;
pub mod value;

pub use ast::Ast;
pub use common::{Source, Span, Spanned};
pub use context::EvaluationContext;
pub use dialect::Version;
pub use error::{ErrorCode, XPathError, XResult};
pub use eval::evaluate;
pub use value::node::XdmNode;
pub use value::sequence::{Item, Sequence};

use std::rc::Rc;

/// Parses and evaluates `expr` against `ctx` in one call — the shortest
/// path from source text to a result sequence for callers that don't need
/// to inspect the AST in between.
pub fn run<N: XdmNode>(version: Version, expr: &str, ctx: &mut EvaluationContext<N>) -> XResult<Sequence<N>> {
    let source = Source::expr(expr);
    let ast = dialect::parse(version, source)?;
    evaluate(&ast, ctx)
}
