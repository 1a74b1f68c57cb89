//! The XPath abstract syntax tree (spec §3, §9).

pub mod node;

pub use node::{Ast, Axis, BinOp, KindTest, LookupKey, NodeTest, QuantKind, UnOp};
