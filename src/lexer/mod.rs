//! Tokenization (spec §4.2). [`lex::Lexer`] turns a [`crate::common::Source`]
//! into a flat [`token::Tokens`] stream; the kernel's parser consumes that
//! stream directly, there is no separate token-tree grouping stage.

pub mod lex;
pub mod token;

pub use lex::Lexer;
pub use token::{NameToken, NumberLit, Token, Tokens};
