//! The TDOP (Top-Down Operator Precedence, "Pratt") parser kernel (spec
//! §4.1). This module knows nothing about XPath grammar specifics — it
//! only understands tokens, binding powers, and the nud/led dispatch loop.
//! The [`crate::dialect`] modules register XPath's actual grammar into a
//! [`symbol::Grammar`] and hand it to [`parser::Parser::parse`].

pub mod parser;
pub mod symbol;

pub use parser::Parser;
pub use symbol::{Grammar, Led, Nud};
