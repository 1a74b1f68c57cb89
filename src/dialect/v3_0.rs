//! XPath 3.0 grammar additions (spec §4.1/§4.5): functions become first-class
//! values — dynamic calls, named function references, and inline function
//! expressions — plus string concatenation, the simple map operator, `let`
//! expressions, and the `namespace-node()` kind test.

use crate::kernel::symbol::Grammar;

use super::*;

pub fn register(g: &mut Grammar) {
    register_binop(g, "||");
    register_binop(g, "!");

    g.nud("let", nud_let);
    g.nud("function", nud_inline_function);
    g.led("(", prec::POSTFIX, prec::POSTFIX + 1, led_dynamic_call);

    g.nud("namespace-node", nud_kind_test_step);
}
