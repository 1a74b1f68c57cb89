//! XPath 2.0 grammar additions (spec §4.1/§4.4): sequences replace node-sets,
//! so a comma becomes a real operator; value/node comparisons, ranges,
//! `if`/`for`/quantified expressions, and the `instance of` family of
//! sequence-type operators all first appear here.

use crate::kernel::symbol::Grammar;

use super::*;

pub fn register(g: &mut Grammar) {
    g.led(",", prec::COMMA, prec::COMMA + 1, led_comma);
    g.nud("+", nud_unary_plus);

    // Value and node comparisons, node-set ordering, range.
    register_binop(g, "eq");
    register_binop(g, "ne");
    register_binop(g, "lt");
    register_binop(g, "le");
    register_binop(g, "gt");
    register_binop(g, "ge");
    register_binop(g, "is");
    register_binop(g, "<<");
    register_binop(g, ">>");
    register_binop(g, "to");
    register_binop(g, "idiv");
    register_binop(g, "union");
    register_binop(g, "intersect");
    register_binop(g, "except");

    // Control structures.
    g.nud("if", nud_if);
    g.nud("for", nud_for);
    g.nud("some", nud_some);
    g.nud("every", nud_every);

    // Sequence-type operators.
    g.led("instance", prec::INSTANCE_OF, prec::INSTANCE_OF + 1, led_instance_of);
    g.led("treat", prec::TREAT, prec::TREAT + 1, led_treat_as);
    g.led("castable", prec::CASTABLE, prec::CASTABLE + 1, led_castable_as);
    g.led("cast", prec::CAST, prec::CAST + 1, led_cast_as);

    // Kind tests with an optional name/schema argument.
    for kind_kw in ["document-node", "element", "schema-element", "schema-attribute"] {
        g.nud(kind_kw, nud_kind_test_step);
    }
}
