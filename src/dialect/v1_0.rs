//! XPath 1.0 core grammar registration (spec §4.1/§4.3/§9 "v1_0 baseline").
//! Every later version layers on top of this: node-set path expressions,
//! the thirteen axes, node-set operators, and the four arithmetic/boolean
//! operator families that have not changed shape since 1.0.

use super::*;

pub fn register(g: &mut Grammar) {
    // Literals, context, variables.
    g.nud("<number>", nud_number);
    g.nud("<string>", nud_string);
    g.nud("<variable>", nud_variable);
    g.nud(".", nud_context_item);
    g.nud("..", nud_parent_shorthand);
    g.nud("@", nud_attribute_shorthand);
    g.nud("-", nud_unary_minus);
    g.nud("(", nud_paren);
    g.nud("<name>", nud_name);

    // Postfix predicate.
    g.led("[", prec::POSTFIX, prec::POSTFIX + 1, led_predicate);

    // Axis steps (`attribute` gets its own disambiguating nud since it also
    // names a kind test from 2.0 on).
    for axis_kw in [
        "child",
        "descendant",
        "descendant-or-self",
        "self",
        "parent",
        "ancestor",
        "ancestor-or-self",
        "following-sibling",
        "preceding-sibling",
        "following",
        "preceding",
        "namespace",
    ] {
        g.nud(axis_kw, nud_axis_step);
    }
    g.nud("attribute", nud_attribute_keyword);

    // The 1.0 kind tests.
    for kind_kw in ["node", "text", "comment", "processing-instruction"] {
        g.nud(kind_kw, nud_kind_test_step);
    }

    // Paths.
    g.nud("/", nud_abs_path);
    g.nud("//", nud_abs_path_double);
    register_binop(g, "/");
    register_binop(g, "//");

    // Boolean, comparison, arithmetic, node-set union.
    register_binop(g, "or");
    register_binop(g, "and");
    register_binop(g, "=");
    register_binop(g, "!=");
    register_binop(g, "<");
    register_binop(g, "<=");
    register_binop(g, ">");
    register_binop(g, ">=");
    register_binop(g, "+");
    register_binop(g, "-");
    register_binop(g, "*");
    register_binop(g, "div");
    register_binop(g, "mod");
    register_binop(g, "|");
}
