//! XPath 3.1 grammar additions (spec §4.1/§4.6): maps, arrays, the lookup
//! operator, and the arrow operator.

use crate::kernel::symbol::Grammar;

use super::*;

pub fn register(g: &mut Grammar) {
    g.nud("map", nud_map_constructor);
    g.nud("array", nud_array_curly);
    g.nud("[", nud_array_square);

    g.nud("?", nud_lookup);
    g.led("?", prec::POSTFIX, prec::POSTFIX + 1, led_lookup);

    g.led("=>", prec::ARROW, prec::ARROW + 1, led_arrow);
}
