//! Function items (spec §3 "Maps and arrays", §4.6 "Higher-order"):
//! `function(*)` is a first-class XDM item as of 3.0. [`FunctionItem`]
//! covers the two shapes the evaluator produces — a reference to a named
//! built-in/user function, and an inline (anonymous) function closing over
//! the scope it was constructed in — which is all `NamedFunctionRef` and
//! `InlineFunction` AST nodes (spec §3 "AST node") need to carry.

use std::rc::Rc;

use crate::ast::Ast;
use crate::common::Spanned;
use crate::value::node::XdmNode;
use crate::value::sequence::Sequence;
use crate::value::types::QName;

#[derive(Debug, Clone)]
pub enum FunctionItem<N: XdmNode> {
    /// `fn:abs#1`, `local:my-func#2`, ... — resolved by (name, arity) at
    /// call time, same as a direct `FunctionCall` (spec §4.6 "Dispatch by
    /// (QName, arity)").
    Named { name: QName, arity: usize },
    /// `function($a, $b) { ... }` — an inline function literal, capturing
    /// the variable scope active where it was written (spec §4.5's
    /// "innermost-binding-wins" applies to the captured scope too).
    Inline { params: Vec<QName>, body: Rc<Spanned<Ast>>, captured: Vec<std::collections::HashMap<QName, Sequence<N>>> },
}

impl<N: XdmNode> FunctionItem<N> {
    pub fn arity(&self) -> usize {
        match self {
            FunctionItem::Named { arity, .. } => *arity,
            FunctionItem::Inline { params, .. } => params.len(),
        }
    }
}

impl<N: XdmNode> PartialEq for FunctionItem<N> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FunctionItem::Named { name: n1, arity: a1 }, FunctionItem::Named { name: n2, arity: a2 }) => {
                n1 == n2 && a1 == a2
            }
            _ => false,
        }
    }
}
