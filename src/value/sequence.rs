//! Sequences (spec §3): "flat, ordered, heterogeneous; no nested
//! sequences." [`Item`] is the sum type of the two things a sequence can
//! hold; [`Sequence`] is a flat `Vec` over it.

use std::rc::Rc;

use crate::error::{ErrorCode, XPathError, XResult};
use crate::value::atomic::AtomicValue;
use crate::value::function_item::FunctionItem;
use crate::value::map_array::{XArray, XMap};
use crate::value::node::XdmNode;

/// One XDM item: a node, an atomic value, or (3.0+) a function/map/array
/// (spec §3 "Maps and arrays", §4.6 "Higher-order"). Maps and arrays are
/// themselves function items under the 3.1 data model (`map(*)`/`array(*)`
/// are subtypes of `function(*)`), but are kept as distinct variants here
/// since the evaluator and F&O library branch on them separately far more
/// often than they treat them uniformly as callables.
#[derive(Debug, Clone)]
pub enum Item<N: XdmNode> {
    Node(N),
    Atomic(AtomicValue),
    Function(Rc<FunctionItem<N>>),
    Map(Rc<XMap<N>>),
    Array(Rc<XArray<N>>),
}

impl<N: XdmNode> Item<N> {
    pub fn is_node(&self) -> bool {
        matches!(self, Item::Node(_))
    }

    pub fn string_value(&self) -> String {
        match self {
            Item::Node(n) => n.string_value(),
            Item::Atomic(a) => a.display_string(),
            Item::Function(_) | Item::Map(_) | Item::Array(_) => String::new(),
        }
    }

    /// Atomization of a single item (spec §3 Glossary: "the operation
    /// reducing a sequence of nodes to a sequence of their typed values").
    /// Function/map/array items have no typed value — atomizing one is a
    /// dynamic type error (`FOTY0013` in the F&O spec; folded into
    /// `FORG0006` here since this crate's error taxonomy, per spec §7, does
    /// not carry the full F&O catalogue).
    pub fn atomize(&self) -> XResult<Vec<AtomicValue>> {
        match self {
            Item::Node(n) => Ok(n.typed_value()),
            Item::Atomic(a) => Ok(vec![a.clone()]),
            Item::Function(_) | Item::Map(_) | Item::Array(_) => Err(XPathError::no_span(
                ErrorCode::FORG0006,
                "a function, map, or array item has no typed value to atomize",
            )),
        }
    }
}

pub type Sequence<N> = Vec<Item<N>>;

/// Atomizes every item of a sequence in order (spec §3).
pub fn atomize_sequence<N: XdmNode>(seq: &Sequence<N>) -> XResult<Vec<AtomicValue>> {
    let mut out = Vec::with_capacity(seq.len());
    for item in seq {
        out.extend(item.atomize()?);
    }
    Ok(out)
}

/// Effective Boolean Value (spec §4.3): empty sequence is false; a single
/// boolean is itself; a single string is non-empty; a single numeric is
/// non-zero and non-NaN; any sequence starting with a node is true. Any
/// other shape is `FORG0006`.
pub fn effective_boolean_value<N: XdmNode>(seq: &Sequence<N>) -> XResult<bool> {
    match seq.as_slice() {
        [] => Ok(false),
        [Item::Node(_), ..] => Ok(true),
        [single] => match single {
            Item::Atomic(a) => Ok(a.effective_boolean_value()),
            Item::Node(_) => unreachable!(),
            Item::Function(_) | Item::Map(_) | Item::Array(_) => Err(XPathError::no_span(
                ErrorCode::FORG0006,
                "effective boolean value is undefined for a function, map, or array item",
            )),
        },
        _ => Err(XPathError::no_span(
            ErrorCode::FORG0006,
            "effective boolean value is undefined for a sequence of more than one item that does not start with a node",
        )),
    }
}

/// Deduplicates by node identity and sorts into document order — the
/// result discipline for path steps joined by `/` and for `union`/
/// `intersect`/`except` (spec §3, §4.3, §4.4).
pub fn dedup_document_order<N: XdmNode>(mut nodes: Vec<N>) -> Vec<N> {
    nodes.sort_by_key(|n| n.document_position());
    nodes.dedup_by_key(|n| n.document_position());
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::node::{DocumentPosition, NodeKind};
    use crate::value::types::QName;

    #[derive(Clone)]
    struct DummyNode;

    impl XdmNode for DummyNode {
        fn kind(&self) -> NodeKind {
            NodeKind::Element
        }
        fn expanded_name(&self) -> Option<QName> {
            None
        }
        fn string_value(&self) -> String {
            String::new()
        }
        fn children(&self) -> Vec<DummyNode> {
            Vec::new()
        }
        fn attributes(&self) -> Vec<DummyNode> {
            Vec::new()
        }
        fn namespaces(&self) -> Vec<DummyNode> {
            Vec::new()
        }
        fn parent(&self) -> Option<DummyNode> {
            None
        }
        fn document_position(&self) -> DocumentPosition {
            DocumentPosition { document_id: 0, position: 0 }
        }
    }

    fn ebv(seq: Sequence<DummyNode>) -> XResult<bool> {
        effective_boolean_value(&seq)
    }

    #[test]
    fn empty_sequence_is_false() {
        assert_eq!(ebv(vec![]).unwrap(), false);
    }

    #[test]
    fn single_boolean_is_itself() {
        assert_eq!(ebv(vec![Item::Atomic(AtomicValue::Boolean(true))]).unwrap(), true);
    }

    #[test]
    fn single_nonempty_string_is_true() {
        assert_eq!(ebv(vec![Item::Atomic(AtomicValue::String("x".to_string()))]).unwrap(), true);
    }

    #[test]
    fn single_empty_string_is_false() {
        assert_eq!(ebv(vec![Item::Atomic(AtomicValue::String("".to_string()))]).unwrap(), false);
    }

    #[test]
    fn single_zero_numeric_is_false() {
        assert_eq!(ebv(vec![Item::Atomic(AtomicValue::integer(0))]).unwrap(), false);
    }

    #[test]
    fn multiple_atomics_is_an_error() {
        let seq = vec![Item::Atomic(AtomicValue::integer(1)), Item::Atomic(AtomicValue::integer(2))];
        let err = ebv(seq).unwrap_err();
        assert_eq!(err.code, ErrorCode::FORG0006);
    }
}
