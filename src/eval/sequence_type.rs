//! `instance of`/`treat as`/`castable as` sequence-type matching (spec §3
//! `SequenceType`, §4.6a). No precomputed table exists for this the way
//! [`crate::value::cast::is_subtype`] tables atomic subtyping — a
//! `SequenceType` pairs an [`ItemType`] with an [`OccurrenceIndicator`], so
//! matching is cardinality-then-per-item, done directly against the
//! dynamic [`Item`] shapes rather than against any static type of the
//! operand expression (spec §1 "static typing is a non-goal").

use crate::context::EvaluationContext;
use crate::value::cast::is_subtype;
use crate::value::node::{NodeKind, XdmNode};
use crate::value::sequence::{Item, Sequence};
use crate::value::types::{ItemType, KindTestShape, OccurrenceIndicator, SequenceType};

fn kind_matches(kind: NodeKind, shape: KindTestShape) -> bool {
    match shape {
        KindTestShape::AnyKind => true,
        KindTestShape::Document => kind == NodeKind::Document,
        KindTestShape::Element | KindTestShape::SchemaElement => kind == NodeKind::Element,
        KindTestShape::Attribute | KindTestShape::SchemaAttribute => kind == NodeKind::Attribute,
        KindTestShape::Text => kind == NodeKind::Text,
        KindTestShape::Comment => kind == NodeKind::Comment,
        KindTestShape::ProcessingInstruction => kind == NodeKind::ProcessingInstruction,
        KindTestShape::NamespaceNode => kind == NodeKind::Namespace,
    }
}

fn item_matches<N: XdmNode>(item: &Item<N>, item_type: &ItemType) -> bool {
    match item_type {
        ItemType::Item => true,
        ItemType::Kind(shape) => match item {
            Item::Node(n) => kind_matches(n.kind(), *shape),
            _ => false,
        },
        ItemType::Atomic(tag) => match item {
            Item::Atomic(a) => is_subtype(a.type_tag(), *tag),
            _ => false,
        },
        // map(*)/array(*) are subtypes of function(*) under the 3.1 data
        // model (spec §3 "Maps and arrays").
        ItemType::AnyFunction => matches!(item, Item::Function(_) | Item::Map(_) | Item::Array(_)),
        ItemType::AnyMap => matches!(item, Item::Map(_)),
        ItemType::AnyArray => matches!(item, Item::Array(_)),
        // Handled by the early return in `matches` — no single item ever
        // satisfies `empty-sequence()`.
        ItemType::EmptySequence => false,
    }
}

/// Does `value` satisfy `seq_type` (spec §4.6a `instance of`)? Checks
/// cardinality against [`OccurrenceIndicator`] first, then every item
/// against the item type.
pub fn matches<N: XdmNode>(value: &Sequence<N>, seq_type: &SequenceType, _ctx: &EvaluationContext<N>) -> bool {
    // `empty-sequence()` constrains cardinality directly rather than
    // combining with `seq_type.occurrence` (spec §3).
    if let ItemType::EmptySequence = seq_type.item_type {
        return value.is_empty();
    }

    let len = value.len();
    let cardinality_ok = match seq_type.occurrence {
        OccurrenceIndicator::ExactlyOne => len == 1,
        OccurrenceIndicator::ZeroOrOne => len <= 1,
        OccurrenceIndicator::OneOrMore => len >= 1,
        OccurrenceIndicator::ZeroOrMore => true,
    };
    if !cardinality_ok {
        return false;
    }
    value.iter().all(|item| item_matches(item, &seq_type.item_type))
}

/// A human-readable rendering of a sequence type, used in `treat as`
/// mismatch diagnostics.
pub fn describe(seq_type: &SequenceType) -> String {
    let item = match &seq_type.item_type {
        ItemType::Item => "item()".to_string(),
        ItemType::Kind(KindTestShape::AnyKind) => "node()".to_string(),
        ItemType::Kind(shape) => format!("{:?}", shape).to_lowercase() + "()",
        ItemType::Atomic(tag) => format!("xs:{}", tag.name()),
        ItemType::AnyFunction => "function(*)".to_string(),
        ItemType::AnyMap => "map(*)".to_string(),
        ItemType::AnyArray => "array(*)".to_string(),
        ItemType::EmptySequence => return "empty-sequence()".to_string(),
    };
    let suffix = match seq_type.occurrence {
        OccurrenceIndicator::ExactlyOne => "",
        OccurrenceIndicator::ZeroOrOne => "?",
        OccurrenceIndicator::OneOrMore => "+",
        OccurrenceIndicator::ZeroOrMore => "*",
    };
    format!("{}{}", item, suffix)
}
