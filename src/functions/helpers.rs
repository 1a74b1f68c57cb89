//! Shared argument-coercion helpers used across the `fn:`/`math:`/`map:`/
//! `array:`/`xs:` dispatch tables (spec §4.6 "arguments are evaluated
//! left-to-right, each atomized/subtyped against the declared signature").

use crate::error::{ErrorCode, XPathError, XResult};
use crate::value::atomic::AtomicValue;
use crate::value::node::XdmNode;
use crate::value::sequence::{atomize_sequence, Item, Sequence};

fn bad_arg(function: &str, detail: &str) -> XPathError {
    XPathError::no_span(ErrorCode::XPTY0004, format!("{}: {}", function, detail))
}

/// Atomizes `seq` and requires exactly zero or one resulting atomic value,
/// the shape most F&O scalar parameters declare (`xs:string?`, `xs:double?`,
/// ...).
pub fn zero_or_one_atomic<N: XdmNode>(function: &str, seq: &Sequence<N>) -> XResult<Option<AtomicValue>> {
    let atoms = atomize_sequence(seq)?;
    match atoms.len() {
        0 => Ok(None),
        1 => Ok(Some(atoms.into_iter().next().unwrap())),
        _ => Err(bad_arg(function, "expected at most one item")),
    }
}

/// Same as [`zero_or_one_atomic`] but requires exactly one (a mandatory
/// parameter).
pub fn exactly_one_atomic<N: XdmNode>(function: &str, seq: &Sequence<N>) -> XResult<AtomicValue> {
    zero_or_one_atomic(function, seq)?.ok_or_else(|| bad_arg(function, "expected exactly one item, got none"))
}

/// `fn:string($arg)` coercion: empty sequence becomes `""`; a single item
/// becomes its string value.
pub fn arg_as_string<N: XdmNode>(function: &str, seq: &Sequence<N>) -> XResult<String> {
    match seq {
        [] => Ok(String::new()),
        [single] => Ok(single.string_value()),
        _ => Err(bad_arg(function, "expected at most one item")),
    }
}

pub fn arg_as_f64<N: XdmNode>(function: &str, seq: &Sequence<N>) -> XResult<Option<f64>> {
    match zero_or_one_atomic(function, seq)? {
        None => Ok(None),
        Some(a) => a.as_f64().ok_or_else(|| bad_arg(function, "expected a numeric argument")).map(Some),
    }
}

pub fn arg_as_bool<N: XdmNode>(function: &str, seq: &Sequence<N>) -> XResult<bool> {
    crate::value::sequence::effective_boolean_value(seq)
}

pub fn arg_as_i64<N: XdmNode>(function: &str, seq: &Sequence<N>) -> XResult<Option<i64>> {
    match arg_as_f64(function, seq)? {
        None => Ok(None),
        Some(n) => Ok(Some(n.round() as i64)),
    }
}

pub fn single_string<N: XdmNode>(s: impl Into<String>) -> Sequence<N> {
    vec![Item::Atomic(AtomicValue::String(s.into()))]
}

pub fn single_boolean<N: XdmNode>(b: bool) -> Sequence<N> {
    vec![Item::Atomic(AtomicValue::Boolean(b))]
}

pub fn single_integer<N: XdmNode>(i: i64) -> Sequence<N> {
    vec![Item::Atomic(AtomicValue::integer(i))]
}

pub fn single_double<N: XdmNode>(d: f64) -> Sequence<N> {
    vec![Item::Atomic(AtomicValue::Double(d))]
}

pub fn empty<N: XdmNode>() -> Sequence<N> {
    Vec::new()
}
