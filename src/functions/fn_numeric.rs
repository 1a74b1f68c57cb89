//! `fn:` numeric and boolean functions (spec §4.6a): `abs`, `ceiling`,
//! `floor`, `round`, `round-half-to-even`, `not`, `true`, `false`,
//! `boolean`. Each preserves the narrowest input numeric type per spec
//! §4.6 "preserve the narrowest input type; special-case NaN, ±0, ±INF".

use crate::error::XResult;
use crate::functions::helpers::{arg_as_bool, single_boolean, zero_or_one_atomic};
use crate::value::atomic::AtomicValue;
use crate::value::node::XdmNode;
use crate::value::sequence::{Item, Sequence};

fn map_numeric<N: XdmNode>(
    function: &str,
    args: &[Sequence<N>],
    f: impl Fn(&AtomicValue) -> AtomicValue,
) -> XResult<Sequence<N>> {
    match zero_or_one_atomic(function, &args[0])? {
        None => Ok(Vec::new()),
        Some(value) => Ok(vec![Item::Atomic(f(&value))]),
    }
}

pub fn abs<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    map_numeric("fn:abs", args, |v| match v {
        AtomicValue::Integer(i, tag) => AtomicValue::Integer(i.abs(), *tag),
        AtomicValue::Decimal(d) => AtomicValue::Decimal(d.abs()),
        AtomicValue::Float(f) => AtomicValue::Float(f.abs()),
        AtomicValue::Double(d) => AtomicValue::Double(d.abs()),
        other => other.clone(),
    })
}

pub fn ceiling<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    map_numeric("fn:ceiling", args, |v| match v {
        AtomicValue::Integer(i, tag) => AtomicValue::Integer(*i, *tag),
        AtomicValue::Decimal(d) => AtomicValue::Decimal(d.ceil()),
        AtomicValue::Float(f) => AtomicValue::Float(f.ceil()),
        AtomicValue::Double(d) => AtomicValue::Double(d.ceil()),
        other => other.clone(),
    })
}

pub fn floor<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    map_numeric("fn:floor", args, |v| match v {
        AtomicValue::Integer(i, tag) => AtomicValue::Integer(*i, *tag),
        AtomicValue::Decimal(d) => AtomicValue::Decimal(d.floor()),
        AtomicValue::Float(f) => AtomicValue::Float(f.floor()),
        AtomicValue::Double(d) => AtomicValue::Double(d.floor()),
        other => other.clone(),
    })
}

/// `fn:round`: rounds half away from zero, except for `xs:double`/`float`
/// `NaN`/`±INF`, which pass through unchanged (spec §4.6a).
pub fn round<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    map_numeric("fn:round", args, |v| match v {
        AtomicValue::Integer(i, tag) => AtomicValue::Integer(*i, *tag),
        AtomicValue::Decimal(d) => AtomicValue::Decimal(round_half_up(*d)),
        AtomicValue::Float(f) => AtomicValue::Float(round_half_up(*f as f64) as f32),
        AtomicValue::Double(d) => AtomicValue::Double(round_half_up(*d)),
        other => other.clone(),
    })
}

fn round_half_up(d: f64) -> f64 {
    if d.is_nan() || d.is_infinite() {
        return d;
    }
    (d + if d >= 0.0 { 0.5 } else { -0.5 }).trunc()
}

/// `fn:round-half-to-even`: banker's rounding (spec §4.6a).
pub fn round_half_to_even<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    map_numeric("fn:round-half-to-even", args, |v| match v {
        AtomicValue::Integer(i, tag) => AtomicValue::Integer(*i, *tag),
        AtomicValue::Decimal(d) => AtomicValue::Decimal(half_to_even(*d)),
        AtomicValue::Float(f) => AtomicValue::Float(half_to_even(*f as f64) as f32),
        AtomicValue::Double(d) => AtomicValue::Double(half_to_even(*d)),
        other => other.clone(),
    })
}

fn half_to_even(d: f64) -> f64 {
    if d.is_nan() || d.is_infinite() {
        return d;
    }
    let floor = d.floor();
    let diff = d - floor;
    if diff < 0.5 {
        floor
    } else if diff > 0.5 {
        floor + 1.0
    } else if (floor as i64) % 2 == 0 {
        floor
    } else {
        floor + 1.0
    }
}

pub fn not<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    Ok(single_boolean(!arg_as_bool("fn:not", &args[0])?))
}

pub fn true_fn<N: XdmNode>() -> Sequence<N> {
    single_boolean(true)
}

pub fn false_fn<N: XdmNode>() -> Sequence<N> {
    single_boolean(false)
}

pub fn boolean<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    Ok(single_boolean(arg_as_bool("fn:boolean", &args[0])?))
}
