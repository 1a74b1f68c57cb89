//! `math:` functions (spec §4.6a), all delegating straight to `f64`
//! methods from the standard library — no dependency needed beyond what
//! `xs:double` arithmetic already requires.

use crate::error::XResult;
use crate::functions::helpers::{arg_as_f64, empty, single_double};
use crate::value::node::XdmNode;
use crate::value::sequence::Sequence;

pub fn pi<N: XdmNode>() -> Sequence<N> {
    single_double(std::f64::consts::PI)
}

fn map_optional<N: XdmNode>(function: &str, args: &[Sequence<N>], f: impl Fn(f64) -> f64) -> XResult<Sequence<N>> {
    match arg_as_f64(function, &args[0])? {
        None => Ok(empty()),
        Some(x) => Ok(single_double(f(x))),
    }
}

pub fn exp<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    map_optional("math:exp", args, f64::exp)
}

pub fn exp10<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    map_optional("math:exp10", args, |x| 10f64.powf(x))
}

pub fn log<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    map_optional("math:log", args, f64::ln)
}

pub fn log10<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    map_optional("math:log10", args, f64::log10)
}

pub fn sqrt<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    map_optional("math:sqrt", args, f64::sqrt)
}

pub fn sin<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    map_optional("math:sin", args, f64::sin)
}

pub fn cos<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    map_optional("math:cos", args, f64::cos)
}

pub fn tan<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    map_optional("math:tan", args, f64::tan)
}

pub fn asin<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    map_optional("math:asin", args, f64::asin)
}

pub fn acos<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    map_optional("math:acos", args, f64::acos)
}

pub fn atan<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    map_optional("math:atan", args, f64::atan)
}

pub fn atan2<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let y = arg_as_f64("math:atan2", &args[0])?.unwrap_or(f64::NAN);
    let x = arg_as_f64("math:atan2", &args[1])?.unwrap_or(f64::NAN);
    Ok(single_double(y.atan2(x)))
}

pub fn pow<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let base = arg_as_f64("math:pow", &args[0])?;
    let exponent = arg_as_f64("math:pow", &args[1])?.unwrap_or(f64::NAN);
    match base {
        None => Ok(empty()),
        Some(b) => Ok(single_double(b.powf(exponent))),
    }
}
