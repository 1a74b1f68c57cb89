//! `fn:` sequence functions and higher-order functions (spec §4.6a):
//! aggregates (`count`/`sum`/`avg`/`min`/`max`), sequence reshaping
//! (`reverse`/`subsequence`/`head`/`tail`/`insert-before`/`remove`/
//! `distinct-values`/`index-of`), sequence predicates (`empty`/`exists`),
//! and the higher-order functions that take function items as arguments
//! (`for-each`/`filter`/`fold-left`/`fold-right`/`for-each-pair`) plus the
//! singleton-coercion family (`zero-or-one`/`one-or-more`/`exactly-one`).
//!
//! Higher-order functions need to *call* a [`FunctionItem`], which is why
//! they take a `call` callback supplied by the evaluator (spec §4.6
//! "dynamic function calls route through the same invocation path as
//! named function calls") rather than reimplementing invocation here.

use crate::error::{ErrorCode, XPathError, XResult};
use crate::functions::helpers::{arg_as_f64, single_boolean, single_integer};
use crate::value::atomic::AtomicValue;
use crate::value::function_item::FunctionItem;
use crate::value::node::XdmNode;
use crate::value::sequence::{atomize_sequence, effective_boolean_value, Item, Sequence};
use std::rc::Rc;

/// Callback the evaluator supplies so higher-order functions can invoke a
/// function item without `functions/` depending on `eval/`.
pub type Invoke<'a, N> = dyn Fn(&Rc<FunctionItem<N>>, Vec<Sequence<N>>) -> XResult<Sequence<N>> + 'a;

pub fn count<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    Ok(single_integer(args[0].len() as i64))
}

fn sum_values(atoms: &[AtomicValue]) -> XResult<AtomicValue> {
    let mut acc = AtomicValue::integer(0);
    for a in atoms {
        acc = crate::eval::operators::arithmetic(crate::ast::node::BinOp::Add, &acc, a)?;
    }
    Ok(acc)
}

pub fn sum<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let atoms = atomize_sequence(&args[0])?;
    if atoms.is_empty() {
        return Ok(args.get(1).cloned().unwrap_or_else(|| vec![Item::Atomic(AtomicValue::integer(0))]));
    }
    Ok(vec![Item::Atomic(sum_values(&atoms)?)])
}

pub fn avg<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let atoms = atomize_sequence(&args[0])?;
    if atoms.is_empty() {
        return Ok(Vec::new());
    }
    let total = sum_values(&atoms)?;
    let count = AtomicValue::Double(atoms.len() as f64);
    Ok(vec![Item::Atomic(crate::eval::operators::arithmetic(crate::ast::node::BinOp::Div, &total, &count)?)])
}

fn extreme<N: XdmNode>(args: &[Sequence<N>], want_max: bool) -> XResult<Sequence<N>> {
    let atoms = atomize_sequence(&args[0])?;
    if atoms.is_empty() {
        return Ok(Vec::new());
    }
    let mut best = atoms[0].clone();
    for a in &atoms[1..] {
        let cmp_op = if want_max { crate::ast::node::BinOp::ValueGt } else { crate::ast::node::BinOp::ValueLt };
        if crate::eval::operators::value_compare_one(cmp_op, a, &best)? {
            best = a.clone();
        }
    }
    Ok(vec![Item::Atomic(best)])
}

pub fn max<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    extreme(args, true)
}

pub fn min<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    extreme(args, false)
}

pub fn reverse<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let mut seq = args[0].clone();
    seq.reverse();
    Ok(seq)
}

/// `fn:subsequence`: 1-indexed, fractional start/length rounded per F&O
/// `fn:round`, clipped (never errors) to the sequence's range.
pub fn subsequence<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let seq = &args[0];
    let len = seq.len() as f64;
    let start = arg_as_f64("fn:subsequence", &args[1])?.unwrap_or(1.0).round();
    let length = if args.len() > 2 { arg_as_f64("fn:subsequence", &args[2])?.map(f64::round) } else { None };

    let end = match length {
        Some(l) => start + l,
        None => len + 1.0,
    };
    let begin = start.max(1.0);
    let end = end.min(len + 1.0);
    if end <= begin {
        return Ok(Vec::new());
    }
    let begin_idx = (begin - 1.0) as usize;
    let end_idx = (end - 1.0) as usize;
    Ok(seq[begin_idx.min(seq.len())..end_idx.min(seq.len())].to_vec())
}

pub fn head<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    Ok(args[0].first().cloned().into_iter().collect())
}

pub fn tail<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    if args[0].is_empty() {
        return Ok(Vec::new());
    }
    Ok(args[0][1..].to_vec())
}

pub fn insert_before<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let seq = &args[0];
    let position = arg_as_f64("fn:insert-before", &args[1])?.unwrap_or(1.0).round() as i64;
    let insert_at = (position - 1).clamp(0, seq.len() as i64) as usize;
    let mut out = seq[..insert_at].to_vec();
    out.extend(args[2].iter().cloned());
    out.extend(seq[insert_at..].iter().cloned());
    Ok(out)
}

pub fn remove<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let seq = &args[0];
    let position = arg_as_f64("fn:remove", &args[1])?.unwrap_or(0.0).round() as i64;
    if position < 1 || position as usize > seq.len() {
        return Ok(seq.clone());
    }
    let idx = (position - 1) as usize;
    let mut out = seq[..idx].to_vec();
    out.extend(seq[idx + 1..].iter().cloned());
    Ok(out)
}

pub fn distinct_values<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let atoms = atomize_sequence(&args[0])?;
    let mut out: Vec<AtomicValue> = Vec::new();
    'outer: for a in atoms {
        for existing in &out {
            if crate::eval::operators::value_compare_one(crate::ast::node::BinOp::ValueEq, &a, existing).unwrap_or(false) {
                continue 'outer;
            }
        }
        out.push(a);
    }
    Ok(out.into_iter().map(Item::Atomic).collect())
}

pub fn index_of<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let atoms = atomize_sequence(&args[0])?;
    let search = crate::functions::helpers::exactly_one_atomic("fn:index-of", &args[1])?;
    let mut out = Vec::new();
    for (i, a) in atoms.iter().enumerate() {
        if crate::eval::operators::value_compare_one(crate::ast::node::BinOp::ValueEq, a, &search)? {
            out.push(Item::Atomic(AtomicValue::integer((i + 1) as i64)));
        }
    }
    Ok(out)
}

pub fn empty<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    Ok(single_boolean(args[0].is_empty()))
}

pub fn exists<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    Ok(single_boolean(!args[0].is_empty()))
}

pub fn zero_or_one<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    if args[0].len() > 1 {
        return Err(XPathError::no_span(ErrorCode::FORG0003, "fn:zero-or-one: sequence has more than one item"));
    }
    Ok(args[0].clone())
}

pub fn one_or_more<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    if args[0].is_empty() {
        return Err(XPathError::no_span(ErrorCode::FORG0004, "fn:one-or-more: sequence is empty"));
    }
    Ok(args[0].clone())
}

pub fn exactly_one<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    if args[0].len() != 1 {
        return Err(XPathError::no_span(ErrorCode::FORG0005, "fn:exactly-one: sequence does not contain exactly one item"));
    }
    Ok(args[0].clone())
}

fn as_function<N: XdmNode>(function: &str, seq: &Sequence<N>) -> XResult<Rc<FunctionItem<N>>> {
    match seq.as_slice() {
        [Item::Function(f)] => Ok(f.clone()),
        _ => Err(XPathError::no_span(ErrorCode::XPTY0004, format!("{}: expected a function item argument", function))),
    }
}

pub fn for_each<N: XdmNode>(args: &[Sequence<N>], invoke: &Invoke<N>) -> XResult<Sequence<N>> {
    let f = as_function("fn:for-each", &args[1])?;
    let mut out = Vec::new();
    for item in &args[0] {
        out.extend(invoke(&f, vec![vec![item.clone()]])?);
    }
    Ok(out)
}

pub fn filter<N: XdmNode>(args: &[Sequence<N>], invoke: &Invoke<N>) -> XResult<Sequence<N>> {
    let f = as_function("fn:filter", &args[1])?;
    let mut out = Vec::new();
    for item in &args[0] {
        let result = invoke(&f, vec![vec![item.clone()]])?;
        if effective_boolean_value(&result)? {
            out.push(item.clone());
        }
    }
    Ok(out)
}

pub fn fold_left<N: XdmNode>(args: &[Sequence<N>], invoke: &Invoke<N>) -> XResult<Sequence<N>> {
    let f = as_function("fn:fold-left", &args[2])?;
    let mut acc = args[1].clone();
    for item in &args[0] {
        acc = invoke(&f, vec![acc, vec![item.clone()]])?;
    }
    Ok(acc)
}

pub fn fold_right<N: XdmNode>(args: &[Sequence<N>], invoke: &Invoke<N>) -> XResult<Sequence<N>> {
    let f = as_function("fn:fold-right", &args[2])?;
    let mut acc = args[1].clone();
    for item in args[0].iter().rev() {
        acc = invoke(&f, vec![vec![item.clone()], acc])?;
    }
    Ok(acc)
}

pub fn for_each_pair<N: XdmNode>(args: &[Sequence<N>], invoke: &Invoke<N>) -> XResult<Sequence<N>> {
    let f = as_function("fn:for-each-pair", &args[2])?;
    let mut out = Vec::new();
    for (a, b) in args[0].iter().zip(args[1].iter()) {
        out.extend(invoke(&f, vec![vec![a.clone()], vec![b.clone()]])?);
    }
    Ok(out)
}
