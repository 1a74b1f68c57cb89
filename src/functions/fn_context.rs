//! `fn:` context-accessor functions (spec §4.6a, §4.7): focus accessors
//! (`position`/`last`), timezone/date accessors sourced from the frozen
//! `current-dateTime` the context captured at creation, `base-uri`, and
//! the document-loading pair `doc`/`doc-available` which route through
//! [`EvaluationContext::load_document`] so all I/O stays behind the
//! caller-supplied loader callback (spec §5 "Resource discipline").

use crate::context::EvaluationContext;
use crate::error::XResult;
use crate::functions::helpers::{arg_as_string, single_boolean, single_string};
use crate::value::atomic::AtomicValue;
use crate::value::node::XdmNode;
use crate::value::sequence::{Item, Sequence};

pub fn position<N: XdmNode>(ctx: &EvaluationContext<N>) -> Sequence<N> {
    vec![Item::Atomic(AtomicValue::integer(ctx.position as i64))]
}

pub fn last<N: XdmNode>(ctx: &EvaluationContext<N>) -> Sequence<N> {
    vec![Item::Atomic(AtomicValue::integer(ctx.size as i64))]
}

pub fn current_date_time<N: XdmNode>(ctx: &EvaluationContext<N>) -> Sequence<N> {
    vec![Item::Atomic(AtomicValue::DateTime(ctx.current_date_time))]
}

pub fn current_date<N: XdmNode>(ctx: &EvaluationContext<N>) -> Sequence<N> {
    vec![Item::Atomic(AtomicValue::Date(ctx.current_date_time.date_naive()))]
}

pub fn current_time<N: XdmNode>(ctx: &EvaluationContext<N>) -> Sequence<N> {
    vec![Item::Atomic(AtomicValue::Time(ctx.current_date_time.time()))]
}

pub fn implicit_timezone<N: XdmNode>(ctx: &EvaluationContext<N>) -> Sequence<N> {
    let offset_seconds = ctx.implicit_timezone.local_minus_utc() as i64;
    vec![Item::Atomic(AtomicValue::Duration(crate::value::atomic::XDuration::day_time(offset_seconds * 1000)))]
}

pub fn default_collation<N: XdmNode>(ctx: &EvaluationContext<N>) -> Sequence<N> {
    single_string(ctx.collations.default_uri().to_string())
}

pub fn static_base_uri<N: XdmNode>(ctx: &EvaluationContext<N>) -> Sequence<N> {
    match &ctx.base_uri {
        Some(uri) => single_string(uri.clone()),
        None => Vec::new(),
    }
}

pub fn base_uri<N: XdmNode>(args: &[Sequence<N>], ctx: &EvaluationContext<N>) -> XResult<Sequence<N>> {
    // Omitted argument defaults to the context node (spec §4.6a, §4.7);
    // an explicitly supplied empty sequence instead returns the empty
    // sequence, per `fn:base-uri`'s own signature (`$arg? as node()?`).
    let arg = if args.is_empty() {
        match &ctx.item {
            Some(Item::Node(n)) => vec![Item::Node(n.clone())],
            Some(_) => {
                return Err(crate::error::XPathError::no_span(
                    crate::error::ErrorCode::XPTY0004,
                    "fn:base-uri: context item is not a node",
                ))
            }
            None => {
                return Err(crate::error::XPathError::no_span(
                    crate::error::ErrorCode::XPDY0002,
                    "fn:base-uri: context item is absent",
                ))
            }
        }
    } else {
        args[0].clone()
    };
    let node = match arg.as_slice() {
        [] => return Ok(Vec::new()),
        [Item::Node(n)] => n,
        _ => {
            return Err(crate::error::XPathError::no_span(
                crate::error::ErrorCode::XPTY0004,
                "fn:base-uri: argument is not a node",
            ))
        }
    };
    match node.base_uri() {
        Some(uri) => Ok(single_string(uri)),
        None => Ok(static_base_uri(ctx)),
    }
}

/// `fn:doc`: cache hit or caller-supplied loader, never implicit network/
/// file I/O (spec §5).
pub fn doc<N: XdmNode>(args: &[Sequence<N>], ctx: &mut EvaluationContext<N>) -> XResult<Sequence<N>> {
    let uri = arg_as_string("fn:doc", &args[0])?;
    match ctx.load_document(&uri) {
        Some(node) => Ok(vec![Item::Node(node)]),
        None => Err(crate::error::XPathError::no_span(
            crate::error::ErrorCode::FODC0002,
            format!("fn:doc: document not available: {}", uri),
        )),
    }
}

pub fn doc_available<N: XdmNode>(args: &[Sequence<N>], ctx: &mut EvaluationContext<N>) -> XResult<Sequence<N>> {
    let uri = arg_as_string("fn:doc-available", &args[0])?;
    Ok(single_boolean(ctx.load_document(&uri).is_some()))
}
