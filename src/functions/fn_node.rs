//! `fn:` node functions (spec §4.6a): `name`/`local-name`/`namespace-uri`,
//! `root`, `data`, `string`, `number`, and the id/idref family which walks
//! the tree looking for attributes typed (or merely named, schema-less) as
//! `ID`/`IDREF` (spec §6 "no schema validation is performed; `id()` matches
//! on the attribute's local name or declared type, whichever the tree
//! adapter exposes").

use crate::context::EvaluationContext;
use crate::error::{ErrorCode, XPathError, XResult};
use crate::functions::helpers::{arg_as_string, single_string, zero_or_one_atomic};
use crate::value::atomic::AtomicValue;
use crate::value::node::{NodeKind, XdmNode};
use crate::value::sequence::{atomize_sequence, Item, Sequence};

/// Resolves the optional node argument: what `args` supplies, or the
/// F&O-mandated default (the context item) when the argument is omitted
/// entirely (spec §4.6a, §4.7). An explicitly supplied empty sequence is distinct from an
/// omitted argument: the former resolves to `Ok(None)` (the caller returns
/// its own empty-sequence/`""` default), the latter dereferences `ctx.item`
/// and raises `XPDY0002`/`XPTY0004` exactly as a bare path step would.
fn context_node<N: XdmNode>(function: &str, args: &[Sequence<N>], ctx: &EvaluationContext<N>) -> XResult<Option<N>> {
    if args.is_empty() {
        return match &ctx.item {
            None => Err(XPathError::no_span(ErrorCode::XPDY0002, format!("{}: context item is absent", function))),
            Some(Item::Node(n)) => Ok(Some(n.clone())),
            Some(_) => Err(XPathError::no_span(ErrorCode::XPTY0004, format!("{}: context item is not a node", function))),
        };
    }
    if args[0].is_empty() {
        return Ok(None);
    }
    match &args[0][0] {
        Item::Node(n) => Ok(Some(n.clone())),
        _ => Err(XPathError::no_span(ErrorCode::XPTY0004, format!("{}: argument is not a node", function))),
    }
}

/// Resolves an `item()*`-typed `args` argument the same way: supplied as-is,
/// or defaulting to the context item (as a singleton) when omitted (spec
/// §4.6a: `fn:data`/`fn:string`/`fn:number` all default their sole
/// parameter to the context item, raising `XPDY0002` if none is in focus).
fn default_to_context_item<N: XdmNode>(function: &str, args: &[Sequence<N>], ctx: &EvaluationContext<N>) -> XResult<Sequence<N>> {
    if args.is_empty() {
        return match &ctx.item {
            Some(item) => Ok(vec![item.clone()]),
            None => Err(XPathError::no_span(ErrorCode::XPDY0002, format!("{}: context item is absent", function))),
        };
    }
    Ok(args[0].clone())
}

pub fn name<N: XdmNode>(args: &[Sequence<N>], ctx: &EvaluationContext<N>) -> XResult<Sequence<N>> {
    match context_node("fn:name", args, ctx)?.and_then(|n| n.expanded_name()) {
        Some(qname) => Ok(single_string(qname.local)),
        None => Ok(single_string("")),
    }
}

pub fn local_name<N: XdmNode>(args: &[Sequence<N>], ctx: &EvaluationContext<N>) -> XResult<Sequence<N>> {
    match context_node("fn:local-name", args, ctx)?.and_then(|n| n.expanded_name()) {
        Some(qname) => Ok(single_string(qname.local)),
        None => Ok(single_string("")),
    }
}

pub fn namespace_uri<N: XdmNode>(args: &[Sequence<N>], ctx: &EvaluationContext<N>) -> XResult<Sequence<N>> {
    match context_node("fn:namespace-uri", args, ctx)?.and_then(|n| n.expanded_name()) {
        Some(qname) => Ok(single_string(qname.uri.unwrap_or_default())),
        None => Ok(single_string("")),
    }
}

pub fn root<N: XdmNode>(args: &[Sequence<N>], ctx: &EvaluationContext<N>) -> XResult<Sequence<N>> {
    match context_node("fn:root", args, ctx)? {
        None => Ok(Vec::new()),
        Some(mut node) => {
            while let Some(parent) = node.parent() {
                node = parent;
            }
            Ok(vec![Item::Node(node)])
        }
    }
}

pub fn data<N: XdmNode>(args: &[Sequence<N>], ctx: &EvaluationContext<N>) -> XResult<Sequence<N>> {
    let seq = default_to_context_item("fn:data", args, ctx)?;
    Ok(atomize_sequence(&seq)?.into_iter().map(Item::Atomic).collect())
}

pub fn string<N: XdmNode>(args: &[Sequence<N>], ctx: &EvaluationContext<N>) -> XResult<Sequence<N>> {
    let seq = default_to_context_item("fn:string", args, ctx)?;
    Ok(single_string(arg_as_string("fn:string", &seq)?))
}

pub fn number<N: XdmNode>(args: &[Sequence<N>], ctx: &EvaluationContext<N>) -> XResult<Sequence<N>> {
    let seq = default_to_context_item("fn:number", args, ctx)?;
    let value = zero_or_one_atomic("fn:number", &seq)?;
    let n = match value {
        None => f64::NAN,
        Some(a) => a.as_f64().unwrap_or_else(|| a.display_string().trim().parse().unwrap_or(f64::NAN)),
    };
    Ok(vec![Item::Atomic(AtomicValue::Double(n))])
}

fn find_by_id<N: XdmNode>(node: &N, ids: &[String], out: &mut Vec<N>) {
    for attr in node.attributes() {
        if let Some(name) = attr.expanded_name() {
            if name.local.eq_ignore_ascii_case("id") && ids.iter().any(|id| id == &attr.string_value()) {
                out.push(node.clone());
            }
        }
    }
    for child in node.children() {
        find_by_id(&child, ids, out);
    }
}

/// `fn:id`: schema-less implementations cannot validate `xs:ID`-typed
/// attributes, so this matches any attribute literally named `id` (spec §6).
pub fn id<N: XdmNode>(args: &[Sequence<N>], ctx: &EvaluationContext<N>) -> XResult<Sequence<N>> {
    let ids: Vec<String> = atomize_sequence(&args[0])?
        .into_iter()
        .flat_map(|a| a.display_string().split_whitespace().map(|s| s.to_string()).collect::<Vec<_>>())
        .collect();
    let start = context_node("fn:id", &args[1..], ctx)?;
    let mut root_node = match start {
        Some(n) => n,
        None => return Ok(Vec::new()),
    };
    while let Some(parent) = root_node.parent() {
        root_node = parent;
    }
    let mut found = Vec::new();
    find_by_id(&root_node, &ids, &mut found);
    Ok(found.into_iter().map(Item::Node).collect())
}

fn find_by_idref<N: XdmNode>(node: &N, ids: &[String], out: &mut Vec<N>) {
    for attr in node.attributes() {
        if let Some(name) = attr.expanded_name() {
            if name.local.eq_ignore_ascii_case("idref")
                && attr.string_value().split_whitespace().any(|tok| ids.iter().any(|id| id == tok))
            {
                out.push(attr.clone());
            }
        }
    }
    for child in node.children() {
        find_by_idref(&child, ids, out);
    }
}

pub fn idref<N: XdmNode>(args: &[Sequence<N>], ctx: &EvaluationContext<N>) -> XResult<Sequence<N>> {
    let ids: Vec<String> = atomize_sequence(&args[0])?
        .into_iter()
        .flat_map(|a| a.display_string().split_whitespace().map(|s| s.to_string()).collect::<Vec<_>>())
        .collect();
    let start = context_node("fn:idref", &args[1..], ctx)?;
    let mut root_node = match start {
        Some(n) => n,
        None => return Ok(Vec::new()),
    };
    while let Some(parent) = root_node.parent() {
        root_node = parent;
    }
    let mut found = Vec::new();
    find_by_idref(&root_node, &ids, &mut found);
    Ok(found.into_iter().map(Item::Node).collect())
}

/// `fn:generate-id`: not guaranteed stable across evaluations against
/// different trees, only within one (spec §4.6a), so it is derived directly
/// from the node's [`crate::value::node::DocumentPosition`].
pub fn generate_id<N: XdmNode>(args: &[Sequence<N>], ctx: &EvaluationContext<N>) -> XResult<Sequence<N>> {
    match context_node("fn:generate-id", args, ctx)? {
        None => Ok(single_string("")),
        Some(node) => {
            let pos = node.document_position();
            Ok(single_string(format!("d{}p{}", pos.document_id, pos.position)))
        }
    }
}

pub fn node_name<N: XdmNode>(args: &[Sequence<N>], ctx: &EvaluationContext<N>) -> XResult<Sequence<N>> {
    match context_node("fn:node-name", args, ctx)?.and_then(|n| n.expanded_name()) {
        Some(qname) => Ok(vec![Item::Atomic(AtomicValue::QName(qname))]),
        None => Ok(Vec::new()),
    }
}

pub fn lang<N: XdmNode>(args: &[Sequence<N>], ctx: &EvaluationContext<N>) -> XResult<Sequence<N>> {
    let test = arg_as_string("fn:lang", &args[0])?.to_lowercase();
    let mut node = context_node("fn:lang", &args[1..], ctx)?;
    while let Some(n) = node {
        for attr in n.attributes() {
            if let Some(name) = attr.expanded_name() {
                if name.local.eq_ignore_ascii_case("lang") {
                    let value = attr.string_value().to_lowercase();
                    return Ok(crate::functions::helpers::single_boolean(
                        value == test || value.starts_with(&format!("{}-", test)),
                    ));
                }
            }
        }
        node = n.parent();
    }
    Ok(crate::functions::helpers::single_boolean(false))
}

pub fn is_element<N: XdmNode>(node: &N) -> bool {
    node.kind() == NodeKind::Element
}
