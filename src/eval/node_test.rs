//! Node-test matching (spec §4.3): does a candidate node, reached via a
//! given axis, satisfy the step's `NodeTest`? Name tests resolve prefixes
//! against the active namespace bindings; kind tests match on [`NodeKind`]
//! alone, since schema-aware matching is a non-goal (spec §1).

use crate::ast::{Axis, KindTest, NodeTest};
use crate::context::EvaluationContext;
use crate::error::{ErrorCode, XPathError, XResult};
use crate::lexer::NameToken;
use crate::value::node::{NodeKind, XdmNode};
use crate::value::types::QName;

/// Resolves a (possibly wildcarded) lexical name against the context's
/// namespace bindings into the form node-test matching actually compares.
enum ResolvedName {
    Exact(QName),
    AnyLocal(Option<String>),
    AnyPrefix(String),
    Any,
}

fn resolve_name<N: XdmNode>(
    name: &NameToken,
    ctx: &EvaluationContext<N>,
    default_ns: Option<&str>,
) -> XResult<ResolvedName> {
    Ok(match name {
        NameToken::Wildcard => ResolvedName::Any,
        NameToken::PrefixWildcard(prefix) => {
            let uri = ctx.resolve_namespace(prefix).map(|s| s.to_string());
            if uri.is_none() && !prefix.is_empty() {
                return Err(XPathError::no_span(
                    ErrorCode::XPST0081,
                    format!("unbound namespace prefix `{}`", prefix),
                ));
            }
            ResolvedName::AnyLocal(uri)
        }
        NameToken::LocalWildcard(local) => ResolvedName::AnyPrefix(local.clone()),
        NameToken::BracedUri { uri, local } => {
            let uri = if uri.is_empty() { None } else { Some(uri.clone()) };
            ResolvedName::Exact(QName::new(uri, local.clone()))
        }
        NameToken::QName { prefix: Some(prefix), local } => {
            let uri = ctx.resolve_namespace(prefix).ok_or_else(|| {
                XPathError::no_span(ErrorCode::XPST0081, format!("unbound namespace prefix `{}`", prefix))
            })?;
            ResolvedName::Exact(QName::new(Some(uri.to_string()), local.clone()))
        }
        NameToken::QName { prefix: None, local } => {
            ResolvedName::Exact(QName::new(default_ns.map(|s| s.to_string()), local.clone()))
        }
    })
}

fn name_matches(resolved: &ResolvedName, actual: &QName) -> bool {
    match resolved {
        ResolvedName::Any => true,
        ResolvedName::AnyLocal(uri) => uri.as_deref() == actual.uri.as_deref(),
        ResolvedName::AnyPrefix(local) => local == &actual.local,
        ResolvedName::Exact(q) => q == actual,
    }
}

fn kind_matches(kind: NodeKind, test: &KindTest) -> bool {
    match test {
        KindTest::AnyKind => true,
        KindTest::Document(_) => kind == NodeKind::Document,
        KindTest::Element(_) => kind == NodeKind::Element,
        KindTest::Attribute(_) => kind == NodeKind::Attribute,
        KindTest::SchemaElement(_) => kind == NodeKind::Element,
        KindTest::SchemaAttribute(_) => kind == NodeKind::Attribute,
        KindTest::Text => kind == NodeKind::Text,
        KindTest::Comment => kind == NodeKind::Comment,
        KindTest::ProcessingInstruction(_) => kind == NodeKind::ProcessingInstruction,
        KindTest::NamespaceNode => kind == NodeKind::Namespace,
    }
}

/// Does `node`, reached on `axis`, satisfy `test`? A bare name test only
/// matches the axis's principal node kind (spec §4.3 "Each axis defines a
/// principal node kind... used by the bare-name node test").
pub fn matches<N: XdmNode>(
    node: &N,
    axis: Axis,
    test: &NodeTest,
    ctx: &EvaluationContext<N>,
) -> XResult<bool> {
    match test {
        NodeTest::Kind(kind_test) => {
            if !kind_matches(node.kind(), kind_test) {
                return Ok(false);
            }
            match kind_test {
                KindTest::Element(Some(name)) | KindTest::Attribute(Some(name))
                | KindTest::SchemaElement(name) | KindTest::SchemaAttribute(name) => {
                    let resolved = resolve_name(name, ctx, None)?;
                    match node.expanded_name() {
                        Some(actual) => Ok(name_matches(&resolved, &actual)),
                        None => Ok(false),
                    }
                }
                KindTest::ProcessingInstruction(Some(target)) => {
                    Ok(node.expanded_name().map_or(false, |n| &n.local == target))
                }
                _ => Ok(true),
            }
        }
        NodeTest::Name(name) => {
            if node.kind() != axis.principal_kind() {
                return Ok(false);
            }
            let default_ns =
                if axis.principal_kind() == NodeKind::Element { ctx.default_element_namespace.as_deref() } else { None };
            let resolved = resolve_name(name, ctx, default_ns)?;
            match node.expanded_name() {
                Some(actual) => Ok(name_matches(&resolved, &actual)),
                None => Ok(false),
            }
        }
    }
}
