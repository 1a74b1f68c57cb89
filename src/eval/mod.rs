//! The tree-walking evaluator (spec §4, §4.4, §4.5, §4.6): turns a
//! `Spanned<Ast>` plus a dynamic [`EvaluationContext`] into a [`Sequence`].
//! Dispatches on [`Ast`] the way [`crate::kernel::parser::Parser`]
//! dispatches on token key — one big match, no virtual dispatch — since
//! the AST, like the grammar, is closed (spec §9).

pub mod node_test;
pub mod operators;
pub mod sequence_type;

use std::rc::Rc;

use crate::ast::{Ast, Axis, BinOp, LookupKey, QuantKind, UnOp};
use crate::axes::walk_axis;
use crate::common::Spanned;
use crate::context::EvaluationContext;
use crate::error::{ErrorCode, XPathError, XResult};
use crate::lexer::NameToken;
use crate::value::atomic::AtomicValue;
use crate::value::function_item::FunctionItem;
use crate::value::map_array::{XArray, XMap};
use crate::value::node::XdmNode;
use crate::value::sequence::{atomize_sequence, dedup_document_order, effective_boolean_value, Item, Sequence};
use crate::value::types::QName;

/// Resolves a lexical [`NameToken`] into an absolute [`QName`], consulting
/// `default_ns` only for the unprefixed case (spec §4.2: element/type names
/// default against `default_element_namespace`, function names against
/// `default_function_namespace`, variables against neither).
fn resolve_qname<N: XdmNode>(
    name: &NameToken,
    ctx: &EvaluationContext<N>,
    default_ns: Option<&str>,
) -> XResult<QName> {
    match name {
        NameToken::QName { prefix: Some(prefix), local } => {
            let uri = ctx.resolve_namespace(prefix).ok_or_else(|| {
                XPathError::no_span(ErrorCode::XPST0081, format!("unbound namespace prefix `{}`", prefix))
            })?;
            Ok(QName::new(Some(uri.to_string()), local.clone()))
        }
        NameToken::QName { prefix: None, local } => Ok(QName::new(default_ns.map(|s| s.to_string()), local.clone())),
        NameToken::BracedUri { uri, local } => {
            Ok(QName::new(if uri.is_empty() { None } else { Some(uri.clone()) }, local.clone()))
        }
        _ => Err(XPathError::no_span(ErrorCode::XPST0003, "a wildcard name is not valid here")),
    }
}

/// The entry point: evaluates `node` against `ctx`, returning the resulting
/// sequence (spec §4).
pub fn evaluate<N: XdmNode>(node: &Spanned<Ast>, ctx: &mut EvaluationContext<N>) -> XResult<Sequence<N>> {
    if ctx.is_cancelled() {
        return Err(XPathError::new(ErrorCode::FOER0000, "evaluation cancelled", &node.span));
    }

    match &node.item {
        Ast::IntegerLit(n) => Ok(vec![Item::Atomic(AtomicValue::integer(*n))]),
        Ast::DecimalLit(d) => Ok(vec![Item::Atomic(AtomicValue::Decimal(*d))]),
        Ast::DoubleLit(d) => Ok(vec![Item::Atomic(AtomicValue::Double(*d))]),
        Ast::StringLit(s) => Ok(vec![Item::Atomic(AtomicValue::String(s.clone()))]),

        Ast::ContextItem => match &ctx.item {
            Some(item) => Ok(vec![item.clone()]),
            None => Err(XPathError::new(ErrorCode::XPDY0002, "context item is absent", &node.span)),
        },

        Ast::Root => {
            let item = ctx
                .item
                .as_ref()
                .ok_or_else(|| XPathError::new(ErrorCode::XPDY0002, "context item is absent", &node.span))?;
            let mut current = match item {
                Item::Node(n) => n.clone(),
                _ => return Err(XPathError::new(ErrorCode::XPTY0004, "context item is not a node", &node.span)),
            };
            while let Some(parent) = current.parent() {
                current = parent;
            }
            Ok(vec![Item::Node(current)])
        }

        Ast::VarRef(name) => {
            let qname = resolve_qname(name, ctx, None)?;
            ctx.lookup_variable(&qname)
                .cloned()
                .ok_or_else(|| XPathError::new(ErrorCode::XPST0008, format!("undeclared variable ${}", qname), &node.span))
        }

        Ast::Step { axis, test, predicates } => eval_step(*axis, test, predicates, ctx, &node.span),

        Ast::Predicate { base, predicate } => {
            let items = evaluate(base, ctx)?;
            apply_predicate(items, predicate, ctx)
        }

        Ast::Binary { op, lhs, rhs } => eval_binary(*op, lhs, rhs, ctx, &node.span),

        Ast::Unary { op, operand } => {
            let value = crate::functions::helpers::exactly_one_atomic("unary operator", &evaluate(operand, ctx)?)?;
            let zero = AtomicValue::integer(0);
            let result = match op {
                UnOp::Plus => operators::arithmetic(BinOp::Add, &zero, &value)?,
                UnOp::Minus => operators::arithmetic(BinOp::Sub, &zero, &value)?,
            };
            Ok(vec![Item::Atomic(result)])
        }

        Ast::FunctionCall { name, args } => {
            let qname = resolve_qname(name, ctx, ctx.default_function_namespace.as_deref())?;
            let mut evaluated = Vec::with_capacity(args.len());
            for arg in args {
                evaluated.push(evaluate(arg, ctx)?);
            }
            call_function(&qname, evaluated, ctx)
        }

        Ast::NamedFunctionRef { name, arity } => {
            let qname = resolve_qname(name, ctx, ctx.default_function_namespace.as_deref())?;
            Ok(vec![Item::Function(Rc::new(FunctionItem::Named { name: qname, arity: *arity }))])
        }

        Ast::InlineFunction { params, body, .. } => {
            let param_names = params
                .iter()
                .map(|(name, _)| resolve_qname(name, ctx, None))
                .collect::<XResult<Vec<_>>>()?;
            Ok(vec![Item::Function(Rc::new(FunctionItem::Inline {
                params: param_names,
                body: Rc::new((**body).clone()),
                captured: ctx.capture_scopes(),
            }))])
        }

        Ast::DynamicCall { callee, args } => {
            let callee_seq = evaluate(callee, ctx)?;
            let function = match callee_seq.as_slice() {
                [Item::Function(f)] => f.clone(),
                _ => return Err(XPathError::new(ErrorCode::XPTY0004, "dynamic call target is not a function item", &node.span)),
            };
            let mut evaluated = Vec::with_capacity(args.len());
            for arg in args {
                evaluated.push(evaluate(arg, ctx)?);
            }
            invoke(&function, evaluated, ctx)
        }

        Ast::If { cond, then_branch, else_branch } => {
            if effective_boolean_value(&evaluate(cond, ctx)?)? {
                evaluate(then_branch, ctx)
            } else {
                evaluate(else_branch, ctx)
            }
        }

        Ast::ForBinding { bindings, body } => eval_for(bindings, body, ctx),

        Ast::LetBinding { bindings, body } => {
            let mut scope_ctx = ctx.with_new_scope();
            for (name, expr) in bindings {
                let value = evaluate(expr, &mut scope_ctx)?;
                let qname = resolve_qname(name, &scope_ctx, None)?;
                scope_ctx = scope_ctx.with_binding(qname, value);
            }
            evaluate(body, &mut scope_ctx)
        }

        Ast::Quantified { kind, bindings, predicate } => eval_quantified(*kind, bindings, predicate, ctx),

        Ast::InstanceOf { operand, seq_type } => {
            let value = evaluate(operand, ctx)?;
            Ok(vec![Item::Atomic(AtomicValue::Boolean(sequence_type::matches(&value, seq_type, ctx)))])
        }

        Ast::TreatAs { operand, seq_type } => {
            let value = evaluate(operand, ctx)?;
            if !sequence_type::matches(&value, seq_type, ctx) {
                return Err(XPathError::new(
                    ErrorCode::XPDY0050,
                    format!("dynamic type does not match `treat as {}`", sequence_type::describe(seq_type)),
                    &node.span,
                ));
            }
            Ok(value)
        }

        Ast::CastAs { operand, target, optional } => {
            let value = evaluate(operand, ctx)?;
            eval_cast_as(value, *target, *optional, &node.span)
        }

        Ast::CastableAs { operand, target, optional } => {
            let value = evaluate(operand, ctx)?;
            let castable = eval_cast_as(value, *target, *optional, &node.span).is_ok();
            Ok(vec![Item::Atomic(AtomicValue::Boolean(castable))])
        }

        Ast::Sequence(items) => {
            let mut out = Vec::new();
            for item in items {
                out.extend(evaluate(item, ctx)?);
            }
            Ok(out)
        }

        Ast::MapConstructor(entries) => {
            let mut map = XMap::new();
            for (key_expr, value_expr) in entries {
                let key = crate::functions::helpers::exactly_one_atomic("map constructor key", &evaluate(key_expr, ctx)?)?;
                let value = evaluate(value_expr, ctx)?;
                map.insert(key, value);
            }
            Ok(vec![Item::Map(Rc::new(map))])
        }

        Ast::ArrayConstructor(members) => {
            let mut values = Vec::with_capacity(members.len());
            for member in members {
                values.push(evaluate(member, ctx)?);
            }
            Ok(vec![Item::Array(Rc::new(XArray::new(values)))])
        }

        Ast::CurlyArrayConstructor(body) => {
            let items = evaluate(body, ctx)?;
            let members = items.into_iter().map(|item| vec![item]).collect();
            Ok(vec![Item::Array(Rc::new(XArray::new(members)))])
        }

        Ast::Lookup { base, key } => eval_lookup(base, key, ctx),

        Ast::Arrow { operand, call } => eval_arrow(operand, call, ctx, &node.span),
    }
}

fn eval_step<N: XdmNode>(
    axis: Axis,
    test: &crate::ast::NodeTest,
    predicates: &[Spanned<Ast>],
    ctx: &mut EvaluationContext<N>,
    span: &crate::common::Span,
) -> XResult<Sequence<N>> {
    let item = ctx.item.as_ref().ok_or_else(|| XPathError::new(ErrorCode::XPDY0002, "context item is absent", span))?;
    let context_node = match item {
        Item::Node(n) => n.clone(),
        _ => return Err(XPathError::new(ErrorCode::XPTY0019, "a path step's context item is not a node", span)),
    };

    let candidates = walk_axis(axis, &context_node);
    let mut matched = Vec::new();
    for candidate in &candidates {
        if node_test::matches(candidate, axis, test, ctx)? {
            matched.push(candidate.clone());
        }
    }
    if axis.is_reverse() {
        matched.reverse();
    }

    let mut items: Sequence<N> = matched.into_iter().map(Item::Node).collect();
    for predicate in predicates {
        items = apply_predicate(items, predicate, ctx)?;
    }
    Ok(items)
}

/// Applies one `[predicate]` to a sequence: a numeric result is a
/// positional test (spec §4.3 "a predicate whose value is numeric selects
/// by position, not effective boolean value"); anything else uses
/// effective boolean value. Re-establishes focus (`position`/`size`) over
/// `items` for each evaluation, per-item (spec §4.7).
fn apply_predicate<N: XdmNode>(
    items: Sequence<N>,
    predicate: &Spanned<Ast>,
    ctx: &EvaluationContext<N>,
) -> XResult<Sequence<N>> {
    let size = items.len();
    let mut kept = Vec::new();
    for (i, item) in items.into_iter().enumerate() {
        let position = i + 1;
        let mut focused = ctx.with_focus(item.clone(), position, size);
        let result = evaluate(predicate, &mut focused)?;
        let satisfied = match result.as_slice() {
            [Item::Atomic(AtomicValue::Integer(n, _))] => *n == position as i64,
            [Item::Atomic(AtomicValue::Decimal(d))]
            | [Item::Atomic(AtomicValue::Double(d))] => *d == position as f64,
            [Item::Atomic(AtomicValue::Float(f))] => *f as f64 == position as f64,
            _ => effective_boolean_value(&result)?,
        };
        if satisfied {
            kept.push(item);
        }
    }
    Ok(kept)
}

fn only_nodes<N: XdmNode>(seq: Sequence<N>, span: &crate::common::Span) -> XResult<Vec<N>> {
    seq.into_iter()
        .map(|item| match item {
            Item::Node(n) => Ok(n),
            _ => Err(XPathError::new(ErrorCode::XPTY0019, "a path/set operand must be a sequence of nodes", span)),
        })
        .collect()
}

fn eval_binary<N: XdmNode>(
    op: BinOp,
    lhs: &Spanned<Ast>,
    rhs: &Spanned<Ast>,
    ctx: &mut EvaluationContext<N>,
    span: &crate::common::Span,
) -> XResult<Sequence<N>> {
    match op {
        BinOp::And => {
            let left = effective_boolean_value(&evaluate(lhs, ctx)?)?;
            if !left {
                return Ok(vec![Item::Atomic(AtomicValue::Boolean(false))]);
            }
            let right = effective_boolean_value(&evaluate(rhs, ctx)?)?;
            Ok(vec![Item::Atomic(AtomicValue::Boolean(right))])
        }
        BinOp::Or => {
            let left = effective_boolean_value(&evaluate(lhs, ctx)?)?;
            if left {
                return Ok(vec![Item::Atomic(AtomicValue::Boolean(true))]);
            }
            let right = effective_boolean_value(&evaluate(rhs, ctx)?)?;
            Ok(vec![Item::Atomic(AtomicValue::Boolean(right))])
        }

        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::IDiv | BinOp::Mod => {
            let left = crate::functions::helpers::zero_or_one_atomic("arithmetic operand", &evaluate(lhs, ctx)?)?;
            let right = crate::functions::helpers::zero_or_one_atomic("arithmetic operand", &evaluate(rhs, ctx)?)?;
            match (left, right) {
                (Some(a), Some(b)) => Ok(vec![Item::Atomic(operators::arithmetic(op, &a, &b)?)]),
                _ => Ok(Vec::new()),
            }
        }

        BinOp::GeneralEq | BinOp::GeneralNe | BinOp::GeneralLt | BinOp::GeneralLe | BinOp::GeneralGt | BinOp::GeneralGe => {
            let left = atomize_sequence(&evaluate(lhs, ctx)?)?;
            let right = atomize_sequence(&evaluate(rhs, ctx)?)?;
            let result = operators::general_compare(op, &left, &right, ctx.compatibility_mode)?;
            Ok(vec![Item::Atomic(AtomicValue::Boolean(result))])
        }

        BinOp::ValueEq | BinOp::ValueNe | BinOp::ValueLt | BinOp::ValueLe | BinOp::ValueGt | BinOp::ValueGe => {
            let left = crate::functions::helpers::zero_or_one_atomic("value comparison operand", &evaluate(lhs, ctx)?)?;
            let right = crate::functions::helpers::zero_or_one_atomic("value comparison operand", &evaluate(rhs, ctx)?)?;
            match (left, right) {
                (Some(a), Some(b)) => Ok(vec![Item::Atomic(AtomicValue::Boolean(operators::value_compare_one(op, &a, &b)?))]),
                _ => Ok(Vec::new()),
            }
        }

        BinOp::Is | BinOp::Precedes | BinOp::Follows => {
            let left = only_nodes(evaluate(lhs, ctx)?, span)?;
            let right = only_nodes(evaluate(rhs, ctx)?, span)?;
            match (left.as_slice(), right.as_slice()) {
                ([a], [b]) => Ok(vec![Item::Atomic(AtomicValue::Boolean(operators::node_compare(op, a, b)))]),
                ([], _) | (_, []) => Ok(Vec::new()),
                _ => Err(XPathError::new(ErrorCode::XPTY0004, "`is`/`<<`/`>>` operands must be at most one node", span)),
            }
        }

        BinOp::Union | BinOp::Intersect | BinOp::Except => {
            let left = only_nodes(evaluate(lhs, ctx)?, span)?;
            let right = only_nodes(evaluate(rhs, ctx)?, span)?;
            Ok(operators::set_op(op, left, right).into_iter().map(Item::Node).collect())
        }

        BinOp::Concat => {
            let left = string_concat_operand(&evaluate(lhs, ctx)?)?;
            let right = string_concat_operand(&evaluate(rhs, ctx)?)?;
            Ok(vec![Item::Atomic(AtomicValue::String(format!("{}{}", left, right)))])
        }

        BinOp::SimpleMap => {
            let left_items = evaluate(lhs, ctx)?;
            let size = left_items.len();
            let mut out = Vec::new();
            for (i, item) in left_items.into_iter().enumerate() {
                let mut focused = ctx.with_focus(item, i + 1, size);
                out.extend(evaluate(rhs, &mut focused)?);
            }
            Ok(out)
        }

        BinOp::Path { double } => eval_path(lhs, rhs, double, ctx, span),

        BinOp::Range => {
            let m = crate::functions::helpers::exactly_one_atomic("range operand", &evaluate(lhs, ctx)?)?
                .as_f64()
                .map(|f| f as i64);
            let n = crate::functions::helpers::exactly_one_atomic("range operand", &evaluate(rhs, ctx)?)?
                .as_f64()
                .map(|f| f as i64);
            match (m, n) {
                (Some(m), Some(n)) => {
                    Ok(operators::range(m, n).into_iter().map(|i| Item::Atomic(AtomicValue::integer(i))).collect())
                }
                _ => Err(XPathError::new(ErrorCode::XPTY0004, "`to` operands must be numeric", span)),
            }
        }
    }
}

fn string_concat_operand<N: XdmNode>(seq: &Sequence<N>) -> XResult<String> {
    match crate::functions::helpers::zero_or_one_atomic("`||` operand", seq)? {
        None => Ok(String::new()),
        Some(a) => Ok(a.display_string()),
    }
}

fn eval_path<N: XdmNode>(
    lhs: &Spanned<Ast>,
    rhs: &Spanned<Ast>,
    double: bool,
    ctx: &mut EvaluationContext<N>,
    span: &crate::common::Span,
) -> XResult<Sequence<N>> {
    let left_nodes = only_nodes(evaluate(lhs, ctx)?, span)?;

    let step_origins: Vec<N> = if double {
        let mut acc = Vec::new();
        for node in &left_nodes {
            acc.extend(walk_axis(Axis::DescendantOrSelf, node));
        }
        dedup_document_order(acc)
    } else {
        left_nodes
    };

    let size = step_origins.len();
    let mut out_nodes = Vec::new();
    for (i, node) in step_origins.into_iter().enumerate() {
        let mut focused = ctx.with_focus(Item::Node(node), i + 1, size);
        out_nodes.extend(only_nodes(evaluate(rhs, &mut focused)?, span)?);
    }
    Ok(dedup_document_order(out_nodes).into_iter().map(Item::Node).collect())
}

fn eval_for<N: XdmNode>(
    bindings: &[(NameToken, Spanned<Ast>)],
    body: &Spanned<Ast>,
    ctx: &mut EvaluationContext<N>,
) -> XResult<Sequence<N>> {
    fn recurse<N: XdmNode>(
        bindings: &[(NameToken, Spanned<Ast>)],
        body: &Spanned<Ast>,
        ctx: &EvaluationContext<N>,
    ) -> XResult<Sequence<N>> {
        match bindings.split_first() {
            None => {
                let mut body_ctx = ctx.clone();
                evaluate(body, &mut body_ctx)
            }
            Some(((name, expr), rest)) => {
                let mut expr_ctx = ctx.clone();
                let sequence = evaluate(expr, &mut expr_ctx)?;
                let qname = resolve_qname(name, ctx, None)?;
                let mut out = Vec::new();
                for item in sequence {
                    let bound = ctx.with_binding(qname.clone(), vec![item]);
                    out.extend(recurse(rest, body, &bound)?);
                }
                Ok(out)
            }
        }
    }
    recurse(bindings, body, ctx)
}

fn eval_quantified<N: XdmNode>(
    kind: QuantKind,
    bindings: &[(NameToken, Spanned<Ast>)],
    predicate: &Spanned<Ast>,
    ctx: &mut EvaluationContext<N>,
) -> XResult<Sequence<N>> {
    fn recurse<N: XdmNode>(
        kind: QuantKind,
        bindings: &[(NameToken, Spanned<Ast>)],
        predicate: &Spanned<Ast>,
        ctx: &EvaluationContext<N>,
    ) -> XResult<bool> {
        match bindings.split_first() {
            None => {
                let mut pred_ctx = ctx.clone();
                effective_boolean_value(&evaluate(predicate, &mut pred_ctx)?)
            }
            Some(((name, expr), rest)) => {
                let mut expr_ctx = ctx.clone();
                let sequence = evaluate(expr, &mut expr_ctx)?;
                let qname = resolve_qname(name, ctx, None)?;
                for item in sequence {
                    let bound = ctx.with_binding(qname.clone(), vec![item]);
                    let satisfied = recurse(kind, rest, predicate, &bound)?;
                    match kind {
                        QuantKind::Some if satisfied => return Ok(true),
                        QuantKind::Every if !satisfied => return Ok(false),
                        _ => continue,
                    }
                }
                Ok(matches!(kind, QuantKind::Every))
            }
        }
    }
    let result = recurse(kind, bindings, predicate, ctx)?;
    Ok(vec![Item::Atomic(AtomicValue::Boolean(result))])
}

fn eval_cast_as<N: XdmNode>(
    value: Sequence<N>,
    target: crate::value::types::AtomicTypeTag,
    optional: bool,
    span: &crate::common::Span,
) -> XResult<Sequence<N>> {
    let atom = crate::functions::helpers::zero_or_one_atomic("cast operand", &value)?;
    match atom {
        None if optional => Ok(Vec::new()),
        None => Err(XPathError::new(ErrorCode::XPTY0004, "`cast as` operand is an empty sequence", span)),
        Some(a) => Ok(vec![Item::Atomic(crate::value::cast::cast_atomic(&a, target)?)]),
    }
}

fn eval_lookup<N: XdmNode>(
    base: &Spanned<Ast>,
    key: &LookupKey,
    ctx: &mut EvaluationContext<N>,
) -> XResult<Sequence<N>> {
    let base_items = evaluate(base, ctx)?;
    let mut out = Vec::new();
    for item in &base_items {
        match key {
            LookupKey::Wildcard => match item {
                Item::Map(m) => out.extend(m.entries_in_order().into_iter().flat_map(|(_, v)| v)),
                Item::Array(a) => out.extend(a.flatten()),
                _ => return Err(XPathError::no_span(ErrorCode::XPTY0004, "`?*` requires a map or array")),
            },
            LookupKey::Name(name) => {
                let local = match name {
                    NameToken::QName { local, .. } => local.clone(),
                    _ => return Err(XPathError::no_span(ErrorCode::XPST0003, "invalid lookup key")),
                };
                if let Item::Map(m) = item {
                    if let Some(v) = m.get(&AtomicValue::String(local)) {
                        out.extend(v.clone());
                    }
                }
            }
            LookupKey::Integer(i) => lookup_one(item, *i, &mut out)?,
            LookupKey::Expr(expr) => {
                let keys = atomize_sequence(&evaluate(expr, ctx)?)?;
                for key in keys {
                    match item {
                        Item::Map(m) => {
                            if let Some(v) = m.get(&key) {
                                out.extend(v.clone());
                            }
                        }
                        Item::Array(_) => {
                            if let Some(i) = key.as_f64() {
                                lookup_one(item, i as i64, &mut out)?;
                            }
                        }
                        _ => return Err(XPathError::no_span(ErrorCode::XPTY0004, "`?key` requires a map or array")),
                    }
                }
            }
        }
    }
    Ok(out)
}

fn lookup_one<N: XdmNode>(item: &Item<N>, index: i64, out: &mut Sequence<N>) -> XResult<()> {
    match item {
        Item::Array(a) => {
            if let Some(v) = a.get(index) {
                out.extend(v.clone());
            }
            Ok(())
        }
        Item::Map(m) => {
            if let Some(v) = m.get(&AtomicValue::integer(index)) {
                out.extend(v.clone());
            }
            Ok(())
        }
        _ => Err(XPathError::no_span(ErrorCode::XPTY0004, "`?key` requires a map or array")),
    }
}

fn eval_arrow<N: XdmNode>(
    operand: &Spanned<Ast>,
    call: &Spanned<Ast>,
    ctx: &mut EvaluationContext<N>,
    span: &crate::common::Span,
) -> XResult<Sequence<N>> {
    let piped = evaluate(operand, ctx)?;
    match &call.item {
        Ast::FunctionCall { name, args } => {
            let qname = resolve_qname(name, ctx, ctx.default_function_namespace.as_deref())?;
            let mut evaluated = vec![piped];
            for arg in args {
                evaluated.push(evaluate(arg, ctx)?);
            }
            call_function(&qname, evaluated, ctx)
        }
        Ast::NamedFunctionRef { name, .. } => {
            let qname = resolve_qname(name, ctx, ctx.default_function_namespace.as_deref())?;
            call_function(&qname, vec![piped], ctx)
        }
        Ast::DynamicCall { callee, args } => {
            let callee_seq = evaluate(callee, ctx)?;
            let function = match callee_seq.as_slice() {
                [Item::Function(f)] => f.clone(),
                _ => return Err(XPathError::new(ErrorCode::XPTY0004, "dynamic call target is not a function item", span)),
            };
            let mut evaluated = vec![piped];
            for arg in args {
                evaluated.push(evaluate(arg, ctx)?);
            }
            invoke(&function, evaluated, ctx)
        }
        _ => Err(XPathError::new(ErrorCode::XPST0003, "`=>` must be followed by a function call", span)),
    }
}

fn call_function<N: XdmNode>(
    qname: &QName,
    args: Vec<Sequence<N>>,
    ctx: &mut EvaluationContext<N>,
) -> XResult<Sequence<N>> {
    let uri = qname.uri.as_deref().unwrap_or(crate::functions::FN_NAMESPACE);
    // `ctx` is cloned into the callback (rather than borrowed) so this
    // immutable capture doesn't collide with `functions::call`'s own
    // `&mut ctx` below — `EvaluationContext` is designed to be cheaply
    // cloned (spec §4.7).
    let invoke_cb = make_invoke(ctx.clone());
    crate::functions::call(uri, &qname.local, &args, ctx, &invoke_cb)
}

/// Builds the callback higher-order `fn:`/`map:`/`array:` functions use to
/// call back into a function item without `functions/` depending on
/// `eval::evaluate` directly (spec §4.6).
fn make_invoke<N: XdmNode>(
    ctx: EvaluationContext<N>,
) -> impl Fn(&Rc<FunctionItem<N>>, Vec<Sequence<N>>) -> XResult<Sequence<N>> {
    move |f, args| invoke(f, args, &mut ctx.clone())
}

/// Invokes a function item, named or inline (spec §4.6 "dynamic function
/// calls route through the same invocation path as named function calls").
pub fn invoke<N: XdmNode>(
    function: &Rc<FunctionItem<N>>,
    args: Vec<Sequence<N>>,
    ctx: &mut EvaluationContext<N>,
) -> XResult<Sequence<N>> {
    match function.as_ref() {
        FunctionItem::Named { name, arity } => {
            if args.len() != *arity {
                return Err(XPathError::no_span(
                    ErrorCode::XPST0017,
                    format!("{} expects {} argument(s), got {}", name, arity, args.len()),
                ));
            }
            call_function(name, args, ctx)
        }
        FunctionItem::Inline { params, body, captured } => {
            if args.len() != params.len() {
                return Err(XPathError::no_span(
                    ErrorCode::XPST0017,
                    format!("inline function expects {} argument(s), got {}", params.len(), args.len()),
                ));
            }
            let mut call_ctx = ctx.with_captured_scopes(captured.clone()).with_new_scope();
            for (param, value) in params.iter().zip(args) {
                call_ctx = call_ctx.with_binding(param.clone(), value);
            }
            evaluate(body, &mut call_ctx)
        }
    }
}

