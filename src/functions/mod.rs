//! The function library (spec §4.6, §4.6a): `fn:`, `math:`, `map:`,
//! `array:`, and `xs:` constructor dispatch. Functions are matched by
//! `(namespace URI, local name, arity)` rather than assembled into a
//! generic `HashMap` registry — grounded on the reference engine's
//! `static_function_calls` match-based dispatcher (see DESIGN.md), since a
//! registry keyed on function pointers generic over `N: XdmNode` does not
//! compose cleanly with Rust's monomorphization model. Unknown name/arity
//! combinations raise `XPST0017`, a static error under the spec even
//! though this crate only detects it once the call is actually reached.

pub mod array_fns;
pub mod fn_context;
pub mod fn_diag;
pub mod fn_node;
pub mod fn_numeric;
pub mod fn_sequence;
pub mod fn_string;
pub mod helpers;
pub mod map_fns;
pub mod math_fns;
pub mod xs_fns;

use crate::context::EvaluationContext;
use crate::error::{ErrorCode, XPathError, XResult};
use crate::value::node::XdmNode;
use crate::value::sequence::Sequence;

pub use fn_sequence::Invoke;

pub const FN_NAMESPACE: &str = "http://www.w3.org/2005/xpath-functions";
pub const MATH_NAMESPACE: &str = "http://www.w3.org/2005/xpath-functions/math";
pub const MAP_NAMESPACE: &str = "http://www.w3.org/2005/xpath-functions/map";
pub const ARRAY_NAMESPACE: &str = "http://www.w3.org/2005/xpath-functions/array";
pub const XS_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

fn unknown(uri: &str, local: &str, arity: usize) -> XPathError {
    XPathError::no_span(
        ErrorCode::XPST0017,
        format!("unknown function or wrong arity: Q{{{}}}{}#{}", uri, local, arity),
    )
}

/// The single entry point the evaluator calls for every static/dynamic
/// function call once the name is resolved and the arguments evaluated
/// (spec §4.6). `invoke` lets higher-order functions call back into
/// function items without this module depending on `eval::evaluate`
/// directly (spec §4.6 "dynamic function calls route through the same
/// invocation path").
pub fn call<N: XdmNode>(
    uri: &str,
    local: &str,
    args: &[Sequence<N>],
    ctx: &mut EvaluationContext<N>,
    invoke: &Invoke<N>,
) -> XResult<Sequence<N>> {
    let arity = args.len();

    if uri == XS_NAMESPACE {
        return match xs_fns::constructor(local, args) {
            Some(result) => result,
            None => Err(unknown(uri, local, arity)),
        };
    }

    if uri == MATH_NAMESPACE {
        return call_math(local, args).ok_or_else(|| unknown(uri, local, arity))?;
    }

    if uri == MAP_NAMESPACE {
        return call_map(local, args, invoke).ok_or_else(|| unknown(uri, local, arity))?;
    }

    if uri == ARRAY_NAMESPACE {
        return call_array(local, args, invoke).ok_or_else(|| unknown(uri, local, arity))?;
    }

    if uri == FN_NAMESPACE || uri.is_empty() {
        if let Some(result) = call_fn(local, args, ctx, invoke) {
            return result;
        }
        return Err(unknown(uri, local, arity));
    }

    Err(unknown(uri, local, arity))
}

fn call_math<N: XdmNode>(local: &str, args: &[Sequence<N>]) -> Option<XResult<Sequence<N>>> {
    Some(match (local, args.len()) {
        ("pi", 0) => Ok(math_fns::pi()),
        ("exp", 1) => math_fns::exp(args),
        ("exp10", 1) => math_fns::exp10(args),
        ("log", 1) => math_fns::log(args),
        ("log10", 1) => math_fns::log10(args),
        ("sqrt", 1) => math_fns::sqrt(args),
        ("sin", 1) => math_fns::sin(args),
        ("cos", 1) => math_fns::cos(args),
        ("tan", 1) => math_fns::tan(args),
        ("asin", 1) => math_fns::asin(args),
        ("acos", 1) => math_fns::acos(args),
        ("atan", 1) => math_fns::atan(args),
        ("atan2", 2) => math_fns::atan2(args),
        ("pow", 2) => math_fns::pow(args),
        _ => return None,
    })
}

fn call_map<N: XdmNode>(local: &str, args: &[Sequence<N>], invoke: &Invoke<N>) -> Option<XResult<Sequence<N>>> {
    Some(match (local, args.len()) {
        ("get", 2) => map_fns::get(args),
        ("contains", 2) => map_fns::contains(args),
        ("size", 1) => map_fns::size(args),
        ("keys", 1) => map_fns::keys(args),
        ("put", 3) => map_fns::put(args),
        ("remove", 2) => map_fns::remove(args),
        ("merge", 1) | ("merge", 2) => map_fns::merge(args),
        ("entry", 2) => map_fns::entry(args),
        ("for-each", 2) => map_fns::for_each(args, invoke),
        ("filter", 2) => map_fns::filter(args, invoke),
        _ => return None,
    })
}

fn call_array<N: XdmNode>(local: &str, args: &[Sequence<N>], invoke: &Invoke<N>) -> Option<XResult<Sequence<N>>> {
    Some(match (local, args.len()) {
        ("get", 2) => array_fns::get(args),
        ("size", 1) => array_fns::size(args),
        ("put", 3) => array_fns::put(args),
        ("append", 2) => array_fns::append(args),
        ("subarray", 2) | ("subarray", 3) => array_fns::subarray(args),
        ("insert-before", 3) => array_fns::insert_before(args),
        ("remove", 2) => array_fns::remove(args),
        ("reverse", 1) => array_fns::reverse(args),
        ("join", 1) => array_fns::join(args),
        ("flatten", 1) => array_fns::flatten(args),
        ("for-each", 2) => array_fns::for_each(args, invoke),
        ("filter", 2) => array_fns::filter(args, invoke),
        ("fold-left", 3) => array_fns::fold_left(args, invoke),
        ("fold-right", 3) => array_fns::fold_right(args, invoke),
        ("sort", 1) => array_fns::sort(args),
        _ => return None,
    })
}

fn call_fn<N: XdmNode>(
    local: &str,
    args: &[Sequence<N>],
    ctx: &mut EvaluationContext<N>,
    invoke: &Invoke<N>,
) -> Option<XResult<Sequence<N>>> {
    Some(match (local, args.len()) {
        ("abs", 1) => fn_numeric::abs(args),
        ("ceiling", 1) => fn_numeric::ceiling(args),
        ("floor", 1) => fn_numeric::floor(args),
        ("round", 1) | ("round", 2) => fn_numeric::round(args),
        ("round-half-to-even", 1) | ("round-half-to-even", 2) => fn_numeric::round_half_to_even(args),
        ("not", 1) => fn_numeric::not(args),
        ("true", 0) => Ok(fn_numeric::true_fn()),
        ("false", 0) => Ok(fn_numeric::false_fn()),
        ("boolean", 1) => fn_numeric::boolean(args),

        ("string-length", 0) | ("string-length", 1) => fn_string::string_length(args, ctx),
        ("upper-case", 1) => fn_string::upper_case(args),
        ("lower-case", 1) => fn_string::lower_case(args),
        ("normalize-space", 0) | ("normalize-space", 1) => fn_string::normalize_space(args, ctx),
        ("concat", n) if n >= 2 => fn_string::concat(args),
        ("string-join", 1) | ("string-join", 2) => fn_string::string_join(args),
        ("contains", 2) => fn_string::contains(args),
        ("starts-with", 2) => fn_string::starts_with(args),
        ("ends-with", 2) => fn_string::ends_with(args),
        ("substring", 2) | ("substring", 3) => fn_string::substring(args),
        ("translate", 3) => fn_string::translate(args),
        ("string-to-codepoints", 1) => fn_string::string_to_codepoints(args),
        ("matches", 2) | ("matches", 3) => fn_string::matches_fn(args),
        ("replace", 3) | ("replace", 4) => fn_string::replace(args),
        ("tokenize", 1) | ("tokenize", 2) | ("tokenize", 3) => fn_string::tokenize(args),
        ("analyze-string", 2) | ("analyze-string", 3) => fn_string::analyze_string(args),

        ("count", 1) => fn_sequence::count(args),
        ("sum", 1) | ("sum", 2) => fn_sequence::sum(args),
        ("avg", 1) => fn_sequence::avg(args),
        ("max", 1) => fn_sequence::max(args),
        ("min", 1) => fn_sequence::min(args),
        ("reverse", 1) => fn_sequence::reverse(args),
        ("subsequence", 2) | ("subsequence", 3) => fn_sequence::subsequence(args),
        ("head", 1) => fn_sequence::head(args),
        ("tail", 1) => fn_sequence::tail(args),
        ("insert-before", 3) => fn_sequence::insert_before(args),
        ("remove", 2) => fn_sequence::remove(args),
        ("distinct-values", 1) | ("distinct-values", 2) => fn_sequence::distinct_values(args),
        ("index-of", 2) | ("index-of", 3) => fn_sequence::index_of(args),
        ("empty", 1) => fn_sequence::empty(args),
        ("exists", 1) => fn_sequence::exists(args),
        ("zero-or-one", 1) => fn_sequence::zero_or_one(args),
        ("one-or-more", 1) => fn_sequence::one_or_more(args),
        ("exactly-one", 1) => fn_sequence::exactly_one(args),
        ("for-each", 2) => fn_sequence::for_each(args, invoke),
        ("filter", 2) => fn_sequence::filter(args, invoke),
        ("fold-left", 3) => fn_sequence::fold_left(args, invoke),
        ("fold-right", 3) => fn_sequence::fold_right(args, invoke),
        ("for-each-pair", 3) => fn_sequence::for_each_pair(args, invoke),

        ("name", 0) | ("name", 1) => fn_node::name(args, ctx),
        ("local-name", 0) | ("local-name", 1) => fn_node::local_name(args, ctx),
        ("namespace-uri", 0) | ("namespace-uri", 1) => fn_node::namespace_uri(args, ctx),
        ("node-name", 0) | ("node-name", 1) => fn_node::node_name(args, ctx),
        ("root", 0) | ("root", 1) => fn_node::root(args, ctx),
        ("data", 0) | ("data", 1) => fn_node::data(args, ctx),
        ("string", 0) | ("string", 1) => fn_node::string(args, ctx),
        ("number", 0) | ("number", 1) => fn_node::number(args, ctx),
        ("id", 1) | ("id", 2) => fn_node::id(args, ctx),
        ("idref", 1) | ("idref", 2) => fn_node::idref(args, ctx),
        ("generate-id", 0) | ("generate-id", 1) => fn_node::generate_id(args, ctx),
        ("lang", 1) | ("lang", 2) => fn_node::lang(args, ctx),

        ("position", 0) => Ok(fn_context::position(ctx)),
        ("last", 0) => Ok(fn_context::last(ctx)),
        ("current-dateTime", 0) => Ok(fn_context::current_date_time(ctx)),
        ("current-date", 0) => Ok(fn_context::current_date(ctx)),
        ("current-time", 0) => Ok(fn_context::current_time(ctx)),
        ("implicit-timezone", 0) => Ok(fn_context::implicit_timezone(ctx)),
        ("default-collation", 0) => Ok(fn_context::default_collation(ctx)),
        ("static-base-uri", 0) => Ok(fn_context::static_base_uri(ctx)),
        ("base-uri", 0) | ("base-uri", 1) => fn_context::base_uri(args, ctx),
        ("doc", 1) => fn_context::doc(args, ctx),
        ("doc-available", 1) => fn_context::doc_available(args, ctx),

        ("error", 0) | ("error", 1) | ("error", 2) | ("error", 3) => fn_diag::error(args),
        ("trace", 1) | ("trace", 2) => fn_diag::trace(args),

        _ => return None,
    })
}
