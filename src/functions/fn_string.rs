//! `fn:` string and regex functions (spec §4.6a). String functions are
//! codepoint-based; `substring` applies `round-half-to-even` to fractional
//! start/length and clips to the sequence range rather than erroring (spec
//! §4.6 "String functions").
//!
//! Regex functions translate the XPath/XQuery F&O regex flavor onto the
//! host `regex` crate (spec §9 "Regex flavor divergence"): `s`, `m`, `i`
//! map onto `regex`'s inline flags directly; `x` (free-spacing) is
//! approximated by stripping unescaped whitespace and `#`-comments before
//! compiling, and `q` (literal quoting) escapes the pattern with
//! `regex::escape` instead of compiling it as a pattern. Back-references
//! and some POSIX character-class names the F&O grammar allows are not
//! supported by the host engine; such patterns surface as `FORX0002`
//! rather than silently mismatching.

use regex::Regex;

use std::rc::Rc;

use crate::context::EvaluationContext;
use crate::error::{ErrorCode, XPathError, XResult};
use crate::functions::helpers::{arg_as_f64, arg_as_i64, arg_as_string, single_boolean, single_integer, single_string};
use crate::value::atomic::AtomicValue;
use crate::value::map_array::{XArray, XMap};
use crate::value::node::XdmNode;
use crate::value::sequence::{Item, Sequence};

/// `fn:string-length`/`fn:normalize-space` both take an `xs:string?`
/// argument that defaults to the string value of the context item when
/// omitted (spec §4.6a, §4.7) — distinct from the argument being *supplied*
/// as the empty sequence, which `arg_as_string` already renders as `""`.
fn string_arg_or_context<N: XdmNode>(function: &str, args: &[Sequence<N>], ctx: &EvaluationContext<N>) -> XResult<String> {
    if args.is_empty() {
        return match &ctx.item {
            Some(item) => Ok(item.string_value()),
            None => Err(XPathError::no_span(ErrorCode::XPDY0002, format!("{}: context item is absent", function))),
        };
    }
    arg_as_string(function, &args[0])
}

pub fn string_length<N: XdmNode>(args: &[Sequence<N>], ctx: &EvaluationContext<N>) -> XResult<Sequence<N>> {
    let s = string_arg_or_context("fn:string-length", args, ctx)?;
    Ok(single_integer(s.chars().count() as i64))
}

pub fn upper_case<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    Ok(single_string(arg_as_string("fn:upper-case", &args[0])?.to_uppercase()))
}

pub fn lower_case<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    Ok(single_string(arg_as_string("fn:lower-case", &args[0])?.to_lowercase()))
}

pub fn normalize_space<N: XdmNode>(args: &[Sequence<N>], ctx: &EvaluationContext<N>) -> XResult<Sequence<N>> {
    let s = string_arg_or_context("fn:normalize-space", args, ctx)?;
    Ok(single_string(s.split_whitespace().collect::<Vec<_>>().join(" ")))
}

pub fn concat<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let mut out = String::new();
    for arg in args {
        out.push_str(&arg_as_string("fn:concat", arg)?);
    }
    Ok(single_string(out))
}

pub fn string_join<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let separator = if args.len() > 1 { arg_as_string("fn:string-join", &args[1])? } else { String::new() };
    let parts: Vec<String> = args[0].iter().map(|item| item.string_value()).collect();
    Ok(single_string(parts.join(&separator)))
}

pub fn contains<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let haystack = arg_as_string("fn:contains", &args[0])?;
    let needle = arg_as_string("fn:contains", &args[1])?;
    Ok(single_boolean(haystack.contains(&needle)))
}

pub fn starts_with<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let haystack = arg_as_string("fn:starts-with", &args[0])?;
    let needle = arg_as_string("fn:starts-with", &args[1])?;
    Ok(single_boolean(haystack.starts_with(&needle)))
}

pub fn ends_with<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let haystack = arg_as_string("fn:ends-with", &args[0])?;
    let needle = arg_as_string("fn:ends-with", &args[1])?;
    Ok(single_boolean(haystack.ends_with(&needle)))
}

/// `fn:substring`: 1-indexed, `round-half-to-even` on fractional start and
/// length, clipped to the string's range with no out-of-range error (spec
/// §4.6 "range clipped to sequence semantics").
pub fn substring<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let s = arg_as_string("fn:substring", &args[0])?;
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len() as f64;

    let start = arg_as_f64("fn:substring", &args[1])?.unwrap_or(1.0);
    let length = if args.len() > 2 { arg_as_f64("fn:substring", &args[2])? } else { None };

    let start_pos = round_half_to_even(start);
    let end_pos = match length {
        Some(l) => start_pos + round_half_to_even(l),
        None => len + 1.0,
    };

    let begin = start_pos.max(1.0);
    let end = end_pos.min(len + 1.0);
    if end <= begin {
        return Ok(single_string(""));
    }
    let begin_idx = (begin - 1.0) as usize;
    let end_idx = (end - 1.0) as usize;
    let slice: String = chars[begin_idx.min(chars.len())..end_idx.min(chars.len())].iter().collect();
    Ok(single_string(slice))
}

fn round_half_to_even(d: f64) -> f64 {
    if d.is_nan() {
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

pub fn translate<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let s = arg_as_string("fn:translate", &args[0])?;
    let from: Vec<char> = arg_as_string("fn:translate", &args[1])?.chars().collect();
    let to: Vec<char> = arg_as_string("fn:translate", &args[2])?.chars().collect();
    let mut out = String::new();
    for c in s.chars() {
        match from.iter().position(|f| *f == c) {
            Some(idx) => {
                if let Some(r) = to.get(idx) {
                    out.push(*r);
                }
            }
            None => out.push(c),
        }
    }
    Ok(single_string(out))
}

pub fn string_to_codepoints<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let s = arg_as_string("fn:string-to-codepoints", &args[0])?;
    Ok(s.chars().map(|c| Item::Atomic(AtomicValue::integer(c as i64))).collect())
}

/// Translates F&O regex flags into `regex`-crate syntax, and the pattern
/// itself when `q` (quote, literal match) or `x` (free-spacing) is present.
fn compile(pattern: &str, flags: &str) -> XResult<Regex> {
    if flags.contains('q') {
        return Regex::new(&regex::escape(pattern))
            .map_err(|e| XPathError::no_span(ErrorCode::FORX0002, format!("invalid pattern: {}", e)));
    }

    let mut inline_flags = String::new();
    if flags.contains('s') {
        inline_flags.push('s');
    }
    if flags.contains('m') {
        inline_flags.push('m');
    }
    if flags.contains('i') {
        inline_flags.push('i');
    }

    let pattern = if flags.contains('x') { strip_free_spacing(pattern) } else { pattern.to_string() };

    let full = if inline_flags.is_empty() { pattern } else { format!("(?{}){}", inline_flags, pattern) };
    Regex::new(&full).map_err(|e| XPathError::no_span(ErrorCode::FORX0002, format!("invalid pattern: {}", e)))
}

/// Approximates the `x` (free-spacing) flag: unescaped whitespace and
/// `#`-to-end-of-line comments are stripped before compiling, since the
/// host `regex` crate's own `x` flag has slightly different comment syntax.
fn strip_free_spacing(pattern: &str) -> String {
    let mut out = String::new();
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            out.push(c);
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else if c == '#' {
            for c in chars.by_ref() {
                if c == '\n' {
                    break;
                }
            }
        } else if c.is_whitespace() {
            continue;
        } else {
            out.push(c);
        }
    }
    out
}

pub fn matches_fn<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let s = arg_as_string("fn:matches", &args[0])?;
    let pattern = arg_as_string("fn:matches", &args[1])?;
    let flags = if args.len() > 2 { arg_as_string("fn:matches", &args[2])? } else { String::new() };
    let re = compile(&pattern, &flags)?;
    Ok(single_boolean(re.is_match(&s)))
}

pub fn replace<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let s = arg_as_string("fn:replace", &args[0])?;
    let pattern = arg_as_string("fn:replace", &args[1])?;
    let replacement = arg_as_string("fn:replace", &args[2])?;
    let flags = if args.len() > 3 { arg_as_string("fn:replace", &args[3])? } else { String::new() };
    let re = compile(&pattern, &flags)?;
    // F&O `$N` backreferences in the replacement map directly onto `regex`'s `${N}` form.
    let translated = translate_replacement(&replacement);
    Ok(single_string(re.replace_all(&s, translated.as_str()).into_owned()))
}

fn translate_replacement(replacement: &str) -> String {
    let mut out = String::new();
    let mut chars = replacement.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '$' {
            let mut digits = String::new();
            while let Some(d) = chars.peek() {
                if d.is_ascii_digit() {
                    digits.push(*d);
                    chars.next();
                } else {
                    break;
                }
            }
            if digits.is_empty() {
                out.push('$');
            } else {
                out.push_str(&format!("${{{}}}", digits));
            }
        } else if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

pub fn tokenize<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let s = arg_as_string("fn:tokenize", &args[0])?;
    if args.len() < 2 {
        return Ok(s.split_whitespace().map(|t| Item::Atomic(AtomicValue::String(t.to_string()))).collect());
    }
    let pattern = arg_as_string("fn:tokenize", &args[1])?;
    let flags = if args.len() > 2 { arg_as_string("fn:tokenize", &args[2])? } else { String::new() };
    let re = compile(&pattern, &flags)?;
    if re.is_match("") {
        return Err(XPathError::no_span(ErrorCode::FORX0003, "tokenize: pattern matches a zero-length string"));
    }
    Ok(re.split(&s).map(|t| Item::Atomic(AtomicValue::String(t.to_string()))).collect())
}

/// `fn:analyze-string($input, $pattern, $flags?)` (spec §4.6a). The F&O
/// signature returns an `fn:analyze-string-result` XML element alternating
/// `fn:match`/`fn:non-match` children, which this engine has no way to
/// construct (XPath, unlike XQuery, has no element-constructor syntax and
/// [`crate::value::node::XdmNode`] is a read-only tree adapter — spec §1's
/// "XML parsing and DOM construction" stays out of scope). Instead this
/// returns the same information as an `array(map(xs:string, item()))`: one
/// map per run of input, each carrying `"match"` (`xs:boolean`), `"string"`
/// (the run's text), and, for matching runs, `"groups"` (an array of each
/// capture group's text, `""` for a group that did not participate).
pub fn analyze_string<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let s = arg_as_string("fn:analyze-string", &args[0])?;
    let pattern = arg_as_string("fn:analyze-string", &args[1])?;
    let flags = if args.len() > 2 { arg_as_string("fn:analyze-string", &args[2])? } else { String::new() };
    let re = compile(&pattern, &flags)?;
    if re.is_match("") {
        return Err(XPathError::no_span(ErrorCode::FORX0003, "analyze-string: pattern matches a zero-length string"));
    }

    let mut runs = Vec::new();
    let mut cursor = 0usize;
    for caps in re.captures_iter(&s) {
        let whole = caps.get(0).expect("capture group 0 always matches");
        if whole.start() > cursor {
            runs.push(run_map(false, &s[cursor..whole.start()], None));
        }
        let groups: Vec<Sequence<N>> =
            (1..caps.len()).map(|i| vec![Item::Atomic(AtomicValue::String(caps.get(i).map(|m| m.as_str().to_string()).unwrap_or_default()))]).collect();
        runs.push(run_map(true, whole.as_str(), Some(groups)));
        cursor = whole.end();
    }
    if cursor < s.len() {
        runs.push(run_map(false, &s[cursor..], None));
    }
    Ok(vec![Item::Array(Rc::new(XArray::new(runs)))])
}

fn run_map<N: XdmNode>(matched: bool, text: &str, groups: Option<Vec<Sequence<N>>>) -> Sequence<N> {
    let mut map = XMap::new();
    map.insert(AtomicValue::String("match".to_string()), vec![Item::Atomic(AtomicValue::Boolean(matched))]);
    map.insert(AtomicValue::String("string".to_string()), vec![Item::Atomic(AtomicValue::String(text.to_string()))]);
    if let Some(groups) = groups {
        let members: Vec<Sequence<N>> = groups;
        map.insert(AtomicValue::String("groups".to_string()), vec![Item::Array(Rc::new(XArray::new(members)))]);
    }
    vec![Item::Map(Rc::new(map))]
}
