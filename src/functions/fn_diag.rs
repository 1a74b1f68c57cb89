//! `fn:error` and `fn:trace` (spec §4.6a, §7): `fn:error` raises a dynamic
//! error carrying a caller-chosen `QName` code (defaulting to the standard
//! `err:FOER0000` when omitted) and message; `fn:trace` is a debugging
//! pass-through that logs its argument via the `log` facade and returns it
//! unchanged, matching how diagnostic output is handled elsewhere in this
//! crate (spec §5 "Logging goes through the `log` facade, never stdout").

use crate::error::{ErrorCode, XPathError, XResult};
use crate::functions::helpers::arg_as_string;
use crate::value::node::XdmNode;
use crate::value::sequence::Sequence;

pub fn error<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let message = if args.len() > 1 { arg_as_string("fn:error", &args[1])? } else { String::from("fn:error") };
    let mut err = XPathError::no_span(ErrorCode::FOER0000, message);
    if !args.is_empty() {
        if let [crate::value::sequence::Item::Atomic(crate::value::atomic::AtomicValue::QName(qname))] = args[0].as_slice() {
            err = err.with_hint(&format!("error code: {}", qname));
        }
    }
    Err(err)
}

pub fn trace<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let label = if args.len() > 1 { arg_as_string("fn:trace", &args[1])? } else { String::new() };
    let values: Vec<String> = args[0].iter().map(|item| item.string_value()).collect();
    log::debug!("fn:trace {}: {}", label, values.join(", "));
    Ok(args[0].clone())
}
