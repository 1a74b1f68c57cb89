//! `xs:` constructor functions (spec §4.6a): each one is `cast as
//! xs:TYPE` under a function-call syntax rather than a distinct operation
//! (spec §3 "type constructors and `cast as` share one coercion table"),
//! so this module is a thin dispatcher onto [`crate::value::cast::cast_atomic`].

use crate::error::{ErrorCode, XResult};
use crate::functions::helpers::zero_or_one_atomic;
use crate::value::cast::cast_atomic;
use crate::value::node::XdmNode;
use crate::value::sequence::{Item, Sequence};
use crate::value::types::AtomicTypeTag;

/// Dispatches an `xs:TYPE(...)` constructor call by local name. Returns
/// `None` for names that are not `xs:` atomic type constructors, so the
/// caller can fall through to "unknown function".
pub fn constructor<N: XdmNode>(local_name: &str, args: &[Sequence<N>]) -> Option<XResult<Sequence<N>>> {
    let tag = AtomicTypeTag::by_name(local_name)?;
    Some(construct(tag, args))
}

fn construct<N: XdmNode>(tag: AtomicTypeTag, args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let function = format!("xs:{}", tag.name());
    match zero_or_one_atomic(&function, &args[0])? {
        None => Ok(Vec::new()),
        Some(value) => {
            let cast = cast_atomic(&value, tag).map_err(|mut e| {
                e.code = ErrorCode::FOCA0002;
                e
            })?;
            Ok(vec![Item::Atomic(cast)])
        }
    }
}
