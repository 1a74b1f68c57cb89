//! `map:` functions (spec §3.1, §4.6a), operating over the immutable
//! [`XMap`] value. Every mutator (`put`/`remove`) returns a new map rather
//! than mutating in place, matching XDM's "maps are immutable" rule.

use std::rc::Rc;

use crate::error::{ErrorCode, XPathError, XResult};
use crate::functions::fn_sequence::Invoke;
use crate::functions::helpers::single_integer;
use crate::value::function_item::FunctionItem;
use crate::value::map_array::{MergePolicy, XMap};
use crate::value::node::XdmNode;
use crate::value::sequence::{effective_boolean_value, Item, Sequence};

fn as_map<N: XdmNode>(function: &str, seq: &Sequence<N>) -> XResult<Rc<XMap<N>>> {
    match seq.as_slice() {
        [Item::Map(m)] => Ok(m.clone()),
        _ => Err(XPathError::no_span(ErrorCode::XPTY0004, format!("{}: expected a single map argument", function))),
    }
}

fn as_function<N: XdmNode>(function: &str, seq: &Sequence<N>) -> XResult<Rc<FunctionItem<N>>> {
    match seq.as_slice() {
        [Item::Function(f)] => Ok(f.clone()),
        _ => Err(XPathError::no_span(ErrorCode::XPTY0004, format!("{}: expected a function item argument", function))),
    }
}

fn key_of<N: XdmNode>(function: &str, seq: &Sequence<N>) -> XResult<crate::value::atomic::AtomicValue> {
    crate::functions::helpers::exactly_one_atomic(function, seq)
}

pub fn get<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let map = as_map("map:get", &args[0])?;
    let key = key_of("map:get", &args[1])?;
    Ok(map.get(&key).cloned().unwrap_or_default())
}

pub fn contains<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let map = as_map("map:contains", &args[0])?;
    let key = key_of("map:contains", &args[1])?;
    Ok(crate::functions::helpers::single_boolean(map.contains(&key)))
}

pub fn size<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let map = as_map("map:size", &args[0])?;
    Ok(single_integer(map.size() as i64))
}

pub fn keys<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let map = as_map("map:keys", &args[0])?;
    Ok(map.keys().into_iter().map(Item::Atomic).collect())
}

pub fn put<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let map = as_map("map:put", &args[0])?;
    let key = key_of("map:put", &args[1])?;
    let mut clone = (*map).clone();
    clone.insert(key, args[2].clone());
    Ok(vec![Item::Map(Rc::new(clone))])
}

pub fn remove<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let map = as_map("map:remove", &args[0])?;
    let mut result = (*map).clone();
    for key_seq in &args[1] {
        if let Item::Atomic(key) = key_seq {
            result = result.remove(key);
        }
    }
    Ok(vec![Item::Map(Rc::new(result))])
}

pub fn merge<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let mut maps = Vec::new();
    for item in &args[0] {
        if let Item::Map(m) = item {
            maps.push((**m).clone());
        } else {
            return Err(XPathError::no_span(ErrorCode::XPTY0004, "map:merge: expected a sequence of maps"));
        }
    }
    let policy = if args.len() > 1 {
        let name = crate::functions::helpers::arg_as_string("map:merge", &args[1])?;
        MergePolicy::by_name(&name)
            .ok_or_else(|| XPathError::no_span(ErrorCode::FOJS0003, format!("map:merge: unknown duplicates policy: {}", name)))?
    } else {
        MergePolicy::UseFirst
    };
    let merged = XMap::merge(&maps, policy)?;
    Ok(vec![Item::Map(Rc::new(merged))])
}

pub fn entry<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let key = key_of("map:entry", &args[0])?;
    let mut map = XMap::new();
    map.insert(key, args[1].clone());
    Ok(vec![Item::Map(Rc::new(map))])
}

pub fn for_each<N: XdmNode>(args: &[Sequence<N>], invoke: &Invoke<N>) -> XResult<Sequence<N>> {
    let map = as_map("map:for-each", &args[0])?;
    let f = as_function("map:for-each", &args[1])?;
    let mut out = Vec::new();
    for (key, value) in map.entries_in_order() {
        out.extend(invoke(&f, vec![vec![Item::Atomic(key)], value])?);
    }
    Ok(out)
}

/// `map:filter` is not part of the base 3.1 F&O table but follows directly
/// from `map:for-each` plus a predicate (spec §4.6a "map/array coverage
/// extends beyond the base table where the corpus' higher-order pattern
/// composes naturally").
pub fn filter<N: XdmNode>(args: &[Sequence<N>], invoke: &Invoke<N>) -> XResult<Sequence<N>> {
    let map = as_map("map:filter", &args[0])?;
    let f = as_function("map:filter", &args[1])?;
    let mut result = XMap::new();
    for (key, value) in map.entries_in_order() {
        let kept = invoke(&f, vec![vec![Item::Atomic(key.clone())], value.clone()])?;
        if effective_boolean_value(&kept)? {
            result.insert(key, value);
        }
    }
    Ok(vec![Item::Map(Rc::new(result))])
}
