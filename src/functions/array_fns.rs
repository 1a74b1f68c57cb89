//! `array:` functions (spec §3.1, §4.6a), operating over the immutable,
//! 1-indexed [`XArray`] value.

use std::rc::Rc;

use crate::error::{ErrorCode, XPathError, XResult};
use crate::functions::fn_sequence::Invoke;
use crate::functions::helpers::{arg_as_i64, single_integer};
use crate::value::function_item::FunctionItem;
use crate::value::map_array::XArray;
use crate::value::node::XdmNode;
use crate::value::sequence::{effective_boolean_value, Item, Sequence};

fn as_array<N: XdmNode>(function: &str, seq: &Sequence<N>) -> XResult<Rc<XArray<N>>> {
    match seq.as_slice() {
        [Item::Array(a)] => Ok(a.clone()),
        _ => Err(XPathError::no_span(ErrorCode::XPTY0004, format!("{}: expected a single array argument", function))),
    }
}

fn as_function<N: XdmNode>(function: &str, seq: &Sequence<N>) -> XResult<Rc<FunctionItem<N>>> {
    match seq.as_slice() {
        [Item::Function(f)] => Ok(f.clone()),
        _ => Err(XPathError::no_span(ErrorCode::XPTY0004, format!("{}: expected a function item argument", function))),
    }
}

fn index_of<N: XdmNode>(function: &str, args: &[Sequence<N>], index: usize) -> XResult<i64> {
    arg_as_i64(function, &args[index])?.ok_or_else(|| XPathError::no_span(ErrorCode::XPTY0004, format!("{}: missing index", function)))
}

fn out_of_bounds(function: &str, index: i64) -> XPathError {
    XPathError::no_span(ErrorCode::FOAY0001, format!("{}: index {} is out of bounds", function, index))
}

pub fn get<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let array = as_array("array:get", &args[0])?;
    let index = index_of("array:get", args, 1)?;
    array.get(index).cloned().ok_or_else(|| out_of_bounds("array:get", index))
}

pub fn size<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let array = as_array("array:size", &args[0])?;
    Ok(single_integer(array.size() as i64))
}

pub fn put<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let array = as_array("array:put", &args[0])?;
    let index = index_of("array:put", args, 1)?;
    if index < 1 || index as usize > array.size() {
        return Err(out_of_bounds("array:put", index));
    }
    let mut members = array.members.clone();
    members[(index - 1) as usize] = args[2].clone();
    Ok(vec![Item::Array(Rc::new(XArray::new(members)))])
}

pub fn append<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let array = as_array("array:append", &args[0])?;
    let mut members = array.members.clone();
    members.push(args[1].clone());
    Ok(vec![Item::Array(Rc::new(XArray::new(members)))])
}

pub fn subarray<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let array = as_array("array:subarray", &args[0])?;
    let start = index_of("array:subarray", args, 1)?;
    let length = if args.len() > 2 { Some(index_of("array:subarray", args, 2)?) } else { None };
    let len = array.size() as i64;
    if start < 1 || start > len + 1 {
        return Err(out_of_bounds("array:subarray", start));
    }
    let count = length.unwrap_or(len - start + 1);
    if count < 0 || start + count - 1 > len {
        return Err(out_of_bounds("array:subarray", start + count - 1));
    }
    let begin = (start - 1) as usize;
    let end = begin + count as usize;
    Ok(vec![Item::Array(Rc::new(XArray::new(array.members[begin..end].to_vec())))])
}

pub fn insert_before<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let array = as_array("array:insert-before", &args[0])?;
    let index = index_of("array:insert-before", args, 1)?;
    if index < 1 || index as usize > array.size() + 1 {
        return Err(out_of_bounds("array:insert-before", index));
    }
    let mut members = array.members.clone();
    members.insert((index - 1) as usize, args[2].clone());
    Ok(vec![Item::Array(Rc::new(XArray::new(members)))])
}

pub fn remove<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let array = as_array("array:remove", &args[0])?;
    let index = index_of("array:remove", args, 1)?;
    if index < 1 || index as usize > array.size() {
        return Err(out_of_bounds("array:remove", index));
    }
    let mut members = array.members.clone();
    members.remove((index - 1) as usize);
    Ok(vec![Item::Array(Rc::new(XArray::new(members)))])
}

pub fn reverse<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let array = as_array("array:reverse", &args[0])?;
    let mut members = array.members.clone();
    members.reverse();
    Ok(vec![Item::Array(Rc::new(XArray::new(members)))])
}

pub fn join<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let mut members = Vec::new();
    for item in &args[0] {
        let array = match item {
            Item::Array(a) => a.clone(),
            _ => return Err(XPathError::no_span(ErrorCode::XPTY0004, "array:join: expected a sequence of arrays")),
        };
        members.extend(array.members.clone());
    }
    Ok(vec![Item::Array(Rc::new(XArray::new(members)))])
}

pub fn flatten<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    fn walk<N: XdmNode>(item: &Item<N>, out: &mut Sequence<N>) {
        match item {
            Item::Array(a) => {
                for member in &a.members {
                    for inner in member {
                        walk(inner, out);
                    }
                }
            }
            other => out.push(other.clone()),
        }
    }
    let mut out = Vec::new();
    for item in &args[0] {
        walk(item, &mut out);
    }
    Ok(out)
}

pub fn for_each<N: XdmNode>(args: &[Sequence<N>], invoke: &Invoke<N>) -> XResult<Sequence<N>> {
    let array = as_array("array:for-each", &args[0])?;
    let f = as_function("array:for-each", &args[1])?;
    let mut members = Vec::new();
    for member in &array.members {
        members.push(invoke(&f, vec![member.clone()])?);
    }
    Ok(vec![Item::Array(Rc::new(XArray::new(members)))])
}

pub fn filter<N: XdmNode>(args: &[Sequence<N>], invoke: &Invoke<N>) -> XResult<Sequence<N>> {
    let array = as_array("array:filter", &args[0])?;
    let f = as_function("array:filter", &args[1])?;
    let mut members = Vec::new();
    for member in &array.members {
        let kept = invoke(&f, vec![member.clone()])?;
        if effective_boolean_value(&kept)? {
            members.push(member.clone());
        }
    }
    Ok(vec![Item::Array(Rc::new(XArray::new(members)))])
}

pub fn fold_left<N: XdmNode>(args: &[Sequence<N>], invoke: &Invoke<N>) -> XResult<Sequence<N>> {
    let array = as_array("array:fold-left", &args[0])?;
    let f = as_function("array:fold-left", &args[2])?;
    let mut acc = args[1].clone();
    for member in &array.members {
        acc = invoke(&f, vec![acc, member.clone()])?;
    }
    Ok(acc)
}

pub fn fold_right<N: XdmNode>(args: &[Sequence<N>], invoke: &Invoke<N>) -> XResult<Sequence<N>> {
    let array = as_array("array:fold-right", &args[0])?;
    let f = as_function("array:fold-right", &args[2])?;
    let mut acc = args[1].clone();
    for member in array.members.iter().rev() {
        acc = invoke(&f, vec![member.clone(), acc])?;
    }
    Ok(acc)
}

pub fn sort<N: XdmNode>(args: &[Sequence<N>]) -> XResult<Sequence<N>> {
    let array = as_array("array:sort", &args[0])?;
    let mut members: Vec<(crate::value::atomic::AtomicValue, Sequence<N>)> = Vec::with_capacity(array.size());
    for member in &array.members {
        let key = crate::functions::helpers::exactly_one_atomic("array:sort", member)?;
        members.push((key, member.clone()));
    }
    members.sort_by(|(a, _), (b, _)| {
        crate::eval::operators::value_compare_one(crate::ast::node::BinOp::ValueLt, a, b)
            .ok()
            .map(|less| if less { std::cmp::Ordering::Less } else { std::cmp::Ordering::Greater })
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(vec![Item::Array(Rc::new(XArray::new(members.into_iter().map(|(_, m)| m).collect())))])
}
