//! Maps and arrays (spec §3, 3.1). Maps are immutable `key → value` with
//! atomic keys compared under the `eq` of their common type (spec §3:
//! "integer keys `1` and `1.0` collide"); arrays are 1-indexed finite
//! sequences whose members may themselves be sequences.
//!
//! A literal `BTreeMap<AtomicValue, Item<N>>` (the teacher's `Data::Map`
//! shape) does not work here: `f64` is not `Ord`, and XPath's key equality
//! is `eq`-collision, not `Ord`-bucketing. [`MapKey`] is a canonical
//! representation — numerics bucket into one normalized form — so two keys
//! that are `eq` hash and compare equal.

use std::collections::HashMap;

use crate::value::atomic::AtomicValue;
use crate::value::node::XdmNode;
use crate::value::sequence::{Item, Sequence};

/// The canonical, hashable form of a map key. Numerics (integer, decimal,
/// float, double) all collapse to `Numeric`, comparing their `f64` bit
/// patterns via the total order `f64::total_cmp` gives — sufficient for
/// hashing/equality even though it does not match IEEE-754 `==`, because
/// XPath `eq` on numerics never needs to distinguish `1` from `1.0`.
#[derive(Debug, Clone, PartialEq)]
pub enum MapKey {
    Numeric(u64),
    String(String),
    Boolean(bool),
    AnyUri(String),
}

impl Eq for MapKey {}

impl std::hash::Hash for MapKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            MapKey::Numeric(bits) => bits.hash(state),
            MapKey::String(s) | MapKey::AnyUri(s) => s.hash(state),
            MapKey::Boolean(b) => b.hash(state),
        }
    }
}

impl MapKey {
    pub fn from_atomic(value: &AtomicValue) -> Option<MapKey> {
        Some(match value {
            AtomicValue::Integer(i, _) => MapKey::Numeric((*i as f64).to_bits()),
            AtomicValue::Decimal(d) => MapKey::Numeric(d.to_bits()),
            AtomicValue::Float(f) => MapKey::Numeric((*f as f64).to_bits()),
            AtomicValue::Double(d) => MapKey::Numeric(d.to_bits()),
            AtomicValue::String(s) | AtomicValue::UntypedAtomic(s) => MapKey::String(s.clone()),
            AtomicValue::Boolean(b) => MapKey::Boolean(*b),
            AtomicValue::AnyUri(u) => MapKey::AnyUri(u.clone()),
            _ => return None,
        })
    }
}

/// An XPath 3.1 map value. Insertion order is preserved for `map:keys` /
/// `map:for-each`, which iterate in a defined (if implementation-specific)
/// order; a plain `HashMap` plus a side vector tracks that order.
#[derive(Debug, Clone)]
pub struct XMap<N> {
    entries: HashMap<MapKey, (AtomicValue, Sequence<N>)>,
    order: Vec<MapKey>,
}

impl<N: XdmNode> XMap<N> {
    pub fn new() -> XMap<N> {
        XMap { entries: HashMap::new(), order: Vec::new() }
    }

    pub fn insert(&mut self, key: AtomicValue, value: Sequence<N>) {
        if let Some(map_key) = MapKey::from_atomic(&key) {
            if !self.entries.contains_key(&map_key) {
                self.order.push(map_key.clone());
            }
            self.entries.insert(map_key, (key, value));
        }
    }

    pub fn get(&self, key: &AtomicValue) -> Option<&Sequence<N>> {
        let map_key = MapKey::from_atomic(key)?;
        self.entries.get(&map_key).map(|(_, v)| v)
    }

    pub fn contains(&self, key: &AtomicValue) -> bool {
        MapKey::from_atomic(key).map_or(false, |k| self.entries.contains_key(&k))
    }

    pub fn remove(&self, key: &AtomicValue) -> XMap<N> {
        let mut clone = self.clone();
        if let Some(map_key) = MapKey::from_atomic(key) {
            clone.entries.remove(&map_key);
            clone.order.retain(|k| k != &map_key);
        }
        clone
    }

    pub fn size(&self) -> usize {
        self.order.len()
    }

    pub fn keys(&self) -> Vec<AtomicValue> {
        self.order.iter().filter_map(|k| self.entries.get(k)).map(|(key, _)| key.clone()).collect()
    }

    pub fn entries_in_order(&self) -> Vec<(AtomicValue, Sequence<N>)> {
        self.order
            .iter()
            .filter_map(|k| self.entries.get(k))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// `map:merge` duplicate-key policy (spec §4.6).
    pub fn merge(maps: &[XMap<N>], policy: MergePolicy) -> XResult<XMap<N>> {
        let mut result: XMap<N> = XMap::new();
        for map in maps {
            for (key, value) in map.entries_in_order() {
                let map_key = match MapKey::from_atomic(&key) {
                    Some(k) => k,
                    None => continue,
                };
                if let Some((_, existing)) = result.entries.get(&map_key).cloned() {
                    let merged = match policy {
                        MergePolicy::UseFirst => existing,
                        MergePolicy::UseLast => value.clone(),
                        MergePolicy::UseAny => existing,
                        MergePolicy::Combine => {
                            let mut combined = existing;
                            combined.extend(value.clone());
                            combined
                        }
                        MergePolicy::Reject => {
                            return Err(crate::error::XPathError::no_span(
                                crate::error::ErrorCode::FOJS0003,
                                "map:merge: duplicate key under the reject policy",
                            ))
                        }
                    };
                    result.insert(key, merged);
                } else {
                    result.insert(key, value);
                }
            }
        }
        Ok(result)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    UseFirst,
    UseLast,
    UseAny,
    Combine,
    Reject,
}

impl MergePolicy {
    pub fn by_name(name: &str) -> Option<MergePolicy> {
        Some(match name {
            "use-first" => MergePolicy::UseFirst,
            "use-last" => MergePolicy::UseLast,
            "use-any" => MergePolicy::UseAny,
            "combine" => MergePolicy::Combine,
            "reject" => MergePolicy::Reject,
            _ => return None,
        })
    }
}

/// An XPath 3.1 array value: a 1-indexed finite sequence of *members*,
/// each itself an XDM sequence (spec §3: "items may themselves be
/// sequences, unlike top-level flattening").
#[derive(Debug, Clone)]
pub struct XArray<N> {
    pub members: Vec<Sequence<N>>,
}

impl<N: XdmNode> XArray<N> {
    pub fn new(members: Vec<Sequence<N>>) -> XArray<N> {
        XArray { members }
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// 1-indexed member access.
    pub fn get(&self, index: i64) -> Option<&Sequence<N>> {
        if index < 1 {
            return None;
        }
        self.members.get((index - 1) as usize)
    }

    pub fn flatten(&self) -> Sequence<N> {
        self.members.iter().flat_map(|m| m.iter().cloned()).collect()
    }
}

use crate::error::XResult;

/// Turns a `map()`/`array()` item into a plain sequence of its values, used
/// by higher-order sequence functions that accept either shape.
pub fn items_of_sequence<N: XdmNode>(seq: &Sequence<N>) -> Vec<Item<N>> {
    seq.clone()
}
