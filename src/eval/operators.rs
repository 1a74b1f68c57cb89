//! Arithmetic, comparison, and set operators (spec §4.4). Each operates on
//! already-evaluated operand sequences; the evaluator (`eval::mod`) is
//! responsible for atomizing, promoting, and re-wrapping the scalar result
//! into a one-item [`Sequence`].

use crate::ast::BinOp;
use crate::error::{ErrorCode, XPathError, XResult};
use crate::value::atomic::AtomicValue;
use crate::value::cast;
use crate::value::node::XdmNode;
use crate::value::sequence::{dedup_document_order, Item, Sequence};
use crate::value::types::AtomicTypeTag;

/// A numeric's rung on the promotion lattice (spec §3: `integer → decimal →
/// float → double`), used to find the common type two arithmetic operands
/// promote to before the operation is performed.
fn numeric_rank(tag: AtomicTypeTag) -> Option<u8> {
    use AtomicTypeTag::*;
    Some(match tag {
        Float => 2,
        Double => 3,
        Decimal => 1,
        _ if cast::is_subtype(tag, Integer) => 0,
        _ => return None,
    })
}

enum Numeric {
    Integer(i64),
    Decimal(f64),
    Float(f32),
    Double(f64),
}

fn as_numeric(value: &AtomicValue) -> XResult<Numeric> {
    Ok(match value {
        AtomicValue::Integer(i, _) => Numeric::Integer(*i),
        AtomicValue::Decimal(d) => Numeric::Decimal(*d),
        AtomicValue::Float(f) => Numeric::Float(*f),
        AtomicValue::Double(d) => Numeric::Double(*d),
        _ => {
            return Err(XPathError::no_span(
                ErrorCode::XPTY0004,
                format!("{} is not numeric", value.type_tag().name()),
            ))
        }
    })
}

/// Promotes `lhs`/`rhs` to their common numeric rank and applies `op`
/// (spec §4.4 arithmetic operators). Division/modulo by a zero integer or
/// decimal operand raises `FOAR0001`; the same on `float`/`double`
/// operands yields `±INF`/`NaN` through ordinary IEEE-754 semantics.
pub fn arithmetic(op: BinOp, lhs: &AtomicValue, rhs: &AtomicValue) -> XResult<AtomicValue> {
    if let Some(result) = try_duration_arithmetic(op, lhs, rhs)? {
        return Ok(result);
    }

    let lhs_rank = numeric_rank(lhs.type_tag());
    let rhs_rank = numeric_rank(rhs.type_tag());
    let (lhs_rank, rhs_rank) = match (lhs_rank, rhs_rank) {
        (Some(l), Some(r)) => (l, r),
        _ => {
            return Err(XPathError::no_span(
                ErrorCode::XPTY0004,
                format!("cannot apply {:?} to {}/{}", op, lhs.type_tag().name(), rhs.type_tag().name()),
            ))
        }
    };
    let rank = lhs_rank.max(rhs_rank);

    match rank {
        0 => {
            let (Numeric::Integer(a), Numeric::Integer(b)) = (as_numeric(lhs)?, as_numeric(rhs)?) else {
                unreachable!()
            };
            integer_arithmetic(op, a, b)
        }
        1 => {
            let a = lhs.as_f64().expect("rank-1 operand is numeric");
            let b = rhs.as_f64().expect("rank-1 operand is numeric");
            Ok(AtomicValue::Decimal(decimal_arithmetic(op, a, b, true)?))
        }
        2 => {
            let a = lhs.as_f64().expect("rank-2 operand is numeric") as f32;
            let b = rhs.as_f64().expect("rank-2 operand is numeric") as f32;
            Ok(AtomicValue::Float(float_arithmetic(op, a, b)))
        }
        _ => {
            let a = lhs.as_f64().expect("rank-3 operand is numeric");
            let b = rhs.as_f64().expect("rank-3 operand is numeric");
            Ok(AtomicValue::Double(double_arithmetic(op, a, b)))
        }
    }
}

fn integer_arithmetic(op: BinOp, a: i64, b: i64) -> XResult<AtomicValue> {
    Ok(match op {
        BinOp::Add => AtomicValue::integer(a.wrapping_add(b)),
        BinOp::Sub => AtomicValue::integer(a.wrapping_sub(b)),
        BinOp::Mul => AtomicValue::integer(a.wrapping_mul(b)),
        BinOp::Div => {
            if b == 0 {
                return Err(div_by_zero());
            }
            AtomicValue::Decimal(a as f64 / b as f64)
        }
        BinOp::IDiv => {
            if b == 0 {
                return Err(div_by_zero());
            }
            AtomicValue::integer(a / b)
        }
        BinOp::Mod => {
            if b == 0 {
                return Err(div_by_zero());
            }
            AtomicValue::integer(a % b)
        }
        _ => unreachable!("non-arithmetic BinOp passed to integer_arithmetic"),
    })
}

fn decimal_arithmetic(op: BinOp, a: f64, b: f64, is_decimal: bool) -> XResult<f64> {
    Ok(match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => {
            if is_decimal && b == 0.0 {
                return Err(div_by_zero());
            }
            a / b
        }
        BinOp::IDiv => {
            if b == 0.0 {
                return Err(div_by_zero());
            }
            return Ok((a / b).trunc());
        }
        BinOp::Mod => {
            if is_decimal && b == 0.0 {
                return Err(div_by_zero());
            }
            a % b
        }
        _ => unreachable!("non-arithmetic BinOp passed to decimal_arithmetic"),
    })
}

fn float_arithmetic(op: BinOp, a: f32, b: f32) -> f32 {
    match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => a / b,
        BinOp::IDiv => (a / b).trunc(),
        BinOp::Mod => a % b,
        _ => unreachable!("non-arithmetic BinOp passed to float_arithmetic"),
    }
}

fn double_arithmetic(op: BinOp, a: f64, b: f64) -> f64 {
    match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => a / b,
        BinOp::IDiv => (a / b).trunc(),
        BinOp::Mod => a % b,
        _ => unreachable!("non-arithmetic BinOp passed to double_arithmetic"),
    }
}

fn div_by_zero() -> XPathError {
    XPathError::no_span(ErrorCode::FOAR0001, "division by zero")
}

/// Date/time/duration arithmetic (spec §4.6a, boundary scenario §8.4):
/// `date + duration`, `dateTime +/- duration`, `duration +/- duration`,
/// `duration * number`, `duration div duration`. Returns `Ok(None)` when
/// neither operand is a temporal value, so the caller falls through to
/// plain numeric arithmetic.
fn try_duration_arithmetic(op: BinOp, lhs: &AtomicValue, rhs: &AtomicValue) -> XResult<Option<AtomicValue>> {
    use AtomicValue::*;
    Ok(Some(match (lhs, op, rhs) {
        (Duration(a), BinOp::Add, Duration(b)) => {
            Duration(crate::value::atomic::XDuration { months: a.months + b.months, millis: a.millis + b.millis })
        }
        (Duration(a), BinOp::Sub, Duration(b)) => {
            Duration(crate::value::atomic::XDuration { months: a.months - b.months, millis: a.millis - b.millis })
        }
        (Duration(a), BinOp::Mul, _) => {
            let factor = rhs.as_f64().ok_or_else(|| XPathError::no_span(ErrorCode::XPTY0004, "duration * non-numeric"))?;
            Duration(crate::value::atomic::XDuration {
                months: (a.months as f64 * factor).round() as i64,
                millis: (a.millis as f64 * factor).round() as i64,
            })
        }
        (Duration(a), BinOp::Div, Duration(b)) => {
            if a.is_year_month() && b.is_year_month() {
                if b.months == 0 {
                    return Err(div_by_zero());
                }
                Decimal(a.months as f64 / b.months as f64)
            } else if a.is_day_time() && b.is_day_time() {
                if b.millis == 0 {
                    return Err(div_by_zero());
                }
                Decimal(a.millis as f64 / b.millis as f64)
            } else {
                return Err(XPathError::no_span(ErrorCode::XPTY0004, "incompatible duration types for division"));
            }
        }
        (Duration(a), BinOp::Div, _) => {
            let factor = rhs.as_f64().ok_or_else(|| XPathError::no_span(ErrorCode::XPTY0004, "duration div non-numeric"))?;
            if factor == 0.0 {
                return Err(div_by_zero());
            }
            Duration(crate::value::atomic::XDuration {
                months: (a.months as f64 / factor).round() as i64,
                millis: (a.millis as f64 / factor).round() as i64,
            })
        }
        (Date(d), BinOp::Add, Duration(dur)) | (Duration(dur), BinOp::Add, Date(d)) => {
            Date(add_months_days(*d, *dur))
        }
        (Date(d), BinOp::Sub, Duration(dur)) => Date(add_months_days(*d, negate(*dur))),
        (DateTime(dt), BinOp::Add, Duration(dur)) | (Duration(dur), BinOp::Add, DateTime(dt)) => {
            DateTime(add_to_datetime(*dt, *dur))
        }
        (DateTime(dt), BinOp::Sub, Duration(dur)) => DateTime(add_to_datetime(*dt, negate(*dur))),
        (Date(a), BinOp::Sub, Date(b)) => {
            let days = (*a - *b).num_days();
            Duration(crate::value::atomic::XDuration::day_time(days * 86_400_000))
        }
        (DateTime(a), BinOp::Sub, DateTime(b)) => {
            let millis = (*a - *b).num_milliseconds();
            Duration(crate::value::atomic::XDuration::day_time(millis))
        }
        _ => return Ok(None),
    }))
}

fn negate(d: crate::value::atomic::XDuration) -> crate::value::atomic::XDuration {
    crate::value::atomic::XDuration { months: -d.months, millis: -d.millis }
}

fn add_months_days(date: chrono::NaiveDate, dur: crate::value::atomic::XDuration) -> chrono::NaiveDate {
    use chrono::Datelike;
    let total_months = date.year() as i64 * 12 + (date.month0() as i64) + dur.months;
    let year = total_months.div_euclid(12) as i32;
    let month = total_months.rem_euclid(12) as u32 + 1;
    let day = date.day();
    let mut candidate = chrono::NaiveDate::from_ymd_opt(year, month, day);
    let mut shrink = day;
    while candidate.is_none() && shrink > 28 {
        shrink -= 1;
        candidate = chrono::NaiveDate::from_ymd_opt(year, month, shrink);
    }
    let with_months = candidate.expect("clamped day always yields a valid date");
    with_months + chrono::Duration::milliseconds(dur.millis)
}

fn add_to_datetime(
    dt: chrono::DateTime<chrono::FixedOffset>,
    dur: crate::value::atomic::XDuration,
) -> chrono::DateTime<chrono::FixedOffset> {
    let date = add_months_days(dt.date_naive(), crate::value::atomic::XDuration::year_month(dur.months));
    let shifted = date.and_time(dt.time()) + chrono::Duration::milliseconds(dur.millis);
    chrono::DateTime::from_naive_utc_and_offset(shifted, *dt.offset())
}

/// `m to n` (spec §4.4 Range): ascending integers, empty if `m > n`.
pub fn range(m: i64, n: i64) -> Vec<i64> {
    if m > n {
        Vec::new()
    } else {
        (m..=n).collect()
    }
}

/// `union`/`intersect`/`except` on node sequences (spec §4.4 Set
/// operations): "result is deduplicated and document-ordered."
pub fn set_op<N: XdmNode>(op: BinOp, lhs: Vec<N>, rhs: Vec<N>) -> Vec<N> {
    let result = match op {
        BinOp::Union => {
            let mut all = lhs;
            all.extend(rhs);
            all
        }
        BinOp::Intersect => lhs.into_iter().filter(|n| rhs.iter().any(|r| r.identical(n))).collect(),
        BinOp::Except => lhs.into_iter().filter(|n| !rhs.iter().any(|r| r.identical(n))).collect(),
        _ => unreachable!("non-set BinOp passed to set_op"),
    };
    dedup_document_order(result)
}

/// General comparison (spec §4.4): existentially quantified over the
/// Cartesian product of the two atomized operand sequences, using the
/// comparator `cmp` (type-coercion and 1.0 compatibility handled by the
/// caller before values reach here).
pub fn general_compare(
    op: BinOp,
    lhs: &[AtomicValue],
    rhs: &[AtomicValue],
    compatibility_mode: bool,
) -> XResult<bool> {
    for a in lhs {
        for b in rhs {
            if atomic_general_compare_one(op, a, b, compatibility_mode)? {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

fn coerce_pair(a: &AtomicValue, b: &AtomicValue, compatibility_mode: bool) -> XResult<(AtomicValue, AtomicValue)> {
    use AtomicValue::*;
    match (a, b) {
        (UntypedAtomic(_), UntypedAtomic(_)) => {
            Ok((String(a.display_string()), String(b.display_string())))
        }
        (UntypedAtomic(_), other) => {
            let casted = cast::cast_atomic(a, other.type_tag())?;
            Ok((casted, b.clone()))
        }
        (other, UntypedAtomic(_)) => {
            let casted = cast::cast_atomic(b, other.type_tag())?;
            Ok((a.clone(), casted))
        }
        _ if a.as_f64().is_some() && b.as_f64().is_some() => Ok((a.clone(), b.clone())),
        (String(_), String(_)) => Ok((a.clone(), b.clone())),
        _ if compatibility_mode => {
            Ok((AtomicValue::Double(a.as_f64().unwrap_or(f64::NAN)), AtomicValue::Double(b.as_f64().unwrap_or(f64::NAN))))
        }
        _ => Ok((a.clone(), b.clone())),
    }
}

fn atomic_general_compare_one(op: BinOp, a: &AtomicValue, b: &AtomicValue, compatibility_mode: bool) -> XResult<bool> {
    let (a, b) = coerce_pair(a, b, compatibility_mode)?;
    let value_op = match op {
        BinOp::GeneralEq => BinOp::ValueEq,
        BinOp::GeneralNe => BinOp::ValueNe,
        BinOp::GeneralLt => BinOp::ValueLt,
        BinOp::GeneralLe => BinOp::ValueLe,
        BinOp::GeneralGt => BinOp::ValueGt,
        BinOp::GeneralGe => BinOp::ValueGe,
        _ => unreachable!("non-comparison BinOp passed to atomic_general_compare_one"),
    };
    value_compare_one(value_op, &a, &b)
}

/// Value comparison (spec §4.4): `eq ne lt le gt ge` on a matched pair of
/// singleton atomic operands.
pub fn value_compare_one(op: BinOp, a: &AtomicValue, b: &AtomicValue) -> XResult<bool> {
    use std::cmp::Ordering;

    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return Ok(match op {
            BinOp::ValueEq => x == y,
            BinOp::ValueNe => x != y,
            BinOp::ValueLt => x < y,
            BinOp::ValueLe => x <= y,
            BinOp::ValueGt => x > y,
            BinOp::ValueGe => x >= y,
            _ => unreachable!(),
        });
    }

    let ordering = match (a, b) {
        (AtomicValue::String(x), AtomicValue::String(y))
        | (AtomicValue::UntypedAtomic(x), AtomicValue::UntypedAtomic(y))
        | (AtomicValue::AnyUri(x), AtomicValue::AnyUri(y)) => Some(x.cmp(y)),
        (AtomicValue::Boolean(x), AtomicValue::Boolean(y)) => Some(x.cmp(y)),
        (AtomicValue::Date(x), AtomicValue::Date(y)) => Some(x.cmp(y)),
        (AtomicValue::Time(x), AtomicValue::Time(y)) => Some(x.cmp(y)),
        (AtomicValue::DateTime(x), AtomicValue::DateTime(y)) => Some(x.cmp(y)),
        (AtomicValue::Duration(x), AtomicValue::Duration(y)) => {
            if x.months == y.months && x.millis == y.millis {
                Some(Ordering::Equal)
            } else if x.months == 0 && y.months == 0 {
                Some(x.millis.cmp(&y.millis))
            } else if x.millis == 0 && y.millis == 0 {
                Some(x.months.cmp(&y.months))
            } else {
                None
            }
        }
        (AtomicValue::QName(x), AtomicValue::QName(y)) => match op {
            BinOp::ValueEq => return Ok(x == y),
            BinOp::ValueNe => return Ok(x != y),
            _ => {
                return Err(XPathError::no_span(
                    ErrorCode::XPTY0004,
                    "xs:QName supports only eq/ne comparison, not an ordering",
                ))
            }
        },
        _ => {
            return Err(XPathError::no_span(
                ErrorCode::XPTY0004,
                format!("cannot compare {} with {}", a.type_tag().name(), b.type_tag().name()),
            ))
        }
    };

    let ordering = ordering.ok_or_else(|| {
        XPathError::no_span(ErrorCode::FORG0001, "operand values are not comparable under this ordering")
    })?;

    Ok(match op {
        BinOp::ValueEq => ordering == Ordering::Equal,
        BinOp::ValueNe => ordering != Ordering::Equal,
        BinOp::ValueLt => ordering == Ordering::Less,
        BinOp::ValueLe => ordering != Ordering::Greater,
        BinOp::ValueGt => ordering == Ordering::Greater,
        BinOp::ValueGe => ordering != Ordering::Less,
        _ => unreachable!(),
    })
}

/// `<<`/`>>`/`is` on singleton nodes (spec §4.4 "Node comparison").
pub fn node_compare<N: XdmNode>(op: BinOp, a: &N, b: &N) -> bool {
    match op {
        BinOp::Is => a.identical(b),
        BinOp::Precedes => a.document_position() < b.document_position(),
        BinOp::Follows => a.document_position() > b.document_position(),
        _ => unreachable!("non-node-comparison BinOp passed to node_compare"),
    }
}

/// Wraps a scalar `AtomicValue` result into a one-item sequence — the shape
/// every scalar operator hands back to the evaluator.
pub fn singleton<N: XdmNode>(value: AtomicValue) -> Sequence<N> {
    vec![Item::Atomic(value)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_division_by_zero_is_foar0001() {
        let err = arithmetic(BinOp::Div, &AtomicValue::integer(1), &AtomicValue::integer(0)).unwrap_err();
        assert_eq!(err.code, ErrorCode::FOAR0001);
    }

    #[test]
    fn double_division_by_zero_is_infinite_not_an_error() {
        let result = arithmetic(BinOp::Div, &AtomicValue::Double(1.0), &AtomicValue::Double(0.0)).unwrap();
        match result {
            AtomicValue::Double(d) => assert!(d.is_infinite() && d.is_sign_positive()),
            other => panic!("expected Double, got {:?}", other),
        }
    }

    #[test]
    fn zero_divided_by_zero_double_is_nan() {
        let result = arithmetic(BinOp::Div, &AtomicValue::Double(0.0), &AtomicValue::Double(0.0)).unwrap();
        match result {
            AtomicValue::Double(d) => assert!(d.is_nan()),
            other => panic!("expected Double, got {:?}", other),
        }
    }

    #[test]
    fn idiv_truncates_toward_zero() {
        let result = arithmetic(BinOp::IDiv, &AtomicValue::integer(7), &AtomicValue::integer(2)).unwrap();
        assert_eq!(result.display_string(), "3");
        let result = arithmetic(BinOp::IDiv, &AtomicValue::integer(-7), &AtomicValue::integer(2)).unwrap();
        assert_eq!(result.display_string(), "-3");
    }

    #[test]
    fn arithmetic_promotes_to_the_higher_rank_operand() {
        // integer + double promotes to double, not integer.
        let result = arithmetic(BinOp::Add, &AtomicValue::integer(1), &AtomicValue::Double(0.5)).unwrap();
        assert!(matches!(result, AtomicValue::Double(d) if d == 1.5));
    }

    #[test]
    fn range_descending_bounds_is_empty() {
        assert_eq!(range(5, 1), Vec::<i64>::new());
        assert_eq!(range(1, 3), vec![1, 2, 3]);
    }

    #[test]
    fn untyped_atomic_is_coerced_against_a_typed_operand_for_general_comparison() {
        let lhs = vec![AtomicValue::UntypedAtomic("3".to_string())];
        let rhs = vec![AtomicValue::integer(3)];
        assert!(general_compare(BinOp::GeneralEq, &lhs, &rhs, false).unwrap());
    }

    #[test]
    fn general_comparison_is_existential_over_the_cartesian_product() {
        let lhs = vec![AtomicValue::integer(1), AtomicValue::integer(2)];
        let rhs = vec![AtomicValue::integer(2), AtomicValue::integer(3)];
        assert!(general_compare(BinOp::GeneralEq, &lhs, &rhs, false).unwrap());
        assert!(!general_compare(BinOp::GeneralEq, &lhs, &[AtomicValue::integer(9)], false).unwrap());
    }

    #[test]
    fn qname_supports_eq_ne_but_not_ordering() {
        use crate::value::types::QName;
        let a = AtomicValue::QName(QName::no_namespace("foo"));
        let b = AtomicValue::QName(QName::no_namespace("bar"));
        assert!(value_compare_one(BinOp::ValueNe, &a, &b).unwrap());
        assert!(value_compare_one(BinOp::ValueLt, &a, &b).is_err());
    }

    #[test]
    fn duration_addition_combines_both_components() {
        use crate::value::atomic::XDuration;
        let a = AtomicValue::Duration(XDuration { months: 1, millis: 1000 });
        let b = AtomicValue::Duration(XDuration { months: 2, millis: 2000 });
        let result = arithmetic(BinOp::Add, &a, &b).unwrap();
        match result {
            AtomicValue::Duration(d) => {
                assert_eq!(d.months, 3);
                assert_eq!(d.millis, 3000);
            }
            other => panic!("expected Duration, got {:?}", other),
        }
    }
}
