//! The promotion lattice and cast dispatch table (spec §3, §9: "represent
//! as static metadata... Subtype-of is precomputed; atomic-cast dispatches
//! on (from,to) pairs. Do NOT simulate inheritance; use a pair table plus a
//! conformance matrix.").

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime};

use crate::error::{ErrorCode, XPathError, XResult};
use crate::value::atomic::AtomicValue;
use crate::value::types::{AtomicTypeTag, QName};

/// Numeric-subtype widths used to range-check integer casts (spec §3
/// integer subranges).
fn integer_bounds(tag: AtomicTypeTag) -> Option<(i64, i64)> {
    use AtomicTypeTag::*;
    Some(match tag {
        Byte => (-128, 127),
        Short => (-32768, 32767),
        Int => (i32::MIN as i64, i32::MAX as i64),
        Long | Integer => (i64::MIN, i64::MAX),
        NonNegativeInteger | UnsignedLong => (0, i64::MAX),
        PositiveInteger => (1, i64::MAX),
        NonPositiveInteger => (i64::MIN, 0),
        NegativeInteger => (i64::MIN, -1),
        UnsignedInt => (0, u32::MAX as i64),
        UnsignedShort => (0, u16::MAX as i64),
        UnsignedByte => (0, u8::MAX as i64),
        _ => return None,
    })
}

/// Is `sub` a subtype of (or equal to) `sup` in the atomic type lattice
/// (spec §3 lattice, used by `instance of` and signature matching)?
pub fn is_subtype(sub: AtomicTypeTag, sup: AtomicTypeTag) -> bool {
    use AtomicTypeTag::*;
    if sub == sup {
        return true;
    }
    match sup {
        Decimal => matches!(sub, Integer | Long | Int | Short | Byte | NonNegativeInteger | PositiveInteger
            | NonPositiveInteger | NegativeInteger | UnsignedLong | UnsignedInt | UnsignedShort | UnsignedByte),
        Integer => matches!(sub, Long | Int | Short | Byte | NonNegativeInteger | PositiveInteger
            | NonPositiveInteger | NegativeInteger | UnsignedLong | UnsignedInt | UnsignedShort | UnsignedByte),
        Long => matches!(sub, Int | Short | Byte | UnsignedInt | UnsignedShort | UnsignedByte),
        Int => matches!(sub, Short | Byte),
        NonNegativeInteger => matches!(sub, PositiveInteger | UnsignedLong | UnsignedInt | UnsignedShort | UnsignedByte),
        UnsignedLong => matches!(sub, UnsignedInt | UnsignedShort | UnsignedByte),
        UnsignedInt => matches!(sub, UnsignedShort | UnsignedByte),
        Duration => matches!(sub, YearMonthDuration | DayTimeDuration),
        String => matches!(sub, NormalizedString | Token | Language | Nmtoken | Name | NCName | Id | IdRef | Entity),
        Token => matches!(sub, Language | Nmtoken | Name | NCName | Id | IdRef | Entity),
        Name => matches!(sub, NCName | Id | IdRef | Entity),
        AnyUri => false,
        _ => false,
    }
}

/// One step of the promotion lattice (spec §3: `integer → decimal → float
/// → double`; `anyURI → string`; `yearMonthDuration/dayTimeDuration →
/// duration`). Returns the promoted value, or the value unchanged if no
/// promotion edge applies from its current type toward `target`.
pub fn promote(value: AtomicValue, target: AtomicTypeTag) -> AtomicValue {
    use AtomicTypeTag::*;
    match (&value, target) {
        (AtomicValue::Integer(i, _), Decimal) => AtomicValue::Decimal(*i as f64),
        (AtomicValue::Integer(i, _), Float) => AtomicValue::Float(*i as f32),
        (AtomicValue::Integer(i, _), Double) => AtomicValue::Double(*i as f64),
        (AtomicValue::Decimal(d), Float) => AtomicValue::Float(*d as f32),
        (AtomicValue::Decimal(d), Double) => AtomicValue::Double(*d),
        (AtomicValue::Float(f), Double) => AtomicValue::Double(*f as f64),
        (AtomicValue::AnyUri(s), String) => AtomicValue::String(s.clone()),
        _ => value,
    }
}

/// `cast as` dispatch (spec §4.6a): converts a single atomic value to the
/// requested type, raising `FOCA0002` on an invalid lexical form or
/// unsupported conversion. String-to-X casts parse the XSD lexical space;
/// numeric/date casts interpret the source value directly.
pub fn cast_atomic(value: &AtomicValue, target: AtomicTypeTag) -> XResult<AtomicValue> {
    use AtomicTypeTag::*;

    let source_text;
    let text: &str = match value {
        AtomicValue::String(s) | AtomicValue::UntypedAtomic(s) | AtomicValue::AnyUri(s) => s.as_str(),
        _ => {
            source_text = value.display_string();
            source_text.as_str()
        }
    };

    let result = match target {
        String | NormalizedString | Token | Language | Nmtoken | Name | NCName | Id | IdRef | Entity => {
            AtomicValue::String(value.display_string())
        }
        AnyUri => AtomicValue::AnyUri(value.display_string()),
        Boolean => match value {
            AtomicValue::Boolean(b) => AtomicValue::Boolean(*b),
            _ => AtomicValue::Boolean(parse_xsd_boolean(text)?),
        },
        Decimal => AtomicValue::Decimal(parse_number(value, text)?),
        Float => AtomicValue::Float(parse_number(value, text)? as f32),
        Double => AtomicValue::Double(parse_number(value, text)?),
        Integer | Long | Int | Short | Byte | NonNegativeInteger | PositiveInteger | NonPositiveInteger
        | NegativeInteger | UnsignedLong | UnsignedInt | UnsignedShort | UnsignedByte => {
            let raw = match value {
                AtomicValue::Integer(i, _) => *i,
                AtomicValue::Decimal(d) | AtomicValue::Double(d) => *d as i64,
                AtomicValue::Float(f) => *f as i64,
                AtomicValue::Boolean(b) => *b as i64,
                _ => text.trim().parse::<i64>().map_err(|_| invalid_cast(text, target))?,
            };
            if let Some((lo, hi)) = integer_bounds(target) {
                if raw < lo || raw > hi {
                    return Err(invalid_cast(text, target));
                }
            }
            AtomicValue::Integer(raw, target)
        }
        Date => AtomicValue::Date(
            NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").map_err(|_| invalid_cast(text, target))?,
        ),
        Time => AtomicValue::Time(
            NaiveTime::parse_from_str(text.trim(), "%H:%M:%S%.f").map_err(|_| invalid_cast(text, target))?,
        ),
        DateTime | DateTimeStamp => AtomicValue::DateTime(
            DateTime::parse_from_rfc3339(text.trim()).map_err(|_| invalid_cast(text, target))?,
        ),
        Duration | YearMonthDuration | DayTimeDuration => {
            crate::value::duration::parse_duration(text.trim()).map_err(|_| invalid_cast(text, target))?
        }
        QName => AtomicValue::QName(parse_qname_literal(text)),
        _ => return Err(invalid_cast(text, target)),
    };

    Ok(result)
}

fn parse_number(value: &AtomicValue, text: &str) -> XResult<f64> {
    match value.as_f64() {
        Some(n) => Ok(n),
        None => f64::from_str(text.trim()).map_err(|_| invalid_cast(text, AtomicTypeTag::Double)),
    }
}

fn parse_xsd_boolean(text: &str) -> XResult<bool> {
    match text.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(invalid_cast(text, AtomicTypeTag::Boolean)),
    }
}

fn parse_qname_literal(text: &str) -> QName {
    match text.split_once(':') {
        Some((_prefix, local)) => QName::no_namespace(local),
        None => QName::no_namespace(text),
    }
}

fn invalid_cast(text: &str, target: AtomicTypeTag) -> XPathError {
    XPathError::no_span(
        ErrorCode::FOCA0002,
        format!("invalid value {:?} for cast to xs:{}", text, target.name()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_is_subtype_of_decimal_and_decimal_is_not_subtype_of_integer() {
        assert!(is_subtype(AtomicTypeTag::Integer, AtomicTypeTag::Decimal));
        assert!(!is_subtype(AtomicTypeTag::Decimal, AtomicTypeTag::Integer));
    }

    #[test]
    fn every_type_is_a_subtype_of_itself() {
        assert!(is_subtype(AtomicTypeTag::String, AtomicTypeTag::String));
    }

    #[test]
    fn byte_out_of_range_is_rejected() {
        let value = AtomicValue::Integer(200, AtomicTypeTag::Integer);
        assert!(cast_atomic(&value, AtomicTypeTag::Byte).is_err());
    }

    #[test]
    fn string_to_integer_round_trip() {
        // spec.md §8: xs:T(string(xs:T(L))) = xs:T(L)
        let parsed = cast_atomic(&AtomicValue::String("42".to_string()), AtomicTypeTag::Integer).unwrap();
        let roundtrip =
            cast_atomic(&AtomicValue::String(parsed.display_string()), AtomicTypeTag::Integer).unwrap();
        assert_eq!(parsed.display_string(), roundtrip.display_string());
    }

    #[test]
    fn invalid_lexical_form_raises_foca0002() {
        let err = cast_atomic(&AtomicValue::String("not-a-number".to_string()), AtomicTypeTag::Integer).unwrap_err();
        assert_eq!(err.code, ErrorCode::FOCA0002);
    }

    #[test]
    fn promote_integer_through_the_numeric_lattice() {
        let i = AtomicValue::Integer(3, AtomicTypeTag::Integer);
        match promote(i.clone(), AtomicTypeTag::Double) {
            AtomicValue::Double(d) => assert_eq!(d, 3.0),
            other => panic!("expected Double, got {:?}", other),
        }
    }

    #[test]
    fn any_uri_promotes_to_string() {
        let uri = AtomicValue::AnyUri("http://example.com".to_string());
        match promote(uri, AtomicTypeTag::String) {
            AtomicValue::String(s) => assert_eq!(s, "http://example.com"),
            other => panic!("expected String, got {:?}", other),
        }
    }
}
