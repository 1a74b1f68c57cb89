//! Atomic values (spec §3). `xs:decimal` is represented as `f64` and
//! integers as `i64`, grounded on the reference XPath engine's
//! `XdmAtomicValue` (see DESIGN.md) rather than pulling in an
//! arbitrary-precision decimal crate nothing else in the corpus uses.
//! Date/time values use `chrono`.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};

use crate::value::types::{AtomicTypeTag, QName};

/// A `duration`/`yearMonthDuration`/`dayTimeDuration` value, stored as its
/// two independent XSD components: whole months and milliseconds. `sign`
/// applies to both components together (XSD durations have one sign).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XDuration {
    pub months: i64,
    pub millis: i64,
}

impl XDuration {
    pub fn year_month(months: i64) -> XDuration {
        XDuration { months, millis: 0 }
    }

    pub fn day_time(millis: i64) -> XDuration {
        XDuration { months: 0, millis }
    }

    pub fn is_year_month(&self) -> bool {
        self.millis == 0
    }

    pub fn is_day_time(&self) -> bool {
        self.months == 0
    }
}

impl fmt::Display for XDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.months == 0 && self.millis == 0 {
            return write!(f, "PT0S");
        }
        let sign = if self.months < 0 || self.millis < 0 { "-" } else { "" };
        write!(f, "{}P", sign)?;
        let years = self.months.abs() / 12;
        let months = self.months.abs() % 12;
        if years > 0 {
            write!(f, "{}Y", years)?;
        }
        if months > 0 {
            write!(f, "{}M", months)?;
        }
        let total_seconds = self.millis.abs() / 1000;
        let days = total_seconds / 86400;
        let hours = (total_seconds % 86400) / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;
        let millis = self.millis.abs() % 1000;
        if days > 0 {
            write!(f, "{}D", days)?;
        }
        if hours > 0 || minutes > 0 || seconds > 0 || millis > 0 {
            write!(f, "T")?;
            if hours > 0 {
                write!(f, "{}H", hours)?;
            }
            if minutes > 0 {
                write!(f, "{}M", minutes)?;
            }
            if seconds > 0 || millis > 0 {
                if millis > 0 {
                    write!(f, "{}.{:03}S", seconds, millis)?;
                } else {
                    write!(f, "{}S", seconds)?;
                }
            }
        }
        Ok(())
    }
}

/// One atomic value, tagged by its precise XSD type (spec §3: "each atomic
/// value carries its type label; type-preserving operations retain the
/// narrowest applicable type").
#[derive(Debug, Clone)]
pub enum AtomicValue {
    UntypedAtomic(String),
    String(String),
    Boolean(bool),
    Decimal(f64),
    /// Carries its precise subtype tag (`xs:integer`, `xs:long`, `xs:int`,
    /// ... or one of the unsigned/non-negative variants) so casts and
    /// `instance of` narrow correctly.
    Integer(i64, AtomicTypeTag),
    Float(f32),
    Double(f64),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(DateTime<FixedOffset>),
    Duration(XDuration),
    AnyUri(String),
    QName(QName),
}

impl AtomicValue {
    pub fn integer(value: i64) -> AtomicValue {
        AtomicValue::Integer(value, AtomicTypeTag::Integer)
    }

    pub fn type_tag(&self) -> AtomicTypeTag {
        match self {
            AtomicValue::UntypedAtomic(_) => AtomicTypeTag::UntypedAtomic,
            AtomicValue::String(_) => AtomicTypeTag::String,
            AtomicValue::Boolean(_) => AtomicTypeTag::Boolean,
            AtomicValue::Decimal(_) => AtomicTypeTag::Decimal,
            AtomicValue::Integer(_, tag) => *tag,
            AtomicValue::Float(_) => AtomicTypeTag::Float,
            AtomicValue::Double(_) => AtomicTypeTag::Double,
            AtomicValue::Date(_) => AtomicTypeTag::Date,
            AtomicValue::Time(_) => AtomicTypeTag::Time,
            AtomicValue::DateTime(_) => AtomicTypeTag::DateTime,
            AtomicValue::Duration(d) => {
                if d.is_year_month() {
                    AtomicTypeTag::YearMonthDuration
                } else if d.is_day_time() {
                    AtomicTypeTag::DayTimeDuration
                } else {
                    AtomicTypeTag::Duration
                }
            }
            AtomicValue::AnyUri(_) => AtomicTypeTag::AnyUri,
            AtomicValue::QName(_) => AtomicTypeTag::QName,
        }
    }

    /// The value's string representation (`fn:string($v)` on an atomic
    /// argument; also used for concatenation and display).
    pub fn display_string(&self) -> String {
        match self {
            AtomicValue::UntypedAtomic(s) | AtomicValue::String(s) | AtomicValue::AnyUri(s) => s.clone(),
            AtomicValue::Boolean(b) => b.to_string(),
            AtomicValue::Decimal(d) => format_decimal(*d),
            AtomicValue::Integer(i, _) => i.to_string(),
            AtomicValue::Float(f) => format_double(*f as f64),
            AtomicValue::Double(d) => format_double(*d),
            AtomicValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            AtomicValue::Time(t) => t.format("%H:%M:%S%.f").to_string(),
            AtomicValue::DateTime(dt) => dt.to_rfc3339(),
            AtomicValue::Duration(d) => d.to_string(),
            AtomicValue::QName(q) => q.to_string(),
        }
    }

    /// Numeric coercion used by arithmetic and `fn:number`-like contexts;
    /// `None` for non-numeric-castable values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AtomicValue::Decimal(d) => Some(*d),
            AtomicValue::Integer(i, _) => Some(*i as f64),
            AtomicValue::Float(f) => Some(*f as f64),
            AtomicValue::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Effective boolean value of a single atomic item (spec §4.3): a
    /// boolean is itself; a non-empty string is true; a non-zero,
    /// non-NaN numeric is true.
    pub fn effective_boolean_value(&self) -> bool {
        match self {
            AtomicValue::Boolean(b) => *b,
            AtomicValue::String(s) | AtomicValue::UntypedAtomic(s) | AtomicValue::AnyUri(s) => !s.is_empty(),
            AtomicValue::Decimal(d) => *d != 0.0,
            AtomicValue::Integer(i, _) => *i != 0,
            AtomicValue::Float(f) => *f != 0.0 && !f.is_nan(),
            AtomicValue::Double(d) => *d != 0.0 && !d.is_nan(),
            _ => true,
        }
    }
}

/// Formats an `xs:decimal` without scientific notation and without a
/// trailing `.0` for whole values, per XSD canonical lexical form.
pub fn format_decimal(value: f64) -> String {
    if value == value.trunc() && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let s = format!("{}", value);
        s
    }
}

/// Formats an `xs:double`/`xs:float`, using `INF`/`-INF`/`NaN` for the
/// special values (spec §4.4).
pub fn format_double(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "INF".to_string() } else { "-INF".to_string() }
    } else {
        format!("{}", value)
    }
}
