//! `xs:duration` lexical parsing and arithmetic helpers (spec §4.6a date/
//! time arithmetic, boundary scenario §8.4).

use crate::error::{ErrorCode, XPathError, XResult};
use crate::value::atomic::{AtomicValue, XDuration};

/// Parses an XSD duration lexical form: `[-]P[nY][nM][nD][T[nH][nM][nS]]`.
pub fn parse_duration(text: &str) -> XResult<AtomicValue> {
    let mut rest = text;
    let negative = if let Some(stripped) = rest.strip_prefix('-') {
        rest = stripped;
        true
    } else {
        false
    };

    let rest = rest.strip_prefix('P').ok_or_else(|| malformed(text))?;
    let (date_part, time_part) = match rest.split_once('T') {
        Some((d, t)) => (d, Some(t)),
        None => (rest, None),
    };

    let mut months: i64 = 0;
    let mut millis: i64 = 0;

    let mut remaining = date_part;
    if let Some((value, tail)) = take_component(remaining, 'Y') {
        months += value * 12;
        remaining = tail;
    }
    if let Some((value, tail)) = take_component(remaining, 'M') {
        months += value;
        remaining = tail;
    }
    if let Some((value, tail)) = take_component(remaining, 'D') {
        millis += value * 86_400_000;
        remaining = tail;
    }
    if !remaining.is_empty() {
        return Err(malformed(text));
    }

    if let Some(time_part) = time_part {
        let mut remaining = time_part;
        if let Some((value, tail)) = take_component(remaining, 'H') {
            millis += value * 3_600_000;
            remaining = tail;
        }
        if let Some((value, tail)) = take_component(remaining, 'M') {
            millis += value * 60_000;
            remaining = tail;
        }
        if let Some(idx) = remaining.find('S') {
            let seconds: f64 = remaining[..idx].parse().map_err(|_| malformed(text))?;
            millis += (seconds * 1000.0).round() as i64;
            remaining = &remaining[idx + 1..];
        }
        if !remaining.is_empty() {
            return Err(malformed(text));
        }
    }

    if negative {
        months = -months;
        millis = -millis;
    }

    Ok(AtomicValue::Duration(XDuration { months, millis }))
}

fn take_component(text: &str, marker: char) -> Option<(i64, &str)> {
    let idx = text.find(marker)?;
    let value: i64 = text[..idx].parse().ok()?;
    Some((value, &text[idx + 1..]))
}

fn malformed(text: &str) -> XPathError {
    XPathError::no_span(ErrorCode::FOCA0002, format!("malformed xs:duration lexical form {:?}", text))
}
