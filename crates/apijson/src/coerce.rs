//! Scalar coercion between scanned JSON nodes and native values.

use std::collections::BTreeMap;

use serde_json::{Map, Number, Value};
use time::format_description::well_known::Rfc3339;
use time::{Date, Month, OffsetDateTime};

use crate::encode::Encoded;
use crate::error::{DecodeError, DecodeErrorKind, EncodeErrorKind};
use crate::scan::{Node, NodeValue};
use crate::tag::Format;

/// Reads an integer from a number literal, a base-10 string or a boolean.
///
/// Number literals are evaluated from their digits, fraction and exponent
/// included, so no precision is lost to an intermediate `f64`. A remaining
/// fractional part is truncated toward zero.
pub fn to_integer(node: &Node<'_>, target: &'static str) -> Result<i128, DecodeError> {
    match node.value() {
        NodeValue::Number(literal) => integer_literal(literal, target),
        NodeValue::String(text) => text.parse::<i128>().map_err(|_| {
            DecodeErrorKind::InvalidLiteral {
                target,
                literal: text.to_string(),
            }
            .into()
        }),
        NodeValue::Bool(b) => Ok(i128::from(*b)),
        _ => Err(DecodeError::mismatch(target, node)),
    }
}

/// Expects a literal already accepted by the scanner's number grammar.
fn integer_literal(literal: &str, target: &'static str) -> Result<i128, DecodeError> {
    let out_of_range = || -> DecodeError {
        DecodeErrorKind::OutOfRange {
            target,
            literal: literal.to_owned(),
        }
        .into()
    };
    let (negative, unsigned) = match literal.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, literal),
    };
    let (mantissa, exponent) = match unsigned.split_once(&['e', 'E'][..]) {
        Some((mantissa, exponent)) => {
            let exponent = exponent.parse::<i64>().map_err(|_| out_of_range())?;
            (mantissa, exponent)
        }
        None => (unsigned, 0),
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    // Digits of whole and fraction form one integer scaled by 10^scale.
    let scale = exponent.saturating_sub(fraction.len() as i64);
    let dropped = usize::try_from(scale.unsigned_abs()).unwrap_or(usize::MAX);
    let kept = if scale < 0 {
        (whole.len() + fraction.len()).saturating_sub(dropped)
    } else {
        whole.len() + fraction.len()
    };

    let mut value: i128 = 0;
    for digit in whole.bytes().chain(fraction.bytes()).take(kept) {
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(i128::from(digit - b'0')))
            .ok_or_else(out_of_range)?;
    }
    if scale > 0 && value != 0 {
        let factor = u32::try_from(scale)
            .ok()
            .and_then(|s| 10_i128.checked_pow(s))
            .ok_or_else(out_of_range)?;
        value = value.checked_mul(factor).ok_or_else(out_of_range)?;
    }
    Ok(if negative { -value } else { value })
}

/// Narrows an integer read by [`to_integer`] into the destination width.
pub fn narrow<T: TryFrom<i128>>(
    wide: i128,
    node: &Node<'_>,
    target: &'static str,
) -> Result<T, DecodeError> {
    T::try_from(wide).map_err(|_| {
        DecodeErrorKind::OutOfRange {
            target,
            literal: node.raw().to_owned(),
        }
        .into()
    })
}

/// Returns the literal text of a number node; the caller parses it at the
/// width it needs.
pub fn number_literal<'n>(node: &'n Node<'_>, target: &'static str) -> Result<&'n str, DecodeError> {
    match node.value() {
        NodeValue::Number(literal) => Ok(literal),
        _ => Err(DecodeError::mismatch(target, node)),
    }
}

pub fn to_bool(node: &Node<'_>) -> Result<bool, DecodeError> {
    match node.value() {
        NodeValue::Bool(b) => Ok(*b),
        _ => Err(DecodeError::mismatch("boolean", node)),
    }
}

/// Strings are taken as-is; numbers keep their literal text.
pub fn to_string(node: &Node<'_>) -> Result<String, DecodeError> {
    match node.value() {
        NodeValue::String(text) => Ok(text.to_string()),
        NodeValue::Number(literal) => Ok((*literal).to_owned()),
        _ => Err(DecodeError::mismatch("string", node)),
    }
}

/// Materialises an open value the way a generic JSON decode would: every
/// number becomes a float and objects are key-ordered.
pub fn to_open(node: &Node<'_>) -> Result<Value, DecodeError> {
    Ok(match node.value() {
        NodeValue::Null => Value::Null,
        NodeValue::Bool(b) => Value::Bool(*b),
        NodeValue::Number(literal) => {
            let invalid = || DecodeErrorKind::InvalidLiteral {
                target: "number",
                literal: (*literal).to_owned(),
            };
            let float: f64 = literal.parse().map_err(|_| invalid())?;
            Value::Number(Number::from_f64(float).ok_or_else(invalid)?)
        }
        NodeValue::String(text) => Value::String(text.to_string()),
        NodeValue::Array(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| to_open(item).map_err(|e| e.at_index(i)))
                .collect::<Result<_, _>>()?,
        ),
        NodeValue::Object(members) => {
            let mut map = Map::new();
            for (key, value) in members {
                map.insert(key.to_string(), to_open(value).map_err(|e| e.at_key(key))?);
            }
            Value::Object(map)
        }
    })
}

/// Encodes an open value. Returns `None` for `null` so record fields holding
/// it are left out.
pub fn from_open(value: &Value) -> Result<Option<Encoded>, EncodeErrorKind> {
    Ok(Some(match value {
        Value::Null => return Ok(None),
        Value::Bool(b) => Encoded::Text(b.to_string()),
        Value::Number(n) => Encoded::Text(number_text(n)?),
        Value::String(s) => Encoded::string(s),
        Value::Array(items) => Encoded::Array(
            items
                .iter()
                .map(|item| Ok(from_open(item)?.unwrap_or_else(Encoded::null)))
                .collect::<Result<_, EncodeErrorKind>>()?,
        ),
        Value::Object(members) => {
            let mut out = BTreeMap::new();
            for (key, item) in members {
                out.insert(key.clone(), from_open(item)?.unwrap_or_else(Encoded::null));
            }
            Encoded::Object(out)
        }
    }))
}

fn number_text(n: &Number) -> Result<String, EncodeErrorKind> {
    if let Some(i) = n.as_i64() {
        return Ok(i.to_string());
    }
    if let Some(u) = n.as_u64() {
        return Ok(u.to_string());
    }
    match n.as_f64() {
        Some(f) => float_text(f),
        None => Ok(n.to_string()),
    }
}

/// Shortest round-trip text of a float; `12.0` is written as `12`.
pub fn float_text<F: Into<f64> + std::fmt::Display + Copy>(value: F) -> Result<String, EncodeErrorKind> {
    if value.into().is_finite() {
        Ok(value.to_string())
    } else {
        Err(EncodeErrorKind::NonFinite(value.to_string()))
    }
}

/// Parses a timestamp. The hinted form is tried first and the other form is
/// accepted as a fallback.
pub fn to_time(node: &Node<'_>, format: Format) -> Result<OffsetDateTime, DecodeError> {
    let Some(text) = node.as_str() else {
        return Err(DecodeError::mismatch("string", node));
    };
    let parsed = match format {
        Format::Date => parse_date(text).or_else(|| parse_date_time(text)),
        Format::DateTime | Format::None => parse_date_time(text).or_else(|| parse_date(text)),
    };
    parsed.ok_or_else(|| {
        DecodeErrorKind::InvalidTime {
            format: format.name(),
            text: text.to_owned(),
        }
        .into()
    })
}

pub fn from_time(value: &OffsetDateTime, format: Format) -> Result<Encoded, EncodeErrorKind> {
    match format {
        Format::Date => {
            let date = value.date();
            Ok(Encoded::string(&format!(
                "{:04}-{:02}-{:02}",
                date.year(),
                u8::from(date.month()),
                date.day()
            )))
        }
        Format::DateTime | Format::None => value
            .format(&Rfc3339)
            .map(|text| Encoded::string(&text))
            .map_err(|e| EncodeErrorKind::Time(e.to_string())),
    }
}

/// `YYYY-MM-DD` at midnight UTC.
fn parse_date(text: &str) -> Option<OffsetDateTime> {
    let bytes = text.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    let year: i32 = text.get(0..4)?.parse().ok()?;
    let month: u8 = text.get(5..7)?.parse().ok()?;
    let day: u8 = text.get(8..10)?.parse().ok()?;
    let date = Date::from_calendar_date(year, Month::try_from(month).ok()?, day).ok()?;
    Some(date.midnight().assume_utc())
}

/// RFC 3339 with the tolerances seen from real APIs: a space instead of `T`,
/// no zone designator (UTC), and offsets written without a colon.
fn parse_date_time(text: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(&normalize_date_time(text)?, &Rfc3339).ok()
}

fn normalize_date_time(text: &str) -> Option<String> {
    if text.len() < 19 || !text.is_char_boundary(10) {
        return None;
    }
    let (date, rest) = text.split_at(10);
    let rest = rest.strip_prefix(&['T', 't', ' '][..])?;
    let mut out = String::with_capacity(text.len() + 2);
    out.push_str(date);
    out.push('T');
    match rest.find(&['Z', 'z', '+', '-'][..]) {
        None => {
            out.push_str(rest);
            out.push('Z');
        }
        Some(at) => {
            let (clock, zone) = rest.split_at(at);
            out.push_str(clock);
            if zone.eq_ignore_ascii_case("z") {
                out.push('Z');
            } else if zone.len() == 5 && zone.bytes().skip(1).all(|b| b.is_ascii_digit()) {
                out.push_str(&zone[..3]);
                out.push(':');
                out.push_str(&zone[3..]);
            } else {
                out.push_str(zone);
            }
        }
    }
    Some(out)
}
