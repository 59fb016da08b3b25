//! Restoring runtime values from the canonical tree.
//!
//! Mappings whose key set is exactly a family's `{type_key, value_key}` are
//! tagged wrappers and decode into the corresponding extended value. Every
//! other mapping is user data and decodes key by key.

use rust_decimal::Decimal;

use crate::canonical::Canonical;
use crate::error::DecodeError;
use crate::formats;
use crate::mapping::Mapping;
use crate::tags::{
    CollectionKind, DatetimeKind, Family, NumericKind, PathKind, Wrapper, UNIT_TAG,
};
use crate::value::{Complex, SnapPath, Value, ValueSet};

/// Decode a canonical tree into a runtime value.
pub fn decode(value: &Canonical) -> Result<Value, DecodeError> {
    match value {
        Canonical::Null => Ok(Value::Null),
        Canonical::Bool(b) => Ok(Value::Bool(*b)),
        Canonical::Int(i) => Ok(Value::Int(*i)),
        Canonical::Float(x) => Ok(Value::Float(*x)),
        Canonical::Str(s) => Ok(Value::Str(s.clone())),
        Canonical::List(items) => decode_items(items).map(Value::List),
        Canonical::Map(map) => match Family::detect(map) {
            Some(wrapper) => decode_wrapper(map, wrapper),
            None => {
                let mut out = Mapping::with_capacity(map.len());
                for (key, item) in map.iter() {
                    out.insert(key, decode(item)?);
                }
                Ok(Value::Map(out))
            }
        },
    }
}

fn decode_items(items: &[Canonical]) -> Result<Vec<Value>, DecodeError> {
    items.iter().map(decode).collect()
}

fn decode_wrapper(map: &Mapping<Canonical>, wrapper: Wrapper<'_>) -> Result<Value, DecodeError> {
    let unknown = || DecodeError::UnknownTag {
        type_key: wrapper.family.type_key(),
        tag: match wrapper.tag {
            Canonical::Str(s) => s.clone(),
            other => other.to_string(),
        },
        mapping: Canonical::Map(map.clone()).to_string(),
    };
    let tag = wrapper.tag.as_str().ok_or_else(unknown)?;
    let payload = wrapper.payload;

    match wrapper.family {
        Family::Numeric => match NumericKind::from_name(tag).ok_or_else(unknown)? {
            NumericKind::Complex => decode_complex(tag, payload),
            NumericKind::Decimal => decode_decimal(tag, payload).map(Value::Decimal),
        },
        Family::Datetime => decode_datetime(
            tag,
            DatetimeKind::from_name(tag).ok_or_else(unknown)?,
            payload,
        ),
        Family::Collection => {
            let kind = CollectionKind::from_name(tag).ok_or_else(unknown)?;
            let items = payload
                .as_list()
                .ok_or_else(|| DecodeError::payload(tag, "expected a list of values"))?;
            match kind {
                CollectionKind::Set => {
                    Ok(Value::Set(decode_items(items)?.into_iter().collect::<ValueSet>()))
                }
                CollectionKind::Tuple => decode_items(items).map(Value::Tuple),
                CollectionKind::Bytes => items
                    .iter()
                    .map(|item| {
                        item.as_i64()
                            .and_then(|b| u8::try_from(b).ok())
                            .ok_or_else(|| {
                                DecodeError::payload(tag, format!("{} is not a byte", item))
                            })
                    })
                    .collect::<Result<Vec<u8>, _>>()
                    .map(Value::Bytes),
            }
        }
        Family::Path => {
            let kind = PathKind::from_name(tag).ok_or_else(unknown)?;
            let parts = payload
                .as_list()
                .ok_or_else(|| DecodeError::payload(tag, "expected a list of path parts"))?
                .iter()
                .map(|part| {
                    part.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| DecodeError::payload(tag, "path parts must be strings"))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Path(SnapPath::new(kind, parts)))
        }
        Family::Unit => {
            if tag != UNIT_TAG {
                return Err(unknown());
            }
            payload
                .as_str()
                .map(|unit| Value::Unit(unit.to_string()))
                .ok_or_else(|| DecodeError::payload(tag, "expected the unit's string form"))
        }
    }
}

fn decode_complex(tag: &str, payload: &Canonical) -> Result<Value, DecodeError> {
    match payload.as_list() {
        Some([re, im]) => match (re.as_f64(), im.as_f64()) {
            (Some(re), Some(im)) => Ok(Value::Complex(Complex::new(re, im))),
            _ => Err(DecodeError::payload(tag, "parts must be numbers")),
        },
        _ => Err(DecodeError::payload(tag, "expected [real, imaginary]")),
    }
}

const MAX_DECIMAL_EXPONENT: i64 = 28;

/// Decode `[sign, [digits...], exponent]`.
fn decode_decimal(tag: &str, payload: &Canonical) -> Result<Decimal, DecodeError> {
    let invalid = |message: &str| DecodeError::payload(tag, message);

    let (sign, digits, exponent) = match payload.as_list() {
        Some([sign, digits, exponent]) => (sign, digits, exponent),
        _ => return Err(invalid("expected [sign, digits, exponent]")),
    };
    let negative = match sign.as_i64() {
        Some(0) => false,
        Some(1) => true,
        _ => return Err(invalid("sign must be 0 or 1")),
    };
    let digits = digits
        .as_list()
        .ok_or_else(|| invalid("digits must be a list"))?;
    let exponent = match exponent {
        Canonical::Int(e) => *e,
        _ => return Err(invalid("exponent must be an integer")),
    };

    let mut mantissa: i128 = 0;
    for digit in digits {
        let digit = digit
            .as_i64()
            .filter(|d| (0..=9).contains(d))
            .ok_or_else(|| invalid("digits must be integers in 0..=9"))?;
        mantissa = mantissa
            .checked_mul(10)
            .and_then(|m| m.checked_add(i128::from(digit)))
            .ok_or_else(|| invalid("too many digits"))?;
    }

    // rust_decimal holds at most 28 fractional digits and values below 1e29.
    let mut value = if mantissa == 0 && exponent > 0 {
        Decimal::ZERO
    } else if exponent > MAX_DECIMAL_EXPONENT {
        return Err(invalid("exponent out of range"));
    } else if exponent <= 0 {
        let scale = u32::try_from(-exponent).map_err(|_| invalid("exponent out of range"))?;
        Decimal::try_from_i128_with_scale(mantissa, scale)
            .map_err(|e| DecodeError::payload(tag, e.to_string()))?
    } else {
        let mut value = Decimal::try_from_i128_with_scale(mantissa, 0)
            .map_err(|e| DecodeError::payload(tag, e.to_string()))?;
        for _ in 0..exponent {
            value = value
                .checked_mul(Decimal::TEN)
                .ok_or_else(|| invalid("exponent out of range"))?;
        }
        value
    };
    value.set_sign_negative(negative);
    Ok(value)
}

fn decode_datetime(
    tag: &str,
    kind: DatetimeKind,
    payload: &Canonical,
) -> Result<Value, DecodeError> {
    let text = || {
        payload
            .as_str()
            .ok_or_else(|| DecodeError::payload(tag, "expected a formatted string"))
    };
    let bad = |text: &str, e: time::error::Parse| {
        DecodeError::payload(tag, format!("{:?}: {}", text, e))
    };
    match kind {
        DatetimeKind::Timedelta => payload
            .as_f64()
            .map(|seconds| Value::Duration(formats::duration_from_seconds(seconds)))
            .ok_or_else(|| DecodeError::payload(tag, "expected total seconds")),
        DatetimeKind::Date => {
            let text = text()?;
            formats::parse_date(text)
                .map(Value::Date)
                .map_err(|e| bad(text, e))
        }
        DatetimeKind::Time => {
            let text = text()?;
            formats::parse_time(text)
                .map(Value::Time)
                .map_err(|e| bad(text, e))
        }
        DatetimeKind::DatetimeWithoutTimezone => {
            let text = text()?;
            formats::parse_datetime(text)
                .map(Value::DateTime)
                .map_err(|e| bad(text, e))
        }
        DatetimeKind::DatetimeWithTimezone => {
            let text = text()?;
            formats::parse_datetime_tz(text)
                .map(Value::DateTimeTz)
                .map_err(|e| bad(text, e))
        }
    }
}
