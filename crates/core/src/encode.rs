//! Lowering runtime values into the canonical tree.
//!
//! Encoding is recursive. Elements of containers and attributes of objects
//! that cannot be encoded are skipped: each skip is logged with
//! `tracing::warn!` and returned as a [`Diagnostic`] next to the result.
//! Cycles are detected by object identity along the current path.

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use rust_decimal::Decimal;
use tracing::warn;

use crate::canonical::Canonical;
use crate::error::EncodeError;
use crate::formats;
use crate::mapping::Mapping;
use crate::tags::{
    CollectionKind, DatetimeKind, Family, NumericKind, EXCEPTION_TYPE_KEY, EXCEPTION_VALUE_KEY,
    UNIT_TAG,
};
use crate::value::{Object, ObjectKind, ObjectRef, Value};

/// A skipped element.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Accessor path from the root to the skipped element, e.g. `["items"][2]`.
    pub location: String,
    pub error: EncodeError,
}

impl Diagnostic {
    pub fn is_recursive(&self) -> bool {
        matches!(self.error, EncodeError::Recursive { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = if self.location.is_empty() {
            "<root>"
        } else {
            &self.location
        };
        write!(f, "skipped {}: {}", location, self.error)
    }
}

/// A canonical value plus the diagnostics produced while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct Encoded {
    pub value: Canonical,
    pub diagnostics: Vec<Diagnostic>,
}

/// Encode a value.
///
/// Fails only when the top-level value itself has no encoding; anything
/// deeper is skipped and reported in [`Encoded::diagnostics`].
pub fn encode(value: &Value) -> Result<Encoded, EncodeError> {
    let mut encoder = Encoder::default();
    let value = encoder.encode(value)?;
    Ok(Encoded {
        value,
        diagnostics: encoder.diagnostics,
    })
}

#[derive(Default)]
struct Encoder {
    /// Objects currently being encoded on the path from the root.
    visiting: HashSet<*const Object>,
    location: Vec<String>,
    diagnostics: Vec<Diagnostic>,
}

impl Encoder {
    fn encode(&mut self, value: &Value) -> Result<Canonical, EncodeError> {
        let encoded = match value {
            Value::Null => Canonical::Null,
            Value::Bool(b) => Canonical::Bool(*b),
            Value::Int(i) => Canonical::Int(*i),
            Value::Float(x) => Canonical::Float(*x),
            Value::Str(s) => Canonical::Str(s.clone()),
            Value::Map(map) => Canonical::Map(self.encode_entries(map.iter())),
            Value::Error(error) => {
                let mut map = Mapping::with_capacity(2);
                map.insert(EXCEPTION_TYPE_KEY, Canonical::Str(error.type_name.clone()));
                map.insert(EXCEPTION_VALUE_KEY, Canonical::Str(error.message.clone()));
                Canonical::Map(map)
            }
            Value::List(items) => Canonical::List(self.encode_items(items.iter())),
            Value::Array(array) => return self.encode(&array.to_nested()),
            Value::Table(table) => return self.encode(&table.to_mapping()),
            Value::Object(object) => return self.encode_object(object),
            Value::Set(set) => Family::Collection.wrap(
                CollectionKind::Set.name(),
                Canonical::List(self.encode_items(set.iter())),
            ),
            Value::Tuple(items) => Family::Collection.wrap(
                CollectionKind::Tuple.name(),
                Canonical::List(self.encode_items(items.iter())),
            ),
            Value::Bytes(bytes) => Family::Collection.wrap(
                CollectionKind::Bytes.name(),
                Canonical::List(bytes.iter().map(|b| Canonical::Int(i64::from(*b))).collect()),
            ),
            Value::Complex(c) => Family::Numeric.wrap(
                NumericKind::Complex.name(),
                Canonical::List(vec![Canonical::Float(c.re), Canonical::Float(c.im)]),
            ),
            Value::Decimal(d) => {
                Family::Numeric.wrap(NumericKind::Decimal.name(), decimal_payload(d))
            }
            Value::Date(d) => datetime(
                DatetimeKind::Date,
                formats::format_date(*d).map_err(|e| format_error("date", e))?,
            ),
            Value::Time(t) => datetime(
                DatetimeKind::Time,
                formats::format_time(*t).map_err(|e| format_error("time", e))?,
            ),
            Value::DateTime(dt) => datetime(
                DatetimeKind::DatetimeWithoutTimezone,
                formats::format_datetime(*dt).map_err(|e| format_error("datetime", e))?,
            ),
            Value::DateTimeTz(dt) => datetime(
                DatetimeKind::DatetimeWithTimezone,
                formats::format_datetime_tz(*dt).map_err(|e| format_error("datetime", e))?,
            ),
            Value::Duration(d) => Family::Datetime.wrap(
                DatetimeKind::Timedelta.name(),
                Canonical::Float(formats::duration_to_seconds(*d)),
            ),
            Value::Path(path) => Family::Path.wrap(
                path.kind.name(),
                Canonical::List(path.parts.iter().cloned().map(Canonical::Str).collect()),
            ),
            Value::Unit(unit) => Family::Unit.wrap(UNIT_TAG, Canonical::Str(unit.clone())),
        };
        Ok(encoded)
    }

    fn encode_items<'a>(&mut self, items: impl Iterator<Item = &'a Value>) -> Vec<Canonical> {
        let mut out = Vec::new();
        for (index, item) in items.enumerate() {
            self.location.push(format!("[{}]", index));
            match self.encode(item) {
                Ok(encoded) => out.push(encoded),
                Err(error) => self.skip(error),
            }
            self.location.pop();
        }
        out
    }

    fn encode_entries<'a>(
        &mut self,
        entries: impl Iterator<Item = (&'a str, &'a Value)>,
    ) -> Mapping<Canonical> {
        let mut out = Mapping::new();
        for (key, value) in entries {
            self.location.push(format!("[{:?}]", key));
            match self.encode(value) {
                Ok(encoded) => {
                    out.insert(key, encoded);
                }
                Err(error) => self.skip(error),
            }
            self.location.pop();
        }
        out
    }

    fn encode_object(&mut self, object: &ObjectRef) -> Result<Canonical, EncodeError> {
        let id = Rc::as_ptr(object);
        if !self.visiting.insert(id) {
            return Err(EncodeError::Recursive {
                type_name: object.type_name().to_string(),
            });
        }
        let result = self.encode_object_state(object);
        self.visiting.remove(&id);
        result
    }

    fn encode_object_state(&mut self, object: &Object) -> Result<Canonical, EncodeError> {
        if object.is_instance() {
            if let Some(hook) = object.custom_hook() {
                return Ok(hook.snapshot_encode());
            }
        }
        if let Some(hook) = object.skip_hook() {
            return Ok(hook.skip_placeholder());
        }
        if !object.is_instance() {
            let value = match object.kind() {
                ObjectKind::Type => format!("<class '{}'>", object.type_name()),
                _ => format!("<function {}>", object.type_name()),
            };
            return Err(EncodeError::Unsupported {
                type_name: object.type_name().to_string(),
                value,
            });
        }
        let state = object.state();
        Ok(Canonical::Map(self.encode_entries(state.iter())))
    }

    fn skip(&mut self, error: EncodeError) {
        let location = self.location.concat();
        warn!(location = %location, %error, "skipping unencodable value");
        self.diagnostics.push(Diagnostic { location, error });
    }
}

fn datetime(kind: DatetimeKind, text: String) -> Canonical {
    Family::Datetime.wrap(kind.name(), Canonical::Str(text))
}

fn format_error(kind: &'static str, error: time::error::Format) -> EncodeError {
    EncodeError::Format {
        kind,
        message: error.to_string(),
    }
}

/// `[sign, [digits...], exponent]`, sign 1 for negative values.
fn decimal_payload(value: &Decimal) -> Canonical {
    let sign = i64::from(value.is_sign_negative());
    let digits = value
        .mantissa()
        .unsigned_abs()
        .to_string()
        .bytes()
        .map(|b| Canonical::Int(i64::from(b - b'0')))
        .collect();
    let exponent = -i64::from(value.scale());
    Canonical::List(vec![
        Canonical::Int(sign),
        Canonical::List(digits),
        Canonical::Int(exponent),
    ])
}
