//! JSON rendering of canonical trees.
//!
//! Non-finite floats are written as the bare `NaN`, `Infinity` and
//! `-Infinity` tokens that Python's `json` module emits:
//!
//! ```json
//! {"ratio": NaN, "bounds": [-Infinity, Infinity]}
//! ```
//!
//! `serde_json` has no literal for them. On write they go through
//! [`Formatter::write_byte_array`], which the canonical tree never uses
//! otherwise. On read each token is blanked to `null` before parsing and
//! restored by its position among the `null` literals of the document.

use std::borrow::Cow;
use std::cell::Cell;
use std::fmt;
use std::io;

use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::{Serialize, Serializer};
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};
use serde_json::{Map, Number, Value as Json};

use crate::canonical::Canonical;
use crate::mapping::Mapping;

const NON_FINITE: [(&str, f64); 3] = [
    ("-Infinity", f64::NEG_INFINITY),
    ("Infinity", f64::INFINITY),
    ("NaN", f64::NAN),
];

fn non_finite_token(x: f64) -> &'static str {
    if x.is_nan() {
        "NaN"
    } else if x > 0.0 {
        "Infinity"
    } else {
        "-Infinity"
    }
}

/// Convert to a `serde_json` value. Non-finite floats have no
/// representation there and become `null`.
pub fn to_json(value: &Canonical) -> Json {
    match value {
        Canonical::Null => Json::Null,
        Canonical::Bool(b) => Json::Bool(*b),
        Canonical::Int(i) => Json::Number((*i).into()),
        Canonical::Float(x) => Number::from_f64(*x).map_or(Json::Null, Json::Number),
        Canonical::Str(s) => Json::String(s.clone()),
        Canonical::List(items) => Json::Array(items.iter().map(to_json).collect()),
        Canonical::Map(map) => Json::Object(
            map.iter()
                .map(|(k, v)| (k.to_string(), to_json(v)))
                .collect::<Map<String, Json>>(),
        ),
    }
}

pub fn from_json(json: &Json) -> Canonical {
    match json {
        Json::Null => Canonical::Null,
        Json::Bool(b) => Canonical::Bool(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Canonical::Int(i),
            // Unsigned values past i64::MAX degrade to floats.
            None => Canonical::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(s) => Canonical::Str(s.clone()),
        Json::Array(items) => Canonical::List(items.iter().map(from_json).collect()),
        Json::Object(map) => {
            let mut out = Mapping::with_capacity(map.len());
            for (key, item) in map {
                out.insert(key.as_str(), from_json(item));
            }
            Canonical::Map(out)
        }
    }
}

// ──────────────────────────────────────────────
// Writing
// ──────────────────────────────────────────────

struct Wire<'a>(&'a Canonical);

impl Serialize for Wire<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Canonical::Null => serializer.serialize_unit(),
            Canonical::Bool(b) => serializer.serialize_bool(*b),
            Canonical::Int(i) => serializer.serialize_i64(*i),
            Canonical::Float(x) if x.is_finite() => serializer.serialize_f64(*x),
            Canonical::Float(x) => serializer.serialize_bytes(non_finite_token(*x).as_bytes()),
            Canonical::Str(s) => serializer.serialize_str(s),
            Canonical::List(items) => serializer.collect_seq(items.iter().map(Wire)),
            Canonical::Map(map) => serializer.collect_map(map.iter().map(|(k, v)| (k, Wire(v)))),
        }
    }
}

/// Delegates layout to `F` and writes byte arrays verbatim.
struct WireFormatter<F>(F);

impl<F: Formatter> Formatter for WireFormatter<F> {
    fn write_byte_array<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: &[u8]) -> io::Result<()> {
        writer.write_all(value)
    }

    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.0.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.0.begin_object_key(writer, first)
    }

    fn end_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object_key(writer)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object_value(writer)
    }
}

fn write_with<F: Formatter>(value: &Canonical, formatter: F) -> Result<String, serde_json::Error> {
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, WireFormatter(formatter));
    Wire(value).serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Pretty-print with `indent` spaces per level.
pub fn to_string_indented(value: &Canonical, indent: usize) -> Result<String, serde_json::Error> {
    let indent = " ".repeat(indent);
    write_with(value, PrettyFormatter::with_indent(indent.as_bytes()))
}

/// Single-line rendering.
pub fn to_string(value: &Canonical) -> Result<String, serde_json::Error> {
    write_with(value, CompactFormatter)
}

// ──────────────────────────────────────────────
// Reading
// ──────────────────────────────────────────────

/// Replace every bare non-finite token outside strings with `null`.
///
/// Returns the rewritten text and, in document order, the ordinal of each
/// replaced `null` among all `null` literals together with its float.
fn blank_non_finite(text: &str) -> (Cow<'_, str>, Vec<(usize, f64)>) {
    if !text.contains("NaN") && !text.contains("Infinity") {
        return (Cow::Borrowed(text), Vec::new());
    }
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut replaced = Vec::new();
    let mut nulls = 0;
    let mut in_string = false;
    let mut escaped = false;
    let mut copied = 0;
    let mut i = 0;
    while i < bytes.len() {
        let byte = bytes[i];
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            i += 1;
            continue;
        }
        match byte {
            b'"' => in_string = true,
            // Outside strings only `null` contains a lowercase n.
            b'n' => nulls += 1,
            b'N' | b'I' | b'-' => {
                let rest = &bytes[i..];
                if let Some((token, x)) = NON_FINITE
                    .iter()
                    .find(|(token, _)| rest.starts_with(token.as_bytes()))
                {
                    out.push_str(&text[copied..i]);
                    out.push_str("null");
                    replaced.push((nulls, *x));
                    nulls += 1;
                    i += token.len();
                    copied = i;
                    continue;
                }
            }
            _ => {}
        }
        i += 1;
    }
    out.push_str(&text[copied..]);
    (Cow::Owned(out), replaced)
}

/// Hands the blanked floats back as their `null`s are visited.
struct Restore<'a> {
    replaced: &'a [(usize, f64)],
    nulls: Cell<usize>,
    next: Cell<usize>,
}

impl Restore<'_> {
    fn null(&self) -> Canonical {
        let ordinal = self.nulls.get();
        self.nulls.set(ordinal + 1);
        let next = self.next.get();
        match self.replaced.get(next) {
            Some(&(at, x)) if at == ordinal => {
                self.next.set(next + 1);
                Canonical::Float(x)
            }
            _ => Canonical::Null,
        }
    }
}

#[derive(Clone, Copy)]
struct Node<'r, 'a>(&'r Restore<'a>);

impl<'de> DeserializeSeed<'de> for Node<'_, '_> {
    type Value = Canonical;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Canonical, D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for Node<'_, '_> {
    type Value = Canonical;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Canonical, E> {
        Ok(self.0.null())
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Canonical, E> {
        Ok(Canonical::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Canonical, E> {
        Ok(Canonical::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Canonical, E> {
        // Unsigned values past i64::MAX degrade to floats.
        Ok(i64::try_from(v).map_or(Canonical::Float(v as f64), Canonical::Int))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Canonical, E> {
        Ok(Canonical::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Canonical, E> {
        Ok(Canonical::Str(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Canonical, E> {
        Ok(Canonical::Str(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Canonical, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element_seed(self)? {
            items.push(item);
        }
        Ok(Canonical::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Canonical, A::Error> {
        let mut out = Mapping::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(key) = map.next_key::<String>()? {
            let item = map.next_value_seed(self)?;
            out.insert(key, item);
        }
        Ok(Canonical::Map(out))
    }
}

pub fn from_str(text: &str) -> Result<Canonical, serde_json::Error> {
    let (text, replaced) = blank_non_finite(text);
    let restore = Restore {
        replaced: &replaced,
        nulls: Cell::new(0),
        next: Cell::new(0),
    };
    let mut deserializer = serde_json::Deserializer::from_str(&text);
    let value = Node(&restore).deserialize(&mut deserializer)?;
    deserializer.end()?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_non_finite_floats_written_bare() {
        let value = Canonical::List(vec![
            Canonical::Float(f64::NAN),
            Canonical::Float(f64::INFINITY),
            Canonical::Float(f64::NEG_INFINITY),
            Canonical::Null,
        ]);
        let text = to_string(&value).unwrap();
        assert_eq!(text, "[NaN,Infinity,-Infinity,null]");

        let back = from_str(&text).unwrap();
        let items = back.as_list().unwrap();
        assert!(items[0].as_f64().unwrap().is_nan());
        assert_eq!(items[1], Canonical::Float(f64::INFINITY));
        assert_eq!(items[2], Canonical::Float(f64::NEG_INFINITY));
        assert_eq!(items[3], Canonical::Null);
    }

    #[test]
    fn test_reads_python_style_file() {
        let text = r#"{
    "label": "NaN and -Infinity stay text",
    "gap": null,
    "values": [1.5, NaN, null, -Infinity],
    "nested": {"hi": Infinity, "quote": "\"NaN\""}
}"#;
        let back = from_str(text).unwrap();
        let map = back.as_map().unwrap();
        assert_eq!(
            map.get("label"),
            Some(&Canonical::Str("NaN and -Infinity stay text".into()))
        );
        assert_eq!(map.get("gap"), Some(&Canonical::Null));
        let values = map.get("values").unwrap().as_list().unwrap();
        assert_eq!(values[0], Canonical::Float(1.5));
        assert!(values[1].as_f64().unwrap().is_nan());
        assert_eq!(values[2], Canonical::Null);
        assert_eq!(values[3], Canonical::Float(f64::NEG_INFINITY));
        let nested = map.get("nested").unwrap().as_map().unwrap();
        assert_eq!(nested.get("hi"), Some(&Canonical::Float(f64::INFINITY)));
        assert_eq!(nested.get("quote"), Some(&Canonical::Str("\"NaN\"".into())));
    }

    #[test]
    fn test_numeric_lookalike_mapping_stays_a_mapping() {
        let text = r#"{"__snappiershot_numeric__": "float", "value": "nan"}"#;
        let back = from_str(text).unwrap();
        assert_eq!(back.as_map().map(Mapping::len), Some(2));
    }

    #[test]
    fn test_malformed_token_rejected() {
        assert!(from_str("[NaNx]").is_err());
        assert!(from_str("[1] 2").is_err());
    }

    #[test]
    fn test_int_float_distinction_kept() {
        let back = from_str(&to_string_indented(&Canonical::Float(90.0), 4).unwrap()).unwrap();
        assert_eq!(back, Canonical::Float(90.0));
        assert_eq!(from_str("90").unwrap(), Canonical::Int(90));
    }

    #[test]
    fn test_large_unsigned_becomes_float() {
        assert!(matches!(from_json(&json!(18446744073709551615u64)), Canonical::Float(_)));
        assert!(matches!(from_str("18446744073709551615").unwrap(), Canonical::Float(_)));
    }

    #[test]
    fn test_indentation() {
        let mut map = Mapping::new();
        map.insert("a", Canonical::from(vec![1]));
        let text = to_string_indented(&Canonical::Map(map), 2).unwrap();
        assert_eq!(text, "{\n  \"a\": [\n    1\n  ]\n}");

        let mut map = Mapping::new();
        map.insert("x", Canonical::Float(f64::NAN));
        let text = to_string_indented(&Canonical::Map(map), 2).unwrap();
        assert_eq!(text, "{\n  \"x\": NaN\n}");
    }

    #[test]
    fn test_key_order_preserved() {
        let back = from_str(r#"{"z": 1, "a": 2}"#).unwrap();
        let keys: Vec<&str> = back.as_map().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn test_wide_object() {
        let body: Vec<String> = (0..40_000).map(|i| format!("\"k{}\": {}", i, i)).collect();
        let back = from_str(&format!("{{{}}}", body.join(", "))).unwrap();
        let map = back.as_map().unwrap();
        assert_eq!(map.len(), 40_000);
        assert_eq!(map.get("k39999"), Some(&Canonical::Int(39_999)));
    }
}
