//! Runtime value types.
//!
//! [`Value`] is the closed universe of things a test can snapshot. The
//! encoder lowers it into a [`Canonical`] tree and the decoder restores it.

use std::cell::{Ref, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

use rust_decimal::Decimal;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, Time};

use crate::canonical::Canonical;
use crate::mapping::Mapping;
use crate::tags::PathKind;

// ──────────────────────────────────────────────
// Value
// ──────────────────────────────────────────────

/// A runtime value.
///
/// Equality is structural, except for `Object`, which compares by identity,
/// and `Float`, which follows IEEE semantics (`NaN != NaN`).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(Mapping<Value>),
    Set(ValueSet),
    Tuple(Vec<Value>),
    Bytes(Vec<u8>),
    Complex(Complex),
    Decimal(Decimal),
    Date(Date),
    Time(Time),
    /// A date and time without an offset.
    DateTime(PrimitiveDateTime),
    /// A date and time with a UTC offset.
    DateTimeTz(OffsetDateTime),
    Duration(Duration),
    Path(SnapPath),
    /// A unit of measure, carried as its string form.
    Unit(String),
    Error(ErrorValue),
    Array(NdArray),
    Table(Table),
    Object(ObjectRef),
}

impl Value {
    /// Returns a human-readable type name for messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Map(_) => "dict",
            Value::Set(_) => "set",
            Value::Tuple(_) => "tuple",
            Value::Bytes(_) => "bytes",
            Value::Complex(_) => "complex",
            Value::Decimal(_) => "decimal",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "datetime",
            Value::DateTimeTz(_) => "datetime_tz",
            Value::Duration(_) => "timedelta",
            Value::Path(_) => "path",
            Value::Unit(_) => "unit",
            Value::Error(_) => "error",
            Value::Array(_) => "array",
            Value::Table(_) => "table",
            Value::Object(_) => "object",
        }
    }

    /// Byte sequence value.
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(bytes.into())
    }

    /// Set value; duplicates are collapsed.
    pub fn set<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::Set(items.into_iter().map(Into::into).collect())
    }

    /// Tuple value.
    pub fn tuple<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::Tuple(items.into_iter().map(Into::into).collect())
    }

    /// Mapping value from key/value pairs, preserving their order.
    pub fn map<I, K, T>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: Into<Value>,
    {
        Value::Map(entries.into_iter().map(|(k, v)| (k, v.into())).collect())
    }

    /// Lower any `serde::Serialize` type into a value.
    ///
    /// Structs and maps become mappings, sequences become lists and numbers
    /// keep their integer/float distinction.
    pub fn from_serialize<T: serde::Serialize + ?Sized>(
        value: &T,
    ) -> Result<Value, serde_json::Error> {
        serde_json::to_value(value).map(|json| Value::from_json(&json))
    }

    fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s.clone()),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "None"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::List(items) => write_seq(f, "[", items.iter(), "]"),
            Value::Tuple(items) => write_seq(f, "(", items.iter(), ")"),
            Value::Set(set) => write_seq(f, "{", set.iter(), "}"),
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Bytes(bytes) => write!(f, "b{:?}", String::from_utf8_lossy(bytes)),
            Value::Complex(c) => write!(f, "{}", c),
            Value::Decimal(d) => write!(f, "Decimal('{}')", d),
            Value::Date(d) => write!(f, "{}", d),
            Value::Time(t) => write!(f, "{}", t),
            Value::DateTime(dt) => write!(f, "{}", dt),
            Value::DateTimeTz(dt) => write!(f, "{}", dt),
            Value::Duration(d) => write!(f, "{}", d),
            Value::Path(p) => write!(f, "{}('{}')", p.kind.name(), p),
            Value::Unit(u) => write!(f, "<Unit('{}')>", u),
            Value::Error(e) => write!(f, "{}({:?})", e.type_name, e.message),
            Value::Array(a) => write!(f, "array(shape={:?})", a.shape),
            Value::Table(Table::Frame(_)) => write!(f, "<DataFrame>"),
            Value::Table(Table::Series(_)) => write!(f, "<Series>"),
            Value::Object(o) => write!(f, "<{} object>", o.type_name()),
        }
    }
}

fn write_seq<'a>(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    items: impl Iterator<Item = &'a Value>,
    close: &str,
) -> fmt::Result {
    write!(f, "{}", open)?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "{}", close)
}

// ──────────────────────────────────────────────
// Numeric extensions
// ──────────────────────────────────────────────

/// A complex number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub fn new(re: f64, im: f64) -> Self {
        Complex { re, im }
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.im.is_sign_negative() { '-' } else { '+' };
        write!(f, "({}{}{}j)", self.re, sign, self.im.abs())
    }
}

// ──────────────────────────────────────────────
// Sets
// ──────────────────────────────────────────────

/// An unordered collection of distinct values.
///
/// Membership uses `Value` equality, so comparison is exact: floats inside a
/// set are never compared with a tolerance.
#[derive(Debug, Clone, Default)]
pub struct ValueSet {
    items: Vec<Value>,
}

impl ValueSet {
    pub fn new() -> Self {
        ValueSet::default()
    }

    /// Insert a value; returns false if an equal value was already present.
    pub fn insert(&mut self, value: Value) -> bool {
        if self.contains(&value) {
            return false;
        }
        self.items.push(value);
        true
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.items.iter().any(|item| item == value)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.iter()
    }

    /// Elements of `self` that are not in `other`.
    pub fn difference<'a>(&'a self, other: &'a ValueSet) -> Vec<&'a Value> {
        self.items.iter().filter(|v| !other.contains(v)).collect()
    }
}

impl PartialEq for ValueSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.items.iter().all(|v| other.contains(v))
    }
}

impl FromIterator<Value> for ValueSet {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut set = ValueSet::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

// ──────────────────────────────────────────────
// Paths
// ──────────────────────────────────────────────

/// A path split into parts, tagged with its flavour.
///
/// Parts follow the usual convention: an absolute path's first part is its
/// anchor (`"/"`, or `"C:\\"` for a Windows drive).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapPath {
    pub kind: PathKind,
    pub parts: Vec<String>,
}

impl SnapPath {
    pub fn new(kind: PathKind, parts: Vec<String>) -> Self {
        SnapPath { kind, parts }
    }

    /// A platform-native path.
    pub fn native(path: &Path) -> Self {
        let mut parts: Vec<String> = Vec::new();
        let mut after_prefix = false;
        for component in path.components() {
            match component {
                Component::Prefix(prefix) => {
                    parts.push(prefix.as_os_str().to_string_lossy().into_owned());
                    after_prefix = true;
                    continue;
                }
                Component::RootDir if after_prefix => {
                    if let Some(anchor) = parts.last_mut() {
                        anchor.push(std::path::MAIN_SEPARATOR);
                    }
                }
                Component::CurDir => {}
                other => parts.push(other.as_os_str().to_string_lossy().into_owned()),
            }
            after_prefix = false;
        }
        SnapPath::new(PathKind::Path, parts)
    }

    /// A POSIX path, independent of the host platform.
    pub fn posix(path: &str) -> Self {
        let mut parts = Vec::new();
        if path.starts_with('/') {
            parts.push("/".to_string());
        }
        parts.extend(
            path.split('/')
                .filter(|part| !part.is_empty() && *part != ".")
                .map(str::to_string),
        );
        SnapPath::new(PathKind::PurePosixPath, parts)
    }

    /// A Windows path, independent of the host platform.
    pub fn windows(path: &str) -> Self {
        let mut parts = Vec::new();
        let mut rest = path;
        let bytes = path.as_bytes();
        if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
            let drive = &path[..2];
            rest = &path[2..];
            if rest.starts_with(['\\', '/']) {
                parts.push(format!("{}\\", drive));
            } else {
                parts.push(drive.to_string());
            }
        } else if rest.starts_with(['\\', '/']) {
            parts.push("\\".to_string());
        }
        parts.extend(
            rest.split(['\\', '/'])
                .filter(|part| !part.is_empty() && *part != ".")
                .map(str::to_string),
        );
        SnapPath::new(PathKind::PureWindowsPath, parts)
    }

    fn separator(&self) -> char {
        match self.kind {
            PathKind::Path => std::path::MAIN_SEPARATOR,
            PathKind::PurePosixPath => '/',
            PathKind::PureWindowsPath => '\\',
        }
    }

    /// Rebuild a native path. Only meaningful for the native flavour.
    pub fn to_path_buf(&self) -> PathBuf {
        self.parts.iter().collect()
    }
}

impl fmt::Display for SnapPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = self.separator();
        let mut out = String::new();
        for part in &self.parts {
            if !out.is_empty() && !out.ends_with(sep) {
                out.push(sep);
            }
            out.push_str(part);
        }
        if out.is_empty() {
            out.push('.');
        }
        write!(f, "{}", out)
    }
}

// ──────────────────────────────────────────────
// Errors as values
// ──────────────────────────────────────────────

/// An error captured as a value: its type name and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorValue {
    pub type_name: String,
    pub message: String,
}

impl ErrorValue {
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        ErrorValue {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    /// Capture an error of a statically known type.
    pub fn from_error<E: std::error::Error + 'static>(error: &E) -> Self {
        ErrorValue::new(short_type_name::<E>(), error.to_string())
    }

    /// Capture `error` if it is an `E`.
    pub fn downcast<E: std::error::Error + 'static>(
        error: &(dyn std::error::Error + 'static),
    ) -> Option<Self> {
        error.downcast_ref::<E>().map(ErrorValue::from_error)
    }
}

/// The last path segment of a type name, without generic arguments.
pub fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

// ──────────────────────────────────────────────
// Array and table extensions
// ──────────────────────────────────────────────

/// An n-dimensional array stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct NdArray {
    shape: Vec<usize>,
    data: Vec<Value>,
}

impl NdArray {
    /// Returns `None` when the data length does not match the shape.
    /// An empty shape describes a zero-dimensional (scalar) array.
    pub fn new(shape: Vec<usize>, data: Vec<Value>) -> Option<Self> {
        let expected: usize = shape.iter().product();
        (expected == data.len()).then_some(NdArray { shape, data })
    }

    pub fn from_vec<T: Into<Value>>(data: Vec<T>) -> Self {
        let data: Vec<Value> = data.into_iter().map(Into::into).collect();
        NdArray {
            shape: vec![data.len()],
            data,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// The plain nested-list form (a scalar for zero dimensions).
    pub fn to_nested(&self) -> Value {
        fn nest(shape: &[usize], data: &[Value]) -> Value {
            match shape.split_first() {
                None => data.first().cloned().unwrap_or(Value::Null),
                Some((&len, rest)) => {
                    let stride: usize = rest.iter().product();
                    Value::List(
                        (0..len)
                            .map(|i| nest(rest, &data[i * stride..(i + 1) * stride]))
                            .collect(),
                    )
                }
            }
        }
        nest(&self.shape, &self.data)
    }
}

/// Tabular data.
#[derive(Debug, Clone, PartialEq)]
pub enum Table {
    Frame(DataFrame),
    Series(Series),
}

impl Table {
    /// The mapping form tables are snapshotted as.
    ///
    /// Frames use the split layout `{index, columns, data}` with row-major
    /// data; series use `{data, index}`.
    pub fn to_mapping(&self) -> Value {
        match self {
            Table::Frame(frame) => {
                let mut map = Mapping::with_capacity(3);
                map.insert("index", Value::List(frame.index.clone()));
                map.insert(
                    "columns",
                    Value::List(frame.columns.iter().cloned().map(Value::Str).collect()),
                );
                map.insert(
                    "data",
                    Value::List(frame.rows.iter().cloned().map(Value::List).collect()),
                );
                Value::Map(map)
            }
            Table::Series(series) => {
                let mut map = Mapping::with_capacity(2);
                map.insert("data", Value::List(series.data.clone()));
                map.insert("index", Value::List(series.index.clone()));
                Value::Map(map)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
    pub columns: Vec<String>,
    pub index: Vec<Value>,
    pub rows: Vec<Vec<Value>>,
}

impl DataFrame {
    /// Build a frame from named columns with a default `0..n` index.
    /// Returns `None` if the columns differ in length.
    pub fn from_columns<K: Into<String>>(columns: Vec<(K, Vec<Value>)>) -> Option<Self> {
        let height = columns.first().map_or(0, |(_, c)| c.len());
        if columns.iter().any(|(_, c)| c.len() != height) {
            return None;
        }
        let mut rows = vec![Vec::with_capacity(columns.len()); height];
        let mut names = Vec::with_capacity(columns.len());
        for (name, column) in columns {
            names.push(name.into());
            for (row, cell) in rows.iter_mut().zip(column) {
                row.push(cell);
            }
        }
        Some(DataFrame {
            columns: names,
            index: (0..height as i64).map(Value::Int).collect(),
            rows,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub index: Vec<Value>,
    pub data: Vec<Value>,
}

impl Series {
    pub fn new<T: Into<Value>>(data: Vec<T>) -> Self {
        let data: Vec<Value> = data.into_iter().map(Into::into).collect();
        Series {
            index: (0..data.len() as i64).map(Value::Int).collect(),
            data,
        }
    }
}

// ──────────────────────────────────────────────
// Objects
// ──────────────────────────────────────────────

/// Capability: the object provides its own canonical form.
pub trait CustomEncodable {
    fn snapshot_encode(&self) -> Canonical;
}

/// Capability: the object is replaced by a placeholder instead of being
/// encoded (typically a type rather than an instance).
pub trait SkipEncodable {
    fn skip_placeholder(&self) -> Canonical;
}

impl<F: Fn() -> Canonical> CustomEncodable for F {
    fn snapshot_encode(&self) -> Canonical {
        self()
    }
}

/// A placeholder hook returning a fixed canonical value.
pub struct Placeholder(pub Canonical);

impl SkipEncodable for Placeholder {
    fn skip_placeholder(&self) -> Canonical {
        self.0.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// An instance carrying per-instance state.
    Instance,
    /// A type/class object.
    Type,
    /// A function or other callable.
    Function,
}

/// Shared handle to an object. Identity is the allocation.
pub type ObjectRef = Rc<Object>;

/// An object with identity, dict-style attributes and slot-style attributes.
///
/// Attributes sit behind `RefCell` so an object can point back at itself.
pub struct Object {
    type_name: String,
    kind: ObjectKind,
    attributes: RefCell<Mapping<Value>>,
    slots: RefCell<Mapping<Value>>,
    custom: Option<Rc<dyn CustomEncodable>>,
    skip: Option<Rc<dyn SkipEncodable>>,
}

impl Object {
    pub fn instance(type_name: impl Into<String>) -> Self {
        Object::with_kind(type_name, ObjectKind::Instance)
    }

    pub fn with_kind(type_name: impl Into<String>, kind: ObjectKind) -> Self {
        Object {
            type_name: type_name.into(),
            kind,
            attributes: RefCell::new(Mapping::new()),
            slots: RefCell::new(Mapping::new()),
            custom: None,
            skip: None,
        }
    }

    pub fn attr(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.borrow_mut().insert(name, value.into());
        self
    }

    pub fn slot(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.slots.borrow_mut().insert(name, value.into());
        self
    }

    pub fn custom_encoder(mut self, hook: impl CustomEncodable + 'static) -> Self {
        self.custom = Some(Rc::new(hook));
        self
    }

    pub fn skip_encoder(mut self, hook: impl SkipEncodable + 'static) -> Self {
        self.skip = Some(Rc::new(hook));
        self
    }

    pub fn into_ref(self) -> ObjectRef {
        Rc::new(self)
    }

    /// Set (or replace) a dict-style attribute on a shared object.
    pub fn set_attr(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.attributes.borrow_mut().insert(name, value.into());
    }

    /// Drop every attribute and slot, breaking reference cycles.
    pub fn clear(&self) {
        *self.attributes.borrow_mut() = Mapping::new();
        *self.slots.borrow_mut() = Mapping::new();
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn is_instance(&self) -> bool {
        self.kind == ObjectKind::Instance
    }

    pub fn custom_hook(&self) -> Option<&dyn CustomEncodable> {
        self.custom.as_deref()
    }

    pub fn skip_hook(&self) -> Option<&dyn SkipEncodable> {
        self.skip.as_deref()
    }

    pub fn attributes(&self) -> Ref<'_, Mapping<Value>> {
        self.attributes.borrow()
    }

    pub fn slots(&self) -> Ref<'_, Mapping<Value>> {
        self.slots.borrow()
    }

    /// Full instance state: dict attributes followed by slot attributes not
    /// shadowed by a dict attribute of the same name.
    pub fn state(&self) -> Mapping<Value> {
        let mut state = self.attributes.borrow().clone();
        for (name, value) in self.slots.borrow().iter() {
            if !state.contains_key(name) {
                state.insert(name, value.clone());
            }
        }
        state
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("type_name", &self.type_name)
            .field("kind", &self.kind)
            .field("at", &(self as *const Object))
            .finish_non_exhaustive()
    }
}

// ──────────────────────────────────────────────
// Conversions
// ──────────────────────────────────────────────

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Int,
    u16 => Int,
    u32 => Int,
    f32 => Float,
    f64 => Float,
    String => Str,
    &str => Str,
    Complex => Complex,
    Decimal => Decimal,
    Date => Date,
    Time => Time,
    PrimitiveDateTime => DateTime,
    OffsetDateTime => DateTimeTz,
    Duration => Duration,
    SnapPath => Path,
    ErrorValue => Error,
    NdArray => Array,
    Table => Table,
    ObjectRef => Object,
    ValueSet => Set,
}

impl From<Mapping<Value>> for Value {
    fn from(v: Mapping<Value>) -> Self {
        Value::Map(v)
    }
}

impl From<&Path> for Value {
    fn from(v: &Path) -> Self {
        Value::Path(SnapPath::native(v))
    }
}

impl From<PathBuf> for Value {
    fn from(v: PathBuf) -> Self {
        Value::Path(SnapPath::native(&v))
    }
}

impl From<DataFrame> for Value {
    fn from(v: DataFrame) -> Self {
        Value::Table(Table::Frame(v))
    }
}

impl From<Series> for Value {
    fn from(v: Series) -> Self {
        Value::Table(Table::Series(v))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value> + Clone> From<&[T]> for Value {
    fn from(v: &[T]) -> Self {
        Value::List(v.iter().cloned().map(Into::into).collect())
    }
}

impl<K: Into<String>, T: Into<Value>> From<BTreeMap<K, T>> for Value {
    fn from(v: BTreeMap<K, T>) -> Self {
        Value::map(v)
    }
}

impl<T: Into<Value>> From<HashMap<String, T>> for Value {
    /// Keys are sorted so the snapshot does not depend on hash order.
    fn from(v: HashMap<String, T>) -> Self {
        let mut entries: Vec<(String, T)> = v.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Value::map(entries)
    }
}

impl<T: Into<Value>> From<HashSet<T>> for Value {
    fn from(v: HashSet<T>) -> Self {
        Value::set(v)
    }
}

impl<T: Into<Value>> From<BTreeSet<T>> for Value {
    fn from(v: BTreeSet<T>) -> Self {
        Value::set(v)
    }
}

impl<A: Into<Value>, B: Into<Value>> From<(A, B)> for Value {
    fn from((a, b): (A, B)) -> Self {
        Value::Tuple(vec![a.into(), b.into()])
    }
}

impl<A: Into<Value>, B: Into<Value>, C: Into<Value>> From<(A, B, C)> for Value {
    fn from((a, b, c): (A, B, C)) -> Self {
        Value::Tuple(vec![a.into(), b.into(), c.into()])
    }
}

impl<A: Into<Value>, B: Into<Value>, C: Into<Value>, D: Into<Value>> From<(A, B, C, D)>
    for Value
{
    fn from((a, b, c, d): (A, B, C, D)) -> Self {
        Value::Tuple(vec![a.into(), b.into(), c.into(), d.into()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_collapses_duplicates_and_ignores_order() {
        let left = Value::set([1, 2, 3, 3]);
        let right = Value::set([3, 2, 1]);
        assert_eq!(left, right);
        match left {
            Value::Set(set) => assert_eq!(set.len(), 3),
            other => panic!("expected set, got {:?}", other),
        }
    }

    #[test]
    fn test_object_equality_is_identity() {
        let a = Object::instance("Point").attr("x", 1).into_ref();
        let b = Object::instance("Point").attr("x", 1).into_ref();
        assert_eq!(Value::Object(a.clone()), Value::Object(a.clone()));
        assert_ne!(Value::Object(a), Value::Object(b));
    }

    #[test]
    fn test_object_state_merges_slots() {
        let obj = Object::instance("Mixed")
            .attr("a", 1)
            .slot("b", 2)
            .slot("a", 99);
        let state = obj.state();
        assert_eq!(state.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(state.get("a"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_ndarray_nesting() {
        let array = NdArray::new(vec![2, 2], vec![1.into(), 2.into(), 3.into(), 4.into()]).unwrap();
        assert_eq!(
            array.to_nested(),
            Value::from(vec![Value::from(vec![1, 2]), Value::from(vec![3, 4])])
        );
        let scalar = NdArray::new(vec![], vec![Value::Int(1)]).unwrap();
        assert_eq!(scalar.to_nested(), Value::Int(1));
        assert!(NdArray::new(vec![3], vec![Value::Int(1)]).is_none());
    }

    #[test]
    fn test_posix_path_parts() {
        let path = SnapPath::posix("/usr/local/bin");
        assert_eq!(path.parts, vec!["/", "usr", "local", "bin"]);
        assert_eq!(path.to_string(), "/usr/local/bin");
    }

    #[test]
    fn test_windows_path_parts() {
        let path = SnapPath::windows("C:\\Users\\me");
        assert_eq!(path.parts, vec!["C:\\", "Users", "me"]);
        assert_eq!(path.to_string(), "C:\\Users\\me");
    }

    #[test]
    fn test_native_path_round_trip() {
        let original = PathBuf::from("some").join("relative").join("file.txt");
        let path = SnapPath::native(&original);
        assert_eq!(path.parts, vec!["some", "relative", "file.txt"]);
        assert_eq!(path.to_path_buf(), original);
    }

    #[test]
    fn test_from_serialize() {
        #[derive(serde::Serialize)]
        struct Reading {
            sensor: String,
            value: f64,
            count: u32,
        }
        let value = Value::from_serialize(&Reading {
            sensor: "t1".to_string(),
            value: 1.5,
            count: 3,
        })
        .unwrap();
        assert_eq!(
            value,
            Value::map([
                ("sensor", Value::from("t1")),
                ("value", Value::Float(1.5)),
                ("count", Value::Int(3)),
            ])
        );
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<std::num::ParseIntError>(), "ParseIntError");
        assert_eq!(short_type_name::<Vec<u8>>(), "Vec");
    }
}
