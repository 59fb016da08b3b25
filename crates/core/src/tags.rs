//! Tagged-wrapper families and their reserved keys.
//!
//! A tagged wrapper is a mapping whose key set is exactly
//! `{type_key, value_key}` for one family:
//!
//! ```json
//! {"__snappiershot_numeric__": "complex", "value": [3.0, 4.0]}
//! ```
//!
//! The key names are the file contract and must not change.

use crate::canonical::Canonical;
use crate::mapping::Mapping;

pub const NUMERIC_TYPE_KEY: &str = "__snappiershot_numeric__";
pub const NUMERIC_VALUE_KEY: &str = "value";

pub const DATETIME_TYPE_KEY: &str = "__snappiershot_datetime__";
pub const DATETIME_VALUE_KEY: &str = "value";

pub const COLLECTION_TYPE_KEY: &str = "__snappiershot_collection__";
pub const COLLECTION_VALUE_KEY: &str = "values";

pub const PATH_TYPE_KEY: &str = "__snappiershot_path__";
pub const PATH_VALUE_KEY: &str = "values";

pub const UNIT_TYPE_KEY: &str = "__snappiershot_unit__";
pub const UNIT_VALUE_KEY: &str = "value";

/// Keys of the plain mapping an error value is encoded as.
pub const EXCEPTION_TYPE_KEY: &str = "exception_type";
pub const EXCEPTION_VALUE_KEY: &str = "exception_value";

/// The wrapper families. Each owns one type key and one value key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Numeric,
    Datetime,
    Collection,
    Path,
    Unit,
}

impl Family {
    pub const ALL: [Family; 5] = [
        Family::Numeric,
        Family::Datetime,
        Family::Collection,
        Family::Path,
        Family::Unit,
    ];

    pub const fn type_key(self) -> &'static str {
        match self {
            Family::Numeric => NUMERIC_TYPE_KEY,
            Family::Datetime => DATETIME_TYPE_KEY,
            Family::Collection => COLLECTION_TYPE_KEY,
            Family::Path => PATH_TYPE_KEY,
            Family::Unit => UNIT_TYPE_KEY,
        }
    }

    pub const fn value_key(self) -> &'static str {
        match self {
            Family::Numeric => NUMERIC_VALUE_KEY,
            Family::Datetime => DATETIME_VALUE_KEY,
            Family::Collection => COLLECTION_VALUE_KEY,
            Family::Path => PATH_VALUE_KEY,
            Family::Unit => UNIT_VALUE_KEY,
        }
    }

    /// Build the wrapper mapping `{type_key: tag, value_key: payload}`.
    pub fn wrap(self, tag: &str, payload: Canonical) -> Canonical {
        let mut map = Mapping::with_capacity(2);
        map.insert(self.type_key(), Canonical::Str(tag.to_string()));
        map.insert(self.value_key(), payload);
        Canonical::Map(map)
    }

    /// Detect a wrapper by its exact key set.
    ///
    /// Returns the family together with the raw tag node and the payload.
    /// A mapping carrying any additional key is a plain user mapping.
    pub fn detect(map: &Mapping<Canonical>) -> Option<Wrapper<'_>> {
        if map.len() != 2 {
            return None;
        }
        Family::ALL.into_iter().find_map(|family| {
            let tag = map.get(family.type_key())?;
            let payload = map.get(family.value_key())?;
            Some(Wrapper {
                family,
                tag,
                payload,
            })
        })
    }
}

/// A detected tagged wrapper, borrowed from its mapping.
#[derive(Debug, Clone, Copy)]
pub struct Wrapper<'a> {
    pub family: Family,
    pub tag: &'a Canonical,
    pub payload: &'a Canonical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericKind {
    Complex,
    Decimal,
}

impl NumericKind {
    pub const fn name(self) -> &'static str {
        match self {
            NumericKind::Complex => "complex",
            NumericKind::Decimal => "decimal",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "complex" => Some(NumericKind::Complex),
            "decimal" => Some(NumericKind::Decimal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatetimeKind {
    Date,
    Time,
    DatetimeWithTimezone,
    DatetimeWithoutTimezone,
    Timedelta,
}

impl DatetimeKind {
    pub const fn name(self) -> &'static str {
        match self {
            DatetimeKind::Date => "date",
            DatetimeKind::Time => "time",
            DatetimeKind::DatetimeWithTimezone => "datetime_with_timezone",
            DatetimeKind::DatetimeWithoutTimezone => "datetime_without_timezone",
            DatetimeKind::Timedelta => "timedelta",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "date" => Some(DatetimeKind::Date),
            "time" => Some(DatetimeKind::Time),
            "datetime_with_timezone" => Some(DatetimeKind::DatetimeWithTimezone),
            "datetime_without_timezone" => Some(DatetimeKind::DatetimeWithoutTimezone),
            "timedelta" => Some(DatetimeKind::Timedelta),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Set,
    Tuple,
    Bytes,
}

impl CollectionKind {
    pub const fn name(self) -> &'static str {
        match self {
            CollectionKind::Set => "set",
            CollectionKind::Tuple => "tuple",
            CollectionKind::Bytes => "bytes",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "set" => Some(CollectionKind::Set),
            "tuple" => Some(CollectionKind::Tuple),
            "bytes" => Some(CollectionKind::Bytes),
            _ => None,
        }
    }
}

/// Path flavours. A path never decodes into a different flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    /// The platform-native flavour.
    Path,
    PurePosixPath,
    PureWindowsPath,
}

impl PathKind {
    pub const fn name(self) -> &'static str {
        match self {
            PathKind::Path => "Path",
            PathKind::PurePosixPath => "PurePosixPath",
            PathKind::PureWindowsPath => "PureWindowsPath",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Path" => Some(PathKind::Path),
            "PurePosixPath" => Some(PathKind::PurePosixPath),
            "PureWindowsPath" => Some(PathKind::PureWindowsPath),
            _ => None,
        }
    }
}

/// The single tag of the unit family.
pub const UNIT_TAG: &str = "Unit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_keys_are_unique() {
        let mut keys: Vec<&str> = Family::ALL.iter().map(|f| f.type_key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), Family::ALL.len());
    }

    #[test]
    fn test_detect_exact_key_set() {
        let wrapped = Family::Numeric.wrap("complex", Canonical::from(vec![3, 4]));
        let map = wrapped.as_map().unwrap();
        let wrapper = Family::detect(map).unwrap();
        assert_eq!(wrapper.family, Family::Numeric);
        assert_eq!(wrapper.tag.as_str(), Some("complex"));
    }

    #[test]
    fn test_detect_rejects_extra_key() {
        let mut wrapped = Family::Numeric.wrap("complex", Canonical::from(vec![3, 4]));
        let map = wrapped.as_map_mut().unwrap();
        map.insert("extra", Canonical::Null);
        assert!(Family::detect(map).is_none());
    }

    #[test]
    fn test_detect_rejects_wrong_value_key() {
        let mut map = Mapping::new();
        map.insert(COLLECTION_TYPE_KEY, Canonical::from("set"));
        map.insert("value", Canonical::List(vec![]));
        assert!(Family::detect(&map).is_none());
    }

    #[test]
    fn test_names_round_trip() {
        for kind in [
            DatetimeKind::Date,
            DatetimeKind::Time,
            DatetimeKind::DatetimeWithTimezone,
            DatetimeKind::DatetimeWithoutTimezone,
            DatetimeKind::Timedelta,
        ] {
            assert_eq!(DatetimeKind::from_name(kind.name()), Some(kind));
        }
        for kind in [PathKind::Path, PathKind::PurePosixPath, PathKind::PureWindowsPath] {
            assert_eq!(PathKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(CollectionKind::from_name("list"), None);
    }
}
