use snappiershot_compare::{Comparison, Tolerances};
use snappiershot_core::{decode, encode, Canonical, EncodeError, Mapping, Value};
use snappiershot_storage::UPDATE_ON_NEXT_RUN_KEY;

use crate::caller::CallerInfo;

pub const USER_PROVIDED_NAME_KEY: &str = "user_provided_name";
pub const TEST_RUNNER_PROVIDED_NAME_KEY: &str = "test_runner_provided_name";
pub const ARGUMENTS_KEY: &str = "arguments";

/// Identifies which stored entry a session's snapshots belong to.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotMetadata {
    pub caller_info: CallerInfo,
    pub update_on_next_run: bool,
    pub test_runner_provided_name: String,
    pub user_provided_name: String,
}

impl SnapshotMetadata {
    pub fn new(caller_info: CallerInfo, update_on_next_run: bool) -> Self {
        SnapshotMetadata {
            caller_info,
            update_on_next_run,
            test_runner_provided_name: String::new(),
            user_provided_name: String::new(),
        }
    }

    /// The metadata section as stored in a snapshot file.
    pub fn to_canonical(&self) -> Result<Mapping<Canonical>, EncodeError> {
        let arguments = encode(&Value::Map(self.caller_info.args.clone()))?.value;
        let mut map = Mapping::with_capacity(4);
        map.insert(
            USER_PROVIDED_NAME_KEY,
            Canonical::Str(self.user_provided_name.clone()),
        );
        map.insert(
            TEST_RUNNER_PROVIDED_NAME_KEY,
            Canonical::Str(self.test_runner_provided_name.clone()),
        );
        map.insert(UPDATE_ON_NEXT_RUN_KEY, Canonical::Bool(self.update_on_next_run));
        map.insert(ARGUMENTS_KEY, arguments);
        Ok(map)
    }

    /// True when every current argument equals the stored argument of the
    /// same name, compared exactly after an encode/decode round trip.
    ///
    /// A stored argument that is absent counts as null. Stored arguments the
    /// current call does not have are ignored.
    pub fn matches(&self, stored: &Mapping<Canonical>) -> bool {
        let stored_args = stored.get(ARGUMENTS_KEY).and_then(Canonical::as_map);
        self.caller_info.args.iter().all(|(name, current)| {
            let Some(current) = round_trip(current) else {
                return false;
            };
            let stored = match stored_args.and_then(|args| args.get(name)) {
                Some(stored) => match decode(stored) {
                    Ok(decoded) => decoded,
                    Err(_) => return false,
                },
                None => Value::Null,
            };
            Comparison::new(&current, &stored, Tolerances::default(), true).is_equal()
        })
    }
}

fn round_trip(value: &Value) -> Option<Value> {
    let encoded = encode(value).ok()?;
    decode(&encoded.value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use snappiershot_core::json::{from_json, to_json};

    fn metadata() -> SnapshotMetadata {
        SnapshotMetadata::new(
            CallerInfo::new("tests/t.rs", "t::case")
                .arg("n", 2)
                .arg("pair", Value::tuple([1.5, 2.5])),
            false,
        )
    }

    #[test]
    fn test_stored_shape() {
        let stored = metadata().to_canonical().unwrap();
        assert_eq!(
            to_json(&Canonical::Map(stored)),
            json!({
                "user_provided_name": "",
                "test_runner_provided_name": "",
                "update_on_next_run": false,
                "arguments": {
                    "n": 2,
                    "pair": {"__snappiershot_collection__": "tuple", "values": [1.5, 2.5]}
                }
            })
        );
    }

    #[test]
    fn test_matches_own_encoding() {
        let metadata = metadata();
        let stored = metadata.to_canonical().unwrap();
        assert!(metadata.matches(&stored));
    }

    #[test]
    fn test_different_argument_does_not_match() {
        let stored = from_json(&json!({"arguments": {"n": 3}}));
        assert!(!metadata().matches(stored.as_map().unwrap()));
    }

    #[test]
    fn test_missing_argument_counts_as_null() {
        let caller = CallerInfo::new("t.rs", "t").arg("flag", Value::Null);
        let metadata = SnapshotMetadata::new(caller, false);
        let stored = from_json(&json!({"arguments": {}}));
        assert!(metadata.matches(stored.as_map().unwrap()));

        let stored = from_json(&json!({"arguments": {"flag": false}}));
        assert!(!metadata.matches(stored.as_map().unwrap()));
    }

    #[test]
    fn test_extra_stored_arguments_ignored() {
        let caller = CallerInfo::new("t.rs", "t").arg("n", 1);
        let metadata = SnapshotMetadata::new(caller, false);
        let stored = from_json(&json!({"arguments": {"n": 1, "old": "x"}}));
        assert!(metadata.matches(stored.as_map().unwrap()));
    }

    #[test]
    fn test_float_arguments_compare_exactly() {
        let caller = CallerInfo::new("t.rs", "t").arg("x", 1.0);
        let metadata = SnapshotMetadata::new(caller, false);
        let stored = from_json(&json!({"arguments": {"x": 1.0000001}}));
        assert!(!metadata.matches(stored.as_map().unwrap()));
    }
}
