use crate::bound::BoundValue;
use std::fmt;

/// Rendering of the absolute-minimum sentinel.
pub const MIN_KEY_TOKEN: &str = r#"{"$minKey":1}"#;

/// Rendering of the absolute-maximum sentinel.
pub const MAX_KEY_TOKEN: &str = r#"{"$maxKey":1}"#;

/// Rendering of a bound that has not been assigned yet.
pub const NO_BOUND_TOKEN: &str = "null";

/// Render a bound for logs and diagnostics.
///
/// Sentinels render as fixed tokens; everything else renders as relaxed
/// Extended JSON. Rendering follows the stored width rather than canonical
/// equality: `Int32(5)` and `Double(5.0)` compare equal but render as `5` and
/// `5.0`. Identical values always render identically. The output is not meant
/// to be parsed back.
#[must_use]
pub fn format_bound(bound: &BoundValue) -> String {
    match bound {
        BoundValue::MinKey => MIN_KEY_TOKEN.to_string(),
        BoundValue::MaxKey => MAX_KEY_TOKEN.to_string(),
        other => {
            let json: serde_json::Value = other.to_bson().into_relaxed_extjson();
            json.to_string()
        }
    }
}

/// Render a bound that may not be assigned yet.
#[must_use]
pub fn format_optional_bound(bound: Option<&BoundValue>) -> String {
    bound.map_or_else(|| NO_BOUND_TOKEN.to_string(), format_bound)
}

impl fmt::Display for BoundValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_bound(self))
    }
}
