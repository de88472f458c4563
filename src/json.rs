//! This module exports different types for JSON interactions.
//!
//! Besides the aliases used across the crate, it provides [`Payload`], a borrowed view over a
//! raw JSON object with typed accessors. The entity builders read every field through it, so
//! that decoding rules (snowflakes sent as strings, `null` versus absent keys, integer widths)
//! live in one place.

use serde::de::DeserializeOwned;
use serde::ser::Serialize;

use crate::{Error, Result};

pub type Value = serde_json::Value;

pub use serde_json::json;
pub use serde_json::Error as JsonError;

pub type JsonMap = serde_json::Map<String, Value>;

pub const NULL: Value = Value::Null;

#[allow(clippy::missing_errors_doc)] // It's obvious
pub fn to_string<T>(v: &T) -> Result<String>
where
    T: Serialize,
{
    Ok(serde_json::to_string(v)?)
}

#[allow(clippy::missing_errors_doc)] // It's obvious
pub fn from_value<T>(v: Value) -> Result<T>
where
    T: DeserializeOwned,
{
    Ok(serde_json::from_value(v)?)
}

/// A borrowed JSON object with typed, fallible accessors.
///
/// Required accessors fail with [`Error::Decode`] naming the field when it is absent, `null`,
/// or of the wrong type. The `opt_*` accessors treat absent and `null` alike and return
/// `Ok(None)`; [`Self::has_key`] is the only way to tell the two apart.
#[derive(Clone, Copy, Debug)]
pub struct Payload<'a> {
    map: &'a JsonMap,
}

impl<'a> Payload<'a> {
    /// Wraps a value that must be a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the value is not an object.
    pub fn new(value: &'a Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self {
                map,
            }),
            other => Err(Error::Decode("payload", other.clone())),
        }
    }

    #[must_use]
    pub fn from_map(map: &'a JsonMap) -> Self {
        Self {
            map,
        }
    }

    /// The underlying object.
    #[must_use]
    pub fn as_map(&self) -> &'a JsonMap {
        self.map
    }

    /// Whether the key is present at all, even if its value is `null`.
    #[must_use]
    pub fn has_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Whether the key is absent or explicitly `null`.
    #[must_use]
    pub fn is_null(&self, key: &str) -> bool {
        self.map.get(key).map_or(true, Value::is_null)
    }

    /// The raw value behind a key, skipping `null`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    fn required(&self, key: &'static str) -> Result<&'a Value> {
        self.get(key).ok_or(Error::Decode(key, NULL))
    }

    /// Reads a snowflake, which Discord sends as a string but which is accepted as a number too.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the field is missing or not an unsigned 64-bit integer.
    pub fn snowflake(&self, key: &'static str) -> Result<u64> {
        let value = self.required(key)?;
        snowflake_from_value(value).ok_or_else(|| Error::Decode(key, value.clone()))
    }

    /// Reads an optional snowflake.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the field is present but malformed.
    pub fn opt_snowflake(&self, key: &'static str) -> Result<Option<u64>> {
        match self.get(key) {
            Some(value) => snowflake_from_value(value)
                .map(Some)
                .ok_or_else(|| Error::Decode(key, value.clone())),
            None => Ok(None),
        }
    }

    /// Reads a signed integer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the field is missing or not an integer.
    pub fn i64(&self, key: &'static str) -> Result<i64> {
        let value = self.required(key)?;
        value.as_i64().ok_or_else(|| Error::Decode(key, value.clone()))
    }

    /// Reads an optional signed integer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the field is present but not an integer.
    pub fn opt_i64(&self, key: &'static str) -> Result<Option<i64>> {
        match self.get(key) {
            Some(value) => {
                value.as_i64().map(Some).ok_or_else(|| Error::Decode(key, value.clone()))
            },
            None => Ok(None),
        }
    }

    /// Reads a signed integer that must fit in `T`, falling back to `default` when absent or
    /// `null`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the field is present but out of range or not an integer.
    pub fn int_or<T>(&self, key: &'static str, default: T) -> Result<T>
    where
        T: TryFrom<i64>,
    {
        match self.get(key) {
            Some(value) => value
                .as_i64()
                .and_then(|v| T::try_from(v).ok())
                .ok_or_else(|| Error::Decode(key, value.clone())),
            None => Ok(default),
        }
    }

    /// Reads an unsigned integer that must fit in `T`, falling back to `default`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the field is present but negative, too large or not an
    /// integer.
    pub fn uint_or<T>(&self, key: &'static str, default: T) -> Result<T>
    where
        T: TryFrom<u64>,
    {
        match self.get(key) {
            Some(value) => value
                .as_u64()
                .and_then(|v| T::try_from(v).ok())
                .ok_or_else(|| Error::Decode(key, value.clone())),
            None => Ok(default),
        }
    }

    /// Reads a string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the field is missing or not a string.
    pub fn str(&self, key: &'static str) -> Result<&'a str> {
        let value = self.required(key)?;
        value.as_str().ok_or_else(|| Error::Decode(key, value.clone()))
    }

    /// Reads an optional string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the field is present but not a string.
    pub fn opt_str(&self, key: &'static str) -> Result<Option<&'a str>> {
        match self.get(key) {
            Some(value) => {
                value.as_str().map(Some).ok_or_else(|| Error::Decode(key, value.clone()))
            },
            None => Ok(None),
        }
    }

    /// Reads a boolean, falling back to `default` when absent or `null`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the field is present but not a boolean.
    pub fn bool_or(&self, key: &'static str, default: bool) -> Result<bool> {
        match self.get(key) {
            Some(value) => value.as_bool().ok_or_else(|| Error::Decode(key, value.clone())),
            None => Ok(default),
        }
    }

    /// Reads a nested object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the field is missing or not an object.
    pub fn object(&self, key: &'static str) -> Result<Payload<'a>> {
        let value = self.required(key)?;
        Payload::new(value).map_err(|_| Error::Decode(key, value.clone()))
    }

    /// Reads an optional nested object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the field is present but not an object.
    pub fn opt_object(&self, key: &'static str) -> Result<Option<Payload<'a>>> {
        match self.get(key) {
            Some(value) => {
                Payload::new(value).map(Some).map_err(|_| Error::Decode(key, value.clone()))
            },
            None => Ok(None),
        }
    }

    /// Reads an array, treating absent and `null` as empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the field is present but not an array.
    pub fn array(&self, key: &'static str) -> Result<&'a [Value]> {
        match self.get(key) {
            Some(Value::Array(values)) => Ok(values),
            Some(other) => Err(Error::Decode(key, other.clone())),
            None => Ok(&[]),
        }
    }

    /// Deserializes a field with serde.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the field is missing, or [`Error::Json`] if it does not
    /// match `T`.
    pub fn decode<T: DeserializeOwned>(&self, key: &'static str) -> Result<T> {
        from_value(self.required(key)?.clone())
    }

    /// Deserializes an optional field with serde.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the field is present but does not match `T`.
    pub fn opt_decode<T: DeserializeOwned>(&self, key: &'static str) -> Result<Option<T>> {
        self.get(key).map(|v| from_value(v.clone())).transpose()
    }
}

fn snowflake_from_value(value: &Value) -> Option<u64> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_and_absent_are_distinguishable() {
        let value = json!({"a": null, "b": 3});
        let payload = Payload::new(&value).unwrap();

        assert!(payload.has_key("a"));
        assert!(payload.is_null("a"));
        assert!(!payload.has_key("c"));
        assert!(payload.is_null("c"));
        assert!(!payload.is_null("b"));
        assert_eq!(payload.opt_i64("a").unwrap(), None);
    }

    #[test]
    fn snowflakes_accept_strings_and_numbers() {
        let value = json!({"s": "175928847299117063", "n": 81384788765712384_u64, "bad": "x"});
        let payload = Payload::new(&value).unwrap();

        assert_eq!(payload.snowflake("s").unwrap(), 175928847299117063);
        assert_eq!(payload.snowflake("n").unwrap(), 81384788765712384);
        assert!(matches!(payload.snowflake("bad"), Err(Error::Decode("bad", _))));
        assert!(matches!(payload.snowflake("missing"), Err(Error::Decode("missing", _))));
    }

    #[test]
    fn unsigned_width_is_checked() {
        let value = json!({"small": 12, "big": 300, "neg": -1});
        let payload = Payload::new(&value).unwrap();

        assert_eq!(payload.uint_or::<u8>("small", 0).unwrap(), 12);
        assert!(payload.uint_or::<u8>("big", 0).is_err());
        assert!(payload.uint_or::<u32>("neg", 0).is_err());
        assert_eq!(payload.uint_or::<u8>("missing", 7).unwrap(), 7);
    }

    #[test]
    fn signed_width_is_checked() {
        let value = json!({"position": -3, "huge": 4_294_967_296_i64, "text": "1"});
        let payload = Payload::new(&value).unwrap();

        assert_eq!(payload.int_or::<i32>("position", 0).unwrap(), -3);
        assert!(matches!(payload.int_or::<i32>("huge", 0), Err(Error::Decode("huge", _))));
        assert!(matches!(payload.int_or::<i32>("text", 0), Err(Error::Decode("text", _))));
        assert_eq!(payload.int_or::<i32>("missing", 5).unwrap(), 5);
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let value = json!([1, 2, 3]);
        assert!(matches!(Payload::new(&value), Err(Error::Decode("payload", _))));
    }
}
