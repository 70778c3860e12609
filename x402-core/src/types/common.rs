//! Small shared types used across the x402 wire format.

use std::fmt::Display;

use base64::{Engine, prelude::BASE64_STANDARD};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// String-keyed map used for free-form protocol objects.
pub type Record<V> = std::collections::HashMap<String, V>;

/// Arbitrary JSON value.
pub type AnyJson = serde_json::Value;

/// Marker for payloads that must be `"x402Version": 1`.
///
/// Deserializing any other version fails, which lets a payment gate reject
/// payloads it cannot process before contacting a facilitator.
///
/// ```
/// use x402_core::types::X402V1;
///
/// let v: X402V1 = serde_json::from_value(serde_json::json!(1)).unwrap();
/// assert_eq!(serde_json::to_value(v).unwrap(), serde_json::json!(1));
/// assert!(serde_json::from_value::<X402V1>(serde_json::json!(2)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct X402V1;

impl TryFrom<u8> for X402V1 {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(X402V1),
            other => Err(format!("unsupported x402 version {other}; expected 1")),
        }
    }
}

impl From<X402V1> for u8 {
    fn from(_: X402V1) -> Self {
        1
    }
}

impl Display for X402V1 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("1")
    }
}

/// Any protocol version a facilitator may advertise.
///
/// Facilitators list both v1 and v2 kinds from `/supported`; this type lets
/// those lists deserialize without failing on kinds we never use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum X402Version {
    V1,
    V2,
}

impl X402Version {
    pub fn is_v1(&self) -> bool {
        matches!(self, X402Version::V1)
    }
}

impl TryFrom<u8> for X402Version {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(X402Version::V1),
            2 => Ok(X402Version::V2),
            other => Err(format!("unsupported x402 version {other}; expected 1 or 2")),
        }
    }
}

impl From<X402Version> for u8 {
    fn from(value: X402Version) -> Self {
        match value {
            X402Version::V1 => 1,
            X402Version::V2 => 2,
        }
    }
}

impl Display for X402Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// A base64-encoded JSON document carried in an HTTP header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Base64EncodedHeader(pub String);

impl Base64EncodedHeader {
    /// Serialize `value` to JSON and base64-encode it.
    pub fn encode<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        let json = serde_json::to_vec(value)?;
        Ok(Base64EncodedHeader(BASE64_STANDARD.encode(json)))
    }

    /// Base64-decode the header and parse the JSON inside.
    pub fn decode<T: DeserializeOwned>(&self) -> crate::errors::Result<T> {
        let bytes = BASE64_STANDARD.decode(self.0.trim())?;
        let json = String::from_utf8(bytes)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Base64EncodedHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn version_accepts_v1_and_v2() {
        let v1: X402Version = serde_json::from_value(json!(1)).unwrap();
        let v2: X402Version = serde_json::from_value(json!(2)).unwrap();
        assert!(v1.is_v1());
        assert!(!v2.is_v1());
        assert!(serde_json::from_value::<X402Version>(json!(3)).is_err());
    }

    #[test]
    fn decode_rejects_garbage() {
        let header = Base64EncodedHeader("not base64!!".to_string());
        let err = header.decode::<AnyJson>().unwrap_err();
        assert!(matches!(err, crate::errors::Error::Base64DecodeError(_)));

        let header = Base64EncodedHeader(BASE64_STANDARD.encode("{ nope"));
        let err = header.decode::<AnyJson>().unwrap_err();
        assert!(matches!(err, crate::errors::Error::SerdeJsonError(_)));
    }

    #[test]
    fn decode_tolerates_surrounding_whitespace() {
        let header = Base64EncodedHeader::encode(&json!({"a": 1})).unwrap();
        let padded = Base64EncodedHeader(format!("  {}\n", header.0));
        assert_eq!(padded.decode::<AnyJson>().unwrap(), json!({"a": 1}));
    }
}
