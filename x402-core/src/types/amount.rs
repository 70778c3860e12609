//! [`AmountValue`]: an asset amount in atomic units.

use std::{fmt::Display, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Serialize};

/// An amount of some asset, expressed in the asset's smallest unit.
///
/// x402 transmits amounts as decimal strings (`"10000"`) so that values wider
/// than a JSON number survive the round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AmountValue(pub u128);

macro_rules! amount_from_unsigned {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for AmountValue {
                fn from(value: $ty) -> Self {
                    AmountValue(value as u128)
                }
            }
        )*
    };
}

amount_from_unsigned!(u8, u16, u32, u64, u128);

impl FromStr for AmountValue {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u128>().map(AmountValue)
    }
}

impl Display for AmountValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for AmountValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AmountValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_decimal_string() {
        let json = serde_json::to_value(AmountValue(10_000)).unwrap();
        assert_eq!(json, serde_json::json!("10000"));
    }

    #[test]
    fn rejects_numeric_json() {
        let result = serde_json::from_value::<AmountValue>(serde_json::json!(10000));
        assert!(result.is_err(), "amounts must be transmitted as strings");
    }

    #[test]
    fn rejects_negative_strings() {
        assert!("-1".parse::<AmountValue>().is_err());
    }
}
