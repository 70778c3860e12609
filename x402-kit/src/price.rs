//! Human-readable prices such as `"$0.01"`.
//!
//! Prices are configured in dollars and converted to the atomic units of the
//! settlement asset when payment requirements are built. The conversion is
//! exact integer arithmetic; a price that cannot be represented in the asset's
//! precision is an error rather than being rounded.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use x402_core::types::AmountValue;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceError {
    #[error("price must not be empty")]
    Empty,
    #[error("invalid price '{0}': expected a decimal amount such as $0.01")]
    Malformed(String),
    #[error("price '{price}' has more than {decimals} decimal places")]
    TooPrecise { price: String, decimals: u8 },
    #[error("price '{0}' is too large")]
    Overflow(String),
}

/// A non-negative decimal dollar amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Price {
    mantissa: u128,
    scale: u32,
}

impl Price {
    /// Convert to atomic units of an asset with `decimals` decimal places.
    ///
    /// ```
    /// use x402_kit::price::Price;
    /// use x402_core::types::AmountValue;
    ///
    /// let price: Price = "$0.01".parse().unwrap();
    /// assert_eq!(price.to_atomic_units(6).unwrap(), AmountValue(10_000));
    /// ```
    pub fn to_atomic_units(&self, decimals: u8) -> Result<AmountValue, PriceError> {
        let decimals_u32 = u32::from(decimals);
        if self.scale > decimals_u32 {
            let excess = 10u128.pow(self.scale - decimals_u32);
            if self.mantissa % excess != 0 {
                return Err(PriceError::TooPrecise {
                    price: self.to_string(),
                    decimals,
                });
            }
            return Ok(AmountValue(self.mantissa / excess));
        }

        10u128
            .checked_pow(decimals_u32 - self.scale)
            .and_then(|factor| self.mantissa.checked_mul(factor))
            .map(AmountValue)
            .ok_or_else(|| PriceError::Overflow(self.to_string()))
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa == 0
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PriceError::Empty);
        }
        let digits = trimmed.strip_prefix('$').unwrap_or(trimmed);
        let malformed = || PriceError::Malformed(s.to_string());

        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (digits, ""),
        };

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty())
            || !all_digits(whole)
            || !all_digits(fraction)
        {
            return Err(malformed());
        }
        if digits.ends_with('.') {
            return Err(malformed());
        }

        // 10^38 is the largest power of ten a u128 holds.
        if fraction.len() > 38 {
            return Err(malformed());
        }
        let scale = fraction.len() as u32;
        let mantissa = format!("{whole}{fraction}")
            .parse::<u128>()
            .map_err(|_| PriceError::Overflow(s.to_string()))?;

        Ok(Price { mantissa, scale })
    }
}

/// Formats as `$<amount>`, keeping the configured number of decimal places.
impl Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.scale == 0 {
            return write!(f, "${}", self.mantissa);
        }
        let divisor = 10u128.pow(self.scale);
        write!(
            f,
            "${}.{:0width$}",
            self.mantissa / divisor,
            self.mantissa % divisor,
            width = self.scale as usize
        )
    }
}

impl Serialize for Price {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
