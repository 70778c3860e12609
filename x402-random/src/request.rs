//! Request body validation.
//!
//! The body is a JSON object with optional integer `min` and `max` members.
//! An empty body asks for the default range.

use serde::Serialize;
use serde_json::{Map, Number, Value};

pub const DEFAULT_MIN: i64 = 1;
pub const DEFAULT_MAX: i64 = 100;

/// An inclusive integer range with `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Range {
    min: i64,
    max: i64,
}

impl Range {
    pub fn new(min: i64, max: i64) -> Result<Self, ValidationError> {
        if min > max {
            return Err(ValidationError::MinGreaterThanMax { min, max });
        }
        Ok(Range { min, max })
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }
}

impl Default for Range {
    fn default() -> Self {
        Range {
            min: DEFAULT_MIN,
            max: DEFAULT_MAX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("request body must be valid JSON")]
    InvalidJson,
    #[error("request body must be a JSON object")]
    NotAnObject,
    #[error("`{0}` must be a finite number")]
    NotANumber(&'static str),
    #[error("`{0}` must be an integer")]
    NotAnInteger(&'static str),
    #[error("`{0}` is out of range")]
    OutOfRange(&'static str),
    #[error("`min` ({min}) must be less than or equal to `max` ({max})")]
    MinGreaterThanMax { min: i64, max: i64 },
}

/// Parse a request body into a validated [`Range`].
pub fn parse_range(body: &[u8]) -> Result<Range, ValidationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Range::default());
    }

    let value: Value = serde_json::from_slice(body).map_err(|_| ValidationError::InvalidJson)?;
    let Value::Object(fields) = value else {
        return Err(ValidationError::NotAnObject);
    };

    let min = bound(&fields, "min")?.unwrap_or(DEFAULT_MIN);
    let max = bound(&fields, "max")?.unwrap_or(DEFAULT_MAX);
    Range::new(min, max)
}

/// `None` when the member is absent or `null`.
fn bound(fields: &Map<String, Value>, name: &'static str) -> Result<Option<i64>, ValidationError> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => integer(number, name).map(Some),
        Some(_) => Err(ValidationError::NotANumber(name)),
    }
}

fn integer(number: &Number, name: &'static str) -> Result<i64, ValidationError> {
    if let Some(n) = number.as_i64() {
        return Ok(n);
    }
    if number.is_u64() {
        return Err(ValidationError::OutOfRange(name));
    }

    let float = number.as_f64().ok_or(ValidationError::NotANumber(name))?;
    if !float.is_finite() {
        return Err(ValidationError::NotANumber(name));
    }
    if float.fract() != 0.0 {
        return Err(ValidationError::NotAnInteger(name));
    }
    // i64::MAX rounds up to 2^63 as an f64, so the upper bound is exclusive.
    if float < i64::MIN as f64 || float >= i64::MAX as f64 {
        return Err(ValidationError::OutOfRange(name));
    }
    Ok(float as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<Range, ValidationError> {
        parse_range(body.as_bytes())
    }

    #[test]
    fn empty_body_uses_defaults() {
        for body in ["", "  \n", "{}", r#"{"min": null, "max": null}"#] {
            assert_eq!(parse(body), Ok(Range::default()), "{body:?}");
        }
        assert_eq!(Range::default(), Range::new(1, 100).unwrap());
    }

    #[test]
    fn partial_bounds_fill_in_defaults() {
        assert_eq!(parse(r#"{"min": 50}"#), Ok(Range::new(50, 100).unwrap()));
        assert_eq!(parse(r#"{"max": 5}"#), Ok(Range::new(1, 5).unwrap()));
        assert_eq!(
            parse(r#"{"min": -10, "max": -3}"#),
            Ok(Range::new(-10, -3).unwrap())
        );
    }

    #[test]
    fn accepts_integral_floats() {
        assert_eq!(
            parse(r#"{"min": 5.0, "max": 1e2}"#),
            Ok(Range::new(5, 100).unwrap())
        );
    }

    #[test]
    fn single_point_range_is_valid() {
        assert_eq!(
            parse(r#"{"min": 5, "max": 5}"#),
            Ok(Range::new(5, 5).unwrap())
        );
    }

    #[test]
    fn min_greater_than_max_is_rejected() {
        let err = parse(r#"{"min": 10, "max": 1}"#).unwrap_err();
        assert_eq!(err, ValidationError::MinGreaterThanMax { min: 10, max: 1 });
        assert_eq!(
            err.to_string(),
            "`min` (10) must be less than or equal to `max` (1)"
        );

        assert!(matches!(
            parse(r#"{"min": 200}"#),
            Err(ValidationError::MinGreaterThanMax { .. })
        ));
    }

    #[test]
    fn non_numbers_are_rejected() {
        assert_eq!(
            parse(r#"{"min": "5"}"#),
            Err(ValidationError::NotANumber("min"))
        );
        assert_eq!(
            parse(r#"{"max": true}"#),
            Err(ValidationError::NotANumber("max"))
        );
        assert_eq!(
            parse(r#"{"max": [1]}"#),
            Err(ValidationError::NotANumber("max"))
        );
    }

    #[test]
    fn fractional_and_huge_numbers_are_rejected() {
        assert_eq!(
            parse(r#"{"min": 5.5}"#),
            Err(ValidationError::NotAnInteger("min"))
        );
        assert_eq!(
            parse(r#"{"max": 18446744073709551615}"#),
            Err(ValidationError::OutOfRange("max"))
        );
        assert_eq!(
            parse(r#"{"min": -1e300}"#),
            Err(ValidationError::OutOfRange("min"))
        );
    }

    #[test]
    fn malformed_bodies_are_rejected() {
        assert_eq!(parse("{"), Err(ValidationError::InvalidJson));
        assert_eq!(parse("[1, 2]"), Err(ValidationError::NotAnObject));
        assert_eq!(parse("42"), Err(ValidationError::NotAnObject));
    }
}
