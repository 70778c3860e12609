//! Protected route patterns.
//!
//! A pattern is an optional HTTP method followed by a path made of segments:
//!
//! - a literal such as `api`, matched exactly,
//! - `:name`, matching exactly one segment,
//! - a final `:name*` or `*`, matching zero or more remaining segments.
//!
//! ```
//! use http::Method;
//! use x402_paywall::routes::RoutePattern;
//!
//! let pattern: RoutePattern = "POST /api/random/:path*".parse().unwrap();
//! assert!(pattern.matches(&Method::POST, "/api/random"));
//! assert!(pattern.matches(&Method::POST, "/api/random/a/b"));
//! assert!(!pattern.matches(&Method::GET, "/api/random"));
//! ```

use std::{fmt::Display, str::FromStr};

use http::Method;
use x402_core::transport::PaymentRequirements;
use x402_kit::{
    price::{Price, PriceError},
    schemes::exact_evm::ExactEvm,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("route pattern must not be empty")]
    Empty,
    #[error("route pattern '{0}' must start with '/'")]
    MissingLeadingSlash(String),
    #[error("route pattern '{0}' has an invalid method")]
    InvalidMethod(String),
    #[error("route pattern '{0}' has a parameter without a name")]
    UnnamedParameter(String),
    #[error("route pattern '{0}' has a wildcard that is not the last segment")]
    WildcardNotLast(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param,
    Rest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    source: String,
    method: Option<Method>,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Whether a request with `method` and `path` falls under this pattern.
    ///
    /// Empty path segments are ignored, so `/api/random/` matches `/api/random`.
    pub fn matches(&self, method: &Method, path: &str) -> bool {
        if self.method.as_ref().is_some_and(|m| m != method) {
            return false;
        }

        let mut parts = path.split('/').filter(|p| !p.is_empty());
        for segment in &self.segments {
            match segment {
                Segment::Rest => return true,
                Segment::Param => {
                    if parts.next().is_none() {
                        return false;
                    }
                }
                Segment::Literal(literal) => {
                    if parts.next() != Some(literal.as_str()) {
                        return false;
                    }
                }
            }
        }
        parts.next().is_none()
    }

    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl FromStr for RoutePattern {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let source = s.trim();
        if source.is_empty() {
            return Err(RouteError::Empty);
        }

        let (method, path) = match source.split_once(char::is_whitespace) {
            Some((method, path)) => {
                let method = method
                    .to_ascii_uppercase()
                    .parse::<Method>()
                    .map_err(|_| RouteError::InvalidMethod(source.to_string()))?;
                (Some(method), path.trim())
            }
            None => (None, source),
        };

        if !path.starts_with('/') {
            return Err(RouteError::MissingLeadingSlash(source.to_string()));
        }

        let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
        let last = parts.len().saturating_sub(1);
        let mut segments = Vec::with_capacity(parts.len());

        for (index, part) in parts.into_iter().enumerate() {
            let segment = if part == "*" || (part.starts_with(':') && part.ends_with('*')) {
                if part.len() == 2 {
                    return Err(RouteError::UnnamedParameter(source.to_string()));
                }
                if index != last {
                    return Err(RouteError::WildcardNotLast(source.to_string()));
                }
                Segment::Rest
            } else if let Some(name) = part.strip_prefix(':') {
                if name.is_empty() {
                    return Err(RouteError::UnnamedParameter(source.to_string()));
                }
                Segment::Param
            } else {
                Segment::Literal(part.to_string())
            };
            segments.push(segment);
        }

        Ok(RoutePattern {
            source: source.to_string(),
            method,
            segments,
        })
    }
}

impl Display for RoutePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

/// A route pattern and the payment it costs.
#[derive(Debug, Clone)]
pub struct ProtectedRoute {
    pub pattern: RoutePattern,
    pub requirements: PaymentRequirements,
    /// Human-readable price, reported to the handler as the cost of the call.
    pub price: Price,
}

impl ProtectedRoute {
    /// Protect `pattern` with an exact USDC payment.
    pub fn exact_evm(pattern: RoutePattern, scheme: &ExactEvm) -> Result<Self, PriceError> {
        Ok(ProtectedRoute {
            pattern,
            requirements: scheme.requirements()?,
            price: scheme.price,
        })
    }

    pub fn matches(&self, method: &Method, path: &str) -> bool {
        self.pattern.matches(method, path)
    }
}
