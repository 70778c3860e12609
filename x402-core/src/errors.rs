/// Errors raised while decoding x402 header payloads.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The decoded bytes were not the expected JSON document.
    #[error("invalid JSON payload: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// The header value was not valid base64.
    #[error("invalid base64 encoding: {0}")]
    Base64DecodeError(#[from] base64::DecodeError),

    /// The decoded bytes were not valid UTF-8.
    #[error("invalid UTF-8 in decoded payload: {0}")]
    Utf8DecodeError(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, Error>;
