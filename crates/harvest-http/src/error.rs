use bytes::Bytes;
use http::StatusCode;

/// Failures produced while moving a single request over the wire
#[derive(thiserror::Error, Debug)]
pub enum HttpServiceError {
    /// The server answered with a status outside of 2xx
    #[error("Bad status code: {status_code}")]
    BadStatusCode {
        /// The status the server answered with
        status_code: StatusCode,
        /// The raw response body
        data: Bytes,
    },
    /// The request could not be assembled
    #[error("HTTP error: {:?}", .0)]
    Http(#[from] http::Error),
    /// No response arrived within the configured timeout
    #[error("Request timed out")]
    TimedOut,
    /// The request or response body could not be streamed
    #[error("Body error: {:?}", .0)]
    Body(Box<dyn std::error::Error + Send + Sync + 'static>),
    /// No connection could be established
    #[error("Connect error: {:?}", .0)]
    Connect(Box<dyn std::error::Error + Send + Sync + 'static>),
    /// Anything the variants above do not cover
    #[error("Unexpected HTTP error: {:?}", .0)]
    Unexpected(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl HttpServiceError {
    /// Whether a connection was never established
    pub fn is_connect(&self) -> bool {
        matches!(self, HttpServiceError::Connect(_))
    }
    /// Whether the request ran past its timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, HttpServiceError::TimedOut)
    }
    /// Whether the server answered with a non-2xx status
    pub fn is_status(&self) -> bool {
        matches!(self, HttpServiceError::BadStatusCode { .. })
    }
}
