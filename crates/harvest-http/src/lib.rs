#![warn(missing_docs)]

//! Provides [`tower`] implementations for the HTTP requests the harvester sends

use std::{fmt::Debug, time::Duration};

/// Install ring as the default rustls crypto provider. This runs automatically
/// as a global constructor in every binary that links harvest-http (directly or
/// transitively).
#[ctor::ctor]
fn install_ring_crypto_provider() {
    // .ok() because the provider may already be installed, and that's the only
    // case that causes this to error
    rustls::crypto::ring::default_provider()
        .install_default()
        .ok();
}

use buildstructor::Builder;
use bytes::Bytes;
use derive_getters::Getters;
pub use http_body::Body;
pub use http_body_util::{BodyExt, Empty, Full};
use tower::{timeout::error::Elapsed, util::BoxCloneService};

pub mod body;
mod error;
pub mod error_on_status;
mod reqwest;

pub use error::HttpServiceError;
pub use reqwest::ReqwestService;

/// Per-request timeout used when [`HttpServiceConfig::timeout`] is not set
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Ease-of-use synonym for the request type this crate operates on
pub type HttpRequest = http::Request<Full<Bytes>>;
/// Ease-of-use synonym for the response type this crate operates on
pub type HttpResponse<T = Full<Bytes>> = http::Response<T>;
/// Ease-of-use synonym for the [`tower::Service`] type this crate provides
pub type HttpService = BoxCloneService<HttpRequest, HttpResponse, HttpServiceError>;

/// Configuration object for constructing an [`HttpService`].
/// This is intended to be agnostic to the underlying implementation
#[derive(Clone, Debug, Builder, Default, Getters)]
pub struct HttpServiceConfig {
    timeout: Option<Duration>,
}

impl From<Box<dyn std::error::Error + Send + Sync>> for HttpServiceError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        match err.downcast::<Elapsed>() {
            Ok(_) => HttpServiceError::TimedOut,
            Err(err) => match err.downcast::<::reqwest::Error>() {
                Ok(err) => HttpServiceError::from(*err),
                Err(err) => match err.downcast::<HttpServiceError>() {
                    Ok(err) => *err,
                    Err(err) => HttpServiceError::Unexpected(err),
                },
            },
        }
    }
}
