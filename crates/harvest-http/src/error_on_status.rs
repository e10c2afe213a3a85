//! Turns non-2xx responses into [`HttpServiceError::BadStatusCode`]
//!
//! GraphQL servers may answer with a JSON error document and a 5xx status. The
//! harvester treats any status outside of 2xx as a failed attempt, regardless
//! of what the body contains, so the check happens before any body parsing.

use harvest_tower::ResponseFuture;
use http_body_util::BodyExt;
use tower::{Layer, Service};

use crate::{HttpRequest, HttpResponse, HttpServiceError};

/// [`Layer`] that wraps a service in [`ErrorOnStatus`]
#[derive(Clone, Copy, Debug, Default)]
pub struct ErrorOnStatusLayer;

impl<S> Layer<S> for ErrorOnStatusLayer {
    type Service = ErrorOnStatus<S>;
    fn layer(&self, inner: S) -> Self::Service {
        ErrorOnStatus { inner }
    }
}

/// Fails any response whose status is not a success
#[derive(Clone, Debug)]
pub struct ErrorOnStatus<S> {
    inner: S,
}

impl<S> Service<HttpRequest> for ErrorOnStatus<S>
where
    S: Service<HttpRequest, Response = HttpResponse, Error = HttpServiceError>,
    S::Future: Send + 'static,
{
    type Response = HttpResponse;
    type Error = HttpServiceError;
    type Future = ResponseFuture<Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: HttpRequest) -> Self::Future {
        let resp = self.inner.call(req);
        Box::pin(async move {
            let resp = resp.await?;
            let status_code = resp.status();
            if status_code.is_success() {
                Ok(resp)
            } else {
                let data = resp
                    .into_body()
                    .collect()
                    .await
                    .map_err(|err| HttpServiceError::Body(Box::new(err)))?
                    .to_bytes();
                tracing::debug!(%status_code, len = data.len(), "rejecting response");
                Err(HttpServiceError::BadStatusCode { status_code, data })
            }
        })
    }
}
