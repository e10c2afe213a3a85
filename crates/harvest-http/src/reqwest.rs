use std::pin::Pin;

use buildstructor::buildstructor;
use futures::Future;
use http_body_util::Full;
use reqwest::ClientBuilder;
use tower::{util::BoxCloneService, Service, ServiceBuilder, ServiceExt};

use crate::{
    body::body_to_bytes, HttpRequest, HttpResponse, HttpService, HttpServiceConfig,
    HttpServiceError, DEFAULT_TIMEOUT,
};

/// A [`Service`] that wraps a [`reqwest`] client and uses [`http`] constructs for requests and responses
#[derive(Clone, Debug)]
pub struct ReqwestService {
    client: BoxCloneService<reqwest::Request, HttpResponse, HttpServiceError>,
}

#[buildstructor]
impl ReqwestService {
    /// Constructs a new [`ReqwestService`]
    ///
    /// Every exchange, from connecting until the last byte of the response body, is bounded
    /// by the configured timeout, [`DEFAULT_TIMEOUT`] otherwise. An exchange that runs past it
    /// fails with [`HttpServiceError::TimedOut`] and is not retried.
    #[builder]
    pub fn new(
        config: Option<HttpServiceConfig>,
        client: Option<reqwest::Client>,
    ) -> Result<ReqwestService, reqwest::Error> {
        let config = config.unwrap_or_default();
        let client = match client {
            Some(client) => client,
            None => ClientBuilder::new().build()?,
        };
        let timeout = (*config.timeout()).unwrap_or(DEFAULT_TIMEOUT);
        tracing::debug!(?timeout, "building reqwest service");
        let client = ServiceBuilder::new()
            .map_err(HttpServiceError::from)
            .timeout(timeout)
            .service_fn(move |req| exchange(client.clone(), req))
            .boxed_clone();
        Ok(ReqwestService { client })
    }
}

/// Sends `req` and reads the whole response body
async fn exchange(
    client: reqwest::Client,
    req: reqwest::Request,
) -> Result<HttpResponse, HttpServiceError> {
    let mut resp = http::Response::from(client.execute(req).await?);
    let bytes = body_to_bytes(&mut resp)
        .await
        .map_err(|err| HttpServiceError::Body(Box::new(err)))?;
    tracing::trace!(status = %resp.status(), len = bytes.len(), "received response");
    Ok(resp.map(|_| Full::new(bytes)))
}

impl From<reqwest::Error> for HttpServiceError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_body() {
            HttpServiceError::Body(value.into())
        } else if value.is_connect() {
            HttpServiceError::Connect(value.into())
        } else if value.is_timeout() {
            HttpServiceError::TimedOut
        } else {
            HttpServiceError::Unexpected(value.into())
        }
    }
}

impl Service<HttpRequest> for ReqwestService {
    type Response = HttpResponse;
    type Error = HttpServiceError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.client.poll_ready(cx)
    }

    fn call(&mut self, mut req: HttpRequest) -> Self::Future {
        let mut client = harvest_tower::service::replace_ready_service::<_, reqwest::Request>(
            &mut self.client,
        );
        let fut = async move {
            let bytes = body_to_bytes(&mut req)
                .await
                .map_err(|err| HttpServiceError::Body(Box::new(err)))?;
            let body = reqwest::Body::from(bytes);
            let req = req.map(move |_| body);
            let req = reqwest::Request::try_from(req)?;
            tracing::trace!(method = %req.method(), url = %req.url(), "sending request");
            client.call(req).await
        };
        Box::pin(fut)
    }
}

impl From<ReqwestService> for HttpService {
    fn from(value: ReqwestService) -> Self {
        value.boxed_clone()
    }
}
