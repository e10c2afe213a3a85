#![warn(missing_docs)]

//! Provides GraphQL middleware for HTTP services
//!
//! Queries are plain strings rather than compile-time generated operations,
//! because the harvester builds its query text at runtime from introspection
//! results. The response data type is chosen by the caller through
//! [`GraphQLRequest`]'s type parameter.

use std::{fmt, marker::PhantomData, str::FromStr};

use bytes::Bytes;
use harvest_http::{
    body::body_to_bytes, Full, HttpRequest, HttpResponse, HttpServiceError,
};
use harvest_tower::{service::replace_ready_service, ResponseFuture};
use http::{uri::InvalidUri, HeaderValue, Method, StatusCode, Uri};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tower::{Layer, Service};
use url::Url;

const JSON_CONTENT_TYPE: &str = "application/json";

/// A GraphQL response document.
///
/// `errors` entries are kept exactly as received; servers do not always give
/// every entry the `message` that [`GraphQLError`] requires.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct GraphQLResponse<T> {
    /// The `data` member, absent or `null` when the server produced none
    #[serde(default)]
    pub data: Option<T>,
    /// The top-level `errors` array, if any
    #[serde(default)]
    pub errors: Option<Vec<serde_json::Value>>,
}

/// Re-export of [`graphql_client::Error`], one entry of a response's `errors` array
pub type GraphQLError = graphql_client::Error;

/// Errors that may occur from using a [`GraphQLService`]
#[derive(thiserror::Error, Debug)]
pub enum GraphQLServiceError<T: Send + Sync + fmt::Debug> {
    /// Neither `data` nor `errors` were present, or `data` was `null`
    #[error("No data field provided")]
    NoData,
    /// The response carried a top-level `errors` array
    #[error("GraphQL errors returned: {}", friendly_errors_detail.join(" "))]
    Errors {
        /// Any data returned next to the errors
        data: Option<T>,
        /// The entries of `errors` that have the standard shape
        errors: Vec<GraphQLError>,
        /// Every entry of `errors`, as received
        raw_errors: Vec<serde_json::Value>,
        /// display ready decoration of `errors`
        friendly_errors_detail: Vec<String>,
    },
    /// Data serialization error
    #[error("Serialization error")]
    Serialization(serde_json::Error),
    /// The body was not a GraphQL response document, e.g. an HTML error page
    #[error("Deserialization error: {error}")]
    Deserialization {
        /// The source error
        error: serde_json::Error,
        /// The data that was attempted to be deserialized
        data: Bytes,
        /// The [`StatusCode`] of the request
        status_code: StatusCode,
    },
    /// [`http`]-related error, probably from header-related tasks
    #[error("HTTP error: {:?}", .0)]
    Http(#[from] http::Error),
    /// Error that occurs from a failure to parse a [`Uri`] from a [`Url`]
    #[error("Unable to convert URL to URI.")]
    InvalidUri(#[from] InvalidUri),
    /// Errors that occur as a result of the underlying HTTP service failing
    #[error("Upstream service error: {}", .0)]
    UpstreamService(#[from] HttpServiceError),
}

/// The JSON document POSTed to the endpoint
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct GraphQLRequestBody {
    /// The query text
    pub query: String,
    /// Variables for the query, omitted from the body when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_json::Value>,
}

/// A GraphQL request whose `data` deserializes into `T`
pub struct GraphQLRequest<T> {
    body: GraphQLRequestBody,
    data: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for GraphQLRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{:?}", self.body)
    }
}

impl<T> PartialEq for GraphQLRequest<T> {
    fn eq(&self, other: &Self) -> bool {
        self.body == other.body
    }
}

impl<T> GraphQLRequest<T> {
    /// Constructs a new [`GraphQLRequest`] with no variables
    pub fn new(query: impl Into<String>) -> GraphQLRequest<T> {
        GraphQLRequest {
            body: GraphQLRequestBody {
                query: query.into(),
                variables: None,
            },
            data: PhantomData,
        }
    }

    /// Attaches variables to the request
    pub fn with_variables(mut self, variables: serde_json::Value) -> GraphQLRequest<T> {
        self.body.variables = Some(variables);
        self
    }

    /// The body that will be sent
    pub fn body(&self) -> &GraphQLRequestBody {
        &self.body
    }
}

/// [`Layer`] that wraps a service with GraphQL middleware
#[derive(Clone, Debug)]
pub struct GraphQLLayer {
    endpoint: Url,
}

impl GraphQLLayer {
    /// Constructs a new [`GraphQLLayer`]
    pub fn new(endpoint: Url) -> GraphQLLayer {
        GraphQLLayer { endpoint }
    }
}

impl<S> Layer<S> for GraphQLLayer {
    type Service = GraphQLService<S>;
    fn layer(&self, inner: S) -> Self::Service {
        GraphQLService::new(self.endpoint.clone(), inner)
    }
}

/// Middleware that wraps a service in GraphQL functionality
#[derive(Clone, Debug)]
pub struct GraphQLService<S> {
    inner: S,
    endpoint: Url,
}

impl<S> GraphQLService<S> {
    /// Constructs a new [`GraphQLService`]
    pub fn new(endpoint: Url, inner: S) -> GraphQLService<S> {
        GraphQLService { endpoint, inner }
    }

    /// The endpoint requests are POSTed to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl<T, S> Service<GraphQLRequest<T>> for GraphQLService<S>
where
    T: DeserializeOwned + Send + Sync + fmt::Debug + 'static,
    S: Service<HttpRequest, Response = HttpResponse, Error = HttpServiceError>
        + Clone
        + Send
        + 'static,
    S::Future: Send,
{
    type Response = T;
    type Error = GraphQLServiceError<T>;
    type Future = ResponseFuture<Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner
            .poll_ready(cx)
            .map_err(GraphQLServiceError::UpstreamService)
    }

    fn call(&mut self, req: GraphQLRequest<T>) -> Self::Future {
        let mut client = replace_ready_service::<_, HttpRequest>(&mut self.inner);
        let endpoint = self.endpoint.clone();

        let fut = async move {
            let body_bytes = Bytes::from(
                serde_json::to_vec(req.body()).map_err(GraphQLServiceError::Serialization)?,
            );
            tracing::debug!(%endpoint, query = %req.body().query, "sending GraphQL request");
            let http_req = http::Request::builder()
                .uri(Uri::from_str(endpoint.as_str())?)
                .method(Method::POST)
                .header(
                    http::header::CONTENT_TYPE,
                    HeaderValue::from_static(JSON_CONTENT_TYPE),
                )
                .body(Full::new(body_bytes))?;
            let mut resp = client.call(http_req).await?;
            let status_code = resp.status();
            let data = body_to_bytes(resp.body_mut())
                .await
                .map_err(|err| HttpServiceError::Body(Box::new(err)))?;
            let graphql_response: GraphQLResponse<T> =
                serde_json::from_slice(&data).map_err(|error| {
                    GraphQLServiceError::Deserialization {
                        error,
                        data: data.clone(),
                        status_code,
                    }
                })?;

            match graphql_response.errors {
                Some(raw_errors) => {
                    let mut errors = Vec::with_capacity(raw_errors.len());
                    let mut friendly_errors_detail = Vec::with_capacity(raw_errors.len());
                    for raw in &raw_errors {
                        match serde_json::from_value::<GraphQLError>(raw.clone()) {
                            Ok(error) => {
                                friendly_errors_detail.push(error.message.clone());
                                errors.push(error);
                            }
                            Err(_) => friendly_errors_detail.push(raw.to_string()),
                        }
                    }
                    Err(GraphQLServiceError::Errors {
                        data: graphql_response.data,
                        errors,
                        raw_errors,
                        friendly_errors_detail,
                    })
                }
                None => graphql_response.data.ok_or(GraphQLServiceError::NoData),
            }
        };
        Box::pin(fut)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use anyhow::Result;
    use bytes::Bytes;
    use harvest_http::{body::body_to_bytes, HttpRequest, HttpResponse, HttpServiceError};
    use http::{HeaderValue, Method, StatusCode, Uri};
    use rstest::rstest;
    use serde::Deserialize;
    use serde_json::json;
    use speculoos::prelude::*;
    use tokio::task;
    use tower::{Service, ServiceBuilder, ServiceExt};
    use tower_test::mock;
    use url::Url;

    use super::{GraphQLLayer, GraphQLRequest, GraphQLServiceError, JSON_CONTENT_TYPE};

    #[derive(Deserialize, Debug, Eq, PartialEq)]
    struct MetadataData {
        metadata: Metadata,
    }

    #[derive(Deserialize, Debug, Eq, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Metadata {
        server_query_cache_last_updated: String,
    }

    const QUERY: &str = "query { metadata { serverQueryCacheLastUpdated } }";

    /// Sends `request` through a [`GraphQLLayer`] over a mock HTTP service that
    /// checks the outgoing request and answers with `status` and `reply`.
    async fn exchange(
        request: GraphQLRequest<MetadataData>,
        status: StatusCode,
        reply: &'static str,
    ) -> (
        Result<MetadataData, GraphQLServiceError<MetadataData>>,
        Bytes,
    ) {
        let endpoint = Url::parse("http://example.com/graphql").unwrap();
        let (mock_service, mut handle) = mock::spawn::<HttpRequest, HttpResponse>();
        let mut service = ServiceBuilder::new()
            .layer(GraphQLLayer::new(endpoint.clone()))
            .map_err(HttpServiceError::Unexpected)
            .service(mock_service.into_inner());
        let service = ServiceExt::<GraphQLRequest<MetadataData>>::ready(&mut service)
            .await
            .unwrap();
        let service_call_fut = service.call(request);

        let server = task::spawn(async move {
            let (mut actual, send_response) = handle.next_request().await.unwrap();

            assert_that!(actual.uri()).is_equal_to(&Uri::from_str(endpoint.as_str()).unwrap());
            assert_that!(actual.method()).is_equal_to(&Method::POST);
            assert_that!(actual.headers().get(http::header::CONTENT_TYPE).unwrap())
                .is_equal_to(&HeaderValue::from_static(JSON_CONTENT_TYPE));

            let request_body = body_to_bytes(actual.body_mut()).await.unwrap();

            let mock_http_response = http::Response::builder()
                .status(status)
                .body(harvest_http::Full::new(Bytes::from_static(reply.as_bytes())))
                .unwrap();
            send_response.send_response(mock_http_response);
            request_body
        });

        let result = service_call_fut.await;
        let request_body = server.await.unwrap();
        (result, request_body)
    }

    #[tokio::test]
    async fn posts_query_without_variables_and_returns_data() -> Result<()> {
        let (result, request_body) = exchange(
            GraphQLRequest::new(QUERY),
            StatusCode::OK,
            r#"{"data":{"metadata":{"serverQueryCacheLastUpdated":"2024-01-01"}}}"#,
        )
        .await;

        let sent: serde_json::Value = serde_json::from_slice(&request_body)?;
        assert_that!(sent).is_equal_to(json!({ "query": QUERY }));
        assert_that!(result).is_ok().is_equal_to(MetadataData {
            metadata: Metadata {
                server_query_cache_last_updated: "2024-01-01".to_string(),
            },
        });
        Ok(())
    }

    #[tokio::test]
    async fn posts_variables_when_present() -> Result<()> {
        let request = GraphQLRequest::new(QUERY).with_variables(json!({ "cityId": 5 }));
        let (_, request_body) = exchange(
            request,
            StatusCode::OK,
            r#"{"data":{"metadata":{"serverQueryCacheLastUpdated":"x"}}}"#,
        )
        .await;

        let sent: serde_json::Value = serde_json::from_slice(&request_body)?;
        assert_that!(sent).is_equal_to(json!({ "query": QUERY, "variables": { "cityId": 5 } }));
        Ok(())
    }

    #[rstest]
    #[case::errors_without_data(r#"{"errors":[{"message":"something went wrong"}]}"#, false)]
    #[case::errors_with_null_data(
        r#"{"data":null,"errors":[{"message":"something went wrong"}]}"#,
        false
    )]
    #[case::errors_with_data(
        r#"{"data":{"metadata":{"serverQueryCacheLastUpdated":"x"}},"errors":[{"message":"something went wrong"}]}"#,
        true
    )]
    #[tokio::test]
    async fn errors_array_is_an_error_even_with_data(
        #[case] reply: &'static str,
        #[case] has_data: bool,
    ) {
        let (result, _) = exchange(GraphQLRequest::new(QUERY), StatusCode::OK, reply).await;

        assert_that!(result).is_err().matches(|err| match err {
            GraphQLServiceError::Errors {
                data,
                errors,
                friendly_errors_detail,
                ..
            } => {
                data.is_some() == has_data
                    && errors.len() == 1
                    && friendly_errors_detail == &vec!["something went wrong".to_string()]
            }
            _ => false,
        });
    }

    #[tokio::test]
    async fn errors_without_a_message_are_still_graphql_errors() {
        let (result, _) = exchange(
            GraphQLRequest::new(QUERY),
            StatusCode::OK,
            r#"{"data":null,"errors":[{"extensions":{"code":"INTERNAL"}},{"message":"boom"}]}"#,
        )
        .await;

        assert_that!(result).is_err().matches(|err| match err {
            GraphQLServiceError::Errors {
                data,
                errors,
                raw_errors,
                friendly_errors_detail,
            } => {
                data.is_none()
                    && errors.len() == 1
                    && raw_errors
                        == &vec![
                            json!({ "extensions": { "code": "INTERNAL" } }),
                            json!({ "message": "boom" }),
                        ]
                    && friendly_errors_detail
                        == &vec![
                            r#"{"extensions":{"code":"INTERNAL"}}"#.to_string(),
                            "boom".to_string(),
                        ]
            }
            _ => false,
        });
    }

    #[rstest]
    #[case::null_data(r#"{"data":null}"#)]
    #[case::missing_data(r#"{}"#)]
    #[tokio::test]
    async fn missing_data_is_no_data(#[case] reply: &'static str) {
        let (result, _) = exchange(GraphQLRequest::new(QUERY), StatusCode::OK, reply).await;

        assert_that!(result)
            .is_err()
            .matches(|err| matches!(err, GraphQLServiceError::NoData));
    }

    #[rstest]
    #[case::ok(StatusCode::OK)]
    #[case::internal_server_error(StatusCode::INTERNAL_SERVER_ERROR)]
    #[tokio::test]
    async fn html_body_is_a_deserialization_error(#[case] expected_status_code: StatusCode) {
        let (result, _) = exchange(
            GraphQLRequest::new(QUERY),
            expected_status_code,
            "<html>Bad Gateway</html>",
        )
        .await;

        assert_that!(result).is_err().matches(|err| match err {
            GraphQLServiceError::Deserialization {
                data, status_code, ..
            } => {
                status_code == &expected_status_code
                    && data == &Bytes::from_static(b"<html>Bad Gateway</html>")
            }
            _ => false,
        });
    }
}
