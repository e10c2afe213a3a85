use std::{fmt, time::Duration};

use harvest_client::QueryDescriptor;
use harvest_graphql::{GraphQLLayer, GraphQLRequest, GraphQLService, GraphQLServiceError};
use harvest_http::{
    error_on_status::{ErrorOnStatus, ErrorOnStatusLayer},
    HttpService, HttpServiceError,
};
use harvest_std::{errln, infoln, successln, warnln, Style};
use serde_json::{Map, Value};
use tower::{Service, ServiceBuilder, ServiceExt};
use url::Url;

use crate::{eligibility::ineligibility, sink::Sink, synthesize::synthesize};

/// The `data` object of a harvest response, keyed by query name
type Payload = Map<String, Value>;

/// Why a query was passed over without being saved
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// At least one argument is `NON_NULL`
    RequiresArgs,
    /// Output from an earlier run is already in the sink
    Exists,
    /// Nothing could be selected without a nested selection set
    NoScalarFields,
    /// The endpoint answered with a `null` or missing payload
    Empty,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SkipReason::RequiresArgs => "requires-args",
            SkipReason::Exists => "exists",
            SkipReason::NoScalarFields => "no-scalar-fields",
            SkipReason::Empty => "empty",
        })
    }
}

/// Why fetching or saving a query failed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureReason {
    /// Connection failure, timeout, or any other error below HTTP
    Transport,
    /// A status outside of 2xx
    HttpStatus,
    /// A body that is not a GraphQL response document
    BadJson,
    /// A response carrying a top-level `errors` array
    GraphQLError,
    /// The payload arrived but could not be stored
    Sink,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureReason::Transport => "transport",
            FailureReason::HttpStatus => "http-status",
            FailureReason::BadJson => "bad-json",
            FailureReason::GraphQLError => "graphql-error",
            FailureReason::Sink => "sink",
        })
    }
}

/// Terminal state of one query
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Saved,
    Skipped(SkipReason),
    Failed(FailureReason),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Saved => f.write_str("saved"),
            Outcome::Skipped(reason) => write!(f, "skipped ({reason})"),
            Outcome::Failed(reason) => write!(f, "failed ({reason})"),
        }
    }
}

/// Every outcome of a batch, in enumeration order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HarvestReport {
    outcomes: Vec<(String, Outcome)>,
}

impl HarvestReport {
    pub fn record(&mut self, name: impl Into<String>, outcome: Outcome) {
        self.outcomes.push((name.into(), outcome));
    }

    pub fn outcomes(&self) -> &[(String, Outcome)] {
        &self.outcomes
    }

    pub fn outcome(&self, name: &str) -> Option<Outcome> {
        self.outcomes
            .iter()
            .find(|(recorded, _)| recorded == name)
            .map(|(_, outcome)| *outcome)
    }

    pub fn saved(&self) -> usize {
        self.count(|outcome| matches!(outcome, Outcome::Saved))
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, Outcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, Outcome::Failed(_)))
    }

    /// The failed queries with their reasons, in enumeration order
    pub fn failures(&self) -> impl Iterator<Item = (&str, FailureReason)> + '_ {
        self.outcomes.iter().filter_map(|(name, outcome)| match outcome {
            Outcome::Failed(reason) => Some((name.as_str(), *reason)),
            _ => None,
        })
    }

    fn count(&self, predicate: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| predicate(outcome))
            .count()
    }

    pub fn print(&self) {
        let summary = format!(
            "{} saved, {} skipped, {} failed",
            Style::Success.paint(self.saved().to_string()),
            Style::Skipped.paint(self.skipped().to_string()),
            Style::Failure.paint(self.failed().to_string()),
        );
        if self.failed() == 0 {
            successln!("Harvest complete: {summary}");
        } else {
            warnln!("Harvest complete with failures: {summary}");
            for (name, reason) in self.failures() {
                errln!(
                    "{} {}",
                    Style::Query.paint(name),
                    Style::Failure.paint(reason.to_string())
                );
            }
        }
    }
}

/// Drives descriptors through eligibility, synthesis, one fetch, and the sink.
///
/// Queries are processed strictly one at a time, and the configured delay is
/// slept after every query regardless of how it ended.
pub struct Harvester<K> {
    service: GraphQLService<ErrorOnStatus<HttpService>>,
    sink: K,
    delay: Duration,
}

impl<K: Sink> Harvester<K> {
    pub fn new(endpoint: Url, http_service: HttpService, sink: K, delay: Duration) -> Harvester<K> {
        let service = ServiceBuilder::new()
            .layer(GraphQLLayer::new(endpoint))
            .layer(ErrorOnStatusLayer)
            .service(http_service);
        Harvester {
            service,
            sink,
            delay,
        }
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Runs every descriptor in order. A failing query never stops the batch.
    pub async fn run(&mut self, descriptors: &[QueryDescriptor]) -> HarvestReport {
        let mut report = HarvestReport::default();
        for descriptor in descriptors {
            infoln!("Query Name: {}", Style::Query.paint(&descriptor.name));
            let outcome = self.harvest(descriptor).await;
            tracing::debug!(name = %descriptor.name, %outcome, "query finished");
            report.record(descriptor.name.as_str(), outcome);
            tokio::time::sleep(self.delay).await;
        }
        report
    }

    /// Takes one descriptor to its terminal state, without the trailing delay
    pub async fn harvest(&mut self, descriptor: &QueryDescriptor) -> Outcome {
        let name = descriptor.name.as_str();
        if let Some(reason) = ineligibility(descriptor, |name| self.sink.exists(name)) {
            infoln!("Skipping {}: {}", name, Style::Skipped.paint(reason.to_string()));
            return Outcome::Skipped(reason);
        }

        let Some(query) = synthesize(descriptor) else {
            let reason = SkipReason::NoScalarFields;
            infoln!("Skipping {}: {}", name, Style::Skipped.paint(reason.to_string()));
            return Outcome::Skipped(reason);
        };

        let payload = match self.fetch(name, query).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                let reason = SkipReason::Empty;
                infoln!("Skipping {}: {}", name, Style::Skipped.paint(reason.to_string()));
                return Outcome::Skipped(reason);
            }
            Err(reason) => return Outcome::Failed(reason),
        };

        match self.sink.write(name, &payload) {
            Ok(path) => {
                successln!("Saved {}", Style::Path.paint(path.as_str()));
                Outcome::Saved
            }
            Err(err) => {
                errln!("Could not save {}: {:#}", name, anyhow::Error::from(err));
                Outcome::Failed(FailureReason::Sink)
            }
        }
    }

    /// POSTs `query` once and extracts `data.<name>`. `Ok(None)` means the
    /// endpoint answered without a payload.
    async fn fetch(&mut self, name: &str, query: String) -> Result<Option<Value>, FailureReason> {
        let request = GraphQLRequest::<Payload>::new(query);
        let result = match ServiceExt::<GraphQLRequest<Payload>>::ready(&mut self.service).await {
            Ok(service) => service.call(request).await,
            Err(err) => Err(err),
        };
        match result {
            Ok(mut data) => Ok(data.remove(name).filter(|payload| !payload.is_null())),
            Err(GraphQLServiceError::NoData) => Ok(None),
            Err(err) => Err(failure(name, err)),
        }
    }
}

/// Logs `err` and classifies it
fn failure(name: &str, err: GraphQLServiceError<Payload>) -> FailureReason {
    match err {
        GraphQLServiceError::UpstreamService(HttpServiceError::BadStatusCode {
            status_code,
            ..
        }) => {
            errln!("HTTP error for {}: {}", name, status_code);
            FailureReason::HttpStatus
        }
        GraphQLServiceError::Deserialization {
            error, status_code, ..
        } => {
            errln!("Malformed response for {} (status {}): {}", name, status_code, error);
            FailureReason::BadJson
        }
        GraphQLServiceError::Errors {
            raw_errors,
            friendly_errors_detail,
            ..
        } => {
            let detail = serde_json::to_string_pretty(&raw_errors)
                .unwrap_or_else(|_| friendly_errors_detail.join("\n"));
            errln!("GraphQL errors for {}:\n{}", name, detail);
            FailureReason::GraphQLError
        }
        err => {
            errln!("Request for {} failed: {}", name, err);
            tracing::debug!(?err, "transport failure");
            FailureReason::Transport
        }
    }
}
