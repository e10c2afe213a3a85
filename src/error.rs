use std::fmt::{self, Display};

use harvest_std::Style;

pub type HarvestResult<T> = std::result::Result<T, HarvestError>;

/// A fatal error for the whole run. Failures of a single query never become
/// one of these; they are recorded as that query's [`crate::Outcome`].
#[derive(Debug)]
pub struct HarvestError {
    error: anyhow::Error,
    suggestion: Option<Suggestion>,
}

/// A hint printed under a fatal error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Suggestion {
    RunIntrospectFirst,
    CheckEndpoint,
    CheckConfigFile,
}

impl Display for Suggestion {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suggestion = match self {
            Suggestion::RunIntrospectFirst => format!(
                "Generate the descriptor file with {} or use {} to do both steps at once.",
                Style::Query.paint("`schema-harvest introspect`"),
                Style::Query.paint("`schema-harvest run`"),
            ),
            Suggestion::CheckEndpoint => format!(
                "Check that {} points at a GraphQL endpoint with introspection enabled.",
                Style::Query.paint("--endpoint")
            ),
            Suggestion::CheckConfigFile => format!(
                "Known keys are {}.",
                Style::Query
                    .paint("endpoint, timeout_secs, delay_ms, queries, descriptors, output_dir")
            ),
        };
        write!(formatter, "{}", suggestion)
    }
}

impl HarvestError {
    pub fn new<E>(error: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Self {
            error: error.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: Suggestion) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    pub fn suggestion(&self) -> Option<Suggestion> {
        self.suggestion
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

impl Display for HarvestError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(formatter, "{} {:#}", Style::ErrorPrefix.paint("error:"), &self.error)?;
        if let Some(suggestion) = &self.suggestion {
            writeln!(formatter, "        {}", suggestion)?;
        }
        Ok(())
    }
}

impl<E: Into<anyhow::Error>> From<E> for HarvestError {
    fn from(error: E) -> Self {
        Self::new(error)
    }
}
