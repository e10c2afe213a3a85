use clap::{Args, Parser};
use harvest_client::{Introspector, QueryDescriptor};
use harvest_std::{errln, infoln, successln, warnln, Style};

use crate::{descriptors, options::Settings, HarvestError, HarvestResult, Suggestion};

#[derive(Clone, Debug, Parser)]
pub struct Introspect {
    #[clap(flatten)]
    pub selection: QuerySelection,
}

impl Introspect {
    pub async fn run(&self, settings: &Settings) -> HarvestResult<Vec<QueryDescriptor>> {
        let descriptors = self.selection.describe(settings).await?;
        descriptors::save(&settings.descriptors, &descriptors)?;
        successln!(
            "Wrote {} descriptors to {}",
            descriptors.len(),
            Style::Path.paint(settings.descriptors.as_str())
        );
        Ok(descriptors)
    }
}

/// Which top-level queries to describe
#[derive(Clone, Debug, Default, Args)]
pub struct QuerySelection {
    /// Describe every top-level query the schema exposes instead of a fixed list
    #[arg(long, conflicts_with = "queries")]
    pub all: bool,

    /// A top-level query to describe. Repeat to describe several; defaults to
    /// the `queries` of the config file, then to the built-in list.
    #[arg(long = "query", short = 'q', value_name = "NAME")]
    pub queries: Vec<String>,
}

impl QuerySelection {
    /// Describes the selected queries in order, sleeping the configured delay
    /// after each one. Queries that cannot be described are reported and left
    /// out.
    pub async fn describe(&self, settings: &Settings) -> HarvestResult<Vec<QueryDescriptor>> {
        let mut introspector =
            Introspector::new(settings.endpoint.clone(), settings.http_service()?);
        infoln!(
            "Introspecting {}",
            Style::Path.paint(settings.endpoint.as_str())
        );
        if self.all {
            self.describe_all(&mut introspector, settings).await
        } else {
            let names = if self.queries.is_empty() {
                &settings.queries
            } else {
                &self.queries
            };
            Ok(self.describe_named(&mut introspector, settings, names).await)
        }
    }

    async fn describe_named(
        &self,
        introspector: &mut Introspector,
        settings: &Settings,
        names: &[String],
    ) -> Vec<QueryDescriptor> {
        let mut descriptors = Vec::with_capacity(names.len());
        for name in names {
            infoln!("Describing {}", Style::Query.paint(name));
            match introspector.describe_query(name).await {
                Ok(Some(descriptor)) => descriptors.push(descriptor),
                Ok(None) => warnln!(
                    "{} is not a top-level query of this schema",
                    Style::Query.paint(name)
                ),
                Err(err) => errln!("Could not describe {}: {:#}", name, anyhow::Error::from(err)),
            }
            tokio::time::sleep(settings.delay).await;
        }
        descriptors
    }

    async fn describe_all(
        &self,
        introspector: &mut Introspector,
        settings: &Settings,
    ) -> HarvestResult<Vec<QueryDescriptor>> {
        let fields = introspector
            .query_fields()
            .await
            .map_err(|err| HarvestError::new(err).with_suggestion(Suggestion::CheckEndpoint))?;
        tokio::time::sleep(settings.delay).await;

        let mut descriptors = Vec::with_capacity(fields.len());
        for field in fields {
            let name = field.name.clone();
            infoln!("Describing {}", Style::Query.paint(&name));
            match introspector.describe(field).await {
                Ok(descriptor) => descriptors.push(descriptor),
                Err(err) => errln!("Could not describe {}: {:#}", name, anyhow::Error::from(err)),
            }
            tokio::time::sleep(settings.delay).await;
        }
        Ok(descriptors)
    }
}
