use clap::Parser;

use super::{harvest_descriptors, QuerySelection};
use crate::{descriptors, options::Settings, HarvestReport, HarvestResult};

/// Introspects and harvests in one go. The descriptor file is still written,
/// so a later `harvest` can pick up from it.
#[derive(Clone, Debug, Parser)]
pub struct Run {
    #[clap(flatten)]
    pub selection: QuerySelection,
}

impl Run {
    pub async fn run(&self, settings: &Settings) -> HarvestResult<HarvestReport> {
        let descriptors = self.selection.describe(settings).await?;
        descriptors::save(&settings.descriptors, &descriptors)?;
        harvest_descriptors(settings, &descriptors).await
    }
}
