use clap::Parser;
use harvest_client::QueryDescriptor;

use crate::{descriptors, options::Settings, sink::FsSink, HarvestReport, HarvestResult, Harvester};

#[derive(Clone, Debug, Parser)]
pub struct Harvest {}

impl Harvest {
    pub async fn run(&self, settings: &Settings) -> HarvestResult<HarvestReport> {
        let descriptors = descriptors::load(&settings.descriptors)?;
        harvest_descriptors(settings, &descriptors).await
    }
}

/// Creates the output directory and runs the batch over `descriptors`
pub async fn harvest_descriptors(
    settings: &Settings,
    descriptors: &[QueryDescriptor],
) -> HarvestResult<HarvestReport> {
    let sink = FsSink::create(settings.output_dir.clone())?;
    let mut harvester = Harvester::new(
        settings.endpoint.clone(),
        settings.http_service()?,
        sink,
        settings.delay,
    );
    let report = harvester.run(descriptors).await;
    report.print();
    Ok(report)
}
