use std::process;

use clap::Parser;
use schema_harvest::{cli::SchemaHarvest, HarvestResult};

fn main() {
    let app = SchemaHarvest::parse();
    timber::init(app.log_level);
    tracing::trace!(command_structure = ?app);

    if let Err(error) = run(app) {
        tracing::debug!(?error);
        eprint!("{}", error);
        process::exit(1)
    }
}

#[tokio::main]
async fn run(app: SchemaHarvest) -> HarvestResult<()> {
    app.run().await
}
