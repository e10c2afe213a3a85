pub mod cli;
pub mod command;
pub mod descriptors;
pub mod eligibility;
mod error;
pub mod harvester;
pub mod options;
pub mod sink;
pub mod synthesize;

pub use error::{HarvestError, HarvestResult, Suggestion};
pub use harvester::{FailureReason, HarvestReport, Harvester, Outcome, SkipReason};

pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
