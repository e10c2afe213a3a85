mod harvest;
mod introspect;
mod run;

pub use harvest::{harvest_descriptors, Harvest};
pub use introspect::{Introspect, QuerySelection};
pub use run::Run;
