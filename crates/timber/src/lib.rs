#![deny(missing_docs)]

//! Defines the output format of the traces and events the harvester and its
//! workspace crates emit through `tracing`.

use std::io;

use tracing_subscriber::{fmt, EnvFilter};

pub use tracing_core::Level;

/// possible log levels
pub const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// The crates whose events follow the `--log` level. Events from every other
/// crate (hyper, reqwest, rustls) are capped at `warn` so request-level
/// chatter does not drown the harvester's own diagnostics.
const WORKSPACE_TARGETS: [&str; 6] = [
    "schema_harvest",
    "harvest_client",
    "harvest_graphql",
    "harvest_http",
    "harvest_std",
    "harvest_tower",
];

/// Builds the filter directives for `level`
pub fn directives(level: Level) -> String {
    let level = level.to_string().to_lowercase();
    let mut directives = vec!["warn".to_string()];
    directives.extend(
        WORKSPACE_TARGETS
            .iter()
            .map(|target| format!("{target}={level}")),
    );
    directives.join(",")
}

/// Initializes a global tracing subscriber writing to stderr.
///
/// Without a level nothing is printed. `RUST_LOG`, when set, replaces the
/// directives derived from the level.
pub fn init(level: Option<Level>) {
    if let Some(level) = level {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(directives(level)));
        let format = fmt::format().without_time().with_target(true).compact();
        let _ = fmt()
            .with_env_filter(filter)
            .event_format(format)
            .with_writer(io::stderr)
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tracing_core::metadata::ParseLevelError;

    use super::{directives, Level, LEVELS};
    use std::str::FromStr;

    #[test]
    fn it_parses_all_possible_levels() -> Result<(), ParseLevelError> {
        for level in &LEVELS {
            Level::from_str(level)?;
        }
        Ok(())
    }

    #[rstest]
    #[case(Level::DEBUG, "schema_harvest=debug")]
    #[case(Level::TRACE, "harvest_http=trace")]
    #[case(Level::ERROR, "harvest_client=error")]
    fn it_scopes_the_level_to_workspace_crates(#[case] level: Level, #[case] expected: &str) {
        let directives = directives(level);
        assert!(directives.starts_with("warn,"));
        assert!(directives.split(',').any(|directive| directive == expected));
    }
}
