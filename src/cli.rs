use clap::{builder::PossibleValuesParser, builder::TypedValueParser, Parser, Subcommand};
use timber::{Level, LEVELS};

use crate::{
    command,
    options::{GlobalOpts, Settings},
    HarvestResult,
};

#[derive(Debug, Parser)]
#[command(
    name = "schema-harvest",
    version,
    about = "
schema-harvest: download every argument-free query of a GraphQL endpoint

Describe the queries of interest first:

    $ schema-harvest introspect

then fetch each describable one into its own JSON file:

    $ schema-harvest harvest

`schema-harvest run` does both. Files already present in the output directory
are never fetched again, so an interrupted harvest resumes where it stopped.
"
)]
pub struct SchemaHarvest {
    #[command(subcommand)]
    pub command: Command,

    /// Specify the log level
    #[arg(
        long = "log",
        short = 'l',
        global = true,
        ignore_case = true,
        value_parser = PossibleValuesParser::new(LEVELS).try_map(|level| level.parse::<Level>())
    )]
    pub log_level: Option<Level>,

    #[command(flatten)]
    pub opts: GlobalOpts,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Describe top-level queries and write them to the descriptor file
    Introspect(command::Introspect),

    /// Fetch every eligible query listed in the descriptor file
    Harvest(command::Harvest),

    /// Introspect, then harvest the freshly described queries
    Run(command::Run),
}

impl SchemaHarvest {
    pub async fn run(&self) -> HarvestResult<()> {
        let settings = Settings::load(&self.opts)?;
        match &self.command {
            Command::Introspect(command) => command.run(&settings).await.map(|_| ()),
            Command::Harvest(command) => command.run(&settings).await.map(|_| ()),
            Command::Run(command) => command.run(&settings).await.map(|_| ()),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use speculoos::prelude::*;
    use timber::Level;

    use super::{Command, SchemaHarvest};

    #[test]
    fn it_has_a_valid_command_tree() {
        SchemaHarvest::command().debug_assert();
    }

    #[test]
    fn it_accepts_global_options_after_the_subcommand() {
        let app = SchemaHarvest::try_parse_from([
            "schema-harvest",
            "introspect",
            "--all",
            "--delay",
            "0",
            "-l",
            "DEBUG",
        ])
        .unwrap();

        assert_that!(app.log_level).is_equal_to(Some(Level::DEBUG));
        assert_that!(app.opts.delay).is_equal_to(Some(0));
        match app.command {
            Command::Introspect(introspect) => assert_that!(introspect.selection.all).is_true(),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn it_rejects_all_together_with_named_queries() {
        let result =
            SchemaHarvest::try_parse_from(["schema-harvest", "run", "--all", "--query", "metadata"]);
        assert_that!(result).is_err();
    }
}
