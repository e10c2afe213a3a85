use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use harvest_http::{HttpService, HttpServiceConfig, ReqwestService};
use harvest_std::Fs;
use serde::Deserialize;
use url::Url;

use crate::{HarvestError, HarvestResult, Suggestion};

pub const DEFAULT_ENDPOINT: &str = "https://metroverse.hks.harvard.edu/graphql";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_DELAY_MS: u64 = 1000;
pub const DEFAULT_DESCRIPTORS: &str = "_metadata/queries_with_fields.json";
pub const DEFAULT_OUTPUT_DIR: &str = "metadata";

/// The top-level queries introspected when neither the command line nor the
/// config file names any
pub const DEFAULT_QUERIES: [&str; 27] = [
    "metadata",
    "cityPeerGroupCounts",
    "naicsDensityRescale",
    "clusterDensityRescale",
    "naicsPeerEconStruct",
    "clusterPeerEconStruct",
    "naicsRca",
    "clusterRca",
    "globalIndustryYear",
    "classificationNaicsIndustryList",
    "classificationNaicsIndustry",
    "classificationNaicsClusterList",
    "classificationNaicsCluster",
    "classificationCityList",
    "classificationCity",
    "classificationCountryList",
    "classificationCountry",
    "classificationRegionList",
    "classificationRegion",
    "naicsIndustry",
    "naicsIndustryList",
    "clusterIndustry",
    "clusterIndustryList",
    "cityIndustryYearList",
    "cityPartnerList",
    "cityPartnerEucdistScale",
    "cityClusterYearList",
];

/// Options shared by every command. Each one can also come from the
/// environment or from the config file; the command line wins over both.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalOpts {
    /// The GraphQL endpoint to introspect and harvest
    #[arg(long, global = true, env = "HARVEST_ENDPOINT")]
    pub endpoint: Option<Url>,

    /// Seconds before a single request is abandoned
    #[arg(long, value_name = "SECONDS", global = true, env = "HARVEST_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Milliseconds to wait after each query, whatever its outcome
    #[arg(long, value_name = "MILLISECONDS", global = true, env = "HARVEST_DELAY_MS")]
    pub delay: Option<u64>,

    /// Path of the JSON file holding the query descriptors
    #[arg(long, global = true, env = "HARVEST_DESCRIPTORS")]
    pub descriptors: Option<Utf8PathBuf>,

    /// Directory receiving one `<query>.json` file per harvested query
    #[arg(long, global = true, env = "HARVEST_OUTPUT_DIR")]
    pub output_dir: Option<Utf8PathBuf>,

    /// TOML file with defaults for any of the options above
    #[arg(long, global = true, env = "HARVEST_CONFIG")]
    pub config: Option<Utf8PathBuf>,
}

/// Contents of the optional TOML config file
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub endpoint: Option<Url>,
    pub timeout_secs: Option<u64>,
    pub delay_ms: Option<u64>,
    pub queries: Option<Vec<String>>,
    pub descriptors: Option<Utf8PathBuf>,
    pub output_dir: Option<Utf8PathBuf>,
}

impl ConfigFile {
    pub fn load(path: &Utf8Path) -> HarvestResult<ConfigFile> {
        let contents = Fs::read_file(path)?;
        Self::parse(&contents).map_err(|err| {
            HarvestError::new(anyhow::anyhow!(err).context(format!("could not parse {path}")))
                .with_suggestion(Suggestion::CheckConfigFile)
        })
    }

    pub fn parse(contents: &str) -> Result<ConfigFile, toml::de::Error> {
        toml::from_str(contents)
    }
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub endpoint: Url,
    pub timeout: Duration,
    pub delay: Duration,
    pub queries: Vec<String>,
    pub descriptors: Utf8PathBuf,
    pub output_dir: Utf8PathBuf,
}

impl Settings {
    /// Reads the config file named by `opts`, if any, and resolves every setting
    pub fn load(opts: &GlobalOpts) -> HarvestResult<Settings> {
        let file = match &opts.config {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };
        Self::resolve(opts, file)
    }

    /// Command line / environment first, then the config file, then defaults
    pub fn resolve(opts: &GlobalOpts, file: ConfigFile) -> HarvestResult<Settings> {
        let endpoint = match opts.endpoint.clone().or(file.endpoint) {
            Some(endpoint) => endpoint,
            None => Url::parse(DEFAULT_ENDPOINT)?,
        };
        let timeout_secs = opts
            .timeout
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let delay_ms = opts.delay.or(file.delay_ms).unwrap_or(DEFAULT_DELAY_MS);
        let queries = file
            .queries
            .unwrap_or_else(|| DEFAULT_QUERIES.iter().map(ToString::to_string).collect());
        let descriptors = opts
            .descriptors
            .clone()
            .or(file.descriptors)
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DESCRIPTORS));
        let output_dir = opts
            .output_dir
            .clone()
            .or(file.output_dir)
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUTPUT_DIR));

        let settings = Settings {
            endpoint,
            timeout: Duration::from_secs(timeout_secs),
            delay: Duration::from_millis(delay_ms),
            queries,
            descriptors,
            output_dir,
        };
        tracing::debug!(?settings);
        Ok(settings)
    }

    /// Builds the HTTP service every request of the run goes through
    pub fn http_service(&self) -> HarvestResult<HttpService> {
        let config = HttpServiceConfig::builder().timeout(self.timeout).build();
        let service = ReqwestService::builder().config(config).build()?;
        Ok(service.into())
    }
}
