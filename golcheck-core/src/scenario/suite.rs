use camino::Utf8PathBuf;

use super::{Scenario, ScenarioKind, ScenarioOutcome};
use crate::CommandRunner;

/// Queries expected to match at least one feature.
pub const DEFAULT_QUERIES: [&str; 3] = [
    "*",
    "w[highway][name=A*]",
    "a[boundary=administrative][name='La Condamine']",
];
/// Queries expected to match nothing.
pub const DEFAULT_EMPTY_QUERIES: [&str; 1] = ["a[leisure=park][name='This park does not exist!']"];
/// Dataset built by the build/save/load scenario.
pub const DEFAULT_DATASET: &str = "liguria";
/// Database name used by the build scenarios.
pub const BUILD_NAME: &str = "test";
/// Name the saved database is loaded into.
pub const RELOAD_NAME: &str = "test2";
/// Malformed `-l` value.
pub const BAD_LEVELS: &str = "bad_bad_bad";
/// Unsupported `-f` value.
pub const INVALID_FORMAT: &str = "bananas";
/// Filter used with [`INVALID_FORMAT`].
pub const INVALID_FORMAT_FILTER: &str = "n";
/// Substring `-V` must print.
pub const PRODUCT_NAME: &str = "gol";

/// Inputs for [`Suite::standard`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteConfig {
    /// Existing database queried by the query scenarios.
    pub database: Utf8PathBuf,
    /// Directory holding source datasets.
    pub mapdata_dir: Utf8PathBuf,
    /// Dataset stem under `mapdata_dir` used by the build scenarios.
    pub dataset: String,
    /// Queries expected to return features.
    pub queries: Vec<String>,
    /// Queries expected to return nothing.
    pub empty_queries: Vec<String>,
    /// Product name expected in the version banner.
    pub product: String,
}

impl SuiteConfig {
    /// Configuration with the default dataset, queries and product name.
    pub fn new(database: impl Into<Utf8PathBuf>, mapdata_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            database: database.into(),
            mapdata_dir: mapdata_dir.into(),
            dataset: DEFAULT_DATASET.to_owned(),
            queries: DEFAULT_QUERIES.map(str::to_owned).to_vec(),
            empty_queries: DEFAULT_EMPTY_QUERIES.map(str::to_owned).to_vec(),
            product: PRODUCT_NAME.to_owned(),
        }
    }

    fn dataset_source(&self) -> Utf8PathBuf {
        self.mapdata_dir.join(&self.dataset)
    }
}

/// An ordered list of independent scenarios.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Suite {
    scenarios: Vec<Scenario>,
}

impl Suite {
    /// Suite running `scenarios` in order.
    #[must_use]
    pub const fn new(scenarios: Vec<Scenario>) -> Self {
        Self { scenarios }
    }

    /// The standard catalogue: build/save/load, bad build option, version,
    /// one consistency check per query, one empty-result check per empty
    /// query and the invalid format check.
    #[must_use]
    pub fn standard(config: &SuiteConfig) -> Self {
        let source = config.dataset_source();
        let mut scenarios = vec![
            Scenario::new(
                "build_save_load",
                ScenarioKind::BuildSaveLoad {
                    name: BUILD_NAME.to_owned(),
                    source: source.clone(),
                    reload_as: RELOAD_NAME.to_owned(),
                },
            ),
            Scenario::new(
                "build_bad_param",
                ScenarioKind::BuildRejectsBadOption {
                    name: BUILD_NAME.to_owned(),
                    source,
                    levels: BAD_LEVELS.to_owned(),
                },
            ),
            Scenario::new(
                "version",
                ScenarioKind::Version {
                    product: config.product.clone(),
                },
            ),
        ];
        scenarios.extend(config.queries.iter().map(|filter| {
            Scenario::new(
                format!("query[{filter}]"),
                ScenarioKind::QueryConsistency {
                    database: config.database.clone(),
                    filter: filter.clone(),
                },
            )
        }));
        scenarios.extend(config.empty_queries.iter().map(|filter| {
            Scenario::new(
                format!("empty_query[{filter}]"),
                ScenarioKind::EmptyQuery {
                    database: config.database.clone(),
                    filter: filter.clone(),
                },
            )
        }));
        scenarios.push(Scenario::new(
            "invalid_query_format",
            ScenarioKind::InvalidFormat {
                database: config.database.clone(),
                filter: INVALID_FORMAT_FILTER.to_owned(),
                format: INVALID_FORMAT.to_owned(),
            },
        ));
        Self { scenarios }
    }

    /// Scenarios in execution order.
    #[must_use]
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Keep only scenarios whose name contains `pattern`.
    #[must_use]
    pub fn matching(mut self, pattern: &str) -> Self {
        self.scenarios.retain(|scenario| scenario.name().contains(pattern));
        self
    }

    /// Run each scenario in turn; a failure never prevents later scenarios.
    pub fn run(&self, runner: &dyn CommandRunner) -> SuiteReport {
        SuiteReport {
            outcomes: self
                .scenarios
                .iter()
                .map(|scenario| scenario.run(runner))
                .collect(),
        }
    }
}

/// Outcomes of a [`Suite`] run, in execution order.
#[derive(Debug, Default)]
pub struct SuiteReport {
    outcomes: Vec<ScenarioOutcome>,
}

impl SuiteReport {
    /// Every outcome.
    #[must_use]
    pub fn outcomes(&self) -> &[ScenarioOutcome] {
        &self.outcomes
    }

    /// Number of scenarios that passed.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.passed()).count()
    }

    /// Outcomes of scenarios that failed.
    pub fn failures(&self) -> impl Iterator<Item = &ScenarioOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.passed())
    }

    /// Whether every scenario passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(ScenarioOutcome::passed)
    }
}
