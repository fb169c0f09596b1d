//! Declarative black-box scenarios for the GOL command-line tool.
//!
//! Each scenario runs Setup → Invoke → Validate against a [`CommandRunner`].
//! A failed expectation ends that scenario only; [`Suite`] keeps going with
//! the next one and collects every [`ScenarioOutcome`].

mod failure;
mod suite;

pub use failure::ScenarioFailure;
pub use suite::{
    BAD_LEVELS, BUILD_NAME, DEFAULT_DATASET, DEFAULT_EMPTY_QUERIES, DEFAULT_QUERIES,
    INVALID_FORMAT, INVALID_FORMAT_FILTER, PRODUCT_NAME, RELOAD_NAME, Suite, SuiteConfig,
    SuiteReport,
};

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info, warn};

use crate::{
    CommandRunner, EXIT_SUCCESS, EXIT_USAGE, GolCommand, Invocation, OutputFormat, parse_count,
    validate,
};

const INVALID_DIAGNOSTIC: &str = "invalid";

/// What a scenario exercises.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioKind {
    /// `build`, `save`, then `load` into a second name; each must succeed.
    BuildSaveLoad {
        /// Database name used for build and save.
        name: String,
        /// Source dataset for the build.
        source: Utf8PathBuf,
        /// Name the saved database is loaded into.
        reload_as: String,
    },
    /// `build` with a malformed `-l` value must exit with a usage error.
    BuildRejectsBadOption {
        /// Database name.
        name: String,
        /// Source dataset for the build.
        source: Utf8PathBuf,
        /// Malformed levels argument.
        levels: String,
    },
    /// `-V` succeeds and names the product.
    Version {
        /// Substring expected on stdout.
        product: String,
    },
    /// A query matches at least one feature and every format agrees on how many.
    QueryConsistency {
        /// Database to query.
        database: Utf8PathBuf,
        /// Filter expression.
        filter: String,
    },
    /// A query matches nothing and every format still yields valid, empty output.
    EmptyQuery {
        /// Database to query.
        database: Utf8PathBuf,
        /// Filter expression.
        filter: String,
    },
    /// An unknown `-f` value exits with a usage error mentioning "invalid".
    InvalidFormat {
        /// Database to query.
        database: Utf8PathBuf,
        /// Filter expression.
        filter: String,
        /// Unsupported format name.
        format: String,
    },
}

/// A named scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    name: String,
    kind: ScenarioKind,
}

impl Scenario {
    /// Name a scenario.
    pub fn new(name: impl Into<String>, kind: ScenarioKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Scenario name used in reports.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// What the scenario exercises.
    #[must_use]
    pub const fn kind(&self) -> &ScenarioKind {
        &self.kind
    }

    /// Run every step, stopping at the first failed expectation.
    pub fn run(&self, runner: &dyn CommandRunner) -> ScenarioOutcome {
        let mut session = Session::new(runner);
        let result = self.execute(&mut session);
        match &result {
            Ok(_) => info!("scenario {} passed", self.name),
            Err(failure) => warn!("scenario {} failed: {failure}", self.name),
        }
        ScenarioOutcome {
            name: self.name.clone(),
            steps: session.into_steps(),
            result,
        }
    }

    fn execute(&self, session: &mut Session<'_>) -> Result<Option<usize>, ScenarioFailure> {
        match &self.kind {
            ScenarioKind::BuildSaveLoad {
                name,
                source,
                reload_as,
            } => {
                let build = GolCommand::build(name.as_str(), source.as_path()).assuming_yes();
                session.expect_exit(&build, EXIT_SUCCESS)?;
                let save = GolCommand::Save {
                    name: name.clone(),
                    assume_yes: false,
                };
                session.expect_exit(&save, EXIT_SUCCESS)?;
                let load = GolCommand::Load {
                    target: reload_as.clone(),
                    name: name.clone(),
                    assume_yes: true,
                };
                session.expect_exit(&load, EXIT_SUCCESS)?;
                Ok(None)
            }
            ScenarioKind::BuildRejectsBadOption {
                name,
                source,
                levels,
            } => {
                let build =
                    GolCommand::build(name.as_str(), source.as_path()).with_levels(levels.as_str());
                session.expect_exit(&build, EXIT_USAGE)?;
                Ok(None)
            }
            ScenarioKind::Version { product } => {
                let run = session.expect_exit(&GolCommand::Version, EXIT_SUCCESS)?;
                if run.stdout().contains(product.as_str()) {
                    Ok(None)
                } else {
                    Err(ScenarioFailure::MissingProductName {
                        product: product.clone(),
                        stdout: run.stdout().to_owned(),
                    })
                }
            }
            ScenarioKind::QueryConsistency { database, filter } => {
                let count = session.consistent_count(database, filter)?;
                if count == 0 {
                    return Err(ScenarioFailure::EmptyResult {
                        filter: filter.clone(),
                    });
                }
                Ok(Some(count))
            }
            ScenarioKind::EmptyQuery { database, filter } => {
                let count = session.consistent_count(database, filter)?;
                if count != 0 {
                    return Err(ScenarioFailure::UnexpectedResults {
                        filter: filter.clone(),
                        count,
                    });
                }
                Ok(Some(count))
            }
            ScenarioKind::InvalidFormat {
                database,
                filter,
                format,
            } => {
                let query = GolCommand::Query {
                    database: database.clone(),
                    filter: filter.clone(),
                    format: format.clone(),
                };
                let run = session.expect_exit(&query, EXIT_USAGE)?;
                if run.stderr().to_lowercase().contains(INVALID_DIAGNOSTIC) {
                    Ok(None)
                } else {
                    Err(ScenarioFailure::MissingDiagnostic {
                        needle: INVALID_DIAGNOSTIC,
                        stderr: run.stderr().to_owned(),
                    })
                }
            }
        }
    }
}

/// One command a scenario ran and how it exited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    /// Full command line.
    pub command_line: String,
    /// Exit code; `None` when killed by a signal.
    pub exit_code: Option<i32>,
}

/// Result of running one [`Scenario`].
#[derive(Debug)]
pub struct ScenarioOutcome {
    name: String,
    steps: Vec<StepRecord>,
    result: Result<Option<usize>, ScenarioFailure>,
}

impl ScenarioOutcome {
    /// Scenario name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Steps run before the scenario finished or failed.
    #[must_use]
    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    /// Whether every expectation held.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.result.is_ok()
    }

    /// The failure that ended the scenario, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&ScenarioFailure> {
        self.result.as_ref().err()
    }

    /// Feature count observed by query scenarios.
    #[must_use]
    pub fn count(&self) -> Option<usize> {
        self.result.as_ref().ok().copied().flatten()
    }
}

/// Validate every format of `filter` against the count it reports.
///
/// Returns the agreed number of features.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use golcheck_core::check_consistency;
/// use golcheck_core::test_support::FakeGol;
///
/// let gol = FakeGol::new().with_query("w[highway]", 3);
/// let count = check_consistency(&gol, Utf8Path::new("monaco"), "w[highway]")
///     .expect("consistent");
/// assert_eq!(count, 3);
/// ```
pub fn check_consistency(
    runner: &dyn CommandRunner,
    database: &Utf8Path,
    filter: &str,
) -> Result<usize, ScenarioFailure> {
    Session::new(runner).consistent_count(database, filter)
}

struct Session<'a> {
    runner: &'a dyn CommandRunner,
    steps: Vec<StepRecord>,
}

impl<'a> Session<'a> {
    fn new(runner: &'a dyn CommandRunner) -> Self {
        Self {
            runner,
            steps: Vec::new(),
        }
    }

    fn into_steps(self) -> Vec<StepRecord> {
        self.steps
    }

    fn invoke(&mut self, command: &GolCommand) -> Result<Invocation, ScenarioFailure> {
        let request = command.to_request();
        let run = self
            .runner
            .run(&request)
            .map_err(|source| ScenarioFailure::Runner {
                step: request.args().join(" "),
                source,
            })?;
        debug!("{} -> {:?}", run.command_line(), run.exit_code());
        self.steps.push(StepRecord {
            command_line: run.command_line(),
            exit_code: run.exit_code(),
        });
        Ok(run)
    }

    fn expect_exit(
        &mut self,
        command: &GolCommand,
        expected: i32,
    ) -> Result<Invocation, ScenarioFailure> {
        let run = self.invoke(command)?;
        if run.exited_with(expected) {
            Ok(run)
        } else {
            Err(ScenarioFailure::UnexpectedExit {
                step: run.command_line(),
                expected,
                actual: run.exit_code(),
                stderr: run.stderr().trim().to_owned(),
            })
        }
    }

    fn query(
        &mut self,
        database: &Utf8Path,
        filter: &str,
        format: OutputFormat,
    ) -> Result<Invocation, ScenarioFailure> {
        self.expect_exit(&GolCommand::query(database, filter, format), EXIT_SUCCESS)
    }

    fn consistent_count(
        &mut self,
        database: &Utf8Path,
        filter: &str,
    ) -> Result<usize, ScenarioFailure> {
        let run = self.query(database, filter, OutputFormat::Count)?;
        let count = parse_count(run.stdout()).map_err(|source| ScenarioFailure::Validation {
            step: run.command_line(),
            format: OutputFormat::Count,
            source,
        })?;
        debug!("feature count for {filter:?} = {count}");

        for format in OutputFormat::RICH {
            let output = self.query(database, filter, format)?;
            validate(format, output.stdout(), count).map_err(|source| {
                ScenarioFailure::Validation {
                    step: output.command_line(),
                    format,
                    source,
                }
            })?;
        }
        Ok(count)
    }
}
