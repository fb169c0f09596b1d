//! Typed argument lists for the GOL subcommands exercised by the harness.
//!
//! The grammar belongs to the external binary; these builders only spell
//! out the handful of invocations the checks and the size report rely on.

use camino::Utf8PathBuf;

use crate::{CommandRequest, OutputFormat};

/// One invocation of the GOL binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GolCommand {
    /// `build <name> <source> [-l levels] [-n max] [-Y]`
    Build {
        /// Name of the database to create.
        name: String,
        /// Source dataset (usually an `.osm.pbf` stem).
        source: Utf8PathBuf,
        /// Zoom levels passed with `-l`, verbatim.
        levels: Option<String>,
        /// Cap passed with `-n`.
        max_features: Option<u64>,
        /// Answer yes to every prompt (`-Y`).
        assume_yes: bool,
    },
    /// `save <name> [-Y]`
    Save {
        /// Database to save.
        name: String,
        /// Answer yes to every prompt (`-Y`).
        assume_yes: bool,
    },
    /// `load <target> <name> [-Y]`
    Load {
        /// Name of the new database.
        target: String,
        /// Saved database to load.
        name: String,
        /// Answer yes to every prompt (`-Y`).
        assume_yes: bool,
    },
    /// `query <database> <filter> -f <format>`
    Query {
        /// Database to query.
        database: Utf8PathBuf,
        /// Filter expression, opaque to the harness.
        filter: String,
        /// Format name; kept as text so invalid names can be exercised.
        format: String,
    },
    /// `-V`
    Version,
}

impl GolCommand {
    /// `build <name> <source>` with no optional flags.
    pub fn build(name: impl Into<String>, source: impl Into<Utf8PathBuf>) -> Self {
        Self::Build {
            name: name.into(),
            source: source.into(),
            levels: None,
            max_features: None,
            assume_yes: false,
        }
    }

    /// Query `database` with `filter` in one of the supported formats.
    pub fn query(
        database: impl Into<Utf8PathBuf>,
        filter: impl Into<String>,
        format: OutputFormat,
    ) -> Self {
        Self::Query {
            database: database.into(),
            filter: filter.into(),
            format: format.as_str().to_owned(),
        }
    }

    /// Set `-l` on a build; no effect on other commands.
    #[must_use]
    pub fn with_levels(mut self, value: impl Into<String>) -> Self {
        if let Self::Build { levels, .. } = &mut self {
            *levels = Some(value.into());
        }
        self
    }

    /// Set `-n` on a build; no effect on other commands.
    #[must_use]
    pub fn with_max_features(mut self, value: u64) -> Self {
        if let Self::Build { max_features, .. } = &mut self {
            *max_features = Some(value);
        }
        self
    }

    /// Add `-Y` to commands that prompt.
    #[must_use]
    pub fn assuming_yes(mut self) -> Self {
        match &mut self {
            Self::Build { assume_yes, .. }
            | Self::Save { assume_yes, .. }
            | Self::Load { assume_yes, .. } => *assume_yes = true,
            Self::Query { .. } | Self::Version => {}
        }
        self
    }

    /// Argument list passed after the program name.
    ///
    /// # Examples
    ///
    /// ```
    /// use golcheck_core::{GolCommand, OutputFormat};
    ///
    /// let args = GolCommand::query("monaco", "w[highway]", OutputFormat::GeoJsonLines).to_args();
    /// assert_eq!(args, ["query", "monaco", "w[highway]", "-f", "geojsonl"]);
    /// ```
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        match self {
            Self::Build {
                name,
                source,
                levels,
                max_features,
                assume_yes,
            } => {
                let mut args = vec!["build".to_owned(), name.clone(), source.to_string()];
                if let Some(levels) = levels {
                    args.extend(["-l".to_owned(), levels.clone()]);
                }
                if let Some(max) = max_features {
                    args.extend(["-n".to_owned(), max.to_string()]);
                }
                push_yes(&mut args, *assume_yes);
                args
            }
            Self::Save { name, assume_yes } => {
                let mut args = vec!["save".to_owned(), name.clone()];
                push_yes(&mut args, *assume_yes);
                args
            }
            Self::Load {
                target,
                name,
                assume_yes,
            } => {
                let mut args = vec!["load".to_owned(), target.clone(), name.clone()];
                push_yes(&mut args, *assume_yes);
                args
            }
            Self::Query {
                database,
                filter,
                format,
            } => vec![
                "query".to_owned(),
                database.to_string(),
                filter.clone(),
                "-f".to_owned(),
                format.clone(),
            ],
            Self::Version => vec!["-V".to_owned()],
        }
    }

    /// Request carrying these arguments with no input or overrides.
    #[must_use]
    pub fn to_request(&self) -> CommandRequest {
        CommandRequest::new(self.to_args())
    }
}

fn push_yes(args: &mut Vec<String>, assume_yes: bool) {
    if assume_yes {
        args.push("-Y".to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn build_spells_out_every_flag() {
        let command = GolCommand::build("bavaria", "/data/mapdata/bavaria")
            .with_levels("0,3,6,9,12")
            .with_max_features(10_000_000)
            .assuming_yes();
        assert_eq!(
            command.to_args(),
            [
                "build",
                "bavaria",
                "/data/mapdata/bavaria",
                "-l",
                "0,3,6,9,12",
                "-n",
                "10000000",
                "-Y"
            ]
        );
    }

    #[rstest]
    #[case(GolCommand::Save { name: "test".into(), assume_yes: false }, &["save", "test"])]
    #[case(
        GolCommand::Load { target: "test2".into(), name: "test".into(), assume_yes: true },
        &["load", "test2", "test", "-Y"]
    )]
    #[case(GolCommand::Version, &["-V"])]
    fn short_commands(#[case] command: GolCommand, #[case] expected: &[&str]) {
        assert_eq!(command.to_args(), expected);
    }

    #[rstest]
    fn build_modifiers_ignore_other_commands() {
        let command = GolCommand::Version.with_levels("1").with_max_features(2).assuming_yes();
        assert_eq!(command, GolCommand::Version);
    }
}
