//! Output formats accepted by `gol query -f`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Closed set of formats the query command can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputFormat {
    /// A single integer.
    Count,
    /// One GeoJSON `FeatureCollection`.
    GeoJson,
    /// One GeoJSON feature per line.
    GeoJsonLines,
    /// Well-known text.
    Wkt,
    /// One identifier per line.
    List,
}

impl OutputFormat {
    /// Every format, `count` first because it serves as ground truth.
    pub const ALL: [Self; 5] = [
        Self::Count,
        Self::GeoJson,
        Self::GeoJsonLines,
        Self::Wkt,
        Self::List,
    ];

    /// Formats validated against the value reported by `count`.
    pub const RICH: [Self; 4] = [Self::GeoJsonLines, Self::GeoJson, Self::Wkt, Self::List];

    /// Name passed to `-f`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::GeoJson => "geojson",
            Self::GeoJsonLines => "geojsonl",
            Self::Wkt => "wkt",
            Self::List => "list",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a name that is not one of [`OutputFormat::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown output format {0:?}")]
pub struct UnknownFormat(pub String);

impl FromStr for OutputFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownFormat(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn names_parse_back_to_the_same_format(
        #[values(
            OutputFormat::Count,
            OutputFormat::GeoJson,
            OutputFormat::GeoJsonLines,
            OutputFormat::Wkt,
            OutputFormat::List
        )]
        format: OutputFormat,
    ) {
        assert_eq!(format.as_str().parse::<OutputFormat>(), Ok(format));
    }

    #[rstest]
    fn rejects_unknown_names() {
        assert_eq!(
            "bananas".parse::<OutputFormat>(),
            Err(UnknownFormat("bananas".to_owned()))
        );
    }

    #[rstest]
    fn rich_formats_exclude_count() {
        assert!(!OutputFormat::RICH.contains(&OutputFormat::Count));
        assert_eq!(OutputFormat::RICH.len() + 1, OutputFormat::ALL.len());
    }
}
