//! Structural validators for query output.
//!
//! Validators only check cardinality and shape. The number reported by the
//! `count` format is treated as ground truth and every richer format must
//! agree with it; the content of individual features is never inspected.

use geo::Geometry;
use serde_json::Value;
use thiserror::Error;
use wkt::TryFromWkt;

use crate::OutputFormat;

const FEATURE_COLLECTION: &str = "FeatureCollection";

/// Reasons query output failed validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// `count` output was not a non-negative integer.
    #[error("count output {raw:?} is not a non-negative integer: {source}")]
    Count {
        /// Trimmed output that failed to parse.
        raw: String,
        /// Integer parse error.
        #[source]
        source: std::num::ParseIntError,
    },
    /// `count` output parsed but disagreed with the expected value.
    #[error("count reported {actual}, expected {expected}")]
    CountMismatch {
        /// Expected number of features.
        expected: usize,
        /// Reported number of features.
        actual: usize,
    },
    /// GeoJSON output was not valid JSON of the expected shape.
    #[error("geojson output is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The document was not a JSON object.
    #[error("geojson output is a JSON {found}, expected an object")]
    NotAnObject {
        /// JSON kind of the top-level value.
        found: &'static str,
    },
    /// The top-level `type` member was missing or wrong.
    #[error("geojson type is {found:?}, expected \"FeatureCollection\"")]
    NotFeatureCollection {
        /// Type discriminator found in the document, if any.
        found: Option<String>,
    },
    /// The `features` member was missing or not an array.
    #[error("geojson features member is not an array")]
    FeaturesNotArray,
    /// WKT output failed to parse.
    #[error("wkt output failed to parse: {message}")]
    Wkt {
        /// Parser diagnostic.
        message: String,
    },
    /// A single result was wrapped in a collection.
    #[error("expected a single geometry, found a collection of {members}")]
    UnexpectedCollection {
        /// Number of members in the collection.
        members: usize,
    },
    /// Zero or several results were not wrapped in a collection.
    #[error("expected a GEOMETRYCOLLECTION, found {found}")]
    ExpectedCollection {
        /// WKT tag of the geometry that was found.
        found: &'static str,
    },
    /// The number of lines, features or geometries differed from the count.
    #[error("{format} output has {actual} elements, expected {expected}")]
    LengthMismatch {
        /// Format under validation.
        format: OutputFormat,
        /// Expected number of elements.
        expected: usize,
        /// Number of elements found.
        actual: usize,
    },
}

/// Parse the output of `-f count`.
///
/// # Examples
///
/// ```
/// assert_eq!(golcheck_core::parse_count("42\n").ok(), Some(42));
/// assert!(golcheck_core::parse_count("-1").is_err());
/// ```
pub fn parse_count(raw: &str) -> Result<usize, ValidationError> {
    let trimmed = raw.trim();
    trimmed.parse().map_err(|source| ValidationError::Count {
        raw: trimmed.to_owned(),
        source,
    })
}

/// Number of lines after trimming surrounding whitespace; empty output has none.
#[must_use]
pub fn count_lines(raw: &str) -> usize {
    raw.trim().lines().count()
}

/// Validate `raw` as `format` output describing `expected` features.
///
/// # Examples
///
/// ```
/// use golcheck_core::{OutputFormat, validate};
///
/// assert!(validate(OutputFormat::Wkt, "GEOMETRYCOLLECTION EMPTY", 0).is_ok());
/// assert!(validate(OutputFormat::List, "n1\nw2\n", 2).is_ok());
/// assert!(validate(OutputFormat::GeoJsonLines, "{}\n", 2).is_err());
/// ```
pub fn validate(format: OutputFormat, raw: &str, expected: usize) -> Result<(), ValidationError> {
    match format {
        OutputFormat::Count => check_count(raw, expected),
        OutputFormat::GeoJson => check_geojson(raw, expected),
        OutputFormat::GeoJsonLines | OutputFormat::List => check_lines(format, raw, expected),
        OutputFormat::Wkt => check_wkt(raw, expected),
    }
}

/// Check that `count` output equals `expected`.
pub fn check_count(raw: &str, expected: usize) -> Result<(), ValidationError> {
    let actual = parse_count(raw)?;
    if actual == expected {
        Ok(())
    } else {
        Err(ValidationError::CountMismatch { expected, actual })
    }
}

/// Check a GeoJSON `FeatureCollection` holding `expected` features.
pub fn check_geojson(raw: &str, expected: usize) -> Result<(), ValidationError> {
    let document: Value = serde_json::from_str(raw)?;
    let object = document.as_object().ok_or(ValidationError::NotAnObject {
        found: json_kind(&document),
    })?;
    let kind = object.get("type").and_then(Value::as_str);
    if kind != Some(FEATURE_COLLECTION) {
        return Err(ValidationError::NotFeatureCollection {
            found: kind.map(str::to_owned),
        });
    }
    let features = object
        .get("features")
        .and_then(Value::as_array)
        .ok_or(ValidationError::FeaturesNotArray)?;
    expect_length(OutputFormat::GeoJson, expected, features.len())
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Check line-oriented output (`geojsonl`, `list`).
pub fn check_lines(format: OutputFormat, raw: &str, expected: usize) -> Result<(), ValidationError> {
    expect_length(format, expected, count_lines(raw))
}

/// Check WKT output: one bare geometry for a single result, otherwise a
/// collection with exactly `expected` members.
pub fn check_wkt(raw: &str, expected: usize) -> Result<(), ValidationError> {
    let geometry = Geometry::<f64>::try_from_wkt_str(raw.trim()).map_err(|err| {
        ValidationError::Wkt {
            message: err.to_string(),
        }
    })?;
    match geometry {
        Geometry::GeometryCollection(collection) if expected == 1 => {
            Err(ValidationError::UnexpectedCollection {
                members: collection.0.len(),
            })
        }
        _ if expected == 1 => Ok(()),
        Geometry::GeometryCollection(collection) => {
            expect_length(OutputFormat::Wkt, expected, collection.0.len())
        }
        other => Err(ValidationError::ExpectedCollection {
            found: wkt_tag(&other),
        }),
    }
}

fn expect_length(format: OutputFormat, expected: usize, actual: usize) -> Result<(), ValidationError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ValidationError::LengthMismatch {
            format,
            expected,
            actual,
        })
    }
}

const fn wkt_tag(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "POINT",
        Geometry::LineString(_) | Geometry::Line(_) => "LINESTRING",
        Geometry::Polygon(_) | Geometry::Rect(_) | Geometry::Triangle(_) => "POLYGON",
        Geometry::MultiPoint(_) => "MULTIPOINT",
        Geometry::MultiLineString(_) => "MULTILINESTRING",
        Geometry::MultiPolygon(_) => "MULTIPOLYGON",
        Geometry::GeometryCollection(_) => "GEOMETRYCOLLECTION",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0", 0)]
    #[case("17\n", 17)]
    #[case("  3 \r\n", 3)]
    fn parses_counts(#[case] raw: &str, #[case] expected: usize) {
        assert_eq!(parse_count(raw).expect("count parses"), expected);
    }

    #[rstest]
    #[case("")]
    #[case("-4")]
    #[case("three")]
    fn rejects_malformed_counts(#[case] raw: &str) {
        assert!(matches!(parse_count(raw), Err(ValidationError::Count { .. })));
    }

    #[rstest]
    #[case("", 0)]
    #[case("\n\n", 0)]
    #[case("a\nb\nc\n", 3)]
    #[case("a\r\nb", 2)]
    fn counts_lines_after_trimming(#[case] raw: &str, #[case] expected: usize) {
        assert_eq!(count_lines(raw), expected);
    }

    #[rstest]
    fn accepts_matching_feature_collection() {
        let raw = r#"{"type":"FeatureCollection","features":[{"type":"Feature"},{"type":"Feature"}]}"#;
        check_geojson(raw, 2).expect("two features");
    }

    #[rstest]
    fn accepts_empty_feature_collection() {
        check_geojson(r#"{"type":"FeatureCollection","features":[]}"#, 0).expect("empty");
    }

    #[rstest]
    fn rejects_wrong_discriminator() {
        let err = check_geojson(r#"{"type":"Feature","features":[]}"#, 0).expect_err("wrong type");
        match err {
            ValidationError::NotFeatureCollection { found } => {
                assert_eq!(found.as_deref(), Some("Feature"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[rstest]
    #[case(r#"["FeatureCollection", [{}]]"#, "array")]
    #[case(r#""FeatureCollection""#, "string")]
    #[case("1", "number")]
    #[case("null", "null")]
    fn rejects_documents_that_are_not_objects(#[case] raw: &str, #[case] kind: &str) {
        let err = check_geojson(raw, 1).expect_err("top level must be an object");
        match err {
            ValidationError::NotAnObject { found } => assert_eq!(found, kind),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[rstest]
    fn rejects_missing_discriminator() {
        let err = check_geojson(r#"{"features":[{}]}"#, 1).expect_err("type is required");
        assert!(matches!(
            err,
            ValidationError::NotFeatureCollection { found: None }
        ));
    }

    #[rstest]
    fn rejects_non_array_features() {
        let err = check_geojson(r#"{"type":"FeatureCollection","features":{}}"#, 0)
            .expect_err("features must be an array");
        assert!(matches!(err, ValidationError::FeaturesNotArray));
    }

    #[rstest]
    fn reports_dropped_features() {
        let raw = r#"{"type":"FeatureCollection","features":[{}]}"#;
        let err = check_geojson(raw, 2).expect_err("one feature missing");
        assert!(matches!(
            err,
            ValidationError::LengthMismatch {
                format: OutputFormat::GeoJson,
                expected: 2,
                actual: 1,
            }
        ));
    }

    #[rstest]
    fn rejects_malformed_json() {
        assert!(matches!(check_geojson("{", 0), Err(ValidationError::Json(_))));
    }

    #[rstest]
    #[case("POINT (7.4 43.7)")]
    #[case("LINESTRING (7.4 43.7, 7.5 43.8)")]
    #[case("POLYGON ((0 0, 1 0, 1 1, 0 0))")]
    fn single_result_is_a_bare_geometry(#[case] raw: &str) {
        check_wkt(raw, 1).expect("bare geometry");
    }

    #[rstest]
    fn single_result_must_not_be_wrapped() {
        let err = check_wkt("GEOMETRYCOLLECTION (POINT (1 2))", 1).expect_err("wrapped single");
        assert!(matches!(err, ValidationError::UnexpectedCollection { members: 1 }));
    }

    #[rstest]
    fn empty_result_is_an_empty_collection() {
        check_wkt("GEOMETRYCOLLECTION EMPTY", 0).expect("empty collection parses");
    }

    #[rstest]
    fn several_results_form_a_collection() {
        let raw = "GEOMETRYCOLLECTION (POINT (1 2), LINESTRING (0 0, 1 1), POINT (3 4))";
        check_wkt(raw, 3).expect("three members");
        let err = check_wkt(raw, 4).expect_err("member count differs");
        assert!(matches!(
            err,
            ValidationError::LengthMismatch {
                format: OutputFormat::Wkt,
                expected: 4,
                actual: 3,
            }
        ));
    }

    #[rstest]
    fn several_results_require_a_collection() {
        let err = check_wkt("POINT (1 2)", 2).expect_err("bare geometry for two results");
        assert!(matches!(
            err,
            ValidationError::ExpectedCollection { found: "POINT" }
        ));
    }

    #[rstest]
    fn malformed_wkt_fails_to_parse() {
        assert!(matches!(
            check_wkt("POINT (1", 1),
            Err(ValidationError::Wkt { .. })
        ));
    }

    #[rstest]
    fn dispatch_covers_every_format() {
        validate(OutputFormat::Count, "2\n", 2).expect("count");
        validate(OutputFormat::GeoJsonLines, "{}\n{}\n", 2).expect("geojsonl");
        validate(OutputFormat::List, "n1\nw2", 2).expect("list");
        validate(
            OutputFormat::GeoJson,
            r#"{"type":"FeatureCollection","features":[{},{}]}"#,
            2,
        )
        .expect("geojson");
        validate(OutputFormat::Wkt, "GEOMETRYCOLLECTION (POINT (1 2), POINT (3 4))", 2)
            .expect("wkt");
        assert!(matches!(
            validate(OutputFormat::Count, "1", 2),
            Err(ValidationError::CountMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }
}
