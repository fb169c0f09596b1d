//! In-memory stand-in for the GOL binary used by unit and behaviour tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;

use camino::Utf8PathBuf;
use serde_json::{Value, json};

use crate::{CommandRequest, CommandRunner, EXIT_SUCCESS, EXIT_USAGE, Invocation, OutputFormat, RunnerError};

/// Serialisation bug a [`FakeGol`] can inject into one output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Defect {
    /// Omit the last element.
    DropLast,
    /// Wrap a single WKT result in a `GEOMETRYCOLLECTION`.
    WrapSingle,
    /// Emit text that does not parse.
    Garbage,
}

/// Scripted GOL binary.
///
/// Queries return the configured number of synthetic features (unknown
/// filters return none), unknown `-f` values and malformed `-l` values exit
/// with a usage error, and `save` can materialise `.gol`/`.gob` artefacts so
/// size measurements have something to read.
#[derive(Debug)]
pub struct FakeGol {
    queries: BTreeMap<String, usize>,
    defects: BTreeMap<OutputFormat, Defect>,
    exit_overrides: BTreeMap<String, i32>,
    banner: String,
    artefact_dir: Option<Utf8PathBuf>,
    artefact_sizes: (usize, usize),
    saved: RefCell<BTreeSet<String>>,
    calls: RefCell<Vec<Vec<String>>>,
}

impl Default for FakeGol {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeGol {
    /// A well-behaved fake with no known queries.
    #[must_use]
    pub fn new() -> Self {
        Self {
            queries: BTreeMap::new(),
            defects: BTreeMap::new(),
            exit_overrides: BTreeMap::new(),
            banner: "gol 2.0.0".to_owned(),
            artefact_dir: None,
            artefact_sizes: (64, 32),
            saved: RefCell::new(BTreeSet::new()),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Make `filter` match `count` features.
    #[must_use]
    pub fn with_query(mut self, filter: impl Into<String>, count: usize) -> Self {
        self.queries.insert(filter.into(), count);
        self
    }

    /// Inject `defect` into every `format` response.
    #[must_use]
    pub fn with_defect(mut self, format: OutputFormat, defect: Defect) -> Self {
        self.defects.insert(format, defect);
        self
    }

    /// Force `subcommand` (`build`, `save`, `load`, `query`, `-V`) to exit with `code`.
    #[must_use]
    pub fn with_exit(mut self, subcommand: impl Into<String>, code: i32) -> Self {
        self.exit_overrides.insert(subcommand.into(), code);
        self
    }

    /// Replace the `-V` banner.
    #[must_use]
    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = banner.into();
        self
    }

    /// Write `<name>.gol` and `<name>.gob` into `dir` on `save`.
    #[must_use]
    pub fn with_artefacts(mut self, dir: impl Into<Utf8PathBuf>, gol: usize, gob: usize) -> Self {
        self.artefact_dir = Some(dir.into());
        self.artefact_sizes = (gol, gob);
        self
    }

    /// Argument lists received so far, without the program name.
    #[must_use]
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }

    fn respond(&self, args: &[String]) -> (String, String, i32) {
        let Some(subcommand) = args.first() else {
            return usage("error: missing subcommand");
        };
        if let Some(code) = self.exit_overrides.get(subcommand) {
            return (String::new(), format!("error: {subcommand} failed"), *code);
        }
        match subcommand.as_str() {
            "-V" => (format!("{}\n", self.banner), String::new(), EXIT_SUCCESS),
            "build" => respond_build(args),
            "save" => self.respond_save(args),
            "load" => self.respond_load(args),
            "query" => self.respond_query(args),
            other => usage(&format!("error: unrecognized subcommand '{other}'")),
        }
    }

    fn respond_save(&self, args: &[String]) -> (String, String, i32) {
        let Some(name) = args.get(1) else {
            return usage("error: save requires a database name");
        };
        if let Some(dir) = &self.artefact_dir {
            let (gol, gob) = self.artefact_sizes;
            let written = fs::write(dir.join(format!("{name}.gol")), vec![0_u8; gol])
                .and_then(|()| fs::write(dir.join(format!("{name}.gob")), vec![0_u8; gob]));
            if let Err(err) = written {
                return (String::new(), format!("error: {err}"), 1);
            }
        }
        self.saved.borrow_mut().insert(name.clone());
        (format!("Saved {name}\n"), String::new(), EXIT_SUCCESS)
    }

    fn respond_load(&self, args: &[String]) -> (String, String, i32) {
        let (Some(target), Some(name)) = (args.get(1), args.get(2)) else {
            return usage("error: load requires a target and a name");
        };
        if self.saved.borrow().contains(name) {
            (format!("Loaded {name} into {target}\n"), String::new(), EXIT_SUCCESS)
        } else {
            (String::new(), format!("error: {name}.gob not found"), 1)
        }
    }

    fn respond_query(&self, args: &[String]) -> (String, String, i32) {
        let (Some(filter), Some(flag), Some(format_name)) = (args.get(2), args.get(3), args.get(4))
        else {
            return usage("error: query requires <db> <filter> -f <format>");
        };
        if flag != "-f" {
            return usage(&format!("error: unexpected argument '{flag}'"));
        }
        let Ok(format) = format_name.parse::<OutputFormat>() else {
            return usage(&format!(
                "error: invalid value '{format_name}' for '-f <FORMAT>'"
            ));
        };
        let count = self.queries.get(filter).copied().unwrap_or_default();
        let defect = self.defects.get(&format).copied();
        (render(format, count, defect), String::new(), EXIT_SUCCESS)
    }
}

impl CommandRunner for FakeGol {
    fn run(&self, request: &CommandRequest) -> Result<Invocation, RunnerError> {
        let args = request.args().to_vec();
        self.calls.borrow_mut().push(args.clone());
        let (stdout, stderr, code) = self.respond(&args);
        let mut command = vec!["gol".to_owned()];
        command.extend(args);
        Ok(Invocation::new(command, stdout, stderr, Some(code)))
    }
}

fn usage(message: &str) -> (String, String, i32) {
    (String::new(), format!("{message}\n"), EXIT_USAGE)
}

fn respond_build(args: &[String]) -> (String, String, i32) {
    let levels_ok = args
        .iter()
        .position(|arg| arg == "-l")
        .and_then(|index| args.get(index + 1))
        .is_none_or(|levels| {
            levels
                .split(',')
                .all(|level| !level.is_empty() && level.bytes().all(|b| b.is_ascii_digit()))
        });
    if !levels_ok {
        return usage("error: invalid value for '-l <LEVELS>'");
    }
    match args.get(1) {
        Some(name) => (format!("Built {name}\n"), String::new(), EXIT_SUCCESS),
        None => usage("error: build requires a database name"),
    }
}

fn render(format: OutputFormat, count: usize, defect: Option<Defect>) -> String {
    if defect == Some(Defect::Garbage) {
        return "<<not valid output>>\n".to_owned();
    }
    let emitted = if defect == Some(Defect::DropLast) {
        count.saturating_sub(1)
    } else {
        count
    };
    match format {
        OutputFormat::Count => format!("{count}\n"),
        OutputFormat::GeoJson => {
            let features: Vec<Value> = (0..emitted).map(feature).collect();
            json!({ "type": "FeatureCollection", "features": features }).to_string()
        }
        OutputFormat::GeoJsonLines => (0..emitted)
            .map(|index| format!("{}\n", feature(index)))
            .collect(),
        OutputFormat::List => (0..emitted).map(|index| format!("n{}\n", index + 1)).collect(),
        OutputFormat::Wkt => {
            let points: Vec<String> = (0..emitted).map(point_wkt).collect();
            match points.as_slice() {
                [single] if defect != Some(Defect::WrapSingle) => format!("{single}\n"),
                [] => "GEOMETRYCOLLECTION EMPTY\n".to_owned(),
                many => format!("GEOMETRYCOLLECTION ({})\n", many.join(", ")),
            }
        }
    }
}

fn feature(index: usize) -> Value {
    json!({
        "type": "Feature",
        "id": format!("N{}", index + 1),
        "geometry": { "type": "Point", "coordinates": [7.42, 43.73] },
        "properties": { "seq": index }
    })
}

fn point_wkt(index: usize) -> String {
    format!("POINT (7.42 43.{index})")
}
