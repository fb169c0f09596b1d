//! Captured results of running the external binary.

use std::collections::BTreeMap;

/// Exit code reported by the GOL binary on success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code reported by the GOL binary for usage and argument errors.
pub const EXIT_USAGE: i32 = 2;

/// Arguments, optional standard input and environment overrides for one run.
///
/// # Examples
///
/// ```
/// use golcheck_core::CommandRequest;
///
/// let request = CommandRequest::new(["query", "monaco.gol", "*", "-f", "count"])
///     .with_env("RUST_BACKTRACE", "0");
/// assert_eq!(request.args().len(), 5);
/// assert!(request.input().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandRequest {
    args: Vec<String>,
    input: Option<String>,
    env: BTreeMap<String, String>,
}

impl CommandRequest {
    /// Build a request from an argument list.
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            input: None,
            env: BTreeMap::new(),
        }
    }

    /// Feed `input` to the child's standard input instead of the null device.
    #[must_use]
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// Set an environment variable for the child only.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Arguments passed after the program name.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Text written to standard input, if any.
    #[must_use]
    pub fn input(&self) -> Option<&str> {
        self.input.as_deref()
    }

    /// Environment overrides applied on top of the inherited environment.
    #[must_use]
    pub const fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }
}

impl From<Vec<String>> for CommandRequest {
    fn from(args: Vec<String>) -> Self {
        Self::new(args)
    }
}

/// One completed child process: the command line, its output and exit code.
///
/// A non-zero exit code is a normal, inspectable outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    command: Vec<String>,
    stdout: String,
    stderr: String,
    exit_code: Option<i32>,
}

impl Invocation {
    /// Record a finished run. `exit_code` is `None` when the child was
    /// terminated by a signal.
    #[must_use]
    pub const fn new(
        command: Vec<String>,
        stdout: String,
        stderr: String,
        exit_code: Option<i32>,
    ) -> Self {
        Self {
            command,
            stdout,
            stderr,
            exit_code,
        }
    }

    /// Program name followed by its arguments.
    #[must_use]
    pub fn command(&self) -> &[String] {
        &self.command
    }

    /// Captured standard output.
    #[must_use]
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    /// Captured standard error.
    #[must_use]
    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    /// Exit code, or `None` if the process did not exit normally.
    #[must_use]
    pub const fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Whether the process exited with [`EXIT_SUCCESS`].
    #[must_use]
    pub fn success(&self) -> bool {
        self.exited_with(EXIT_SUCCESS)
    }

    /// Whether the process exited with exactly `code`.
    #[must_use]
    pub fn exited_with(&self, code: i32) -> bool {
        self.exit_code == Some(code)
    }

    /// Space-separated command line for diagnostics.
    #[must_use]
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some(0), true, false)]
    #[case(Some(2), false, true)]
    #[case(None, false, false)]
    fn exit_code_predicates(
        #[case] code: Option<i32>,
        #[case] success: bool,
        #[case] usage: bool,
    ) {
        let run = Invocation::new(vec!["gol".into()], String::new(), String::new(), code);
        assert_eq!(run.success(), success);
        assert_eq!(run.exited_with(EXIT_USAGE), usage);
    }

    #[rstest]
    fn request_collects_overrides() {
        let request = CommandRequest::new(["-V"])
            .with_input("y\n")
            .with_env("LANG", "C")
            .with_env("LANG", "C.UTF-8");
        assert_eq!(request.args(), ["-V"]);
        assert_eq!(request.input(), Some("y\n"));
        assert_eq!(request.env().get("LANG").map(String::as_str), Some("C.UTF-8"));
    }

    #[rstest]
    fn command_line_joins_arguments() {
        let run = Invocation::new(
            vec!["gol".into(), "save".into(), "liguria".into()],
            String::new(),
            String::new(),
            Some(0),
        );
        assert_eq!(run.command_line(), "gol save liguria");
    }
}
