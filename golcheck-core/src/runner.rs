//! Run the external GOL binary as a child process.

use std::io::Write;
use std::process::{Command, Stdio};

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use thiserror::Error;

use crate::{CommandRequest, Invocation};

/// Executes one request and returns the captured [`Invocation`].
///
/// Implementations must not treat a non-zero exit code as an error.
pub trait CommandRunner {
    /// Run `request` to completion.
    fn run(&self, request: &CommandRequest) -> Result<Invocation, RunnerError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, request: &CommandRequest) -> Result<Invocation, RunnerError> {
        (**self).run(request)
    }
}

/// Errors raised when a child process could not be run or read.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The executable could not be started.
    #[error("failed to start {program:?}: {source}")]
    Spawn {
        /// Executable that failed to start.
        program: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Waiting for the child or collecting its output failed.
    #[error("failed waiting for {program:?}: {source}")]
    Wait {
        /// Executable being waited on.
        program: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Captured output was not valid UTF-8.
    #[error("{stream} of {program:?} is not valid UTF-8: {source}")]
    NonUtf8Output {
        /// Executable that produced the output.
        program: Utf8PathBuf,
        /// `stdout` or `stderr`.
        stream: &'static str,
        /// Decoding error.
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// [`CommandRunner`] that spawns a real executable.
///
/// Standard input is the null device unless the request carries input text,
/// so the child can never block on an interactive prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRunner {
    program: Utf8PathBuf,
    working_dir: Option<Utf8PathBuf>,
}

impl ProcessRunner {
    /// Runner for the executable at `program`, inheriting the current directory.
    pub fn new(program: impl Into<Utf8PathBuf>) -> Self {
        Self {
            program: program.into(),
            working_dir: None,
        }
    }

    /// Run children inside `dir`; the engine writes its artefacts there.
    #[must_use]
    pub fn in_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Path of the executable.
    #[must_use]
    pub fn program(&self) -> &Utf8Path {
        &self.program
    }

    /// Working directory for children, if overridden.
    #[must_use]
    pub fn working_dir(&self) -> Option<&Utf8Path> {
        self.working_dir.as_deref()
    }

    fn command(&self, request: &CommandRequest) -> Command {
        let mut command = Command::new(self.program.as_std_path());
        command
            .args(request.args())
            .envs(request.env())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if request.input().is_some() {
            command.stdin(Stdio::piped());
        } else {
            command.stdin(Stdio::null());
        }
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir.as_std_path());
        }
        command
    }

    fn decode(&self, stream: &'static str, bytes: Vec<u8>) -> Result<String, RunnerError> {
        String::from_utf8(bytes).map_err(|source| RunnerError::NonUtf8Output {
            program: self.program.clone(),
            stream,
            source,
        })
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, request: &CommandRequest) -> Result<Invocation, RunnerError> {
        debug!("running {} {}", self.program, request.args().join(" "));
        let mut child = self
            .command(request)
            .spawn()
            .map_err(|source| RunnerError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Feed stdin from a scoped thread so a chatty child cannot fill its
        // output pipes while we are still writing.
        let output = std::thread::scope(|scope| {
            if let (Some(mut stdin), Some(input)) = (child.stdin.take(), request.input()) {
                scope.spawn(move || {
                    if let Err(err) = stdin.write_all(input.as_bytes()) {
                        debug!("child closed stdin early: {err}");
                    }
                });
            }
            child.wait_with_output()
        })
        .map_err(|source| RunnerError::Wait {
            program: self.program.clone(),
            source,
        })?;

        let stdout = self.decode("stdout", output.stdout)?;
        let stderr = self.decode("stderr", output.stderr)?;
        let exit_code = output.status.code();
        debug!("{} exited with {exit_code:?}", self.program);

        let mut command = Vec::with_capacity(request.args().len() + 1);
        command.push(self.program.to_string());
        command.extend(request.args().iter().cloned());
        Ok(Invocation::new(command, stdout, stderr, exit_code))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use rstest::rstest;

    fn shell() -> ProcessRunner {
        ProcessRunner::new("/bin/sh")
    }

    #[rstest]
    fn captures_both_streams_and_exit_code() {
        let request = CommandRequest::new(["-c", "echo out; echo err >&2; exit 2"]);
        let run = shell().run(&request).expect("shell should run");
        assert_eq!(run.stdout(), "out\n");
        assert_eq!(run.stderr(), "err\n");
        assert_eq!(run.exit_code(), Some(2));
        assert_eq!(run.command().first().map(String::as_str), Some("/bin/sh"));
    }

    #[rstest]
    fn stdin_is_disconnected_without_input() {
        let request = CommandRequest::new(["-c", "cat; echo done"]);
        let run = shell().run(&request).expect("shell should run");
        assert_eq!(run.stdout(), "done\n");
        assert!(run.success());
    }

    #[rstest]
    fn input_text_reaches_stdin() {
        let request = CommandRequest::new(["-c", "cat"]).with_input("Y\n");
        let run = shell().run(&request).expect("shell should run");
        assert_eq!(run.stdout(), "Y\n");
    }

    #[rstest]
    fn environment_overrides_are_applied() {
        let request =
            CommandRequest::new(["-c", "printf %s \"$GOLCHECK_PROBE\""]).with_env("GOLCHECK_PROBE", "x1");
        let run = shell().run(&request).expect("shell should run");
        assert_eq!(run.stdout(), "x1");
    }

    #[rstest]
    fn working_directory_is_honoured() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let dir = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 tempdir");
        let runner = shell().in_dir(dir.clone());
        let run = runner
            .run(&CommandRequest::new(["-c", "touch marker"]))
            .expect("shell should run");
        assert!(run.success());
        assert!(dir.join("marker").exists());
    }

    #[rstest]
    fn missing_executable_is_a_spawn_error() {
        let runner = ProcessRunner::new("/nonexistent/gol");
        let err = runner
            .run(&CommandRequest::new(["-V"]))
            .expect_err("missing executable");
        assert!(matches!(err, RunnerError::Spawn { .. }));
    }

    #[rstest]
    fn invalid_utf8_is_reported() {
        let request = CommandRequest::new(["-c", "printf '\\377'"]);
        let err = shell().run(&request).expect_err("invalid utf-8");
        match err {
            RunnerError::NonUtf8Output { stream, .. } => assert_eq!(stream, "stdout"),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
