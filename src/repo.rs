//! Local repository helpers used before uploading build artifacts.
//!
//! Commands run through the [`CommandRunner`] abstraction so tests can
//! script outcomes without spawning processes.

use std::ffi::OsString;
use std::process::Command;

use camino::Utf8Path;
use thiserror::Error;

/// Result of running an external command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandOutput {
    /// Exit code reported by the process, if available.
    pub code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// Returns `true` when the exit code equals zero.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.code, Some(0))
    }
}

/// Errors raised by repository helpers.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RepoError {
    /// Raised when a command cannot be started.
    #[error("failed to start {program}: {message}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Error message from the operating system.
        message: String,
    },
    /// Raised when a command exits unsuccessfully.
    #[error("{program} exited with status {status_text}: {stderr}")]
    CommandFailure {
        /// Program that failed.
        program: String,
        /// Exit status reported by the OS.
        status: Option<i32>,
        /// Human readable representation of the exit status.
        status_text: String,
        /// Stderr captured from the command.
        stderr: String,
    },
    /// Raised when `HEAD` does not point at a branch.
    #[error("repository is in a detached HEAD state")]
    Detached,
    /// Raised when a command line is blank.
    #[error("command line is empty")]
    EmptyCommand,
}

impl RepoError {
    fn from_output(program: &str, output: CommandOutput) -> Self {
        let status_text = output
            .code
            .map_or_else(|| String::from("unknown"), |code| code.to_string());
        Self::CommandFailure {
            program: program.to_owned(),
            status: output.code,
            status_text,
            stderr: output.stderr.trim().to_owned(),
        }
    }
}

/// Abstraction over command execution to support fakes in tests.
pub trait CommandRunner {
    /// Runs `program` with `args` inside `dir`, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::Spawn`] if the command cannot be started.
    fn run(&self, dir: &Utf8Path, program: &str, args: &[OsString])
    -> Result<CommandOutput, RepoError>;
}

/// Real command runner that shells out to the host operating system.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessCommandRunner;

impl CommandRunner for ProcessCommandRunner {
    fn run(
        &self,
        dir: &Utf8Path,
        program: &str,
        args: &[OsString],
    ) -> Result<CommandOutput, RepoError> {
        let output = Command::new(program)
            .args(args)
            .current_dir(dir)
            .output()
            .map_err(|err| RepoError::Spawn {
                program: program.to_owned(),
                message: err.to_string(),
            })?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Returns the branch checked out in the git repository at `dir`.
///
/// # Errors
///
/// Returns [`RepoError::Detached`] when `HEAD` is detached, and
/// [`RepoError::Spawn`] or [`RepoError::CommandFailure`] when `git` cannot
/// report a branch (for example outside a repository).
pub fn git_branch<R: CommandRunner>(runner: &R, dir: &Utf8Path) -> Result<String, RepoError> {
    let args = ["rev-parse", "--abbrev-ref", "HEAD"].map(OsString::from);
    let output = runner.run(dir, "git", &args)?;
    if !output.is_success() {
        return Err(RepoError::from_output("git", output));
    }

    let branch = output.stdout.trim();
    if branch == "HEAD" {
        return Err(RepoError::Detached);
    }
    Ok(branch.to_owned())
}

/// Outcome of one command run by [`run_all`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StepOutcome {
    /// Command line as executed, trimmed.
    pub command: String,
    /// Trimmed standard output.
    pub stdout: String,
    /// Failure, if the command did not start or exited non-zero.
    pub error: Option<RepoError>,
}

impl StepOutcome {
    /// Returns `true` when the step completed successfully.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Runs each command line in `dir` in order, stopping after the first
/// failure.
///
/// Command lines are split on whitespace; no shell quoting is interpreted.
/// The returned outcomes cover every command that ran, including the
/// failing one.
pub fn run_all<R, S>(runner: &R, dir: &Utf8Path, commands: &[S]) -> Vec<StepOutcome>
where
    R: CommandRunner,
    S: AsRef<str>,
{
    let mut outcomes = Vec::with_capacity(commands.len());
    for line in commands {
        let outcome = run_step(runner, dir, line.as_ref().trim());
        let failed = !outcome.is_success();
        outcomes.push(outcome);
        if failed {
            break;
        }
    }
    outcomes
}

fn run_step<R: CommandRunner>(runner: &R, dir: &Utf8Path, command: &str) -> StepOutcome {
    let mut parts = command.split_whitespace();
    let Some(program) = parts.next() else {
        return StepOutcome {
            command: command.to_owned(),
            stdout: String::new(),
            error: Some(RepoError::EmptyCommand),
        };
    };
    let args: Vec<OsString> = parts.map(OsString::from).collect();

    match runner.run(dir, program, &args) {
        Ok(output) if output.is_success() => StepOutcome {
            command: command.to_owned(),
            stdout: output.stdout.trim().to_owned(),
            error: None,
        },
        Ok(output) => StepOutcome {
            command: command.to_owned(),
            stdout: output.stdout.trim().to_owned(),
            error: Some(RepoError::from_output(program, output)),
        },
        Err(err) => StepOutcome {
            command: command.to_owned(),
            stdout: String::new(),
            error: Some(err),
        },
    }
}
