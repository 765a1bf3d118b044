//! External command execution.
//!
//! Every subprocess (container runs, scheduler invocations) is described by
//! a [`CommandSpec`] and executed through a [`CommandRunner`], so pipelines
//! can be exercised in tests without docker or a scheduler installed.

use std::fmt;
use std::path::PathBuf;
use std::process::Command;
use tracing::{error, info};

use super::error::SolverError;

//─────────────────────────────────────────────────────────────────────────────

/// A program invocation: program, arguments and optional working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

impl fmt::Display for CommandSpec {
    /// Shell-like rendering for logs; arguments with spaces are double-quoted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Trait for running external commands to completion.
pub trait CommandRunner {
    /// Runs the command and returns its exit code.
    ///
    /// # Errors
    /// Returns `SolverError::Spawn` if the program cannot be started.
    fn run(&self, spec: &CommandSpec) -> Result<i32, SolverError>;
}

/// Runs commands with `std::process::Command`, inheriting stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<i32, SolverError> {
        let mut command = Command::new(&spec.program);
        command.args(&spec.args);
        if let Some(dir) = &spec.cwd {
            command.current_dir(dir);
        }
        let status = command.status().map_err(|e| SolverError::Spawn {
            program: spec.program.clone(),
            source: e,
        })?;
        // Terminated by a signal: no code, report a generic failure.
        Ok(status.code().unwrap_or(1))
    }
}

/// Runs `spec` and turns a non-zero exit into `SolverError::CommandFailed`.
pub fn run_checked(runner: &dyn CommandRunner, spec: &CommandSpec) -> Result<(), SolverError> {
    info!("Running: {}", spec);
    let code = runner.run(spec)?;
    if code != 0 {
        error!("Command failed with exit code {}: {}", code, spec);
        return Err(SolverError::CommandFailed {
            command: spec.to_string(),
            code,
        });
    }
    Ok(())
}

#[cfg(test)]
pub mod mock {
    //! Recording runner for tests.

    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Records every command and answers with scripted exit codes
    /// (0 once the script is exhausted).
    #[derive(Debug, Default)]
    pub struct RecordingRunner {
        pub commands: RefCell<Vec<CommandSpec>>,
        exit_codes: RefCell<VecDeque<i32>>,
    }

    impl RecordingRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_exit_codes(codes: &[i32]) -> Self {
            Self {
                commands: RefCell::new(Vec::new()),
                exit_codes: RefCell::new(codes.iter().copied().collect()),
            }
        }

        pub fn recorded(&self) -> Vec<CommandSpec> {
            self.commands.borrow().clone()
        }
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, spec: &CommandSpec) -> Result<i32, SolverError> {
            self.commands.borrow_mut().push(spec.clone());
            Ok(self.exit_codes.borrow_mut().pop_front().unwrap_or(0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::RecordingRunner;
    use super::*;

    #[test]
    fn test_display_quotes_arguments_with_spaces() {
        let spec = CommandSpec::new("docker")
            .args(["run", "--rm"])
            .arg("/bin/bash")
            .arg("-c")
            .arg("source x && cd y");
        assert_eq!(
            spec.to_string(),
            "docker run --rm /bin/bash -c \"source x && cd y\""
        );
    }

    #[test]
    fn test_run_checked_propagates_exit_code() {
        let runner = RecordingRunner::with_exit_codes(&[0, 3]);
        let spec = CommandSpec::new("snakemake").args(["-j", "1"]);
        assert!(run_checked(&runner, &spec).is_ok());
        let err = run_checked(&runner, &spec).unwrap_err();
        assert!(matches!(err, SolverError::CommandFailed { code: 3, .. }));
        assert_eq!(err.exit_code(), 3);
        assert_eq!(runner.recorded().len(), 2);
    }

    #[test]
    fn test_system_runner_reports_missing_program() {
        let spec = CommandSpec::new("hullflow-definitely-not-a-real-program");
        let result = SystemRunner.run(&spec);
        assert!(matches!(result, Err(SolverError::Spawn { .. })));
    }
}
