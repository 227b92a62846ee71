//! Errors that end a `pxeboot` run.

use core::fmt::{Debug, Display, Write};
use pxe::{BootOutcome, PxeError};
use std::{io, path::PathBuf};

/// An error that can be printed to a string device
pub trait MessageError: Debug {
    /// Print the error message to a writer
    fn print_to_writer(&self, f: &mut dyn Write) {
        if let Err(err) = f.write_fmt(format_args!("{:?}", self)) {
            let _ = f.write_fmt(format_args!("Error on printing error message: {:?}", err));
        }
    }
}

impl Display for dyn MessageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.print_to_writer(f);
        Ok(())
    }
}

#[derive(Debug)]
pub enum CliError {
    Pxe(PxeError),
    /// The environment file could not be read.
    EnvFile { path: PathBuf, err: io::Error },
    /// The environment file is not a JSON object of strings and numbers.
    EnvJson { path: PathBuf, err: serde_json::Error },
    /// A `--set` argument without `=`.
    BadAssignment(String),
    /// The logger could not be installed.
    Logger(log::SetLoggerError),
    /// Every label was tried and none booted.
    NotBooted(BootOutcome),
}

impl MessageError for CliError {
    fn print_to_writer(&self, f: &mut dyn Write) {
        let _ = match self {
            CliError::Pxe(err) => write!(f, "{}", err),
            CliError::EnvFile { path, err } => write!(f, "{}: {}", path.display(), err),
            CliError::EnvJson { path, err } => write!(f, "{}: {}", path.display(), err),
            CliError::BadAssignment(arg) => write!(f, "expected name=value, got '{}'", arg),
            CliError::Logger(err) => write!(f, "Error initializing logger: {}", err),
            CliError::NotBooted(BootOutcome::Interrupted) => write!(f, "interrupted"),
            CliError::NotBooted(outcome) => write!(f, "nothing booted ({:?})", outcome),
        };
    }
}

impl From<PxeError> for CliError {
    fn from(err: PxeError) -> Self {
        CliError::Pxe(err)
    }
}

impl From<log::SetLoggerError> for CliError {
    fn from(err: log::SetLoggerError) -> Self {
        CliError::Logger(err)
    }
}
