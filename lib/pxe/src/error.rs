//! Error types of the config interpreter.
//!
//! Structural problems (malformed tokens, runaway includes, failed fetches of
//! a config file) abort a whole parse. Problems with a single label are
//! reported through the same type but only cost that label its boot attempt.

use alloc::string::String;
use core::fmt::{Display, Formatter};

/// Errors reported by a [crate::platform::Platform] when loading a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchError {
    /// The file does not exist on the boot server / device.
    NotFound,
    /// The transfer itself failed.
    Io,
    /// The file does not fit at the requested load address.
    OutOfMemory,
}

/// Errors reported by a boot-monitor command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The command is not available on this platform.
    Unsupported,
    /// The command ran and failed.
    Failed { code: i32 },
    /// Custom platform-specific information.
    Customized { info: String },
}

/// Errors of the generic selectable menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuError {
    /// No item, or no default item when one was needed.
    NotFound,
    /// The user aborted the prompt.
    Interrupted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PxeError {
    /// A string literal was required; `snippet` is the offending input.
    ExpectedLiteral { snippet: String },
    /// `include` chains deeper than the configured limit.
    NestingTooDeep { limit: usize },
    /// A path would exceed the loader's path limit.
    NameTooLong { path: String },
    /// A fixed-size buffer is too small for the value.
    NoSpace,
    /// A required environment variable is not set.
    MissingVariable { name: String },
    /// An environment variable does not hold a valid number.
    InvalidNumber { name: String, value: String },
    /// Fetching `path` failed.
    Fetch { path: String, err: FetchError },
    /// The generated kernel command line would not fit the command buffer.
    BootargsOverflow { len: usize, limit: usize },
    /// A label has neither `kernel` nor `localboot`.
    NoKernel { label: String },
    /// A file needed by a label could not be loaded.
    Retrieve {
        label: String,
        what: &'static str,
        source: alloc::boxed::Box<PxeError>,
    },
    /// None of the boot handlers accepted the kernel image.
    NoBootHandler,
    /// No config file was found for this client.
    NoConfig,
    Menu(MenuError),
    Command(CommandError),
}

impl From<MenuError> for PxeError {
    fn from(err: MenuError) -> Self {
        PxeError::Menu(err)
    }
}

impl From<CommandError> for PxeError {
    fn from(err: CommandError) -> Self {
        PxeError::Command(err)
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            FetchError::NotFound => f.write_str("file not found"),
            FetchError::Io => f.write_str("transfer failed"),
            FetchError::OutOfMemory => f.write_str("file does not fit at load address"),
        }
    }
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            CommandError::Unsupported => f.write_str("command not supported"),
            CommandError::Failed { code } => write!(f, "command failed ({})", code),
            CommandError::Customized { info } => f.write_str(info),
        }
    }
}

impl Display for MenuError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            MenuError::NotFound => f.write_str("no menu choice available"),
            MenuError::Interrupted => f.write_str("interrupted"),
        }
    }
}

impl Display for PxeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            PxeError::ExpectedLiteral { snippet } => {
                write!(f, "Expected string literal: {}", snippet)
            }
            PxeError::NestingTooDeep { limit } => {
                write!(f, "Maximum nesting ({}) exceeded", limit)
            }
            PxeError::NameTooLong { path } => write!(f, "Base path too long ({})", path),
            PxeError::NoSpace => f.write_str("buffer too small"),
            PxeError::MissingVariable { name } => {
                write!(f, "missing environment variable: {}", name)
            }
            PxeError::InvalidNumber { name, value } => {
                write!(f, "invalid number in {}: '{}'", name, value)
            }
            PxeError::Fetch { path, err } => write!(f, "Couldn't retrieve {}: {}", path, err),
            PxeError::BootargsOverflow { len, limit } => {
                write!(f, "bootarg overflow {} > {}", len, limit)
            }
            PxeError::NoKernel { label } => write!(f, "No kernel given, skipping {}", label),
            PxeError::Retrieve { label, what, source } => {
                write!(f, "Skipping {} for failure retrieving {} ({})", label, what, source)
            }
            PxeError::NoBootHandler => f.write_str("no boot command accepted the kernel image"),
            PxeError::NoConfig => f.write_str("Config file not found"),
            PxeError::Menu(err) => write!(f, "menu: {}", err),
            PxeError::Command(err) => write!(f, "{}", err),
        }
    }
}
