//! Core type definitions with strong typing and validation

use nix::sys::signal::Signal;
use nix::sys::wait::WaitStatus;
use serde::{Deserialize, Serialize};
use std::ffi::{CStr, CString};
use std::fmt;

use crate::{Error, Result};

/// Process identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct ProcessId(i32);

impl ProcessId {
    /// Create from raw PID
    #[must_use]
    pub const fn from_raw(pid: i32) -> Self {
        Self(pid)
    }

    /// Get the current process ID
    #[must_use]
    pub fn current() -> Self {
        Self(nix::unistd::getpid().as_raw())
    }

    /// Convert to `nix::unistd::Pid`
    #[must_use]
    pub const fn as_nix_pid(self) -> nix::unistd::Pid {
        nix::unistd::Pid::from_raw(self.0)
    }

    /// Get raw PID value
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<nix::unistd::Pid> for ProcessId {
    fn from(pid: nix::unistd::Pid) -> Self {
        Self(pid.as_raw())
    }
}

impl From<ProcessId> for nix::unistd::Pid {
    fn from(pid: ProcessId) -> Self {
        Self::from_raw(pid.0)
    }
}

/// Command to run inside the isolated process: program followed by its arguments
///
/// The argv is converted to C strings up front so the isolated child only
/// borrows it and never allocates between clone and exec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    argv: Vec<CString>,
}

impl CommandSpec {
    /// Create a command from an argv-style vector
    ///
    /// # Errors
    /// Returns [`Error::Usage`] if `argv` is empty and
    /// [`Error::InvalidCommand`] if any argument contains a NUL byte.
    pub fn new<I, S>(argv: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<Vec<u8>>,
    {
        let argv = argv
            .into_iter()
            .map(|arg| {
                CString::new(arg).map_err(|e| Error::InvalidCommand {
                    message: format!("argument contains a NUL byte at offset {}", e.nul_position()),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if argv.is_empty() {
            return Err(Error::Usage);
        }

        Ok(Self { argv })
    }

    /// Program to execute (`argv[0]`)
    #[must_use]
    pub fn program(&self) -> &CStr {
        &self.argv[0]
    }

    /// Full argument vector, program included
    #[must_use]
    pub fn argv(&self) -> &[CString] {
        &self.argv
    }

    /// Arguments after the program
    #[must_use]
    pub fn args(&self) -> &[CString] {
        &self.argv[1..]
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.argv.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(&arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// How the isolated process terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Normal exit with the given code
    Exited(i32),
    /// Killed by a signal
    Signaled(Signal),
}

impl ExitOutcome {
    /// Offset added to a signal number to form an exit code, as shells do
    pub const SIGNAL_EXIT_BASE: i32 = 128;

    /// Translate a wait status, or `None` if the child has not terminated
    #[must_use]
    pub const fn from_wait_status(status: WaitStatus) -> Option<Self> {
        match status {
            WaitStatus::Exited(_, code) => Some(Self::Exited(code)),
            WaitStatus::Signaled(_, signal, _) => Some(Self::Signaled(signal)),
            _ => None,
        }
    }

    /// Exit code the launcher reports for this outcome
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Exited(code) => code,
            Self::Signaled(signal) => Self::SIGNAL_EXIT_BASE + signal as i32,
        }
    }

    /// Whether the child exited normally with code 0
    #[must_use]
    pub const fn success(self) -> bool {
        matches!(self, Self::Exited(0))
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exited with code {code}"),
            Self::Signaled(signal) => write!(f, "killed by {signal}"),
        }
    }
}
