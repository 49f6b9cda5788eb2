//! Error types for Burrow
//!
//! Every variant renders as the single diagnostic line the launcher and the
//! isolated child print before exiting: `Error <reason>: <description>`.

use nix::errno::Errno;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Setup step performed inside the new namespaces, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupStep {
    /// Remount `/proc` for the new PID namespace
    Remount,
    /// Set the namespace-local hostname
    Hostname,
    /// Create a System V message queue in the new IPC namespace
    Ipc,
    /// Replace the process image with the user command
    Exec,
}

impl SetupStep {
    /// Every step, in the order the isolated child runs them
    pub const ALL: [Self; 4] = [Self::Remount, Self::Hostname, Self::Ipc, Self::Exec];

    /// Short tag used in structured log fields
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Remount => "remount",
            Self::Hostname => "hostname",
            Self::Ipc => "ipc",
            Self::Exec => "exec",
        }
    }

    /// Reason text used in the diagnostic line
    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::Remount => "mounting proc",
            Self::Hostname => "setting hostname",
            Self::Ipc => "creating message queue",
            Self::Exec => "executing command",
        }
    }
}

impl fmt::Display for SetupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Burrow error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// No command was given on the command line
    #[error("No command specified")]
    Usage,

    /// Command cannot be handed to `execvp`
    #[error("Error parsing command: {message}")]
    InvalidCommand {
        /// Error message
        message: String,
    },

    /// Invalid namespace configuration
    #[error("Error in configuration: {message}")]
    InvalidConfig {
        /// Error message
        message: String,
    },

    /// Kernel refused to create the isolated process
    #[error("Error calling clone: {}", .0.desc())]
    Spawn(Errno),

    /// Waiting on the isolated process failed
    #[error("Error waiting for pid: {}", .0.desc())]
    Wait(Errno),

    /// A setup step inside the isolated process failed
    #[error("Error {}: {}", .step.reason(), .source.desc())]
    Setup {
        /// Step that failed
        step: SetupStep,
        /// Underlying system error
        source: Errno,
    },
}

impl Error {
    /// Build a setup error for `step`
    #[must_use]
    pub const fn setup(step: SetupStep, source: Errno) -> Self {
        Self::Setup { step, source }
    }

    /// Underlying system error, when there is one
    #[must_use]
    pub const fn errno(&self) -> Option<Errno> {
        match self {
            Self::Spawn(errno) | Self::Wait(errno) | Self::Setup { source: errno, .. } => {
                Some(*errno)
            }
            _ => None,
        }
    }
}

/// Result type alias for Burrow operations
pub type Result<T> = std::result::Result<T, Error>;
