//! Setup performed inside the new namespaces before the command runs
//!
//! The isolated child is already inside every requested namespace when it
//! starts; this module makes those namespaces useful:
//! 1. Remounts `/proc` so it reflects the new PID namespace
//! 2. Sets the namespace-local hostname
//! 3. Creates a System V message queue in the new IPC namespace
//! 4. Replaces itself with the user command
//!
//! Steps run strictly in that order and the first failure ends the child.

#![allow(unsafe_code)]

use burrow_core::{CommandSpec, Error, Result, SetupStep};
use nix::errno::Errno;
use nix::mount::{MsFlags, mount};
use nix::unistd::{execvp, sethostname};
use std::convert::Infallible;
use tracing::debug;

use crate::config::NamespaceConfig;

/// Exit code of the isolated child when any setup step fails
pub const SETUP_FAILURE_EXIT_CODE: isize = 1;

/// Entry point of the isolated child
///
/// Only returns if setup or exec failed, after printing the diagnostic line;
/// the return value becomes the child's exit code.
pub fn entry_point(config: &NamespaceConfig, command: &CommandSpec) -> isize {
    debug!(pid = %nix::unistd::getpid(), "Isolated child started");

    match run(config, command) {
        Ok(never) => match never {},
        Err(e) => {
            debug!(error = %e, "Isolated setup aborted");
            eprintln!("{e}");
            SETUP_FAILURE_EXIT_CODE
        }
    }
}

/// Run every planned step, ending in exec
///
/// # Errors
/// Returns the first step that failed, tagged with its [`SetupStep`].
pub fn run(config: &NamespaceConfig, command: &CommandSpec) -> Result<Infallible> {
    for step in config.setup_plan() {
        match step {
            SetupStep::Remount => remount_proc()?,
            SetupStep::Hostname => set_hostname(&config.hostname)?,
            SetupStep::Ipc => {
                create_message_queue()?;
            }
            SetupStep::Exec => return exec_command(command),
        }
    }

    // setup_plan always ends with Exec
    exec_command(command)
}

/// Mount a fresh procfs over `/proc`
///
/// # Errors
/// Returns [`SetupStep::Remount`] with the mount(2) errno.
pub fn remount_proc() -> Result<()> {
    debug!("Mounting new /proc");

    mount(
        Some("proc"),
        "/proc",
        Some("proc"),
        MsFlags::empty(),
        None::<&str>,
    )
    .map_err(|e| Error::setup(SetupStep::Remount, e))
}

/// Set the hostname of the current UTS namespace
///
/// # Errors
/// Returns [`SetupStep::Hostname`] with the sethostname(2) errno.
pub fn set_hostname(hostname: &str) -> Result<()> {
    debug!(hostname = %hostname, "Setting hostname");

    sethostname(hostname).map_err(|e| Error::setup(SetupStep::Hostname, e))
}

/// Create a private message queue, returning its identifier
///
/// # Errors
/// Returns [`SetupStep::Ipc`] with the msgget(2) errno.
pub fn create_message_queue() -> Result<i32> {
    // nix has no System V IPC bindings
    let flags = libc::IPC_CREAT | libc::IPC_EXCL | 0o600;
    let id = unsafe { libc::msgget(libc::IPC_PRIVATE, flags) };

    let id = Errno::result(id).map_err(|e| Error::setup(SetupStep::Ipc, e))?;
    debug!(queue_id = id, "Created message queue");

    Ok(id)
}

/// Replace the current process image with `command`, searching `PATH`
///
/// # Errors
/// Only returns on failure, with [`SetupStep::Exec`] and the execvp(3) errno.
pub fn exec_command(command: &CommandSpec) -> Result<Infallible> {
    debug!(command = %command, "Executing command");

    execvp(command.program(), command.argv()).map_err(|e| Error::setup(SetupStep::Exec, e))
}
