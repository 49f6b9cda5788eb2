//! Launching a command in freshly created namespaces
//!
//! This module uses `unsafe` for clone(2), which starts the child on a
//! caller-provided stack.

#![allow(unsafe_code)]

use burrow_core::{CommandSpec, Error, ExitOutcome, ProcessId, Result};
use nix::errno::Errno;
use nix::sched::{CloneCb, clone};
use nix::sys::wait::waitpid;
use tracing::{debug, info, warn};

use crate::config::{IsolationRequest, NamespaceConfig};
use crate::setup;

/// Size of the isolated child's stack
pub const STACK_SIZE: usize = 1024 * 1024;

/// Memory the isolated child runs its entry point on
///
/// Must stay alive until the child has terminated.
#[derive(Debug)]
pub struct ExecutionStack {
    memory: Box<[u8]>,
}

impl ExecutionStack {
    /// Allocate a zeroed stack of [`STACK_SIZE`] bytes
    #[must_use]
    pub fn new() -> Self {
        Self {
            memory: vec![0; STACK_SIZE].into_boxed_slice(),
        }
    }

    /// Stack size in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    /// Whether the stack has no memory
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.memory
    }
}

impl Default for ExecutionStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a process running `entry_point` inside the namespaces of `request`
///
/// The namespaces are entered atomically with process creation. The return
/// value of `entry_point` becomes the child's exit code.
///
/// # Errors
/// Returns [`Error::Spawn`] if the kernel rejects the request
pub fn spawn_isolated<'a, F>(
    entry_point: F,
    stack: &mut ExecutionStack,
    request: IsolationRequest,
) -> Result<ProcessId>
where
    F: FnMut() -> isize + 'a,
{
    let callback: CloneCb<'a> = Box::new(entry_point);

    debug!(flags = ?request.flags, stack_size = stack.len(), "Calling clone");

    // SAFETY: no CLONE_VM, so the child runs on its own copy of the address
    // space; the stack outlives the child because the caller holds it until
    // the child has been waited for.
    let child = unsafe {
        clone(
            callback,
            stack.as_mut_slice(),
            request.flags,
            Some(request.exit_signal as libc::c_int),
        )
    }
    .map_err(Error::Spawn)?;

    Ok(ProcessId::from(child))
}

/// Block until `child` terminates and translate how it ended
///
/// # Errors
/// Returns [`Error::Wait`] if waitpid(2) fails for a reason other than `EINTR`
pub fn await_and_translate(child: ProcessId) -> Result<ExitOutcome> {
    debug!(pid = %child, "Waiting for child to exit");

    loop {
        match waitpid(child.as_nix_pid(), None) {
            Ok(status) => match ExitOutcome::from_wait_status(status) {
                Some(outcome @ ExitOutcome::Exited(_)) => {
                    info!(pid = %child, %outcome, "Child finished");
                    return Ok(outcome);
                }
                Some(outcome @ ExitOutcome::Signaled(_)) => {
                    warn!(pid = %child, %outcome, "Child terminated by signal");
                    return Ok(outcome);
                }
                None => debug!(pid = %child, ?status, "Child still running"),
            },
            Err(Errno::EINTR) => {
                debug!("Wait interrupted by signal, continuing...");
            }
            Err(e) => return Err(Error::Wait(e)),
        }
    }
}

/// Runs commands in a new set of namespaces, one child at a time
#[derive(Debug, Clone, Default)]
pub struct Launcher {
    config: NamespaceConfig,
}

impl Launcher {
    /// Create a launcher for `config`
    #[must_use]
    pub const fn new(config: NamespaceConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    #[must_use]
    pub const fn config(&self) -> &NamespaceConfig {
        &self.config
    }

    /// Run `command` isolated and wait for it
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] before spawning anything if the
    /// configuration is invalid, [`Error::Spawn`] or [`Error::Wait`]
    /// otherwise. Failures inside the child surface as
    /// `ExitOutcome::Exited(1)`.
    pub fn launch(&self, command: &CommandSpec) -> Result<ExitOutcome> {
        self.config.validate()?;

        let config = &self.config;
        let request = config.isolation_request();

        info!(
            command = %command,
            namespaces = ?config.enabled_namespaces(),
            hostname = %config.hostname,
            "Launching isolated command"
        );

        let mut stack = ExecutionStack::new();
        let child = spawn_isolated(|| setup::entry_point(config, command), &mut stack, request)?;

        debug!(pid = %child, "Child spawned");

        match await_and_translate(child) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                // Child may still be running on it
                std::mem::forget(stack);
                Err(e)
            }
        }
    }
}

/// Run `command` with the default isolation set and hostname
///
/// # Errors
/// See [`Launcher::launch`]
pub fn launch(command: &CommandSpec) -> Result<ExitOutcome> {
    Launcher::default().launch(command)
}
