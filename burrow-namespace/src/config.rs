//! Namespace configuration

use burrow_core::{Error, Result, SetupStep};
use nix::sched::CloneFlags;
use nix::sys::signal::Signal;
use serde::{Deserialize, Serialize};

/// Hostname given to the UTS namespace unless configured otherwise
pub const DEFAULT_HOSTNAME: &str = "new-hostname";

/// Longest hostname the kernel accepts (`HOST_NAME_MAX`)
pub const MAX_HOSTNAME_LENGTH: usize = 64;

/// Namespace configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespaceConfig {
    /// Enable network namespace
    pub network: bool,

    /// Enable UTS namespace (hostname)
    pub uts: bool,

    /// Enable mount namespace
    pub mount: bool,

    /// Enable IPC namespace
    pub ipc: bool,

    /// Enable PID namespace
    pub pid: bool,

    /// Enable user namespace
    pub user: bool,

    /// Hostname for UTS namespace
    pub hostname: String,
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            network: true,
            uts: true,
            mount: true,
            ipc: true,
            pid: true,
            user: true,
            hostname: DEFAULT_HOSTNAME.to_string(),
        }
    }
}

impl NamespaceConfig {
    /// Create a new namespace configuration with every namespace enabled
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// No namespaces at all, for callers that opt in one by one
    #[must_use]
    pub fn none() -> Self {
        Self {
            network: false,
            uts: false,
            mount: false,
            ipc: false,
            pid: false,
            user: false,
            hostname: DEFAULT_HOSTNAME.to_string(),
        }
    }

    /// Enable network namespace
    #[must_use]
    pub fn with_network(mut self, enable: bool) -> Self {
        self.network = enable;
        self
    }

    /// Enable UTS namespace
    #[must_use]
    pub fn with_uts(mut self, enable: bool) -> Self {
        self.uts = enable;
        self
    }

    /// Enable mount namespace
    #[must_use]
    pub fn with_mount(mut self, enable: bool) -> Self {
        self.mount = enable;
        self
    }

    /// Enable IPC namespace
    #[must_use]
    pub fn with_ipc(mut self, enable: bool) -> Self {
        self.ipc = enable;
        self
    }

    /// Enable PID namespace
    #[must_use]
    pub fn with_pid(mut self, enable: bool) -> Self {
        self.pid = enable;
        self
    }

    /// Enable user namespace
    #[must_use]
    pub fn with_user(mut self, enable: bool) -> Self {
        self.user = enable;
        self
    }

    /// Set hostname for UTS namespace
    #[must_use]
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    /// Check the configuration before anything is spawned
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] if the hostname is empty, longer than
    /// [`MAX_HOSTNAME_LENGTH`] bytes or contains a NUL byte.
    pub fn validate(&self) -> Result<()> {
        if self.hostname.is_empty() {
            return Err(Error::InvalidConfig {
                message: "hostname cannot be empty".to_string(),
            });
        }

        if self.hostname.len() > MAX_HOSTNAME_LENGTH {
            return Err(Error::InvalidConfig {
                message: format!("hostname too long (max {MAX_HOSTNAME_LENGTH} bytes)"),
            });
        }

        if self.hostname.contains('\0') {
            return Err(Error::InvalidConfig {
                message: "hostname cannot contain a NUL byte".to_string(),
            });
        }

        Ok(())
    }

    /// Convert to clone flags for clone(2)
    #[must_use]
    pub fn to_clone_flags(&self) -> CloneFlags {
        let mut flags = CloneFlags::empty();

        if self.network {
            flags |= CloneFlags::CLONE_NEWNET;
        }
        if self.uts {
            flags |= CloneFlags::CLONE_NEWUTS;
        }
        if self.mount {
            flags |= CloneFlags::CLONE_NEWNS;
        }
        if self.ipc {
            flags |= CloneFlags::CLONE_NEWIPC;
        }
        if self.pid {
            flags |= CloneFlags::CLONE_NEWPID;
        }
        if self.user {
            flags |= CloneFlags::CLONE_NEWUSER;
        }

        flags
    }

    /// Compose the request handed to clone(2)
    #[must_use]
    pub fn isolation_request(&self) -> IsolationRequest {
        IsolationRequest {
            flags: self.to_clone_flags(),
            exit_signal: Signal::SIGCHLD,
        }
    }

    /// Check if any namespaces are enabled
    #[must_use]
    pub const fn has_any(&self) -> bool {
        self.network || self.uts || self.mount || self.ipc || self.pid || self.user
    }

    /// Get list of enabled namespace names
    #[must_use]
    pub fn enabled_namespaces(&self) -> Vec<&'static str> {
        let mut namespaces = Vec::new();

        if self.network {
            namespaces.push("net");
        }
        if self.uts {
            namespaces.push("uts");
        }
        if self.mount {
            namespaces.push("mnt");
        }
        if self.ipc {
            namespaces.push("ipc");
        }
        if self.pid {
            namespaces.push("pid");
        }
        if self.user {
            namespaces.push("user");
        }

        namespaces
    }

    /// Setup steps the isolated child runs, in order
    ///
    /// A step is only planned when the namespace it modifies is private to
    /// the child; otherwise it would change the host. Exec is always last.
    #[must_use]
    pub fn setup_plan(&self) -> impl Iterator<Item = SetupStep> + '_ {
        SetupStep::ALL.into_iter().filter(|step| match step {
            SetupStep::Remount => self.mount,
            SetupStep::Hostname => self.uts,
            SetupStep::Ipc => self.ipc,
            SetupStep::Exec => true,
        })
    }
}

/// Namespace set and exit signal passed to clone(2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsolationRequest {
    /// `CLONE_NEW*` flags for the namespaces to create
    pub flags: CloneFlags,
    /// Signal the kernel sends the parent when the child exits
    pub exit_signal: Signal,
}

impl Default for IsolationRequest {
    fn default() -> Self {
        compose_isolation_request()
    }
}

/// The full isolation set: network, UTS, mount, IPC, PID and user
/// namespaces, with `SIGCHLD` on exit
#[must_use]
pub fn compose_isolation_request() -> IsolationRequest {
    NamespaceConfig::default().isolation_request()
}
