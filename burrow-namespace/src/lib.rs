//! Namespace isolation for a single command
//!
//! This crate starts one child process in new Linux namespaces and prepares
//! them before running the requested command:
//! - PID namespace - `/proc` is remounted so the child sees itself as PID 1
//! - UTS namespace - the child gets its own hostname
//! - IPC namespace - a message queue only the child can see
//! - Network, mount and user namespaces are created and left as-is

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod config;
pub mod executor;
pub mod setup;

pub use config::{DEFAULT_HOSTNAME, IsolationRequest, NamespaceConfig, compose_isolation_request};
pub use executor::{ExecutionStack, Launcher, await_and_translate, launch, spawn_isolated};
