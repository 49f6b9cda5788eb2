//! Burrow Core - Error taxonomy and shared values
//!
//! This crate provides the types the namespace launcher and the CLI agree on.

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod types;

pub use error::{Error, Result, SetupStep};
pub use types::{CommandSpec, ExitOutcome, ProcessId};
