// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`command`] runs one-shot external commands (compiler, git) and
//!   captures their output.
//! - [`supervisor`] owns the long-lived backend and frontend processes.
//! - [`control`] provides the `ServerControl` trait the command loop uses to
//!   stop the servers, so tests can swap in a fake.

pub mod command;
pub mod control;
pub mod supervisor;

pub use command::{run_captured, CapturedOutput, CommandSpec};
pub use control::ServerControl;
pub use supervisor::{LaunchSpec, ProcessSupervisor, ServerHandle};
