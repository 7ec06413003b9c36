// src/exec/control.rs

//! Server control abstraction used by the command loop.
//!
//! Production code uses [`ProcessSupervisor`](super::ProcessSupervisor);
//! tests can provide an implementation that only records the calls.

use crate::errors::Result;

/// Operations the command loop needs on the running servers.
pub trait ServerControl: Send {
    /// Ask every live server to stop, without waiting for the exits.
    fn terminate_all(&mut self) -> Result<()>;
}
