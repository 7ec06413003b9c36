// src/engine/mod.rs

//! Interactive operator loop.
//!
//! The pure state machine lives in [`core`]; the async/IO shell that reads
//! operator input and drives the compiler, backend and servers is
//! implemented in [`runtime`]. Input sources (stdin, Ctrl-C) live in
//! [`input`] and feed the shell through a channel of [`LoopEvent`]s.

/// Command typed by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    Stop,
    Recompile,
    ForceRecompile,
    /// Blank line.
    Empty,
    Unknown(String),
}

impl OperatorCommand {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "s" | "S" => OperatorCommand::Stop,
            "r" | "R" => OperatorCommand::Recompile,
            "f" | "F" => OperatorCommand::ForceRecompile,
            "" => OperatorCommand::Empty,
            other => OperatorCommand::Unknown(other.to_string()),
        }
    }
}

/// State of the command loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// Events flowing into the command loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopEvent {
    /// One line of operator input.
    Line(String),
    /// Operator input reached end of file.
    InputClosed,
    /// Ctrl-C.
    Interrupted,
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Command,
    InputClosed,
    Interrupted,
}

pub mod core;
pub mod input;
pub mod runtime;
pub mod startup;

pub use self::core::{LoopAction, LoopCore, LoopStep};
pub use input::{spawn_interrupt_listener, spawn_line_reader, spawn_stdin_reader};
pub use runtime::{CommandLoop, PROMPT};
pub use startup::{await_backend, stop_servers, Startup};
