// src/engine/core.rs

//! Pure command-loop state machine.
//!
//! Consumes [`LoopEvent`]s and returns the actions the IO shell has to
//! perform. No channels, processes or terminal IO here.

use crate::engine::{LoopEvent, LoopState, OperatorCommand, StopReason};

/// Action produced by the core, executed in order by the IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopAction {
    /// Compile the corpora, cleaning first when `force_clean`.
    Compile { force_clean: bool },
    /// Ask the backend to reload compiled corpora.
    NotifyRefresh,
    /// Stop both servers.
    TerminateServers,
    /// Tell the operator the input was not understood.
    ReportUnknown(String),
    /// Ask for the next command.
    Prompt,
}

/// Decision returned after handling a single event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopStep {
    pub actions: Vec<LoopAction>,
    /// Set once the loop reached `Stopped`.
    pub stopped: Option<StopReason>,
}

impl LoopStep {
    fn running(actions: Vec<LoopAction>) -> Self {
        Self {
            actions,
            stopped: None,
        }
    }
}

#[derive(Debug)]
pub struct LoopCore {
    state: LoopState,
}

impl Default for LoopCore {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopCore {
    /// A core in `Running`, the state entered once the backend is healthy.
    pub fn new() -> Self {
        Self {
            state: LoopState::Running,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn step(&mut self, event: LoopEvent) -> LoopStep {
        if self.state == LoopState::Stopped {
            return LoopStep {
                actions: Vec::new(),
                stopped: Some(StopReason::Command),
            };
        }

        match event {
            LoopEvent::Line(line) => self.handle_command(OperatorCommand::parse(&line)),
            LoopEvent::InputClosed => self.stop(StopReason::InputClosed),
            LoopEvent::Interrupted => self.stop(StopReason::Interrupted),
        }
    }

    fn handle_command(&mut self, command: OperatorCommand) -> LoopStep {
        match command {
            OperatorCommand::Stop => self.stop(StopReason::Command),
            OperatorCommand::Recompile => LoopStep::running(vec![
                LoopAction::Compile { force_clean: false },
                LoopAction::NotifyRefresh,
                LoopAction::Prompt,
            ]),
            OperatorCommand::ForceRecompile => LoopStep::running(vec![
                LoopAction::Compile { force_clean: true },
                LoopAction::NotifyRefresh,
                LoopAction::Prompt,
            ]),
            OperatorCommand::Empty => LoopStep::running(vec![LoopAction::Prompt]),
            OperatorCommand::Unknown(input) => {
                LoopStep::running(vec![LoopAction::ReportUnknown(input), LoopAction::Prompt])
            }
        }
    }

    fn stop(&mut self, reason: StopReason) -> LoopStep {
        self.state = LoopState::Stopped;
        LoopStep {
            actions: vec![LoopAction::TerminateServers],
            stopped: Some(reason),
        }
    }
}
