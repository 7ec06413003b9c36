// src/engine/runtime.rs

use std::fmt;
use std::io::Write;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::client::RefreshNotifier;
use crate::compile::CorpusCompiler;
use crate::errors::{LauncherError, Result};
use crate::exec::ServerControl;

use super::core::{LoopAction, LoopCore};
use super::{LoopEvent, StopReason};

pub const PROMPT: &str = "Enter: s: stop, r: recompile, f: force recompile. ";

/// IO shell around [`LoopCore`].
///
/// Reads [`LoopEvent`]s one at a time, feeds them to the core and executes
/// the returned actions before looking at the next event. Compile and
/// refresh failures are written to the operator output and never end the
/// loop.
pub struct CommandLoop<C, N, S, W> {
    core: LoopCore,
    events: mpsc::Receiver<LoopEvent>,
    compiler: C,
    notifier: N,
    servers: S,
    out: W,
}

impl<C, N, S, W> fmt::Debug for CommandLoop<C, N, S, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandLoop")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<C, N, S, W> CommandLoop<C, N, S, W>
where
    C: CorpusCompiler,
    N: RefreshNotifier,
    S: ServerControl,
    W: Write + Send,
{
    pub fn new(
        events: mpsc::Receiver<LoopEvent>,
        compiler: C,
        notifier: N,
        servers: S,
        out: W,
    ) -> Self {
        Self {
            core: LoopCore::new(),
            events,
            compiler,
            notifier,
            servers,
            out,
        }
    }

    /// Run until a stop command, end of input or Ctrl-C.
    pub async fn run(mut self) -> Result<StopReason> {
        info!("command loop started");
        self.prompt()?;

        loop {
            let event = match self.events.recv().await {
                Some(e) => e,
                None => LoopEvent::InputClosed,
            };
            debug!(?event, "command loop received event");

            let step = self.core.step(event);
            for action in step.actions {
                self.execute(action).await?;
            }

            if let Some(reason) = step.stopped {
                info!(?reason, "command loop stopped");
                return Ok(reason);
            }
        }
    }

    async fn execute(&mut self, action: LoopAction) -> Result<()> {
        match action {
            LoopAction::Compile { force_clean } => self.compile(force_clean).await,
            LoopAction::NotifyRefresh => self.refresh().await,
            LoopAction::TerminateServers => self.terminate(),
            LoopAction::ReportUnknown(input) => {
                writeln!(self.out, "unknown command \"{input}\"")?;
                Ok(())
            }
            LoopAction::Prompt => self.prompt(),
        }
    }

    async fn compile(&mut self, force_clean: bool) -> Result<()> {
        if force_clean {
            writeln!(self.out, "Cleaning and recompiling corpora...")?;
        } else {
            writeln!(self.out, "Recompiling corpora...")?;
        }
        self.out.flush()?;

        match self.compiler.compile(force_clean).await {
            Ok(report) => {
                write_block(&mut self.out, &report.output)?;
                if let Some(warning) = report.clean_warning {
                    writeln!(self.out, "warning: clean failed ({warning}), compiled anyway")?;
                }
                writeln!(self.out, "Compilation done.")?;
            }
            Err(LauncherError::CompileFailure { message, output }) => {
                warn!(%message, "compilation failed");
                write_block(&mut self.out, &output)?;
                writeln!(self.out, "Compilation failed: {message}")?;
            }
            Err(e) => {
                warn!(error = %e, "compilation failed");
                writeln!(self.out, "Compilation failed: {e}")?;
            }
        }
        Ok(())
    }

    async fn refresh(&mut self) -> Result<()> {
        match self.notifier.refresh().await {
            Ok(()) => writeln!(self.out, "Backend refreshed.")?,
            Err(e) => {
                warn!(error = %e, "refresh notification failed");
                writeln!(self.out, "Could not refresh the backend: {e}")?;
            }
        }
        Ok(())
    }

    fn terminate(&mut self) -> Result<()> {
        match self.servers.terminate_all() {
            Ok(()) => writeln!(self.out, "Servers stopped.")?,
            Err(e) => {
                warn!(error = %e, "failed to stop servers");
                writeln!(self.out, "Failed to stop servers: {e}")?;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    fn prompt(&mut self) -> Result<()> {
        write!(self.out, "{PROMPT}")?;
        self.out.flush()?;
        Ok(())
    }
}

fn write_block<W: Write>(out: &mut W, text: &str) -> std::io::Result<()> {
    if !text.trim().is_empty() {
        writeln!(out, "{}", text.trim_end())?;
    }
    Ok(())
}
