// src/engine/input.rs

//! Event sources feeding the command loop.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::engine::LoopEvent;

/// Forward each line of `input` as [`LoopEvent::Line`], then
/// [`LoopEvent::InputClosed`] at end of input.
///
/// Lines are read one at a time; the next line is only read once the
/// previous event was accepted by the channel.
pub fn spawn_line_reader<R>(input: R, tx: mpsc::Sender<LoopEvent>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(input).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(LoopEvent::Line(line)).await.is_err() {
                        debug!("command loop gone; input reader exiting");
                        return;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "failed reading operator input");
                    break;
                }
            }
        }
        let _ = tx.send(LoopEvent::InputClosed).await;
    })
}

/// [`spawn_line_reader`] over the process's stdin.
pub fn spawn_stdin_reader(tx: mpsc::Sender<LoopEvent>) -> JoinHandle<()> {
    spawn_line_reader(tokio::io::stdin(), tx)
}

/// Forward Ctrl-C (and SIGHUP or SIGTERM on unix) as [`LoopEvent::Interrupted`].
pub fn spawn_interrupt_listener(tx: mpsc::Sender<LoopEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = wait_for_interrupt().await {
            warn!(error = %e, "failed to listen for interrupts");
            return;
        }
        let _ = tx.send(LoopEvent::Interrupted).await;
    })
}

#[cfg(unix)]
async fn wait_for_interrupt() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup())?;
    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res,
        _ = hangup.recv() => {
            debug!("received SIGHUP");
            Ok(())
        }
        _ = terminate.recv() => {
            debug!("received SIGTERM");
            Ok(())
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_interrupt() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
