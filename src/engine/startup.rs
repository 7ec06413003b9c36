// src/engine/startup.rs

//! Waiting for the backend while the operator can still interrupt.

use std::path::Path;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::LoopEvent;
use crate::errors::Result;
use crate::exec::ServerControl;
use crate::health::{wait_until_healthy, HealthProbe, PollPolicy};

/// How the wait for the backend ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Startup {
    Healthy,
    Interrupted,
}

/// Poll the backend until healthy, racing an interrupt from `events`.
///
/// The servers are stopped when the poll times out or the operator
/// interrupts; the logs are left in place. Lines typed before the
/// backend is up are dropped.
pub async fn await_backend<P, S>(
    servers: &mut S,
    checker: &P,
    policy: PollPolicy,
    error_log: &Path,
    events: &mut mpsc::Receiver<LoopEvent>,
) -> Result<Startup>
where
    P: HealthProbe + ?Sized,
    S: ServerControl + ?Sized,
{
    let health = wait_until_healthy(checker, policy, error_log);
    tokio::pin!(health);
    let mut events_open = true;

    loop {
        tokio::select! {
            res = &mut health => {
                return match res {
                    Ok(_) => Ok(Startup::Healthy),
                    Err(e) => {
                        stop_servers(servers);
                        Err(e)
                    }
                };
            }
            event = events.recv(), if events_open => match event {
                Some(LoopEvent::Interrupted) => {
                    info!("interrupted while waiting for the backend");
                    stop_servers(servers);
                    return Ok(Startup::Interrupted);
                }
                Some(other) => debug!(?other, "ignoring event before the backend is up"),
                None => events_open = false,
            },
        }
    }
}

/// Ask every server to stop, logging a failure instead of raising it.
pub fn stop_servers<S: ServerControl + ?Sized>(servers: &mut S) {
    if let Err(e) = servers.terminate_all() {
        warn!(error = %e, "failed to stop servers");
    }
}
