// src/health/mod.rs

//! Startup health polling of the backend.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::model::HealthSection;
use crate::errors::{LauncherError, Result};
use crate::types::BoxFuture;

/// A lightweight request whose only job is to reach the backend.
pub trait HealthProbe: Send + Sync {
    /// `Ok` as soon as the backend answered anything at all.
    fn probe(&self) -> BoxFuture<'_, Result<()>>;
}

/// Fixed-interval retry budget, no jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 15,
            interval: Duration::from_secs(2),
        }
    }
}

impl From<&HealthSection> for PollPolicy {
    fn from(section: &HealthSection) -> Self {
        Self {
            max_attempts: section.max_attempts,
            interval: Duration::from_secs(section.interval_secs),
        }
    }
}

/// Probe until the backend answers, returning the successful attempt number.
///
/// After `policy.max_attempts` consecutive failures, fails with
/// [`LauncherError::HealthTimeout`] pointing at `error_log`.
pub async fn wait_until_healthy<P>(probe: &P, policy: PollPolicy, error_log: &Path) -> Result<u32>
where
    P: HealthProbe + ?Sized,
{
    for attempt in 1..=policy.max_attempts {
        match probe.probe().await {
            Ok(()) => {
                info!(attempt, "backend is answering");
                return Ok(attempt);
            }
            Err(e) => {
                debug!(attempt, max = policy.max_attempts, error = %e, "backend not ready");
            }
        }

        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    warn!(attempts = policy.max_attempts, log = %error_log.display(), "backend never answered");
    Err(LauncherError::HealthTimeout {
        attempts: policy.max_attempts,
        log: error_log.to_path_buf(),
    })
}
