// src/client/mod.rs

//! HTTP client for the two backend endpoints the launcher uses: the health
//! probe and the refresh notification.

use std::time::Duration;

use anyhow::Context;
use tracing::debug;

use crate::config::RuntimeConfig;
use crate::errors::{LauncherError, Result};
use crate::health::HealthProbe;
use crate::types::BoxFuture;

/// Tells a running backend to reload compiled corpora.
pub trait RefreshNotifier: Send + Sync {
    fn refresh(&self) -> BoxFuture<'_, Result<()>>;
}

/// Backend client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackendClient {
    http: reqwest::Client,
    ping_url: String,
    refresh_url: String,
}

impl HttpBackendClient {
    /// `base_url` must end with `/`; paths are appended verbatim.
    pub fn new(
        base_url: &str,
        ping_path: &str,
        refresh_path: &str,
        request_timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            http,
            ping_url: format!("{base_url}{}", ping_path.trim_start_matches('/')),
            refresh_url: format!("{base_url}{}", refresh_path.trim_start_matches('/')),
        })
    }

    pub fn from_runtime(cfg: &RuntimeConfig) -> Result<Self> {
        let backend = &cfg.profile.backend;
        Self::new(
            &cfg.backend_url(),
            &backend.ping_path,
            &backend.refresh_path,
            Duration::from_secs(backend.request_timeout_secs),
        )
    }

    pub fn ping_url(&self) -> &str {
        &self.ping_url
    }

    pub fn refresh_url(&self) -> &str {
        &self.refresh_url
    }
}

impl HealthProbe for HttpBackendClient {
    /// Any HTTP response counts; only transport errors fail the probe.
    fn probe(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let response = self
                .http
                .post(&self.ping_url)
                .send()
                .await
                .map_err(|e| {
                    LauncherError::HealthCheckFailure(format!("{}: {e}", self.ping_url))
                })?;
            debug!(url = %self.ping_url, status = %response.status(), "health probe answered");
            Ok(())
        })
    }
}

impl RefreshNotifier for HttpBackendClient {
    fn refresh(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let response = self
                .http
                .post(&self.refresh_url)
                .send()
                .await
                .map_err(|e| {
                    LauncherError::NotificationFailure(format!("{}: {e}", self.refresh_url))
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(LauncherError::NotificationFailure(format!(
                    "{} answered {status}",
                    self.refresh_url
                )));
            }
            debug!(url = %self.refresh_url, %status, "refresh acknowledged");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_urls_are_joined_onto_the_base() {
        let client = HttpBackendClient::new(
            "http://localhost:8899/",
            "/ping",
            "refresh_all",
            Duration::from_secs(1),
        )
        .unwrap();

        assert_eq!(client.ping_url(), "http://localhost:8899/ping");
        assert_eq!(client.refresh_url(), "http://localhost:8899/refresh_all");
    }
}
