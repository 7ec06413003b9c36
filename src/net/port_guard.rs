// src/net/port_guard.rs

//! Best-effort check that a TCP port is free before a server is launched.
//!
//! The check cannot reserve the port: another process may bind it between
//! the check and the moment the child server binds it.

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use anyhow::Context;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::debug;

use crate::config::RuntimeConfig;
use crate::errors::{LauncherError, Result};
use crate::types::ServerRole;

const CONNECT_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortStatus {
    Free,
    Occupied,
}

/// Whether anything listens on `port`.
///
/// A port counts as occupied when a local connection succeeds or when it
/// cannot be bound on all interfaces because the address is in use.
pub async fn check_port(port: u16) -> io::Result<PortStatus> {
    let loopback = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    if let Ok(Ok(_stream)) = timeout(CONNECT_TIMEOUT, TcpStream::connect(loopback)).await {
        debug!(port, "port accepted a connection");
        return Ok(PortStatus::Occupied);
    }

    match TcpListener::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))).await {
        Ok(listener) => {
            drop(listener);
            Ok(PortStatus::Free)
        }
        Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
            debug!(port, "port is bound by another socket");
            Ok(PortStatus::Occupied)
        }
        Err(e) => Err(e),
    }
}

/// Fail with [`LauncherError::PortConflict`] if the port of `role` is taken.
pub async fn ensure_free(role: ServerRole, port: u16) -> Result<()> {
    let status = check_port(port)
        .await
        .with_context(|| format!("probing port {port} for {role}"))?;

    match status {
        PortStatus::Free => Ok(()),
        PortStatus::Occupied => Err(LauncherError::PortConflict {
            port,
            role,
            option: role.port_option(),
        }),
    }
}

/// Check the ports of both servers, backend first.
pub async fn ensure_ports_free(cfg: &RuntimeConfig) -> Result<()> {
    for role in ServerRole::ALL {
        ensure_free(role, cfg.port_of(role)).await?;
    }
    Ok(())
}
