// src/exec/supervisor.rs

//! Ownership of the long-lived backend and frontend processes.

use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Child;
use tracing::{debug, info, warn};

use crate::config::RuntimeConfig;
use crate::errors::{LauncherError, Result};
use crate::exec::command::CommandSpec;
use crate::exec::control::ServerControl;
use crate::types::ServerRole;

/// What to start for a role, and where its output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub role: ServerRole,
    pub command: CommandSpec,
    pub workdir: PathBuf,
    pub stdout_log: PathBuf,
    pub stderr_log: PathBuf,
}

impl LaunchSpec {
    /// Launch spec of `role` as described by the runtime configuration.
    pub fn for_role(cfg: &RuntimeConfig, role: ServerRole) -> Result<Self> {
        let mut argv = cfg.server_command(role).into_iter();
        let program = argv.next().ok_or_else(|| {
            LauncherError::ConfigError(format!("no command configured for the {role}"))
        })?;

        Ok(Self {
            role,
            command: CommandSpec::new(program, argv),
            workdir: cfg.server_dir(role).to_path_buf(),
            stdout_log: cfg.layout.stdout_log(role),
            stderr_log: cfg.layout.stderr_log(role),
        })
    }
}

/// Opaque reference to one launched server instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerHandle {
    role: ServerRole,
    generation: u64,
    pid: Option<u32>,
    stdout_log: PathBuf,
    stderr_log: PathBuf,
}

impl ServerHandle {
    pub fn role(&self) -> ServerRole {
        self.role
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn stdout_log(&self) -> &Path {
        &self.stdout_log
    }

    pub fn stderr_log(&self) -> &Path {
        &self.stderr_log
    }
}

struct ServerInstance {
    handle: ServerHandle,
    child: Child,
}

/// Launches and terminates servers, at most one live instance per role.
///
/// Log files are handed to the child at spawn time; the supervisor keeps no
/// descriptor open on them, so they are released when the child exits.
#[derive(Default)]
pub struct ProcessSupervisor {
    instances: HashMap<ServerRole, ServerInstance>,
    next_generation: u64,
}

impl std::fmt::Debug for ProcessSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessSupervisor")
            .field(
                "instances",
                &self.instances.values().map(|i| &i.handle).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ProcessSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a server with stdout/stderr redirected to fresh log files.
    pub fn launch(&mut self, spec: LaunchSpec) -> Result<ServerHandle> {
        let role = spec.role;
        if self.is_running(role) {
            return Err(LauncherError::DuplicateRole(role));
        }

        if !spec.workdir.is_dir() {
            return Err(LauncherError::LaunchFailure {
                role,
                reason: format!("working directory {} does not exist", spec.workdir.display()),
            });
        }

        let stdout = create_log(role, &spec.stdout_log)?;
        let stderr = create_log(role, &spec.stderr_log)?;

        let mut cmd = spec.command.to_command();
        cmd.current_dir(&spec.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .kill_on_drop(false);

        // Own process group, so terminate reaches the whole server tree.
        #[cfg(unix)]
        cmd.process_group(0);

        let child = cmd.spawn().map_err(|e| LauncherError::LaunchFailure {
            role,
            reason: spawn_failure_reason(&spec.command, &e),
        })?;

        self.next_generation += 1;
        let handle = ServerHandle {
            role,
            generation: self.next_generation,
            pid: child.id(),
            stdout_log: spec.stdout_log,
            stderr_log: spec.stderr_log,
        };

        info!(
            role = %role,
            pid = ?handle.pid,
            cmd = %spec.command,
            workdir = %spec.workdir.display(),
            "server launched"
        );

        self.instances.insert(
            role,
            ServerInstance {
                handle: handle.clone(),
                child,
            },
        );
        Ok(handle)
    }

    /// Ask a server to stop, without waiting for it to exit.
    ///
    /// Terminating a handle that was already terminated (or replaced) is a
    /// no-op.
    pub fn terminate(&mut self, handle: &ServerHandle) -> Result<()> {
        let current = self
            .instances
            .get(&handle.role)
            .is_some_and(|i| i.handle.generation == handle.generation);
        if !current {
            debug!(role = %handle.role, "server already terminated");
            return Ok(());
        }

        let Some(mut instance) = self.instances.remove(&handle.role) else {
            return Ok(());
        };

        if let Err(e) = send_terminate(&mut instance.child) {
            warn!(role = %handle.role, error = %e, "failed to signal server");
        } else {
            info!(role = %handle.role, pid = ?handle.pid, "termination requested");
        }

        reap_in_background(handle.role, instance.child);
        Ok(())
    }

    /// Terminate the current instance of the role (if any), then launch.
    pub fn restart(&mut self, spec: LaunchSpec) -> Result<ServerHandle> {
        if let Some(handle) = self.handle(spec.role).cloned() {
            self.terminate(&handle)?;
        }
        self.launch(spec)
    }

    /// Handle of the current instance of `role`, live or not yet reaped.
    pub fn handle(&self, role: ServerRole) -> Option<&ServerHandle> {
        self.instances.get(&role).map(|i| &i.handle)
    }

    /// Whether the current instance of `role` is still running.
    ///
    /// An instance that exited on its own is forgotten here.
    pub fn is_running(&mut self, role: ServerRole) -> bool {
        let Some(instance) = self.instances.get_mut(&role) else {
            return false;
        };

        match instance.child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                warn!(role = %role, %status, "server exited on its own");
                self.instances.remove(&role);
                false
            }
            Err(e) => {
                warn!(role = %role, error = %e, "cannot query server status; assuming alive");
                true
            }
        }
    }
}

impl ServerControl for ProcessSupervisor {
    fn terminate_all(&mut self) -> Result<()> {
        let handles: Vec<ServerHandle> =
            self.instances.values().map(|i| i.handle.clone()).collect();
        for handle in handles.iter() {
            self.terminate(handle)?;
        }
        Ok(())
    }
}

fn create_log(role: ServerRole, path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| LauncherError::LaunchFailure {
            role,
            reason: format!("cannot create log directory {}: {e}", parent.display()),
        })?;
    }
    File::create(path).map_err(|e| LauncherError::LaunchFailure {
        role,
        reason: format!("cannot create log file {}: {e}", path.display()),
    })
}

fn spawn_failure_reason(command: &CommandSpec, e: &io::Error) -> String {
    if e.kind() == io::ErrorKind::NotFound {
        format!("executable '{}' not found", command.program)
    } else {
        format!("cannot start '{command}': {e}")
    }
}

#[cfg(unix)]
fn send_terminate(child: &mut Child) -> io::Result<()> {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    // `id()` is None once the child has been reaped.
    let Some(pid) = child.id() else {
        return Ok(());
    };
    let pid = i32::try_from(pid).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    match killpg(Pid::from_raw(pid), Signal::SIGTERM) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(errno) => Err(io::Error::from(errno)),
    }
}

#[cfg(not(unix))]
fn send_terminate(child: &mut Child) -> io::Result<()> {
    child.start_kill()
}

/// Wait for the exit in the background so the child does not linger as a
/// zombie; nothing waits on the result.
fn reap_in_background(role: ServerRole, mut child: Child) {
    match tokio::runtime::Handle::try_current() {
        Ok(rt) => {
            rt.spawn(async move {
                match child.wait().await {
                    Ok(status) => info!(role = %role, %status, "server exited"),
                    Err(e) => warn!(role = %role, error = %e, "failed waiting for server exit"),
                }
            });
        }
        Err(_) => debug!(role = %role, "no runtime to reap server; leaving it to the OS"),
    }
}
