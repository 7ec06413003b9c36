#![allow(dead_code)]

use std::path::{Path, PathBuf};

pub use gmlaunch_test_utils::{init_tracing, with_timeout, SharedBuffer};

/// Write an executable shell script at `dir/name`.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

/// Poll until the process with `pid` is gone (reaped).
#[cfg(unix)]
pub async fn wait_gone(pid: u32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    for _ in 0..100 {
        if kill(Pid::from_raw(pid as i32), None).is_err() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    false
}

/// A port nothing listens on right now.
pub fn unused_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
