// src/repos.rs

//! Clone-or-update of the frontend and backend repositories.
//!
//! Git is an external collaborator: failures are logged and reported, and the
//! caller decides whether a missing clone is fatal (it shows up later as a
//! missing template or working directory).

use std::path::Path;

use tracing::{info, warn};

use crate::config::RuntimeConfig;
use crate::errors::{LauncherError, Result};
use crate::exec::command::{run_captured, CommandSpec};

/// How an existing clone is brought up to date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// `git pull`
    Pull,
    /// `git fetch` then `git reset --hard @{u}`, discarding local changes.
    HardReset,
}

/// Git commands that bring `dir` to the state of `url`.
pub fn sync_commands(url: &str, dir: &Path, exists: bool, mode: UpdateMode) -> Vec<CommandSpec> {
    if !exists {
        let parent = dir.parent().unwrap_or_else(|| Path::new("."));
        return vec![
            CommandSpec::new("git", ["clone".to_string(), url.to_string(), dir.display().to_string()])
                .in_dir(parent),
        ];
    }

    match mode {
        UpdateMode::Pull => vec![CommandSpec::new("git", ["pull"]).in_dir(dir)],
        UpdateMode::HardReset => vec![
            CommandSpec::new("git", ["fetch"]).in_dir(dir),
            CommandSpec::new("git", ["reset", "--hard", "@{u}"]).in_dir(dir),
        ],
    }
}

/// Clone `url` into `dir`, or update the existing clone.
pub async fn sync_repository(url: &str, dir: &Path, mode: UpdateMode) -> Result<()> {
    for spec in sync_commands(url, dir, dir.is_dir(), mode) {
        let out = run_captured(&spec).await?;
        if !out.success {
            return Err(LauncherError::Other(anyhow::anyhow!(
                "'{spec}' failed in {}: {}",
                spec.cwd.as_deref().unwrap_or(dir).display(),
                out.combined()
            )));
        }
    }
    info!(repo = %url, dir = %dir.display(), "repository up to date");
    Ok(())
}

/// Sync both dependent repositories, logging failures instead of aborting.
pub async fn sync_all(cfg: &RuntimeConfig) {
    let mode = if cfg.hard_reset {
        UpdateMode::HardReset
    } else {
        UpdateMode::Pull
    };
    let repos = [
        (&cfg.profile.frontend.repo, &cfg.layout.frontend_dir),
        (&cfg.profile.backend.repo, &cfg.layout.backend_dir),
    ];
    for (url, dir) in repos {
        if let Err(e) = sync_repository(url, dir, mode).await {
            warn!(repo = %url, error = %e, "could not update repository; using the local copy");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn missing_clone_is_cloned_from_the_parent() {
        let cmds = sync_commands(
            "https://example.org/repo.git",
            Path::new("/w/repo"),
            false,
            UpdateMode::Pull,
        );
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].to_string(), "git clone https://example.org/repo.git /w/repo");
        assert_eq!(cmds[0].cwd, Some(PathBuf::from("/w")));
    }

    #[test]
    fn existing_clone_is_pulled_or_reset() {
        let pull = sync_commands("u", Path::new("/w/repo"), true, UpdateMode::Pull);
        assert_eq!(pull[0].to_string(), "git pull");

        let reset = sync_commands("u", Path::new("/w/repo"), true, UpdateMode::HardReset);
        let shown: Vec<String> = reset.iter().map(ToString::to_string).collect();
        assert_eq!(shown, vec!["git fetch", "git reset --hard @{u}"]);
        assert!(reset.iter().all(|c| c.cwd == Some(PathBuf::from("/w/repo"))));
    }
}
