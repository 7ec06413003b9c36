#![allow(dead_code)]

use std::path::{Path, PathBuf};

use gmlaunch::cli::CliArgs;
use gmlaunch::config::{LauncherProfile, RuntimeConfig};
use gmlaunch::types::ConfigKind;

/// Builder for `CliArgs` / `RuntimeConfig` to simplify test setup.
pub struct RuntimeConfigBuilder {
    args: CliArgs,
    profile: LauncherProfile,
    env: Vec<(String, String)>,
}

impl RuntimeConfigBuilder {
    /// Defaults of a bare `gmlaunch <data>` run inside `work_dir`.
    pub fn new(data: impl Into<PathBuf>, work_dir: &Path) -> Self {
        Self {
            args: CliArgs {
                data: data.into(),
                backend_port: 8899,
                frontend_port: 8000,
                config: ConfigKind::Ud,
                rtl: false,
                hard_reset: false,
                no_update: true,
                work_dir: work_dir.to_path_buf(),
                corpora_dir: None,
                log_dir: None,
                profile: None,
                log_level: None,
                dry_run: false,
            },
            profile: LauncherProfile::builtin(),
            env: Vec::new(),
        }
    }

    pub fn ports(mut self, backend: u16, frontend: u16) -> Self {
        self.args.backend_port = backend;
        self.args.frontend_port = frontend;
        self
    }

    pub fn config(mut self, kind: ConfigKind) -> Self {
        self.args.config = kind;
        self
    }

    pub fn rtl(mut self) -> Self {
        self.args.rtl = true;
        self
    }

    pub fn hard_reset(mut self) -> Self {
        self.args.hard_reset = true;
        self
    }

    pub fn corpora_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.args.corpora_dir = Some(dir.into());
        self
    }

    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.args.log_dir = Some(dir.into());
        self
    }

    pub fn profile(mut self, profile: LauncherProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn env(mut self, var: &str, value: &str) -> Self {
        self.env.push((var.to_string(), value.to_string()));
        self
    }

    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    pub fn build(self) -> RuntimeConfig {
        let env = self.env;
        RuntimeConfig::from_parts(&self.args, self.profile, |name| {
            env.iter()
                .find(|(var, _)| var == name)
                .map(|(_, value)| value.clone())
        })
        .expect("Failed to build valid runtime config from builder")
    }
}
