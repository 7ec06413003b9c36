// src/config/runtime.rs

//! Immutable runtime configuration built once at startup.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::cli::CliArgs;
use crate::config::loader::resolve_profile;
use crate::config::model::LauncherProfile;
use crate::config::template::Placeholders;
use crate::errors::{LauncherError, Result};
use crate::types::{ConfigKind, FrontendLayout, ServerRole};

/// Identifier of the single corpus group / instance served locally.
pub const LOCAL_INSTANCE: &str = "local";

/// Absolute paths of everything the launcher reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub work_dir: PathBuf,
    pub frontend_dir: PathBuf,
    pub backend_dir: PathBuf,
    pub corpora_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl Layout {
    pub fn new(
        work_dir: PathBuf,
        corpora_dir: Option<PathBuf>,
        log_dir: Option<PathBuf>,
        profile: &LauncherProfile,
    ) -> Self {
        Self {
            frontend_dir: work_dir.join(&profile.frontend.dir),
            backend_dir: work_dir.join(&profile.backend.dir),
            corpora_dir: corpora_dir.unwrap_or_else(|| work_dir.join("corpora")),
            log_dir: log_dir.unwrap_or_else(|| work_dir.join("log")),
            work_dir,
        }
    }

    /// Static assets served by the backend.
    pub fn static_dir(&self) -> PathBuf {
        self.backend_dir.join("static")
    }

    /// Where the backend stores shortened query links.
    pub fn shorten_dir(&self) -> PathBuf {
        self.static_dir().join("shorten")
    }

    /// Where the compiler drops per-corpus metadata for the frontend.
    pub fn meta_dir(&self) -> PathBuf {
        self.frontend_dir.join("meta")
    }

    pub fn stdout_log(&self, role: ServerRole) -> PathBuf {
        self.log_dir.join(format!("{role}.stdout"))
    }

    pub fn stderr_log(&self, role: ServerRole) -> PathBuf {
        self.log_dir.join(format!("{role}.stderr"))
    }
}

/// Everything the launcher needs, resolved once from CLI and environment.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Absolute path of the DATA argument.
    pub data: PathBuf,
    pub layout: Layout,
    pub backend_port: u16,
    pub frontend_port: u16,
    pub config_kind: ConfigKind,
    pub rtl: bool,
    pub hard_reset: bool,
    pub update_repos: bool,
    pub profile: LauncherProfile,
    env_values: Vec<(String, Option<String>)>,
}

impl RuntimeConfig {
    /// Build from CLI arguments, reading the process environment for the
    /// profile's env placeholders.
    pub fn from_args(args: &CliArgs) -> Result<Self> {
        let profile = resolve_profile(args.profile.as_deref())?;
        Self::from_parts(args, profile, |name| std::env::var(name).ok())
    }

    /// Build from CLI arguments and an explicit profile and env lookup.
    pub fn from_parts(
        args: &CliArgs,
        profile: LauncherProfile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        if args.backend_port == args.frontend_port {
            return Err(LauncherError::ConfigError(format!(
                "backend and frontend cannot both use port {}",
                args.backend_port
            )));
        }

        let work_dir = absolute(&args.work_dir)?;
        let corpora_dir = args.corpora_dir.as_deref().map(absolute).transpose()?;
        let log_dir = args.log_dir.as_deref().map(absolute).transpose()?;
        let layout = Layout::new(work_dir, corpora_dir, log_dir, &profile);

        let env_values = profile
            .env_placeholders
            .iter()
            .map(|(name, var)| (name.clone(), env(var)))
            .collect();

        Ok(Self {
            data: absolute(&args.data)?,
            layout,
            backend_port: args.backend_port,
            frontend_port: args.frontend_port,
            config_kind: args.config,
            rtl: args.rtl,
            hard_reset: args.hard_reset,
            update_repos: !args.no_update,
            profile,
            env_values,
        })
    }

    pub fn port_of(&self, role: ServerRole) -> u16 {
        match role {
            ServerRole::Backend => self.backend_port,
            ServerRole::Frontend => self.frontend_port,
        }
    }

    /// Base URL of the backend, with a trailing `/`.
    pub fn backend_url(&self) -> String {
        format!("http://localhost:{}/", self.backend_port)
    }

    pub fn frontend_url(&self) -> String {
        format!("http://localhost:{}", self.frontend_port)
    }

    /// `host:port` key of this instance in the frontend's instance table.
    pub fn instance_key(&self) -> String {
        format!("localhost:{}", self.frontend_port)
    }

    /// The corpus descriptor file consumed by the compiler.
    pub fn descriptor_path(&self) -> PathBuf {
        self.layout
            .corpora_dir
            .join(&self.profile.compiler.descriptor_name)
    }

    /// The groups document read by the frontend (and referenced by the
    /// backend configuration).
    pub fn frontend_config_path(&self) -> PathBuf {
        match self.profile.frontend.layout {
            FrontendLayout::Legacy => self.layout.frontend_dir.join("config.json"),
            FrontendLayout::Instances => self
                .layout
                .frontend_dir
                .join("instances")
                .join(format!("{LOCAL_INSTANCE}.json")),
        }
    }

    /// Instance table, only used by [`FrontendLayout::Instances`].
    pub fn instances_path(&self) -> PathBuf {
        self.layout.frontend_dir.join("instances.json")
    }

    /// Command line of a server, with `{port}` expanded.
    pub fn server_command(&self, role: ServerRole) -> Vec<String> {
        let template = match role {
            ServerRole::Backend => &self.profile.backend.command,
            ServerRole::Frontend => &self.profile.frontend.command,
        };
        let port = self.port_of(role).to_string();
        template
            .iter()
            .map(|arg| arg.replace("{port}", &port))
            .collect()
    }

    /// Working directory of a server.
    pub fn server_dir(&self, role: ServerRole) -> &Path {
        match role {
            ServerRole::Backend => &self.layout.backend_dir,
            ServerRole::Frontend => &self.layout.frontend_dir,
        }
    }

    /// Profile templates resolved inside the backend clone, as
    /// `(template, output)` pairs.
    pub fn template_pairs(&self) -> Vec<(PathBuf, PathBuf)> {
        self.profile
            .templates
            .iter()
            .map(|t| {
                (
                    self.layout.backend_dir.join(&t.source),
                    self.layout.backend_dir.join(&t.target),
                )
            })
            .collect()
    }

    /// Values for the backend configuration templates.
    pub fn placeholders(&self) -> Placeholders {
        let mut p = Placeholders::new();
        p.set("LOG", self.layout.log_dir.display().to_string())
            .set("CONFIG", self.frontend_config_path().display().to_string())
            .set("CORPORA", with_trailing_slash(&self.layout.corpora_dir))
            .set("EXTERN", with_trailing_slash(&self.layout.static_dir()))
            .set("PORT", self.backend_port.to_string());

        for (name, value) in self.env_values.iter() {
            match value {
                Some(value) => p.set(name.clone(), value.clone()),
                None => p.set_unresolved(name.clone()),
            };
        }
        p
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    let abs = std::path::absolute(path).with_context(|| format!("resolving {:?}", path))?;
    Ok(abs)
}

fn with_trailing_slash(path: &Path) -> String {
    let mut s = path.display().to_string();
    if !s.ends_with('/') {
        s.push('/');
    }
    s
}
