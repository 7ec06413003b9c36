use std::fmt;
use std::future::Future;
use std::pin::Pin;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Boxed future returned by the pluggable component traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The two long-lived servers owned by the launcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServerRole {
    Backend,
    Frontend,
}

impl ServerRole {
    pub const ALL: [ServerRole; 2] = [ServerRole::Backend, ServerRole::Frontend];

    pub fn as_str(self) -> &'static str {
        match self {
            ServerRole::Backend => "backend",
            ServerRole::Frontend => "frontend",
        }
    }

    /// CLI option that controls the port of this role.
    pub fn port_option(self) -> &'static str {
        match self {
            ServerRole::Backend => "backend_port",
            ServerRole::Frontend => "frontend_port",
        }
    }
}

impl fmt::Display for ServerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of corpus annotation, forwarded to the compiler and the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConfigKind {
    #[default]
    Ud,
    Sud,
}

impl ConfigKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKind::Ud => "ud",
            ConfigKind::Sud => "sud",
        }
    }
}

impl fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a forced recompile does when the clean step fails.
///
/// - `Proceed` (default): report the failure and compile anyway.
/// - `Abort`: report the failure and skip compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanFailurePolicy {
    #[default]
    Proceed,
    Abort,
}

/// Shape of the corpus descriptor file handed to the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptorShape {
    /// `{"corpora": [...]}`
    #[default]
    Wrapped,
    /// `[...]`
    Flat,
}

/// How the frontend expects to find its backend and corpus groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrontendLayout {
    /// A single `config.json` in the frontend root.
    #[default]
    Legacy,
    /// `instances.json` keyed by `host:port`, plus one descriptor per instance.
    Instances,
}
