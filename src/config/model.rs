// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::types::{CleanFailurePolicy, DescriptorShape, FrontendLayout};

/// Launcher profile as read from an optional TOML file.
///
/// Every section is optional; the built-in defaults describe the stock
/// grew_match setup:
///
/// ```toml
/// [frontend]
/// repo = "https://gitlab.inria.fr/grew/grew_match.git"
/// command = ["python3", "-m", "http.server", "{port}"]
/// layout = "legacy"
///
/// [backend]
/// repo = "https://gitlab.inria.fr/grew/grew_match_back.git"
/// command = ["make", "test.opt"]
///
/// [compiler]
/// program = "grew"
/// clean_failure = "proceed"
///
/// [health]
/// max_attempts = 15
/// interval_secs = 2
///
/// [[template]]
/// source = "gmb.conf.in__TEMPLATE"
/// target = "gmb.conf.in"
///
/// [env_placeholders]
/// CORPUSBANK = "CORPUSBANK"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawProfile {
    #[serde(default)]
    pub frontend: FrontendSection,

    #[serde(default)]
    pub backend: BackendSection,

    #[serde(default)]
    pub compiler: CompilerSection,

    #[serde(default)]
    pub health: HealthSection,

    /// Templates rendered inside the backend repository.
    #[serde(default = "default_templates", rename = "template")]
    pub templates: Vec<TemplateSpec>,

    /// Extra placeholders whose value is read from an environment variable.
    ///
    /// Keys are placeholder names (`CORPUSBANK` stands for `__CORPUSBANK__`),
    /// values are environment variable names.
    #[serde(default)]
    pub env_placeholders: BTreeMap<String, String>,
}

impl Default for RawProfile {
    fn default() -> Self {
        Self {
            frontend: FrontendSection::default(),
            backend: BackendSection::default(),
            compiler: CompilerSection::default(),
            health: HealthSection::default(),
            templates: default_templates(),
            env_placeholders: BTreeMap::new(),
        }
    }
}

/// `[frontend]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrontendSection {
    /// Git URL of the frontend repository.
    #[serde(default = "default_frontend_repo")]
    pub repo: String,

    /// Directory name of the clone inside the working directory.
    #[serde(default = "default_frontend_dir")]
    pub dir: String,

    /// Static file server command, run inside the frontend clone.
    /// `{port}` is replaced by the frontend port.
    #[serde(default = "default_frontend_command")]
    pub command: Vec<String>,

    #[serde(default)]
    pub layout: FrontendLayout,
}

impl Default for FrontendSection {
    fn default() -> Self {
        Self {
            repo: default_frontend_repo(),
            dir: default_frontend_dir(),
            command: default_frontend_command(),
            layout: FrontendLayout::default(),
        }
    }
}

/// `[backend]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendSection {
    #[serde(default = "default_backend_repo")]
    pub repo: String,

    #[serde(default = "default_backend_dir")]
    pub dir: String,

    /// Server command, run inside the backend clone.
    /// `{port}` is replaced by the backend port.
    #[serde(default = "default_backend_command")]
    pub command: Vec<String>,

    /// Endpoint used by the health probe.
    #[serde(default = "default_ping_path")]
    pub ping_path: String,

    /// Endpoint that makes the backend reload compiled corpora.
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,

    /// Timeout of a single HTTP request to the backend.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            repo: default_backend_repo(),
            dir: default_backend_dir(),
            command: default_backend_command(),
            ping_path: default_ping_path(),
            refresh_path: default_refresh_path(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// `[compiler]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompilerSection {
    #[serde(default = "default_compiler_program")]
    pub program: String,

    #[serde(default)]
    pub clean_failure: CleanFailurePolicy,

    #[serde(default)]
    pub descriptor_shape: DescriptorShape,

    /// File name of the corpus descriptor inside the corpus storage dir.
    #[serde(default = "default_descriptor_name")]
    pub descriptor_name: String,
}

impl Default for CompilerSection {
    fn default() -> Self {
        Self {
            program: default_compiler_program(),
            clean_failure: CleanFailurePolicy::default(),
            descriptor_shape: DescriptorShape::default(),
            descriptor_name: default_descriptor_name(),
        }
    }
}

/// `[health]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthSection {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for HealthSection {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            interval_secs: default_interval_secs(),
        }
    }
}

/// `[[template]]` entry, paths relative to the backend clone.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateSpec {
    pub source: PathBuf,
    pub target: PathBuf,
}

/// Validated launcher profile.
///
/// Only obtainable through `TryFrom<RawProfile>` (see `validate.rs`) or
/// [`LauncherProfile::builtin`].
#[derive(Debug, Clone)]
pub struct LauncherProfile {
    pub frontend: FrontendSection,
    pub backend: BackendSection,
    pub compiler: CompilerSection,
    pub health: HealthSection,
    pub templates: Vec<TemplateSpec>,
    pub env_placeholders: BTreeMap<String, String>,
}

impl LauncherProfile {
    pub(crate) fn new_unchecked(raw: RawProfile) -> Self {
        Self {
            frontend: raw.frontend,
            backend: raw.backend,
            compiler: raw.compiler,
            health: raw.health,
            templates: raw.templates,
            env_placeholders: raw.env_placeholders,
        }
    }

    /// The stock grew_match profile.
    pub fn builtin() -> Self {
        Self::new_unchecked(RawProfile::default())
    }
}

impl Default for LauncherProfile {
    fn default() -> Self {
        Self::builtin()
    }
}

fn default_frontend_repo() -> String {
    "https://gitlab.inria.fr/grew/grew_match.git".to_string()
}

fn default_frontend_dir() -> String {
    "grew_match".to_string()
}

fn default_frontend_command() -> Vec<String> {
    ["python3", "-m", "http.server", "{port}"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_backend_repo() -> String {
    "https://gitlab.inria.fr/grew/grew_match_back.git".to_string()
}

fn default_backend_dir() -> String {
    "grew_match_back".to_string()
}

fn default_backend_command() -> Vec<String> {
    vec!["make".to_string(), "test.opt".to_string()]
}

fn default_ping_path() -> String {
    "ping".to_string()
}

fn default_refresh_path() -> String {
    "refresh_all".to_string()
}

fn default_request_timeout_secs() -> u64 {
    5
}

fn default_compiler_program() -> String {
    "grew".to_string()
}

fn default_descriptor_name() -> String {
    "local.json".to_string()
}

fn default_max_attempts() -> u32 {
    15
}

fn default_interval_secs() -> u64 {
    2
}

fn default_templates() -> Vec<TemplateSpec> {
    vec![
        TemplateSpec {
            source: PathBuf::from("gmb.conf.in__TEMPLATE"),
            target: PathBuf::from("gmb.conf.in"),
        },
        TemplateSpec {
            source: PathBuf::from("Makefile.options__TEMPLATE"),
            target: PathBuf::from("Makefile.options"),
        },
    ]
}
