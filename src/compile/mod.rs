// src/compile/mod.rs

//! Corpus compilation through the external `grew` tool.
//!
//! The command loop talks to a [`CorpusCompiler`] so tests can replace the
//! external tool with a fake that records calls.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::config::{RuntimeConfig, TemplateSet};
use crate::errors::{LauncherError, Result};
use crate::exec::command::{run_captured, CapturedOutput, CommandSpec};
use crate::types::{BoxFuture, CleanFailurePolicy, ConfigKind};

/// Outcome of a successful compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileReport {
    /// Set when a forced clean failed but compilation went ahead anyway.
    pub clean_warning: Option<String>,
    /// Combined output of the clean (if any) and compile steps.
    pub output: String,
}

/// Turns the corpus descriptor into the backend's searchable format.
pub trait CorpusCompiler: Send {
    /// Compile all corpora, cleaning previous results first if `force_clean`.
    ///
    /// Blocks the caller until the external tool exits. A failure is
    /// reported as [`LauncherError::CompileFailure`] carrying the tool output.
    fn compile(&mut self, force_clean: bool) -> BoxFuture<'_, Result<CompileReport>>;
}

/// [`CorpusCompiler`] running `grew clean` / `grew compile`.
#[derive(Debug, Clone)]
pub struct GrewCompiler {
    program: String,
    descriptor: PathBuf,
    meta_dir: PathBuf,
    kind: ConfigKind,
    clean_failure: CleanFailurePolicy,
}

impl GrewCompiler {
    pub fn new(
        program: impl Into<String>,
        descriptor: PathBuf,
        meta_dir: PathBuf,
        kind: ConfigKind,
        clean_failure: CleanFailurePolicy,
    ) -> Self {
        Self {
            program: program.into(),
            descriptor,
            meta_dir,
            kind,
            clean_failure,
        }
    }

    pub fn from_runtime(cfg: &RuntimeConfig) -> Self {
        Self::new(
            cfg.profile.compiler.program.clone(),
            cfg.descriptor_path(),
            cfg.layout.meta_dir(),
            cfg.config_kind,
            cfg.profile.compiler.clean_failure,
        )
    }

    pub fn clean_command(&self) -> CommandSpec {
        CommandSpec::new(
            self.program.clone(),
            [
                "clean".to_string(),
                "-i".to_string(),
                self.descriptor.display().to_string(),
            ],
        )
    }

    pub fn compile_command(&self) -> CommandSpec {
        let mut args = vec![
            "compile".to_string(),
            "-grew_match_server".to_string(),
            self.meta_dir.display().to_string(),
            "-i".to_string(),
            self.descriptor.display().to_string(),
        ];
        if self.kind == ConfigKind::Sud {
            args.push("-config".to_string());
            args.push(ConfigKind::Sud.to_string());
        }
        CommandSpec::new(self.program.clone(), args)
    }

    async fn run_compile(&self, force_clean: bool) -> Result<CompileReport> {
        let mut report = CompileReport::default();

        if force_clean {
            let clean = self.clean_command();
            let result = run_captured(&clean).await;
            if let Err(warning) = check_step(&clean, result, &mut report.output) {
                warn!(warning = %warning, "clean step failed");
                if self.clean_failure == CleanFailurePolicy::Abort {
                    return Err(LauncherError::CompileFailure {
                        message: warning,
                        output: report.output,
                    });
                }
                report.clean_warning = Some(warning);
            }
        }

        let compile = self.compile_command();
        let result = run_captured(&compile).await;
        if let Err(message) = check_step(&compile, result, &mut report.output) {
            return Err(LauncherError::CompileFailure {
                message,
                output: report.output,
            });
        }

        info!(force_clean, descriptor = %self.descriptor.display(), "corpora compiled");
        Ok(report)
    }
}

impl CorpusCompiler for GrewCompiler {
    fn compile(&mut self, force_clean: bool) -> BoxFuture<'_, Result<CompileReport>> {
        Box::pin(self.run_compile(force_clean))
    }
}

/// Re-renders the backend templates before each forced compilation, then
/// delegates to the wrapped compiler.
#[derive(Debug)]
pub struct MaterializingCompiler<C> {
    inner: C,
    templates: TemplateSet,
}

impl<C: CorpusCompiler> MaterializingCompiler<C> {
    pub fn new(inner: C, templates: TemplateSet) -> Self {
        Self { inner, templates }
    }
}

impl<C: CorpusCompiler> CorpusCompiler for MaterializingCompiler<C> {
    fn compile(&mut self, force_clean: bool) -> BoxFuture<'_, Result<CompileReport>> {
        Box::pin(async move {
            if force_clean {
                let substitutions = self.templates.render_all()?;
                debug!(substitutions, "backend templates re-rendered");
            }
            self.inner.compile(force_clean).await
        })
    }
}

/// Append the step's output to `log`; describe the failure, if any.
fn check_step(
    spec: &CommandSpec,
    result: anyhow::Result<CapturedOutput>,
    log: &mut String,
) -> std::result::Result<(), String> {
    match result {
        Ok(out) => {
            let text = out.combined();
            if !text.is_empty() {
                if !log.is_empty() {
                    log.push('\n');
                }
                log.push_str(&text);
            }
            if out.success {
                Ok(())
            } else {
                Err(match out.code {
                    Some(code) => format!("'{spec}' exited with code {code}"),
                    None => format!("'{spec}' was killed by a signal"),
                })
            }
        }
        Err(e) => Err(format!("{e:#}")),
    }
}
