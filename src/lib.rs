// src/lib.rs

pub mod cli;
pub mod client;
pub mod compile;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod health;
pub mod logging;
pub mod net;
pub mod repos;
pub mod types;

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::client::HttpBackendClient;
use crate::compile::{CorpusCompiler, GrewCompiler, MaterializingCompiler};
use crate::config::{load_corpora, write_artifacts, CorpusDescriptor, RuntimeConfig, TemplateSet};
use crate::engine::{
    await_backend, spawn_interrupt_listener, spawn_stdin_reader, stop_servers, CommandLoop,
    LoopEvent, Startup,
};
use crate::errors::{LauncherError, Result};
use crate::exec::{LaunchSpec, ProcessSupervisor};
use crate::fs::{FileSystem, RealFileSystem};
use crate::health::PollPolicy;
use crate::net::ensure_ports_free;
use crate::types::ServerRole;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - runtime configuration and corpus loading
/// - repository sync and port checks
/// - generated files, templates and compilation
/// - the two servers and the backend health poll
/// - the interactive command loop (stdin + Ctrl-C)
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = RuntimeConfig::from_args(&args)?;
    let fs = RealFileSystem;

    let corpora = load_corpora(&fs, &cfg.data, cfg.config_kind, cfg.rtl)?;

    if args.dry_run {
        print_dry_run(&cfg, &corpora);
        return Ok(());
    }

    prepare_work_dirs(&fs, &cfg)?;
    if cfg.update_repos {
        repos::sync_all(&cfg).await;
    } else {
        debug!("repository update disabled");
    }
    prepare_repo_dirs(&fs, &cfg)?;

    ensure_ports_free(&cfg).await?;

    write_artifacts(&fs, &cfg, &corpora)?;

    let templates = TemplateSet::new(
        Arc::new(RealFileSystem),
        cfg.template_pairs(),
        cfg.placeholders(),
    );
    templates.render_all()?;

    let mut grew = GrewCompiler::from_runtime(&cfg);
    initial_compile(&mut grew, cfg.hard_reset).await;
    let compiler = MaterializingCompiler::new(grew, templates);

    // Interrupts are caught from the first launch on.
    let (tx, mut rx) = mpsc::channel::<LoopEvent>(16);
    spawn_interrupt_listener(tx.clone());

    let mut supervisor = ProcessSupervisor::new();
    let backend = supervisor.launch(LaunchSpec::for_role(&cfg, ServerRole::Backend)?)?;
    if let Err(e) = LaunchSpec::for_role(&cfg, ServerRole::Frontend)
        .and_then(|spec| supervisor.launch(spec))
    {
        stop_servers(&mut supervisor);
        return Err(e);
    }

    let client = HttpBackendClient::from_runtime(&cfg)?;
    let policy = PollPolicy::from(&cfg.profile.health);
    println!("Waiting for the backend on {} ...", cfg.backend_url());
    let startup = await_backend(
        &mut supervisor,
        &client,
        policy,
        backend.stderr_log(),
        &mut rx,
    )
    .await?;
    if startup == Startup::Interrupted {
        println!("Interrupted, servers stopped.");
        return Ok(());
    }

    print_banner(&cfg);
    spawn_stdin_reader(tx);

    let command_loop = CommandLoop::new(rx, compiler, client, supervisor, std::io::stdout());
    let reason = command_loop.run().await?;
    info!(?reason, "gmlaunch stopped");
    Ok(())
}

/// Create the working directory tree owned by the launcher.
fn prepare_work_dirs(fs: &dyn FileSystem, cfg: &RuntimeConfig) -> Result<()> {
    let layout = &cfg.layout;
    for dir in [&layout.work_dir, &layout.corpora_dir, &layout.log_dir] {
        fs.create_dir_all(dir)?;
    }
    Ok(())
}

/// Create the directories the servers expect inside their clones.
fn prepare_repo_dirs(fs: &dyn FileSystem, cfg: &RuntimeConfig) -> Result<()> {
    let layout = &cfg.layout;
    for (repo, dir) in [
        (&layout.frontend_dir, layout.meta_dir()),
        (&layout.backend_dir, layout.shorten_dir()),
    ] {
        if !fs.is_dir(repo) {
            warn!(dir = %repo.display(), "repository clone is missing");
            continue;
        }
        fs.create_dir_all(&dir)?;
    }
    Ok(())
}

/// First compilation; a failure is shown but the servers still start.
async fn initial_compile<C: CorpusCompiler>(compiler: &mut C, force_clean: bool) {
    match compiler.compile(force_clean).await {
        Ok(report) => {
            if !report.output.trim().is_empty() {
                println!("{}", report.output.trim_end());
            }
            if let Some(warning) = report.clean_warning {
                warn!(%warning, "clean failed before the initial compilation");
            }
        }
        Err(LauncherError::CompileFailure { message, output }) => {
            if !output.trim().is_empty() {
                println!("{}", output.trim_end());
            }
            warn!(%message, "initial compilation failed; starting the servers anyway");
        }
        Err(e) => warn!(error = %e, "initial compilation failed; starting the servers anyway"),
    }
}

fn print_banner(cfg: &RuntimeConfig) {
    println!("****************************************");
    println!(" Grew_match is ready on {}", cfg.frontend_url());
    println!("****************************************");
}

/// Dry-run output: resolved layout, commands and corpora.
fn print_dry_run(cfg: &RuntimeConfig, corpora: &[CorpusDescriptor]) {
    println!("gmlaunch dry-run");
    println!("  work_dir    = {}", cfg.layout.work_dir.display());
    println!("  corpora_dir = {}", cfg.layout.corpora_dir.display());
    println!("  log_dir     = {}", cfg.layout.log_dir.display());
    println!("  descriptor  = {}", cfg.descriptor_path().display());
    println!("  frontend    = {}", cfg.frontend_config_path().display());
    println!();

    let compiler = GrewCompiler::from_runtime(cfg);
    println!("compile: {}", compiler.compile_command());
    for (template, output) in cfg.template_pairs() {
        println!("render: {} -> {}", template.display(), output.display());
    }
    for role in ServerRole::ALL {
        println!(
            "{role} (port {}): {} [in {}]",
            cfg.port_of(role),
            cfg.server_command(role).join(" "),
            cfg.server_dir(role).display()
        );
    }
    println!();

    println!("corpora ({}):", corpora.len());
    for corpus in corpora {
        println!("  - {}", corpus.id);
        if let Some(ref dir) = corpus.directory {
            println!("      directory: {}", dir.display());
        }
        if let Some(ref config) = corpus.config {
            println!("      config: {config}");
        }
    }

    debug!("dry-run complete (no execution)");
}
