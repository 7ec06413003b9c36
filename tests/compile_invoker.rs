// tests/compile_invoker.rs
#![cfg(unix)]

mod common;
use crate::common::{init_tracing, with_timeout, write_script};

use std::error::Error;
use std::path::{Path, PathBuf};

use gmlaunch::compile::{CorpusCompiler, GrewCompiler};
use gmlaunch::errors::LauncherError;
use gmlaunch::types::{CleanFailurePolicy, ConfigKind};

type TestResult = Result<(), Box<dyn Error>>;

/// A stand-in `grew` that records its arguments and fails the subcommand
/// named in `fail_on` (or none).
fn fake_grew(dir: &Path, fail_on: &str) -> PathBuf {
    let calls = dir.join("calls.log");
    write_script(
        dir,
        "grew",
        &format!(
            r#"echo "$@" >> "{calls}"
echo "grew $1 running"
if [ "$1" = "{fail_on}" ]; then
  echo "grew $1 broke" >&2
  exit 1
fi"#,
            calls = calls.display()
        ),
    )
}

fn recorded_calls(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join("calls.log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

fn compiler(dir: &Path, program: &Path, kind: ConfigKind, policy: CleanFailurePolicy) -> GrewCompiler {
    GrewCompiler::new(
        program.display().to_string(),
        dir.join("local.json"),
        dir.join("meta"),
        kind,
        policy,
    )
}

#[tokio::test]
async fn plain_compile_runs_only_the_compile_step() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let grew = fake_grew(dir.path(), "none");
    let mut c = compiler(dir.path(), &grew, ConfigKind::Ud, CleanFailurePolicy::Proceed);

    let report = with_timeout(c.compile(false)).await?;

    let calls = recorded_calls(dir.path());
    assert_eq!(calls.len(), 1);
    assert!(calls[0].starts_with("compile -grew_match_server "));
    assert!(!calls[0].contains("-config"));
    assert!(report.clean_warning.is_none());
    assert!(report.output.contains("grew compile running"));
    Ok(())
}

#[tokio::test]
async fn forced_compile_cleans_first_and_passes_sud() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let grew = fake_grew(dir.path(), "none");
    let mut c = compiler(dir.path(), &grew, ConfigKind::Sud, CleanFailurePolicy::Proceed);

    with_timeout(c.compile(true)).await?;

    let calls = recorded_calls(dir.path());
    assert_eq!(calls.len(), 2);
    assert!(calls[0].starts_with("clean -i "));
    assert!(calls[1].starts_with("compile "));
    assert!(calls[1].ends_with("-config sud"));
    Ok(())
}

#[tokio::test]
async fn clean_failure_proceeds_with_a_warning() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let grew = fake_grew(dir.path(), "clean");
    let mut c = compiler(dir.path(), &grew, ConfigKind::Ud, CleanFailurePolicy::Proceed);

    let report = with_timeout(c.compile(true)).await?;

    assert_eq!(recorded_calls(dir.path()).len(), 2);
    let warning = report.clean_warning.ok_or("missing clean warning")?;
    assert!(warning.contains("exited with code 1"));
    assert!(report.output.contains("grew clean broke"));
    Ok(())
}

#[tokio::test]
async fn clean_failure_aborts_under_the_abort_policy() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let grew = fake_grew(dir.path(), "clean");
    let mut c = compiler(dir.path(), &grew, ConfigKind::Ud, CleanFailurePolicy::Abort);

    let err = with_timeout(c.compile(true)).await.unwrap_err();

    assert_eq!(recorded_calls(dir.path()).len(), 1);
    assert!(matches!(err, LauncherError::CompileFailure { .. }));
    Ok(())
}

#[tokio::test]
async fn compile_failure_carries_the_tool_output() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let grew = fake_grew(dir.path(), "compile");
    let mut c = compiler(dir.path(), &grew, ConfigKind::Ud, CleanFailurePolicy::Proceed);

    match with_timeout(c.compile(false)).await {
        Err(LauncherError::CompileFailure { message, output }) => {
            assert!(message.contains("exited with code 1"));
            assert!(output.contains("grew compile broke"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn missing_compiler_is_a_compile_failure() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let mut c = compiler(
        dir.path(),
        &dir.path().join("no-grew-here"),
        ConfigKind::Ud,
        CleanFailurePolicy::Proceed,
    );

    let err = with_timeout(c.compile(false)).await.unwrap_err();
    assert!(matches!(err, LauncherError::CompileFailure { .. }));
    Ok(())
}
