//! Recording fakes for the command loop and health poller seams.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use gmlaunch::client::RefreshNotifier;
use gmlaunch::compile::{CompileReport, CorpusCompiler};
use gmlaunch::errors::{LauncherError, Result};
use gmlaunch::exec::ServerControl;
use gmlaunch::health::HealthProbe;
use gmlaunch::types::BoxFuture;

/// Calls observed across all fakes, in order.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

fn record(log: &CallLog, entry: impl Into<String>) {
    log.lock().unwrap().push(entry.into());
}

/// A fake compiler that:
/// - records `compile(force_clean)` calls as "compile" / "compile:clean"
/// - fails every call when built with [`FakeCompiler::failing`].
pub struct FakeCompiler {
    log: CallLog,
    fail_with: Option<String>,
    output: String,
}

impl FakeCompiler {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            fail_with: None,
            output: "compiled 1 corpus".to_string(),
        }
    }

    pub fn failing(log: CallLog, message: &str) -> Self {
        Self {
            log,
            fail_with: Some(message.to_string()),
            output: "syntax error in local.conllu".to_string(),
        }
    }
}

impl CorpusCompiler for FakeCompiler {
    fn compile(&mut self, force_clean: bool) -> BoxFuture<'_, Result<CompileReport>> {
        record(&self.log, if force_clean { "compile:clean" } else { "compile" });
        let result = match self.fail_with {
            Some(ref message) => Err(LauncherError::CompileFailure {
                message: message.clone(),
                output: self.output.clone(),
            }),
            None => Ok(CompileReport {
                clean_warning: None,
                output: self.output.clone(),
            }),
        };
        Box::pin(async move { result })
    }
}

/// A fake notifier recording "refresh", optionally failing.
pub struct FakeNotifier {
    log: CallLog,
    fail: bool,
}

impl FakeNotifier {
    pub fn new(log: CallLog) -> Self {
        Self { log, fail: false }
    }

    pub fn failing(log: CallLog) -> Self {
        Self { log, fail: true }
    }
}

impl RefreshNotifier for FakeNotifier {
    fn refresh(&self) -> BoxFuture<'_, Result<()>> {
        record(&self.log, "refresh");
        let fail = self.fail;
        Box::pin(async move {
            if fail {
                Err(LauncherError::NotificationFailure(
                    "http://localhost:8899/refresh_all: connection refused".to_string(),
                ))
            } else {
                Ok(())
            }
        })
    }
}

/// A fake server pair recording "terminate".
pub struct FakeServers {
    log: CallLog,
}

impl FakeServers {
    pub fn new(log: CallLog) -> Self {
        Self { log }
    }
}

impl ServerControl for FakeServers {
    fn terminate_all(&mut self) -> Result<()> {
        record(&self.log, "terminate");
        Ok(())
    }
}

/// A probe that fails until its `succeed_on`-th call.
#[derive(Debug)]
pub struct FakeProbe {
    succeed_on: Option<u32>,
    calls: AtomicU32,
}

impl FakeProbe {
    /// Succeeds on call `attempt` (1-based).
    pub fn succeeding_on(attempt: u32) -> Self {
        Self {
            succeed_on: Some(attempt),
            calls: AtomicU32::new(0),
        }
    }

    pub fn never() -> Self {
        Self {
            succeed_on: None,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl HealthProbe for FakeProbe {
    fn probe(&self) -> BoxFuture<'_, Result<()>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let ok = self.succeed_on.is_some_and(|n| call >= n);
        Box::pin(async move {
            if ok {
                Ok(())
            } else {
                Err(LauncherError::HealthCheckFailure(format!(
                    "attempt {call} refused"
                )))
            }
        })
    }
}
