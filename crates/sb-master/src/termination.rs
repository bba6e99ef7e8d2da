//! Process-wide termination hook.
//!
//! One `ctrlc` handler (SIGINT, SIGTERM, SIGHUP) is installed the first time
//! a hook is registered. Each live session registers a release closure and
//! holds the returned [`HookRegistration`]; dropping it deregisters. On a
//! signal every registered release runs, then the process exits with 130.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock};

use crate::SessionError;

/// Exit status after a termination signal (128 + SIGINT).
pub const SIGNAL_EXIT_CODE: i32 = 130;

type Release = Box<dyn Fn() + Send>;

static HOOKS: Mutex<BTreeMap<u64, Release>> = Mutex::new(BTreeMap::new());
static INSTALLED: OnceLock<Result<(), String>> = OnceLock::new();
static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Keeps a release closure registered until dropped.
#[must_use = "the hook is deregistered when the registration is dropped"]
pub struct HookRegistration {
    id: u64,
}

impl Drop for HookRegistration {
    fn drop(&mut self) {
        hooks().remove(&self.id);
    }
}

/// Register `release` to run if the process is told to terminate.
pub fn register(release: impl Fn() + Send + 'static) -> Result<HookRegistration, SessionError> {
    install()?;
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    hooks().insert(id, Box::new(release));
    Ok(HookRegistration { id })
}

fn install() -> Result<(), SessionError> {
    INSTALLED
        .get_or_init(|| {
            ctrlc::set_handler(|| {
                let released = run_hooks();
                tracing::error!(released, "terminated by signal, speaker released");
                std::process::exit(SIGNAL_EXIT_CODE);
            })
            .map_err(|e| e.to_string())
        })
        .clone()
        .map_err(SessionError::SignalHandler)
}

/// Number of release closures currently registered.
pub fn registered_count() -> usize {
    hooks().len()
}

/// Serializes tests that register hooks, so hook counts are exact.
#[cfg(test)]
pub(crate) static TEST_SERIAL: Mutex<()> = Mutex::new(());

/// Run every registered release. Returns how many ran.
fn run_hooks() -> usize {
    let hooks = hooks();
    for release in hooks.values() {
        release();
    }
    hooks.len()
}

fn hooks() -> MutexGuard<'static, BTreeMap<u64, Release>> {
    HOOKS.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
