//! Scoped modification of process environment variables.
//!
//! gdb picks up `LD_LIBRARY_PATH` and the embedded Python's `PYTHONHOME` /
//! `PYTHONPATH` from its parent, which can point it at the wrong libraries.
//! [`ScopedEnv`] applies a set of changes and restores the previous values when
//! dropped, on every exit path. A process-wide lock is held for the guard's
//! lifetime so two guards never interleave their snapshots.

use std::env;
use std::ffi::OsString;
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;

static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// One change applied while a guard is alive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvChange {
    /// Remove the variable.
    Unset(String),
    /// Put `prefix` in front of the current value, separated by `:`.
    Prepend { name: String, prefix: String },
}

impl EnvChange {
    fn name(&self) -> &str {
        match self {
            EnvChange::Unset(name) => name,
            EnvChange::Prepend { name, .. } => name,
        }
    }
}

/// Restores a snapshot of the touched variables on drop.
pub struct ScopedEnv {
    saved: Vec<(String, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl ScopedEnv {
    /// Snapshot every variable named in `changes`, then apply the changes.
    pub fn acquire(changes: &[EnvChange]) -> Self {
        // Guards restore on drop even while unwinding; poison carries no state.
        let lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut saved: Vec<(String, Option<OsString>)> = Vec::new();
        for change in changes {
            if !saved.iter().any(|(name, _)| name == change.name()) {
                saved.push((change.name().to_string(), env::var_os(change.name())));
            }
        }

        for change in changes {
            match change {
                EnvChange::Unset(name) => {
                    log::debug!("Unsetting {name}");
                    env::remove_var(name);
                }
                EnvChange::Prepend { name, prefix } => {
                    let mut value = OsString::from(prefix);
                    if let Some(current) = env::var_os(name).filter(|v| !v.is_empty()) {
                        value.push(":");
                        value.push(current);
                    }
                    log::debug!("Setting {name}={}", value.to_string_lossy());
                    env::set_var(name, value);
                }
            }
        }

        Self { saved, _lock: lock }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (name, value) in self.saved.drain(..).rev() {
            match value {
                Some(value) => env::set_var(&name, value),
                None => env::remove_var(&name),
            }
        }
        log::debug!("Restored debugger environment");
    }
}

/// Run `f` with `changes` applied, restoring the environment afterwards.
pub fn with_env<T>(changes: &[EnvChange], f: impl FnOnce() -> T) -> T {
    let _guard = ScopedEnv::acquire(changes);
    f()
}
