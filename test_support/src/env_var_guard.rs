//! Guard for temporarily overriding environment variables in tests.
//!
//! `std::env::set_var` and `remove_var` are `unsafe` in Rust 2024 because
//! they mutate process-global state. The guard holds an
//! [`EnvLock`](crate::env_lock::EnvLock) for its whole lifetime and restores
//! the previous value on drop.

use crate::env_lock::EnvLock;
use camino::Utf8Path;
use cmake_env::CMAKE_ENV;
use std::ffi::OsString;

/// RAII guard that resets an environment variable to its previous value.
#[derive(Debug)]
pub struct EnvVarGuard {
    name: &'static str,
    prev: Option<OsString>,
    _lock: EnvLock,
}

impl EnvVarGuard {
    /// Set `name` to `val`, returning a guard that restores the prior value.
    #[must_use]
    pub fn set(name: &'static str, val: &str) -> Self {
        let lock = EnvLock::acquire();
        let prev = std::env::var_os(name);
        // SAFETY: `EnvLock` serialises mutations of the process environment.
        unsafe { std::env::set_var(name, val) };
        Self {
            name,
            prev,
            _lock: lock,
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        // SAFETY: the guard still holds `EnvLock` while restoring.
        unsafe {
            if let Some(ref v) = self.prev {
                std::env::set_var(self.name, v);
            } else {
                std::env::remove_var(self.name);
            }
        }
    }
}

/// Point `KOMPOSIT_CMAKE` at `program` until the guard is dropped.
#[must_use]
pub fn override_cmake_env(program: &Utf8Path) -> EnvVarGuard {
    EnvVarGuard::set(CMAKE_ENV, program.as_str())
}
