//! Shared helpers for tests that touch process-wide state or capture output.

use std::env;
use std::ffi::{OsStr, OsString};
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

/// Scoped environment guard for test-only mutations.
///
/// Holding a guard serializes every other guard in the process. Variables
/// touched through the guard are restored to their previous values, in
/// reverse order, when it drops.
pub struct EnvGuard {
    entries: Vec<(&'static str, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Acquires the global environment lock and prepares to track mutations.
    ///
    /// A lock poisoned by a panicking test is recovered, since the panicking
    /// guard still restored its variables while unwinding.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            _lock: env_lock().lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    fn remember(&mut self, key: &'static str) {
        if self.entries.iter().all(|(existing, _)| existing != &key) {
            self.entries.push((key, env::var_os(key)));
        }
    }

    /// Sets an environment variable, recording its previous value for restoration.
    #[allow(unsafe_code)]
    pub fn set(&mut self, key: &'static str, value: impl AsRef<OsStr>) {
        self.remember(key);

        // SAFETY: Environment mutations are serialized by the global lock, and the
        // previous value is restored when the guard drops.
        unsafe {
            env::set_var(key, value);
        }
    }

    /// Removes an environment variable while preserving its prior value.
    #[allow(unsafe_code)]
    pub fn remove(&mut self, key: &'static str) {
        self.remember(key);

        // SAFETY: Environment mutations are serialized by the global lock, and the
        // previous value is restored when the guard drops.
        unsafe {
            env::remove_var(key);
        }
    }
}

impl Default for EnvGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for EnvGuard {
    #[allow(unsafe_code)]
    fn drop(&mut self) {
        for (key, previous) in self.entries.drain(..).rev() {
            // SAFETY: The global lock is still held while restoring.
            unsafe {
                match previous {
                    Some(value) => env::set_var(key, value),
                    None => env::remove_var(key),
                }
            }
        }
    }
}

/// In-memory writer whose clones all append to the same buffer.
///
/// A `move || buffer.clone()` closure hands it to APIs that create a writer
/// per call, and the test keeps another clone to inspect the output.
#[derive(Clone, Debug, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn bytes(&self) -> MutexGuard<'_, Vec<u8>> {
        self.bytes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns everything written so far, decoded lossily.
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes()).into_owned()
    }

    /// Returns the written text split into lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    /// Returns the number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    /// Returns `true` when nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
