//! crates/simlog/src/global.rs
//! Process-wide default registry behind the free-function API.
//!
//! One registry is shared by every thread. It is filled on first use from
//! [`LogConfig::from_env`] unless [`init`] installed one earlier, so a program
//! that configures at startup and then spawns workers gives those workers the
//! same components, levels and printers. Code that needs more than one
//! registry, or wants to avoid ambient state, should own a [`LogRegistry`]
//! directly instead.
//!
//! Access is serialized by a mutex. Calling back into this module from inside
//! a [`with_registry`] or [`with_registry_mut`] closure on the same thread
//! panics instead of deadlocking.

use std::cell::Cell;
use std::fmt::Display;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use crate::config::LogConfig;
use crate::error::RegistryError;
use crate::level::{LogLevel, Severity};
use crate::printer::PrefixPrinter;
use crate::registry::LogRegistry;

static REGISTRY: Mutex<Option<LogRegistry>> = Mutex::new(None);

thread_local! {
    /// Set while the current thread holds the registry lock.
    static HOLDING: Cell<bool> = const { Cell::new(false) };
}

/// Clears [`HOLDING`] before the lock guard is released.
struct Held;

impl Held {
    fn enter() -> Self {
        set_holding(true);
        Self
    }
}

impl Drop for Held {
    fn drop(&mut self) {
        set_holding(false);
    }
}

// Thread-local storage is gone while a thread tears down; such late callers
// are treated as not holding the lock.
fn set_holding(value: bool) {
    let _ = HOLDING.try_with(|holding| holding.set(value));
}

fn holding() -> bool {
    HOLDING.try_with(Cell::get).unwrap_or(false)
}

fn lock_slot<R>(f: impl FnOnce(&mut Option<LogRegistry>) -> R) -> R {
    assert!(
        !holding(),
        "the global log registry was accessed re-entrantly"
    );
    // A panic inside `f` leaves the registry structurally valid, so a
    // poisoned lock is recovered.
    let mut guard = REGISTRY.lock().unwrap_or_else(PoisonError::into_inner);
    let _held = Held::enter();
    f(&mut guard)
}

fn access<R>(f: impl FnOnce(&mut LogRegistry) -> R) -> R {
    lock_slot(|slot| f(slot.get_or_insert_with(LogRegistry::from_env)))
}

/// Replaces the process-wide registry with an empty one using `config`.
///
/// The environment is not consulted.
pub fn init(config: LogConfig) {
    lock_slot(|slot| *slot = Some(LogRegistry::with_config(config)));
}

/// Runs `f` with shared access to the process-wide registry.
///
/// # Panics
///
/// Panics when called from inside another `with_registry*` closure on the
/// same thread.
pub fn with_registry<R>(f: impl FnOnce(&LogRegistry) -> R) -> R {
    access(|registry| f(registry))
}

/// Runs `f` with exclusive access to the process-wide registry.
///
/// # Panics
///
/// Panics when called from inside another `with_registry*` closure on the
/// same thread.
pub fn with_registry_mut<R>(f: impl FnOnce(&mut LogRegistry) -> R) -> R {
    access(f)
}

/// Like [`with_registry`], but returns `None` instead of panicking when the
/// current thread already holds the registry.
///
/// Other threads holding the lock only make this wait.
#[cfg(feature = "tracing")]
pub(crate) fn try_with_registry<R>(f: impl FnOnce(&LogRegistry) -> R) -> Option<R> {
    if holding() {
        return None;
    }
    Some(access(|registry| f(registry)))
}

/// Registers a component in the process-wide registry.
///
/// # Errors
///
/// Returns [`RegistryError::DuplicateComponent`] when the name is taken.
pub fn define_component(name: &str, mask: LogLevel) -> Result<(), RegistryError> {
    with_registry_mut(|registry| registry.register(name, mask).map(|_| ()))
}

/// Enables `level` on the named component. Unknown names are ignored.
pub fn component_enable(name: &str, level: LogLevel) -> bool {
    with_registry_mut(|registry| registry.enable(name, level))
}

/// Enables `level` on every registered component.
pub fn component_enable_all(level: LogLevel) {
    with_registry_mut(|registry| registry.enable_all(level));
}

/// Disables `level` on the named component. Unknown names are ignored.
pub fn component_disable(name: &str, level: LogLevel) -> bool {
    with_registry_mut(|registry| registry.disable(name, level))
}

/// Disables `level` on every registered component.
pub fn component_disable_all(level: LogLevel) {
    with_registry_mut(|registry| registry.disable_all(level));
}

/// Returns `true` when the named component has any bit of `level` enabled.
#[must_use]
pub fn is_enabled(name: &str, level: LogLevel) -> bool {
    with_registry(|registry| registry.is_enabled(name, level))
}

/// Returns the registered component names in registration order.
#[must_use]
pub fn component_names() -> Vec<String> {
    with_registry(|registry| registry.list_all().into_iter().map(str::to_owned).collect())
}

/// Writes the component list of the process-wide registry.
pub fn print_component_list(out: &mut dyn Write) -> io::Result<()> {
    with_registry(|registry| registry.print_list(out))
}

/// See [`LogRegistry::complete_startup`].
pub fn complete_startup(out: &mut dyn Write) -> io::Result<bool> {
    with_registry_mut(|registry| registry.complete_startup(out))
}

/// See [`LogRegistry::write_line`].
pub fn write_line(
    name: &str,
    severity: Severity,
    function: Option<&str>,
    message: impl Display,
    out: &mut dyn Write,
) -> io::Result<bool> {
    with_registry(|registry| registry.write_line(name, severity, function, message, out))
}

/// Installs the time printer.
pub fn set_time_printer<P>(printer: P)
where
    P: PrefixPrinter + 'static,
{
    with_registry_mut(|registry| {
        registry.hooks_mut().set_time_printer(printer);
    });
}

/// Removes the time printer.
pub fn clear_time_printer() {
    with_registry_mut(|registry| {
        registry.hooks_mut().clear_time_printer();
    });
}

/// Installs the node/context printer.
pub fn set_node_printer<P>(printer: P)
where
    P: PrefixPrinter + 'static,
{
    with_registry_mut(|registry| {
        registry.hooks_mut().set_node_printer(printer);
    });
}

/// Removes the node/context printer.
pub fn clear_node_printer() {
    with_registry_mut(|registry| {
        registry.hooks_mut().clear_node_printer();
    });
}

/// Returns `true` when a time printer is installed.
#[must_use]
pub fn has_time_printer() -> bool {
    with_registry(|registry| registry.hooks().time_printer().is_some())
}

/// Returns `true` when a node/context printer is installed.
#[must_use]
pub fn has_node_printer() -> bool {
    with_registry(|registry| registry.hooks().node_printer().is_some())
}
