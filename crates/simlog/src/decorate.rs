//! crates/simlog/src/decorate.rs
//! Prefix decoration applied in front of every emitted line.
//!
//! Decorations are written in a fixed order: time, node/context, component
//! and function name, then the bracketed severity label. Time and node
//! decorations need both the prefix bit and an installed printer; the other
//! two only need the prefix bit.

use std::fmt::Display;
use std::io::{self, Write};

use crate::component::LogComponent;
use crate::level::{LogLevel, Severity};
use crate::printer::PrefixHooks;

/// Writes the prefixes enabled on `component` for a line of `severity`.
///
/// `function` is the name of the calling function when the caller knows it;
/// without it the function decoration degrades to the component name.
pub fn write_prefix(
    component: &LogComponent,
    hooks: &PrefixHooks,
    severity: Severity,
    function: Option<&str>,
    out: &mut dyn Write,
) -> io::Result<()> {
    if component.is_enabled(LogLevel::PREFIX_TIME) && hooks.print_time(out)? {
        out.write_all(b" ")?;
    }

    if component.is_enabled(LogLevel::PREFIX_NODE) && hooks.print_node(out)? {
        out.write_all(b" ")?;
    }

    if component.is_enabled(LogLevel::PREFIX_FUNC) {
        match function {
            Some(function) => write!(out, "{}:{function}(): ", component.name())?,
            None => write!(out, "{}: ", component.name())?,
        }
    }

    if component.is_enabled(LogLevel::PREFIX_LEVEL) {
        write!(out, "[{}] ", severity.label())?;
    }

    Ok(())
}

/// Writes a decorated, newline-terminated line when `component` is enabled
/// for `severity`.
///
/// Returns `Ok(false)` without writing anything when the severity is
/// disabled.
///
/// # Examples
///
/// ```
/// use simlog::{LogComponent, LogLevel, PrefixHooks, Severity, decorate};
///
/// let mut component = LogComponent::new("UdpEcho", LogLevel::NONE);
/// component.enable(LogLevel::LEVEL_INFO | LogLevel::PREFIX_FUNC | LogLevel::PREFIX_LEVEL);
///
/// let mut out = Vec::new();
/// let hooks = PrefixHooks::new();
/// assert!(decorate::write_line(&component, &hooks, Severity::Info, Some("Send"), "sent 1024 bytes", &mut out)?);
/// assert!(!decorate::write_line(&component, &hooks, Severity::Logic, None, "skipped", &mut out)?);
/// assert_eq!(String::from_utf8(out).unwrap(), "UdpEcho:Send(): [INFO] sent 1024 bytes\n");
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn write_line(
    component: &LogComponent,
    hooks: &PrefixHooks,
    severity: Severity,
    function: Option<&str>,
    message: impl Display,
    out: &mut dyn Write,
) -> io::Result<bool> {
    if !component.is_enabled(severity.bit()) {
        return Ok(false);
    }

    write_prefix(component, hooks, severity, function, out)?;
    writeln!(out, "{message}")?;
    Ok(true)
}
