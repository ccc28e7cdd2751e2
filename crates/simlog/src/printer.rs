//! crates/simlog/src/printer.rs
//! Replaceable time and node/context prefix printers.

use std::fmt;
use std::io::{self, Write};

/// Writes one prefix decoration, such as the current simulation time.
///
/// Closures with the signature `Fn(&mut dyn Write) -> io::Result<()>`
/// implement the trait directly. Printers are shared with every thread that
/// logs through the process-wide registry, hence the `Send + Sync` bound.
pub trait PrefixPrinter: Send + Sync {
    /// Writes the decoration to `out`.
    fn print(&self, out: &mut dyn Write) -> io::Result<()>;
}

impl<F> PrefixPrinter for F
where
    F: Fn(&mut dyn Write) -> io::Result<()> + Send + Sync,
{
    fn print(&self, out: &mut dyn Write) -> io::Result<()> {
        self(out)
    }
}

/// The two printer slots consulted by the prefix decoration step.
///
/// Both slots start empty, in which case the matching decoration prints
/// nothing even when its prefix bit is enabled.
///
/// # Examples
///
/// ```
/// use simlog::PrefixHooks;
/// use std::io::Write;
///
/// let mut hooks = PrefixHooks::new();
/// hooks.set_time_printer(|out: &mut dyn Write| write!(out, "+1.5s"));
///
/// let mut buffer = Vec::new();
/// assert!(hooks.print_time(&mut buffer)?);
/// assert!(!hooks.print_node(&mut buffer)?);
/// assert_eq!(buffer, b"+1.5s");
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Default)]
pub struct PrefixHooks {
    time: Option<Box<dyn PrefixPrinter>>,
    node: Option<Box<dyn PrefixPrinter>>,
}

impl PrefixHooks {
    /// Returns hooks with both slots empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the time printer, returning the previous one.
    pub fn set_time_printer<P>(&mut self, printer: P) -> Option<Box<dyn PrefixPrinter>>
    where
        P: PrefixPrinter + 'static,
    {
        self.time.replace(Box::new(printer))
    }

    /// Empties the time slot, returning the previous printer.
    pub fn clear_time_printer(&mut self) -> Option<Box<dyn PrefixPrinter>> {
        self.time.take()
    }

    /// Returns the installed time printer.
    #[must_use]
    pub fn time_printer(&self) -> Option<&dyn PrefixPrinter> {
        self.time.as_deref()
    }

    /// Installs the node/context printer, returning the previous one.
    pub fn set_node_printer<P>(&mut self, printer: P) -> Option<Box<dyn PrefixPrinter>>
    where
        P: PrefixPrinter + 'static,
    {
        self.node.replace(Box::new(printer))
    }

    /// Empties the node/context slot, returning the previous printer.
    pub fn clear_node_printer(&mut self) -> Option<Box<dyn PrefixPrinter>> {
        self.node.take()
    }

    /// Returns the installed node/context printer.
    #[must_use]
    pub fn node_printer(&self) -> Option<&dyn PrefixPrinter> {
        self.node.as_deref()
    }

    /// Runs the time printer if one is installed. Returns whether it ran.
    pub fn print_time(&self, out: &mut dyn Write) -> io::Result<bool> {
        run(self.time.as_deref(), out)
    }

    /// Runs the node/context printer if one is installed. Returns whether it ran.
    pub fn print_node(&self, out: &mut dyn Write) -> io::Result<bool> {
        run(self.node.as_deref(), out)
    }
}

fn run(printer: Option<&dyn PrefixPrinter>, out: &mut dyn Write) -> io::Result<bool> {
    match printer {
        Some(printer) => {
            printer.print(out)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

impl fmt::Debug for PrefixHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrefixHooks")
            .field("time", &self.time.is_some())
            .field("node", &self.node.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedNode(u32);

    impl PrefixPrinter for FixedNode {
        fn print(&self, out: &mut dyn Write) -> io::Result<()> {
            write!(out, "[node {}]", self.0)
        }
    }

    #[test]
    fn slots_start_empty() {
        let hooks = PrefixHooks::new();
        assert!(hooks.time_printer().is_none());
        assert!(hooks.node_printer().is_none());

        let mut buffer = Vec::new();
        assert!(!hooks.print_time(&mut buffer).unwrap());
        assert!(!hooks.print_node(&mut buffer).unwrap());
        assert!(buffer.is_empty());
    }

    #[test]
    fn slots_are_independent() {
        let mut hooks = PrefixHooks::new();
        hooks.set_node_printer(FixedNode(7));

        let mut buffer = Vec::new();
        assert!(hooks.print_node(&mut buffer).unwrap());
        assert!(!hooks.print_time(&mut buffer).unwrap());
        assert_eq!(buffer, b"[node 7]");
    }

    #[test]
    fn set_returns_previous_and_clear_empties() {
        let mut hooks = PrefixHooks::new();
        assert!(hooks.set_time_printer(|out: &mut dyn Write| out.write_all(b"1s")).is_none());
        assert!(hooks.set_time_printer(|out: &mut dyn Write| out.write_all(b"2s")).is_some());

        let mut buffer = Vec::new();
        hooks.print_time(&mut buffer).unwrap();
        assert_eq!(buffer, b"2s");

        assert!(hooks.clear_time_printer().is_some());
        assert!(hooks.clear_time_printer().is_none());
        assert!(hooks.time_printer().is_none());
    }

    #[test]
    fn printer_errors_propagate() {
        let mut hooks = PrefixHooks::new();
        hooks.set_node_printer(|_: &mut dyn Write| {
            Err::<(), _>(io::Error::other("clock unavailable"))
        });
        let error = hooks.print_node(&mut Vec::new()).unwrap_err();
        assert_eq!(error.to_string(), "clock unavailable");
    }

    #[test]
    fn hooks_move_across_threads() {
        let mut hooks = PrefixHooks::new();
        hooks.set_node_printer(FixedNode(3));

        let buffer = std::thread::spawn(move || {
            let mut buffer = Vec::new();
            hooks.print_node(&mut buffer).unwrap();
            buffer
        })
        .join()
        .unwrap();
        assert_eq!(buffer, b"[node 3]");
    }

    #[test]
    fn debug_reports_installed_slots() {
        let mut hooks = PrefixHooks::new();
        hooks.set_node_printer(FixedNode(1));
        assert_eq!(
            format!("{hooks:?}"),
            "PrefixHooks { time: false, node: true }"
        );
    }
}
