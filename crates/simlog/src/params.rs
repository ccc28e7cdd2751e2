//! crates/simlog/src/params.rs
//! Separator-inserting writer for function trace argument lists.

use std::fmt::Display;
use std::io::{self, Write};

/// Writes streamed values separated by `", "`.
///
/// The first value is written as-is and every later value is preceded by
/// [`SEPARATOR`](Self::SEPARATOR).
///
/// # Examples
///
/// ```
/// use simlog::ParameterJoiner;
///
/// let mut joiner = ParameterJoiner::new(Vec::new());
/// joiner.push(42)?.push("eth0")?.push(1.5)?;
/// assert_eq!(joiner.into_inner(), b"42, eth0, 1.5");
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct ParameterJoiner<W> {
    out: W,
    first: bool,
}

impl<W> ParameterJoiner<W> {
    /// Text written between consecutive values.
    pub const SEPARATOR: &'static str = ", ";

    /// Wraps `out`.
    #[must_use]
    pub const fn new(out: W) -> Self {
        Self { out, first: true }
    }

    /// Returns `true` until the first value has been written.
    #[must_use]
    pub const fn is_first(&self) -> bool {
        self.first
    }

    /// Borrows the wrapped writer.
    #[must_use]
    pub const fn get_ref(&self) -> &W {
        &self.out
    }

    /// Unwraps the writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ParameterJoiner<W> {
    /// Writes `value`, preceded by the separator unless it is the first one.
    pub fn push<T: Display>(&mut self, value: T) -> io::Result<&mut Self> {
        if self.first {
            self.first = false;
        } else {
            self.out.write_all(Self::SEPARATOR.as_bytes())?;
        }
        write!(self.out, "{value}")?;
        Ok(self)
    }
}
