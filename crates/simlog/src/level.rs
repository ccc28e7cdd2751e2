//! crates/simlog/src/level.rs
//! Severity and prefix bit vocabulary shared by every log component.

use std::borrow::Cow;
use std::fmt;
use std::iter::{FromIterator, FusedIterator};
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

/// Bitfield of enabled severities and display prefixes.
///
/// Severity bits live in the low 28 bits and prefix bits in the top four, so
/// the two groups compose with `|` and can be tested independently with `&`.
/// Every `LEVEL_*` constant is cumulative: it carries its own severity bit
/// plus the bits of every more severe class, which is why enabling
/// [`LogLevel::LEVEL_WARN`] also enables [`LogLevel::ERROR`].
///
/// The raw values are part of the external contract (configuration strings
/// and decorated output depend on them) and must not change.
///
/// # Examples
///
/// ```
/// use simlog::LogLevel;
///
/// let level = LogLevel::LEVEL_DEBUG | LogLevel::PREFIX_TIME;
/// assert!(level.contains(LogLevel::ERROR));
/// assert!(level.contains(LogLevel::WARN));
/// assert!(!level.intersects(LogLevel::INFO));
/// assert_eq!(level.prefix_bits(), LogLevel::PREFIX_TIME);
/// assert_eq!(level.to_string(), "error|warn|debug|prefix_time");
/// ```
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct LogLevel {
    bits: u32,
}

impl LogLevel {
    const fn new(bits: u32) -> Self {
        Self { bits }
    }

    /// No severity and no prefix.
    pub const NONE: Self = Self::new(0x0000_0000);

    /// Serious error messages only.
    pub const ERROR: Self = Self::new(0x0000_0001);
    /// Errors.
    pub const LEVEL_ERROR: Self = Self::new(0x0000_0001);

    /// Warning messages.
    pub const WARN: Self = Self::new(0x0000_0002);
    /// Warnings and errors.
    pub const LEVEL_WARN: Self = Self::new(0x0000_0003);

    /// Rare ad-hoc debug messages.
    pub const DEBUG: Self = Self::new(0x0000_0004);
    /// Debug, warnings, and errors.
    pub const LEVEL_DEBUG: Self = Self::new(0x0000_0007);

    /// Informational messages such as banners.
    pub const INFO: Self = Self::new(0x0000_0008);
    /// Info and every more severe class.
    pub const LEVEL_INFO: Self = Self::new(0x0000_000f);

    /// Function entry tracing.
    pub const FUNCTION: Self = Self::new(0x0000_0010);
    /// Function tracing and every more severe class.
    pub const LEVEL_FUNCTION: Self = Self::new(0x0000_001f);

    /// Control flow tracing within functions.
    pub const LOGIC: Self = Self::new(0x0000_0020);
    /// Logic tracing and every more severe class.
    pub const LEVEL_LOGIC: Self = Self::new(0x0000_003f);

    /// Every severity bit, including ones not yet assigned to a class.
    pub const ALL: Self = Self::new(0x0fff_ffff);
    /// Alias of [`LogLevel::ALL`].
    pub const LEVEL_ALL: Self = Self::ALL;

    /// Prefix each line with the component and function name.
    pub const PREFIX_FUNC: Self = Self::new(0x8000_0000);
    /// Prefix each line with the simulation time.
    pub const PREFIX_TIME: Self = Self::new(0x4000_0000);
    /// Prefix each line with the node or context id.
    pub const PREFIX_NODE: Self = Self::new(0x2000_0000);
    /// Prefix each line with the severity label.
    pub const PREFIX_LEVEL: Self = Self::new(0x1000_0000);
    /// Every prefix.
    pub const PREFIX_ALL: Self = Self::new(0xf000_0000);

    const KNOWN_SEVERITY_MASK: u32 = Self::LEVEL_LOGIC.bits;

    /// Returns a level constructed from raw `bits` without masking.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self::new(bits)
    }

    /// Returns the raw bit representation.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.bits
    }

    /// Returns `true` when no bit is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Checks whether every bit of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.bits & other.bits) == other.bits
    }

    /// Checks whether `self` and `other` share at least one bit.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        (self.bits & other.bits) != 0
    }

    /// Returns the union of both operands.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self::new(self.bits | other.bits)
    }

    /// Returns the bits common to both operands.
    #[must_use]
    pub const fn intersection(self, other: Self) -> Self {
        Self::new(self.bits & other.bits)
    }

    /// Returns the bits present in `self` but not in `other`.
    #[must_use]
    pub const fn difference(self, other: Self) -> Self {
        Self::new(self.bits & !other.bits)
    }

    /// Returns only the severity portion of the bitfield.
    #[must_use]
    pub const fn severity_bits(self) -> Self {
        Self::new(self.bits & Self::ALL.bits)
    }

    /// Returns only the prefix portion of the bitfield.
    #[must_use]
    pub const fn prefix_bits(self) -> Self {
        Self::new(self.bits & Self::PREFIX_ALL.bits)
    }

    /// Iterates the known severity classes set in the bitfield, most severe first.
    #[must_use]
    pub const fn severities(self) -> Severities {
        Severities {
            remaining: self.bits & Self::KNOWN_SEVERITY_MASK,
        }
    }

    /// Iterates the prefixes set in the bitfield in decoration order.
    pub fn prefixes(self) -> impl Iterator<Item = Prefix> {
        Prefix::ALL
            .into_iter()
            .filter(move |prefix| self.intersects(prefix.bit()))
    }

    /// Returns the label printed by the severity prefix.
    ///
    /// A single severity bit maps to its uppercase label. Any other pattern
    /// lists the labels of every severity bit present joined with `|`, or
    /// `"unknown"` when the pattern carries no known severity.
    ///
    /// ```
    /// use simlog::LogLevel;
    ///
    /// assert_eq!(LogLevel::WARN.label(), "WARN");
    /// assert_eq!(LogLevel::LEVEL_WARN.label(), "ERROR|WARN");
    /// assert_eq!(LogLevel::PREFIX_TIME.label(), "unknown");
    /// ```
    #[must_use]
    pub fn label(self) -> Cow<'static, str> {
        if let Some(severity) = Severity::from_bit(self.bits) {
            return Cow::Borrowed(severity.label());
        }

        let labels: Vec<&str> = self.severities().map(Severity::label).collect();
        if labels.is_empty() {
            Cow::Borrowed("unknown")
        } else {
            Cow::Owned(labels.join("|"))
        }
    }
}

/// Returns `true` when `level` shares at least one bit with `set`.
#[must_use]
pub const fn is_level_in_set(level: LogLevel, set: LogLevel) -> bool {
    level.intersects(set)
}

/// One severity class.
///
/// Variants are listed from most to least severe, which is also ascending bit
/// order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    /// Serious errors.
    Error,
    /// Warnings.
    Warn,
    /// Ad-hoc debugging output.
    Debug,
    /// Informational messages.
    Info,
    /// Function entry tracing.
    Function,
    /// Control flow tracing.
    Logic,
}

impl Severity {
    /// Every severity in ascending bit order.
    pub const ALL: [Self; 6] = [
        Self::Error,
        Self::Warn,
        Self::Debug,
        Self::Info,
        Self::Function,
        Self::Logic,
    ];

    /// Returns the single bit of this severity.
    #[must_use]
    pub const fn bit(self) -> LogLevel {
        match self {
            Self::Error => LogLevel::ERROR,
            Self::Warn => LogLevel::WARN,
            Self::Debug => LogLevel::DEBUG,
            Self::Info => LogLevel::INFO,
            Self::Function => LogLevel::FUNCTION,
            Self::Logic => LogLevel::LOGIC,
        }
    }

    /// Returns the cumulative level constant of this severity.
    #[must_use]
    pub const fn level(self) -> LogLevel {
        match self {
            Self::Error => LogLevel::LEVEL_ERROR,
            Self::Warn => LogLevel::LEVEL_WARN,
            Self::Debug => LogLevel::LEVEL_DEBUG,
            Self::Info => LogLevel::LEVEL_INFO,
            Self::Function => LogLevel::LEVEL_FUNCTION,
            Self::Logic => LogLevel::LEVEL_LOGIC,
        }
    }

    /// Returns the uppercase label written by the severity prefix.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Function => "FUNCTION",
            Self::Logic => "LOGIC",
        }
    }

    /// Returns the configuration token naming this severity.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Function => "function",
            Self::Logic => "logic",
        }
    }

    pub(crate) const fn from_bit(bits: u32) -> Option<Self> {
        match bits {
            _ if bits == LogLevel::ERROR.bits => Some(Self::Error),
            _ if bits == LogLevel::WARN.bits => Some(Self::Warn),
            _ if bits == LogLevel::DEBUG.bits => Some(Self::Debug),
            _ if bits == LogLevel::INFO.bits => Some(Self::Info),
            _ if bits == LogLevel::FUNCTION.bits => Some(Self::Function),
            _ if bits == LogLevel::LOGIC.bits => Some(Self::Logic),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One display decoration.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Prefix {
    /// Component and function name.
    Func,
    /// Simulation time.
    Time,
    /// Node or context id.
    Node,
    /// Severity label.
    Level,
}

impl Prefix {
    /// Every prefix in the order tokens are listed.
    pub const ALL: [Self; 4] = [Self::Func, Self::Time, Self::Node, Self::Level];

    /// Returns the bit of this prefix.
    #[must_use]
    pub const fn bit(self) -> LogLevel {
        match self {
            Self::Func => LogLevel::PREFIX_FUNC,
            Self::Time => LogLevel::PREFIX_TIME,
            Self::Node => LogLevel::PREFIX_NODE,
            Self::Level => LogLevel::PREFIX_LEVEL,
        }
    }

    /// Returns the configuration token naming this prefix.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Func => "prefix_func",
            Self::Time => "prefix_time",
            Self::Node => "prefix_node",
            Self::Level => "prefix_level",
        }
    }
}

/// Iterator over the known severities set within a [`LogLevel`].
#[derive(Clone, Debug)]
pub struct Severities {
    remaining: u32,
}

impl Iterator for Severities {
    type Item = Severity;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let bit_mask = 1u32 << self.remaining.trailing_zeros();
        self.remaining &= !bit_mask;
        Severity::from_bit(bit_mask)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining.count_ones() as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Severities {}

impl FusedIterator for Severities {}

impl fmt::Debug for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogLevel")
            .field("bits", &format_args!("0x{:08x}", self.bits))
            .finish()
    }
}

impl fmt::Display for LogLevel {
    /// Renders the bitfield with configuration tokens, for example
    /// `error|warn|prefix_time`. An empty level renders as `0` and a level
    /// carrying every severity bit renders as `all`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("0");
        }

        let mut first = true;
        let mut separate = |f: &mut fmt::Formatter<'_>| {
            if first {
                first = false;
                Ok(())
            } else {
                f.write_str("|")
            }
        };

        if self.contains(Self::ALL) {
            separate(f)?;
            f.write_str("all")?;
        } else {
            for severity in self.severities() {
                separate(f)?;
                f.write_str(severity.token())?;
            }

            let unknown = self.bits & Self::ALL.bits & !Self::KNOWN_SEVERITY_MASK;
            if unknown != 0 {
                separate(f)?;
                write!(f, "unknown(0x{unknown:x})")?;
            }
        }

        for prefix in self.prefixes() {
            separate(f)?;
            f.write_str(prefix.token())?;
        }

        Ok(())
    }
}

impl Not for LogLevel {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::new(!self.bits)
    }
}

impl BitOr for LogLevel {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl BitOrAssign for LogLevel {
    fn bitor_assign(&mut self, rhs: Self) {
        self.bits |= rhs.bits;
    }
}

impl BitAnd for LogLevel {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.intersection(rhs)
    }
}

impl BitAndAssign for LogLevel {
    fn bitand_assign(&mut self, rhs: Self) {
        self.bits &= rhs.bits;
    }
}

impl BitXor for LogLevel {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self::Output {
        Self::new(self.bits ^ rhs.bits)
    }
}

impl BitXorAssign for LogLevel {
    fn bitxor_assign(&mut self, rhs: Self) {
        self.bits ^= rhs.bits;
    }
}

impl From<LogLevel> for u32 {
    fn from(level: LogLevel) -> Self {
        level.bits
    }
}

impl From<u32> for LogLevel {
    fn from(bits: u32) -> Self {
        Self::from_bits(bits)
    }
}

impl From<Severity> for LogLevel {
    fn from(severity: Severity) -> Self {
        severity.bit()
    }
}

impl From<Prefix> for LogLevel {
    fn from(prefix: Prefix) -> Self {
        prefix.bit()
    }
}

impl FromIterator<Severity> for LogLevel {
    fn from_iter<I: IntoIterator<Item = Severity>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::NONE, |level, severity| level | severity.bit())
    }
}
