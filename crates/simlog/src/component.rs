//! crates/simlog/src/component.rs
//! A single named log component and its enabled and blocked level sets.

use crate::config::LogConfig;
use crate::level::LogLevel;

/// One named unit of logging, usually one per source module.
///
/// The component keeps two bitfields: the levels currently enabled and a mask
/// of levels that can never be enabled. The mask is meant for helpers that
/// implement the logging facility itself, where logging would recurse.
///
/// Invariant: `levels() & mask()` is always empty. Enable requests that touch
/// masked bits drop those bits silently.
///
/// # Examples
///
/// ```
/// use simlog::{LogComponent, LogLevel};
///
/// let mut component = LogComponent::new("PacketSink", LogLevel::FUNCTION);
/// component.enable(LogLevel::LEVEL_LOGIC);
///
/// assert!(component.is_enabled(LogLevel::INFO));
/// assert!(!component.is_enabled(LogLevel::FUNCTION));
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LogComponent {
    name: Box<str>,
    levels: LogLevel,
    mask: LogLevel,
}

impl LogComponent {
    /// Creates a detached component with nothing enabled.
    ///
    /// Components created this way are not registered anywhere and do not see
    /// any configuration; use [`LogRegistry::register`](crate::LogRegistry::register)
    /// for the normal startup path.
    #[must_use]
    pub fn new(name: impl Into<Box<str>>, mask: LogLevel) -> Self {
        Self {
            name: name.into(),
            levels: LogLevel::NONE,
            mask,
        }
    }

    /// Returns the component name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the currently enabled bits.
    #[must_use]
    pub const fn levels(&self) -> LogLevel {
        self.levels
    }

    /// Returns the blocked bits.
    #[must_use]
    pub const fn mask(&self) -> LogLevel {
        self.mask
    }

    /// Returns `true` when any bit of `level` is enabled.
    #[must_use]
    pub const fn is_enabled(&self, level: LogLevel) -> bool {
        self.levels.intersects(level)
    }

    /// Returns `true` when nothing is enabled.
    #[must_use]
    pub const fn is_none_enabled(&self) -> bool {
        self.levels.is_empty()
    }

    /// Enables `level`, minus any blocked bits.
    pub fn enable(&mut self, level: LogLevel) {
        self.levels |= level.difference(self.mask);
    }

    /// Disables `level`.
    pub fn disable(&mut self, level: LogLevel) {
        self.levels = self.levels.difference(level);
    }

    /// Blocks `level` permanently and clears it from the enabled set.
    pub fn set_mask(&mut self, level: LogLevel) {
        self.mask |= level;
        self.levels = self.levels.difference(level);
    }

    /// Enables every level that `config` assigns to this component.
    ///
    /// Returns `true` when at least one directive matched.
    pub fn apply_config(&mut self, config: &LogConfig) -> bool {
        match config.levels_for(&self.name) {
            Some(levels) => {
                self.enable(levels);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Severity;

    #[test]
    fn new_component_has_nothing_enabled() {
        let component = LogComponent::new("A", LogLevel::NONE);
        assert_eq!(component.name(), "A");
        assert!(component.is_none_enabled());
        assert_eq!(component.mask(), LogLevel::NONE);
    }

    #[test]
    fn enable_then_query_each_severity() {
        for severity in Severity::ALL {
            let mut component = LogComponent::new("A", LogLevel::NONE);
            component.enable(severity.bit());
            assert!(component.is_enabled(severity.bit()));
            component.disable(severity.bit());
            assert!(component.is_none_enabled());
        }
    }

    #[test]
    fn enable_drops_masked_bits() {
        let mut component = LogComponent::new("A", LogLevel::LOGIC | LogLevel::PREFIX_TIME);
        component.enable(LogLevel::ALL | LogLevel::PREFIX_ALL);

        assert!(!component.is_enabled(LogLevel::LOGIC));
        assert!(!component.is_enabled(LogLevel::PREFIX_TIME));
        assert!(component.is_enabled(LogLevel::FUNCTION));
        assert!(!component.levels().intersects(component.mask()));
    }

    #[test]
    fn cumulative_enable_subsumes_lower_severities() {
        let mut component = LogComponent::new("A", LogLevel::NONE);
        component.enable(LogLevel::LEVEL_WARN);
        assert!(component.is_enabled(LogLevel::ERROR));
        assert!(component.is_enabled(LogLevel::WARN));
        assert!(!component.is_enabled(LogLevel::DEBUG));
    }

    #[test]
    fn set_mask_clears_enabled_bits_and_is_idempotent() {
        let mut component = LogComponent::new("A", LogLevel::NONE);
        component.enable(LogLevel::LEVEL_INFO);
        component.set_mask(LogLevel::DEBUG);
        assert!(!component.is_enabled(LogLevel::DEBUG));
        assert!(component.is_enabled(LogLevel::INFO));

        let snapshot = component.clone();
        component.set_mask(LogLevel::DEBUG);
        assert_eq!(component, snapshot);

        component.enable(LogLevel::DEBUG);
        assert!(!component.is_enabled(LogLevel::DEBUG));
    }

    #[test]
    fn disable_leaves_other_bits() {
        let mut component = LogComponent::new("A", LogLevel::NONE);
        component.enable(LogLevel::LEVEL_DEBUG | LogLevel::PREFIX_FUNC);
        component.disable(LogLevel::WARN | LogLevel::PREFIX_FUNC);
        assert_eq!(component.levels(), LogLevel::ERROR | LogLevel::DEBUG);
    }

    #[test]
    fn unknown_bits_are_inert_for_queries() {
        let mut component = LogComponent::new("A", LogLevel::NONE);
        component.enable(LogLevel::LEVEL_LOGIC);
        assert!(!component.is_enabled(LogLevel::from_bits(0x0100_0000)));
        assert!(!component.is_enabled(LogLevel::NONE));
    }

    #[test]
    fn apply_config_reports_matches() {
        let config = LogConfig::parse("A=warn:*=prefix_level");
        let mut a = LogComponent::new("A", LogLevel::NONE);
        let mut b = LogComponent::new("B", LogLevel::NONE);

        assert!(a.apply_config(&config));
        assert!(b.apply_config(&config));
        assert_eq!(a.levels(), LogLevel::LEVEL_WARN | LogLevel::PREFIX_LEVEL);
        assert_eq!(b.levels(), LogLevel::PREFIX_LEVEL);

        let mut c = LogComponent::new("C", LogLevel::NONE);
        assert!(!c.apply_config(&LogConfig::parse("A")));
        assert!(c.is_none_enabled());
    }
}
