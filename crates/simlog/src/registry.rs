//! crates/simlog/src/registry.rs
//! Name-keyed store of every log component known to the process.
//!
//! The registry owns the components, the active [`LogConfig`] and the prefix
//! printer hooks. Configuration is applied twice: to every component already
//! registered when it is installed, and to each component registered later,
//! so a wildcard directive also reaches components that appear after startup.

use std::io::{self, Write};

use rustc_hash::FxHashMap;

use crate::component::LogComponent;
use crate::config::LogConfig;
use crate::decorate;
use crate::error::RegistryError;
use crate::level::{LogLevel, Severity};
use crate::printer::PrefixHooks;

/// Registered components in insertion order plus the process configuration.
///
/// # Examples
///
/// ```
/// use simlog::{LogConfig, LogLevel, LogRegistry};
///
/// let mut registry = LogRegistry::with_config(LogConfig::parse("Comp1=warn|debug:Comp2=error"));
/// registry.register("Comp1", LogLevel::NONE)?;
/// registry.register("Comp2", LogLevel::NONE)?;
///
/// assert!(registry.is_enabled("Comp1", LogLevel::ERROR));
/// assert!(registry.is_enabled("Comp1", LogLevel::DEBUG));
/// assert!(!registry.is_enabled("Comp1", LogLevel::INFO));
/// assert!(!registry.is_enabled("Comp2", LogLevel::WARN));
/// assert_eq!(registry.list_all(), ["Comp1", "Comp2"]);
/// # Ok::<(), simlog::RegistryError>(())
/// ```
#[derive(Debug, Default)]
pub struct LogRegistry {
    components: Vec<LogComponent>,
    index: FxHashMap<Box<str>, usize>,
    config: LogConfig,
    hooks: PrefixHooks,
    print_list_pending: bool,
}

impl LogRegistry {
    /// Returns an empty registry without configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an empty registry that applies `config` to every registration.
    #[must_use]
    pub fn with_config(config: LogConfig) -> Self {
        let mut registry = Self::new();
        registry.set_config(config);
        registry
    }

    /// Returns an empty registry configured from [`LOG_ENV_VAR`](crate::LOG_ENV_VAR).
    #[must_use]
    pub fn from_env() -> Self {
        Self::with_config(LogConfig::from_env())
    }

    /// Registers a component named `name` with the blocked bits in `mask`.
    ///
    /// The active configuration is applied before the component is returned.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateComponent`] when the name is already
    /// registered. The existing component is left untouched.
    pub fn register(
        &mut self,
        name: &str,
        mask: LogLevel,
    ) -> Result<&mut LogComponent, RegistryError> {
        if self.index.contains_key(name) {
            #[cfg(feature = "tracing")]
            tracing::warn!(component = name, "log component registered twice");
            return Err(RegistryError::DuplicateComponent {
                name: name.to_owned(),
            });
        }

        let mut component = LogComponent::new(name, mask);
        component.apply_config(&self.config);

        let slot = self.components.len();
        self.index.insert(Box::from(name), slot);
        self.components.push(component);
        Ok(&mut self.components[slot])
    }

    /// Looks up a component by exact name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&LogComponent> {
        self.index.get(name).map(|&slot| &self.components[slot])
    }

    /// Looks up a component by exact name for modification.
    pub fn find_mut(&mut self, name: &str) -> Option<&mut LogComponent> {
        let slot = *self.index.get(name)?;
        Some(&mut self.components[slot])
    }

    /// Enables `level` on the named component. Returns `false` for unknown names.
    pub fn enable(&mut self, name: &str, level: LogLevel) -> bool {
        match self.find_mut(name) {
            Some(component) => {
                component.enable(level);
                true
            }
            None => false,
        }
    }

    /// Disables `level` on the named component. Returns `false` for unknown names.
    pub fn disable(&mut self, name: &str, level: LogLevel) -> bool {
        match self.find_mut(name) {
            Some(component) => {
                component.disable(level);
                true
            }
            None => false,
        }
    }

    /// Returns `true` when the named component exists and has any bit of `level` enabled.
    #[must_use]
    pub fn is_enabled(&self, name: &str, level: LogLevel) -> bool {
        self.find(name)
            .is_some_and(|component| component.is_enabled(level))
    }

    /// Enables `level` on every registered component.
    pub fn enable_all(&mut self, level: LogLevel) {
        for component in &mut self.components {
            component.enable(level);
        }
    }

    /// Disables `level` on every registered component.
    pub fn disable_all(&mut self, level: LogLevel) {
        for component in &mut self.components {
            component.disable(level);
        }
    }

    /// Disables every severity and prefix on every registered component.
    pub fn disable_all_completely(&mut self) {
        self.disable_all(LogLevel::LEVEL_ALL | LogLevel::PREFIX_ALL);
    }

    /// Returns the registered names in registration order.
    #[must_use]
    pub fn list_all(&self) -> Vec<&str> {
        self.components.iter().map(LogComponent::name).collect()
    }

    /// Writes one `name=levels` line per registered component.
    ///
    /// # Errors
    ///
    /// Propagates errors from `out`.
    pub fn print_list(&self, out: &mut dyn Write) -> io::Result<()> {
        for component in &self.components {
            writeln!(out, "{}={}", component.name(), component.levels())?;
        }
        Ok(())
    }

    /// Installs `config`.
    ///
    /// Matching directives are applied to every registered component and the
    /// configuration is kept for components registered later. Levels enabled
    /// by an earlier configuration stay enabled. A `print-list` request arms
    /// [`complete_startup`](Self::complete_startup).
    pub fn set_config(&mut self, config: LogConfig) {
        for component in &mut self.components {
            component.apply_config(&config);
        }
        if config.print_list_requested() {
            self.print_list_pending = true;
        }
        self.config = config;
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Ends the startup phase, printing the component list if the
    /// configuration asked for it.
    ///
    /// The list is printed at most once per request. Returns whether it was
    /// printed.
    ///
    /// # Errors
    ///
    /// Propagates errors from `out`. The request stays armed on error.
    pub fn complete_startup(&mut self, out: &mut dyn Write) -> io::Result<bool> {
        if !self.print_list_pending {
            return Ok(false);
        }
        self.print_list(out)?;
        self.print_list_pending = false;
        #[cfg(feature = "tracing")]
        tracing::debug!(components = self.components.len(), "printed log component list");
        Ok(true)
    }

    /// Writes `message` for the named component when `severity` is enabled,
    /// decorated with the component's prefixes.
    ///
    /// Returns `Ok(false)` for unknown components and disabled severities.
    ///
    /// # Errors
    ///
    /// Propagates errors from `out` and from the installed printers.
    pub fn write_line(
        &self,
        name: &str,
        severity: Severity,
        function: Option<&str>,
        message: impl std::fmt::Display,
        out: &mut dyn Write,
    ) -> io::Result<bool> {
        match self.find(name) {
            Some(component) => {
                decorate::write_line(component, &self.hooks, severity, function, message, out)
            }
            None => Ok(false),
        }
    }

    /// Returns the number of registered components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Iterates over the components in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, LogComponent> {
        self.components.iter()
    }

    /// Returns the prefix printer hooks.
    #[must_use]
    pub const fn hooks(&self) -> &PrefixHooks {
        &self.hooks
    }

    /// Returns the prefix printer hooks for modification.
    pub fn hooks_mut(&mut self) -> &mut PrefixHooks {
        &mut self.hooks
    }
}

impl<'a> IntoIterator for &'a LogRegistry {
    type Item = &'a LogComponent;
    type IntoIter = std::slice::Iter<'a, LogComponent>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
