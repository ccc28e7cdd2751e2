//! crates/simlog/src/error.rs
//! Errors reported by the registry and the configuration parser.

use thiserror::Error;

/// Errors produced while registering log components.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum RegistryError {
    /// A component with the same name already exists. The existing component
    /// is left untouched.
    #[error("log component '{name}' is already registered")]
    DuplicateComponent {
        /// The rejected name.
        name: String,
    },
}

/// Diagnostics produced while parsing a configuration string.
///
/// These never abort parsing: the offending directive is dropped and the
/// remaining directives are still applied.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ConfigError {
    /// A level token that is not part of the configuration vocabulary.
    #[error("unknown log level '{token}' for component selector '{selector}'")]
    UnknownLevel {
        /// Selector of the directive containing the token.
        selector: String,
        /// The unrecognised token.
        token: String,
    },
    /// A directive of the form `=level`.
    #[error("log directive '{directive}' has an empty component selector")]
    EmptySelector {
        /// The full directive text.
        directive: String,
    },
    /// An empty entry in a level list, as in `Comp=` or `Comp=warn||info`.
    #[error("empty log level in the level list for component selector '{selector}'")]
    EmptyLevel {
        /// Selector of the directive containing the empty entry.
        selector: String,
    },
}

impl ConfigError {
    /// Returns the selector of the directive that produced the diagnostic, if any.
    #[must_use]
    pub fn selector(&self) -> Option<&str> {
        match self {
            Self::UnknownLevel { selector, .. } | Self::EmptyLevel { selector } => Some(selector),
            Self::EmptySelector { .. } => None,
        }
    }
}
