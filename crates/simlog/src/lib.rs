#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `simlog` implements per-component logging configuration for simulation
//! programs. Every source module registers a named [`LogComponent`] that
//! carries its own bitfield of enabled severities and display prefixes. A
//! compact configuration string, usually taken from the `SIMLOG` environment
//! variable, selects what each component prints, and a pair of replaceable
//! printers decorates output with the current simulation time and the
//! node or context that produced it.
//!
//! # Design
//!
//! - [`LogLevel`] is the shared bit vocabulary. Severity classes occupy the
//!   low bits and the four prefix flags the top nibble; every `LEVEL_*`
//!   constant also contains the more severe classes.
//! - [`LogRegistry`] owns the components in registration order, the active
//!   [`LogConfig`] and the [`PrefixHooks`]. Configuration applies both to
//!   components already registered and to later registrations.
//! - [`global`] keeps one process-wide default registry, shared by every
//!   thread, for code that prefers free functions over passing a registry
//!   around.
//! - [`decorate`] renders the prefixes in a fixed order and
//!   [`ParameterJoiner`] formats function argument lists.
//! - With the default `tracing` feature, `ComponentLayer` routes events from
//!   the standard tracing macros through the same filtering and writes the
//!   accepted lines to standard error or a chosen writer.
//!
//! # Invariants
//!
//! - Component names are unique within a registry; a second registration is
//!   rejected with [`RegistryError::DuplicateComponent`].
//! - A component never has a masked bit enabled.
//! - Configuration problems are reported through [`ConfigError`] values and
//!   never abort parsing; the rest of the string still applies.
//!
//! # Examples
//!
//! ```
//! use simlog::{LogConfig, LogLevel, LogRegistry, Severity};
//! use std::io::Write;
//!
//! let mut registry = LogRegistry::with_config(LogConfig::parse("*=warn|prefix_time|prefix_level"));
//! registry.register("Ipv4L3", LogLevel::NONE)?;
//! registry
//!     .hooks_mut()
//!     .set_time_printer(|out: &mut dyn Write| write!(out, "+1.25s"));
//!
//! let mut out = Vec::new();
//! registry.write_line("Ipv4L3", Severity::Warn, None, "no route", &mut out)?;
//! registry.write_line("Ipv4L3", Severity::Info, None, "forwarding", &mut out)?;
//! assert_eq!(String::from_utf8(out).unwrap(), "+1.25s [WARN] no route\n");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # See also
//!
//! - [`config`] for the configuration grammar.

mod component;
pub mod config;
pub mod decorate;
mod error;
pub mod global;
mod level;
mod params;
mod printer;
mod registry;
#[cfg(feature = "tracing")]
mod tracing_bridge;

pub use component::LogComponent;
pub use config::{
    Directive, LOG_ENV_VAR, LevelToken, LogConfig, PRINT_LIST_TOKEN, Selector, parse_level_token,
};
pub use error::{ConfigError, RegistryError};
pub use level::{LogLevel, Prefix, Severities, Severity, is_level_in_set};
pub use params::ParameterJoiner;
pub use printer::{PrefixHooks, PrefixPrinter};
pub use registry::LogRegistry;
#[cfg(feature = "tracing")]
pub use tracing_bridge::{ComponentLayer, init_tracing, init_tracing_with_filter};
