//! crates/simlog/src/config.rs
//! Parser for the `SIMLOG` configuration string.
//!
//! ```text
//! config      := directive (':' directive)*
//! directive   := selector ['=' levelList]
//! selector    := component-name | '*'
//! levelList   := levelToken ('|' levelToken)*
//! ```
//!
//! A bare selector enables every severity without prefixes. The `print-list`
//! pseudo-token requests a one-shot listing of the registered components and
//! is accepted either as a level token or as a directive of its own.

use std::env;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::level::LogLevel;

/// Environment variable consulted by [`LogConfig::from_env`].
pub const LOG_ENV_VAR: &str = "SIMLOG";

/// Pseudo-token requesting the component listing.
pub const PRINT_LIST_TOKEN: &str = "print-list";

const WILDCARD: &str = "*";

/// Component selector of a directive.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selector {
    /// `*`: every component, including ones registered later.
    All,
    /// Exact component name.
    Component(String),
}

impl Selector {
    /// Parses selector text, mapping `*` to [`Selector::All`].
    #[must_use]
    pub fn parse(text: &str) -> Self {
        if text == WILDCARD {
            Self::All
        } else {
            Self::Component(text.to_owned())
        }
    }

    /// Returns `true` when the selector applies to the component called `name`.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Component(component) => component == name,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(WILDCARD),
            Self::Component(name) => f.write_str(name),
        }
    }
}

/// One `selector=levels` entry of a configuration string.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Directive {
    selector: Selector,
    levels: LogLevel,
}

impl Directive {
    /// Creates a directive enabling `levels` on the components chosen by `selector`.
    #[must_use]
    pub const fn new(selector: Selector, levels: LogLevel) -> Self {
        Self { selector, levels }
    }

    /// Returns the component selector.
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Returns the levels the directive enables.
    #[must_use]
    pub const fn levels(&self) -> LogLevel {
        self.levels
    }

    /// Returns `true` when the directive applies to the component called `name`.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.selector.matches(name)
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.selector, self.levels)
    }
}

/// Meaning of a single level token.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LevelToken {
    /// Bits OR-ed into the directive's level set.
    Level(LogLevel),
    /// The `print-list` pseudo-token.
    PrintList,
}

/// Maps a level token to its meaning, or `None` when the token is unknown.
///
/// Severity tokens contribute the cumulative constant of their class, so
/// `warn` enables warnings and errors exactly like `level_warn`. `func` and
/// `prefix` are accepted as short forms of `function` and `prefix_all`.
#[must_use]
pub fn parse_level_token(token: &str) -> Option<LevelToken> {
    let level = match token {
        "error" | "level_error" => LogLevel::LEVEL_ERROR,
        "warn" | "level_warn" => LogLevel::LEVEL_WARN,
        "debug" | "level_debug" => LogLevel::LEVEL_DEBUG,
        "info" | "level_info" => LogLevel::LEVEL_INFO,
        "function" | "func" | "level_function" => LogLevel::LEVEL_FUNCTION,
        "logic" | "level_logic" => LogLevel::LEVEL_LOGIC,
        "all" | "level_all" => LogLevel::LEVEL_ALL,
        "prefix_func" => LogLevel::PREFIX_FUNC,
        "prefix_time" => LogLevel::PREFIX_TIME,
        "prefix_node" => LogLevel::PREFIX_NODE,
        "prefix_level" => LogLevel::PREFIX_LEVEL,
        "prefix_all" | "prefix" => LogLevel::PREFIX_ALL,
        PRINT_LIST_TOKEN => return Some(LevelToken::PrintList),
        _ => return None,
    };
    Some(LevelToken::Level(level))
}

/// Parsed configuration string.
///
/// Parsing is lenient: malformed directives are recorded in
/// [`errors`](Self::errors) and skipped while the rest of the string is still
/// honoured. Use [`str::parse`] for a strict parse that fails on the first
/// diagnostic.
///
/// # Examples
///
/// ```
/// use simlog::{LogConfig, LogLevel};
///
/// let config = LogConfig::parse("Comp1=warn|prefix_time:Comp2:*=error");
/// assert_eq!(
///     config.levels_for("Comp1"),
///     Some(LogLevel::LEVEL_WARN | LogLevel::PREFIX_TIME)
/// );
/// assert_eq!(config.levels_for("Comp2"), Some(LogLevel::LEVEL_ALL));
/// assert_eq!(config.levels_for("Other"), Some(LogLevel::LEVEL_ERROR));
/// assert!(config.errors().is_empty());
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LogConfig {
    directives: Vec<Directive>,
    print_list: bool,
    errors: Vec<ConfigError>,
}

impl LogConfig {
    /// Returns a configuration without directives.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration string, collecting diagnostics instead of failing.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut config = Self::default();

        for raw in text.split(':') {
            let directive = raw.trim();
            if directive.is_empty() {
                continue;
            }

            match parse_directive(directive, &mut config.print_list) {
                Ok(Some(parsed)) => config.directives.push(parsed),
                Ok(None) => {}
                Err(error) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(%error, directive, "ignoring log configuration directive");
                    config.errors.push(error);
                }
            }
        }

        config
    }

    /// Reads and parses [`LOG_ENV_VAR`].
    ///
    /// An unset or non-unicode variable yields an empty configuration.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_var(LOG_ENV_VAR)
    }

    /// Reads and parses the environment variable `key`.
    #[must_use]
    pub fn from_env_var(key: &str) -> Self {
        env::var(key).map_or_else(|_| Self::default(), |value| Self::parse(&value))
    }

    /// Appends a directive, as if it had been written at the end of the string.
    pub fn push(&mut self, directive: Directive) {
        self.directives.push(directive);
    }

    /// Returns the parsed directives in source order.
    #[must_use]
    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// Reports whether the string contained `print-list`.
    #[must_use]
    pub const fn print_list_requested(&self) -> bool {
        self.print_list
    }

    /// Returns the diagnostics collected while parsing.
    #[must_use]
    pub fn errors(&self) -> &[ConfigError] {
        &self.errors
    }

    /// Returns `true` when there is nothing to apply.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty() && !self.print_list
    }

    /// Returns the union of every directive matching `name`, or `None` when
    /// no directive names it.
    #[must_use]
    pub fn levels_for(&self, name: &str) -> Option<LogLevel> {
        self.directives
            .iter()
            .filter(|directive| directive.matches(name))
            .map(Directive::levels)
            .reduce(|acc, levels| acc | levels)
    }
}

impl FromStr for LogConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config = Self::parse(s);
        match config.errors.first() {
            Some(error) => Err(error.clone()),
            None => Ok(config),
        }
    }
}

/// Parses one non-empty directive. Returns `Ok(None)` for directives that
/// carry nothing but the `print-list` request.
fn parse_directive(text: &str, print_list: &mut bool) -> Result<Option<Directive>, ConfigError> {
    let (selector, level_list) = match text.split_once('=') {
        Some((selector, levels)) => (selector.trim(), Some(levels)),
        None if text == PRINT_LIST_TOKEN => {
            *print_list = true;
            return Ok(None);
        }
        None => (text, None),
    };

    if selector.is_empty() {
        return Err(ConfigError::EmptySelector {
            directive: text.to_owned(),
        });
    }

    let levels = match level_list {
        Some(list) => parse_level_list(selector, list, print_list)?,
        None => LogLevel::LEVEL_ALL,
    };

    if levels.is_empty() {
        return Ok(None);
    }

    Ok(Some(Directive::new(Selector::parse(selector), levels)))
}

/// Folds a `|`-separated token list. Every token is scanned even after an
/// error so a `print-list` request is never lost.
fn parse_level_list(
    selector: &str,
    list: &str,
    print_list: &mut bool,
) -> Result<LogLevel, ConfigError> {
    let mut levels = LogLevel::NONE;
    let mut first_error = None;

    for token in list.split('|').map(str::trim) {
        let outcome = if token.is_empty() {
            Err(ConfigError::EmptyLevel {
                selector: selector.to_owned(),
            })
        } else {
            parse_level_token(token).ok_or_else(|| ConfigError::UnknownLevel {
                selector: selector.to_owned(),
                token: token.to_owned(),
            })
        };

        match outcome {
            Ok(LevelToken::Level(bits)) => levels |= bits,
            Ok(LevelToken::PrintList) => *print_list = true,
            Err(error) => {
                first_error.get_or_insert(error);
            }
        }
    }

    match first_error {
        Some(error) => Err(error),
        None => Ok(levels),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_token() {
        assert_eq!(
            parse_level_token("warn"),
            Some(LevelToken::Level(LogLevel::LEVEL_WARN))
        );
        assert_eq!(
            parse_level_token("level_info"),
            Some(LevelToken::Level(LogLevel::LEVEL_INFO))
        );
        assert_eq!(
            parse_level_token("func"),
            Some(LevelToken::Level(LogLevel::LEVEL_FUNCTION))
        );
        assert_eq!(
            parse_level_token("prefix"),
            Some(LevelToken::Level(LogLevel::PREFIX_ALL))
        );
        assert_eq!(parse_level_token("print-list"), Some(LevelToken::PrintList));
        assert_eq!(parse_level_token("WARN"), None);
        assert_eq!(parse_level_token(""), None);
    }

    #[test]
    fn test_bare_selector_enables_all_levels_without_prefixes() {
        let config = LogConfig::parse("OlsrAgent");
        assert_eq!(config.directives().len(), 1);
        assert_eq!(config.levels_for("OlsrAgent"), Some(LogLevel::LEVEL_ALL));
        assert_eq!(
            config.levels_for("OlsrAgent").unwrap().prefix_bits(),
            LogLevel::NONE
        );
    }

    #[test]
    fn test_multiple_directives() {
        let config = LogConfig::parse("Comp1=warn|debug:Comp2=error");
        assert_eq!(config.levels_for("Comp1"), Some(LogLevel::LEVEL_DEBUG));
        assert_eq!(config.levels_for("Comp2"), Some(LogLevel::LEVEL_ERROR));
        assert_eq!(config.levels_for("Comp3"), None);
    }

    #[test]
    fn test_wildcard_matches_everything() {
        let config = LogConfig::parse("*=level_all|prefix_func");
        assert_eq!(config.directives()[0].selector(), &Selector::All);
        assert_eq!(
            config.levels_for("anything"),
            Some(LogLevel::ALL | LogLevel::PREFIX_FUNC)
        );
    }

    #[test]
    fn test_unknown_token_drops_only_its_directive() {
        let config = LogConfig::parse("A=warn|verbose:B=info");
        assert_eq!(config.levels_for("A"), None);
        assert_eq!(config.levels_for("B"), Some(LogLevel::LEVEL_INFO));
        assert_eq!(
            config.errors(),
            [ConfigError::UnknownLevel {
                selector: "A".to_owned(),
                token: "verbose".to_owned(),
            }]
        );
    }

    #[test]
    fn test_empty_pieces() {
        assert!(LogConfig::parse("").is_empty());
        assert!(LogConfig::parse("  ").is_empty());
        assert!(LogConfig::parse("::").is_empty());

        let config = LogConfig::parse("=warn:A=:B=warn||info");
        assert_eq!(config.directives().len(), 0);
        assert_eq!(config.errors().len(), 3);
        assert!(matches!(config.errors()[0], ConfigError::EmptySelector { .. }));
        assert!(matches!(config.errors()[1], ConfigError::EmptyLevel { .. }));
        assert!(matches!(config.errors()[2], ConfigError::EmptyLevel { .. }));
    }

    #[test]
    fn test_print_list_positions() {
        assert!(LogConfig::parse("print-list").print_list_requested());
        assert!(LogConfig::parse("A=warn|print-list").print_list_requested());
        assert!(LogConfig::parse("A=bogus|print-list").print_list_requested());
        assert!(!LogConfig::parse("A=warn").print_list_requested());

        let config = LogConfig::parse("A=print-list");
        assert!(config.directives().is_empty());
        assert!(!config.is_empty());
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let config = LogConfig::parse(" A = warn | prefix_time : B ");
        assert_eq!(
            config.levels_for("A"),
            Some(LogLevel::LEVEL_WARN | LogLevel::PREFIX_TIME)
        );
        assert_eq!(config.levels_for("B"), Some(LogLevel::LEVEL_ALL));
    }

    #[test]
    fn test_levels_for_unions_repeated_selectors() {
        let config = LogConfig::parse("A=error:*=prefix_level:A=logic");
        assert_eq!(
            config.levels_for("A"),
            Some(LogLevel::LEVEL_LOGIC | LogLevel::PREFIX_LEVEL)
        );
    }

    #[test]
    fn test_strict_parse() {
        assert!("A=warn:B".parse::<LogConfig>().is_ok());
        let error = "A=warn:B=loud".parse::<LogConfig>().unwrap_err();
        assert_eq!(error.selector(), Some("B"));
    }

    #[test]
    fn test_directive_display() {
        let config = LogConfig::parse("*=warn|prefix_node");
        assert_eq!(config.directives()[0].to_string(), "*=error|warn|prefix_node");
    }

    #[test]
    fn test_push_appends_directive() {
        let mut config = LogConfig::new();
        config.push(Directive::new(
            Selector::Component("A".to_owned()),
            LogLevel::INFO,
        ));
        assert_eq!(config.levels_for("A"), Some(LogLevel::INFO));
    }

    #[cfg(feature = "serde")]
    mod serde_tests {
        use super::*;

        #[test]
        fn test_directive_serde_roundtrip() {
            let directive = Directive::new(Selector::All, LogLevel::LEVEL_WARN);
            let json = serde_json::to_string(&directive).unwrap();
            let decoded: Directive = serde_json::from_str(&json).unwrap();
            assert_eq!(decoded, directive);
        }
    }
}
