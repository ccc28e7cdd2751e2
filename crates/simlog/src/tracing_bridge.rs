//! crates/simlog/src/tracing_bridge.rs
//! Bridge between the tracing crate and per-component log filtering.
//!
//! [`ComponentLayer`] lets code emit through the standard tracing macros while
//! the process-wide registry in [`global`](crate::global) decides what is kept.
//! The event target names the component, either exactly or through its last
//! `::` segment, so `target: "UdpEcho"` and `my_app::UdpEcho` both resolve to
//! the component `UdpEcho`. Accepted events are rendered with the component's
//! prefixes and written as one line to the layer's writer, standard error
//! unless [`ComponentLayer::with_writer`] chose another. The layer keeps no
//! record of what it wrote.
//!
//! Events raised on a thread that is already inside the registry are dropped.
//! This is what stops the facility's own diagnostics from re-entering it.
//!
//! # Usage
//!
//! ```
//! use simlog::{ComponentLayer, LogConfig, LogLevel, global};
//! use tracing_subscriber::layer::SubscriberExt;
//!
//! global::init(LogConfig::parse("UdpEcho=info|prefix_level"));
//! global::define_component("UdpEcho", LogLevel::NONE)?;
//!
//! let layer = ComponentLayer::new().with_writer(std::io::stdout);
//! let subscriber = tracing_subscriber::registry().with(layer);
//! tracing::subscriber::with_default(subscriber, || {
//!     tracing::info!(target: "UdpEcho", "echoed 64 bytes");
//!     tracing::debug!(target: "UdpEcho", "not written");
//! });
//! # Ok::<(), simlog::RegistryError>(())
//! ```

use std::fmt;
use std::io::{self, Write};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use crate::component::LogComponent;
use crate::decorate;
use crate::global::try_with_registry;
use crate::level::Severity;
use crate::registry::LogRegistry;

/// A tracing layer that filters events through the process-wide registry and
/// writes the accepted ones, one line each.
///
/// `W` creates the writer for every line, following
/// [`MakeWriter`]; the default writes to standard error.
pub struct ComponentLayer<W = fn() -> io::Stderr> {
    make_writer: W,
}

impl ComponentLayer {
    /// Creates a layer writing to standard error.
    #[must_use]
    pub fn new() -> Self {
        Self {
            make_writer: io::stderr,
        }
    }
}

impl Default for ComponentLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> ComponentLayer<W> {
    /// Replaces the writer, keeping the rest of the layer.
    ///
    /// Anything implementing [`MakeWriter`] fits, including
    /// `std::io::stdout` and closures returning a writer.
    #[must_use]
    pub fn with_writer<W2>(self, make_writer: W2) -> ComponentLayer<W2>
    where
        W2: for<'w> MakeWriter<'w> + 'static,
    {
        ComponentLayer { make_writer }
    }
}

/// Maps a tracing level to a severity.
const fn severity_for(level: &Level) -> Severity {
    match *level {
        Level::ERROR => Severity::Error,
        Level::WARN => Severity::Warn,
        Level::INFO => Severity::Info,
        Level::DEBUG => Severity::Debug,
        Level::TRACE => Severity::Logic,
    }
}

/// Finds the component named by `target`, trying the exact target first
/// and then its last path segment.
fn resolve<'r>(registry: &'r LogRegistry, target: &str) -> Option<&'r LogComponent> {
    registry.find(target).or_else(|| {
        target
            .rsplit_once("::")
            .and_then(|(_, last)| registry.find(last))
    })
}

/// Renders the decorated line, newline included, or `None` when the
/// event is filtered out.
fn render(
    registry: &LogRegistry,
    target: &str,
    severity: Severity,
    event: &Event<'_>,
) -> Option<Vec<u8>> {
    let component = resolve(registry, target)?;
    if !component.is_enabled(severity.bit()) {
        return None;
    }

    let mut visitor = MessageVisitor::default();
    event.record(&mut visitor);

    let mut line = Vec::new();
    decorate::write_prefix(
        component,
        registry.hooks(),
        severity,
        visitor.function.as_deref(),
        &mut line,
    )
    .ok()?;
    line.extend_from_slice(visitor.message.unwrap_or_default().as_bytes());
    line.push(b'\n');
    Some(line)
}

impl<W> fmt::Debug for ComponentLayer<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentLayer").finish_non_exhaustive()
    }
}

impl<S, W> Layer<S> for ComponentLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let severity = severity_for(metadata.level());

        let line = try_with_registry(|registry| {
            render(registry, metadata.target(), severity, event)
        })
        .flatten();

        // The registry lock is released before writing.
        if let Some(line) = line {
            let mut writer = self.make_writer.make_writer_for(metadata);
            // A failing log sink has nowhere to report to.
            let _ = writer.write_all(&line);
        }
    }
}

/// Extracts the `message` field and the optional `func` field naming the
/// calling function.
#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
    function: Option<String>,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = Some(format!("{value:?}")),
            "func" => self.function = Some(format!("{value:?}")),
            _ => {}
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = Some(value.to_owned()),
            "func" => self.function = Some(value.to_owned()),
            _ => {}
        }
    }
}

/// Installs a [`ComponentLayer`] writing to standard error as the global
/// default subscriber.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
pub fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(ComponentLayer::new())
        .init();
}

/// Installs a [`ComponentLayer`] writing to standard error behind an
/// additional filter layer.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
pub fn init_tracing_with_filter<F>(filter: F)
where
    F: Layer<tracing_subscriber::Registry> + Send + Sync + 'static,
{
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(filter)
        .with(ComponentLayer::new())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogConfig;
    use crate::global;
    use crate::level::LogLevel;
    use test_support::{EnvGuard, SharedBuffer};
    use tracing_subscriber::layer::SubscriberExt;

    fn with_layer(f: impl FnOnce()) -> SharedBuffer {
        let buffer = SharedBuffer::new();
        let sink = buffer.clone();
        let layer = ComponentLayer::new().with_writer(move || sink.clone());
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, f);
        buffer
    }

    /// Counts bytes without keeping them.
    #[derive(Clone, Default)]
    struct Counter(std::sync::Arc<std::sync::atomic::AtomicUsize>);

    impl Write for Counter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0
                .fetch_add(buf.len(), std::sync::atomic::Ordering::Relaxed);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_severity_for() {
        assert_eq!(severity_for(&Level::ERROR), Severity::Error);
        assert_eq!(severity_for(&Level::WARN), Severity::Warn);
        assert_eq!(severity_for(&Level::INFO), Severity::Info);
        assert_eq!(severity_for(&Level::DEBUG), Severity::Debug);
        assert_eq!(severity_for(&Level::TRACE), Severity::Logic);
    }

    #[test]
    fn test_resolve_exact_then_last_segment() {
        let mut registry = LogRegistry::new();
        registry.register("Router", LogLevel::NONE).unwrap();
        registry.register("net::Router", LogLevel::NONE).unwrap();

        assert_eq!(
            resolve(&registry, "net::Router").map(|c| c.name()),
            Some("net::Router")
        );
        assert_eq!(
            resolve(&registry, "app::sim::Router").map(|c| c.name()),
            Some("Router")
        );
        assert!(resolve(&registry, "Switch").is_none());
    }

    #[test]
    fn test_events_are_filtered_by_component() {
        let _guard = EnvGuard::new();
        global::init(LogConfig::parse("Queue=warn|prefix_level"));
        global::define_component("Queue", LogLevel::NONE).unwrap();

        let buffer = with_layer(|| {
            tracing::error!(target: "Queue", "overflow");
            tracing::warn!(target: "sim::Queue", "nearly full");
            tracing::info!(target: "Queue", "ignored");
            tracing::error!(target: "Unregistered", "ignored");
        });

        assert_eq!(
            buffer.contents(),
            "[ERROR] overflow\n[WARN] nearly full\n"
        );
    }

    #[test]
    fn test_prefixes_and_function_field() {
        let _guard = EnvGuard::new();
        global::init(LogConfig::parse("Tcp=logic|prefix_all"));
        global::define_component("Tcp", LogLevel::NONE).unwrap();
        global::set_time_printer(|out: &mut dyn Write| write!(out, "+3s"));

        let buffer = with_layer(|| {
            tracing::trace!(target: "Tcp", func = "Connect", "syn sent");
        });

        assert_eq!(buffer.lines(), ["+3s Tcp:Connect(): [LOGIC] syn sent"]);
    }

    #[test]
    fn test_lines_are_written_as_events_arrive() {
        let _guard = EnvGuard::new();
        global::init(LogConfig::parse("Hot=info"));
        global::define_component("Hot", LogLevel::NONE).unwrap();

        let buffer = SharedBuffer::new();
        let sink = buffer.clone();
        let layer = ComponentLayer::new().with_writer(move || sink.clone());
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "Hot", "first");
            assert_eq!(buffer.contents(), "first\n");
            tracing::info!(target: "Hot", "second");
            assert_eq!(buffer.contents(), "first\nsecond\n");
        });
    }

    #[test]
    fn test_high_volume_is_streamed_not_kept() {
        let _guard = EnvGuard::new();
        global::init(LogConfig::parse("Hot=info"));
        global::define_component("Hot", LogLevel::NONE).unwrap();

        let counter = Counter::default();
        let sink = counter.clone();
        let layer = ComponentLayer::new().with_writer(move || sink.clone());
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            for _ in 0..100_000 {
                tracing::info!(target: "Hot", "tick");
            }
        });

        // "tick\n" per event.
        assert_eq!(
            counter.0.load(std::sync::atomic::Ordering::Relaxed),
            5 * 100_000
        );
    }

    #[test]
    fn test_events_inside_the_registry_are_dropped() {
        let _guard = EnvGuard::new();
        global::init(LogConfig::parse("*"));
        global::define_component("Dup", LogLevel::NONE).unwrap();

        let buffer = with_layer(|| {
            // The duplicate warning fires while the registry lock is held.
            assert!(global::define_component("Dup", LogLevel::NONE).is_err());
            global::with_registry_mut(|_| {
                tracing::error!(target: "Dup", "dropped");
            });
        });

        assert!(buffer.is_empty());
    }

    #[test]
    fn test_default_layer_writes_to_stderr() {
        let layer: ComponentLayer = ComponentLayer::default();
        assert_eq!(format!("{layer:?}"), "ComponentLayer { .. }");
        let _stderr: io::Stderr = (layer.make_writer)();
    }
}
