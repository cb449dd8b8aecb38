//! Logging initialization using `tracing` and `tracing-subscriber`.
//!
//! Filtering follows [`EnvFilter`] (`RUST_LOG`), the output is picked with [`LogFormat`].

use std::io;
use std::str::FromStr;

use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

/// Log output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, single-line logs.
    Full,

    /// A variant of the full format, optimized for short line lengths (default in release builds).
    Compact,

    /// Without timestamps, targets or ANSI colors.
    Bare,

    /// Multi-line logs for local debugging (default in debug builds).
    Pretty,

    /// Newline-delimited JSON.
    Json,
}

impl LogFormat {
    /// Installs the global subscriber. Log lines go to stderr, reports go to stdout.
    pub fn init(self, env_filter: EnvFilter) {
        let builder = tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_span_events(FmtSpan::NONE)
            .with_env_filter(env_filter);
        let dispatch = match self {
            Self::Full => builder.finish().into(),
            Self::Compact => builder.compact().finish().into(),
            Self::Pretty => builder.pretty().finish().into(),
            Self::Bare => builder
                .compact()
                .without_time()
                .with_target(false)
                .with_ansi(false)
                .finish()
                .into(),
            Self::Json => builder.json().finish().into(),
        };
        // not `SubscriberInitExt::init()`, which would install its own `LogTracer`
        if tracing::dispatcher::set_global_default(dispatch).is_err() {
            eprintln!("Warning: a global tracing subscriber is already set");
        }
    }
}

impl Default for LogFormat {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Compact
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "compact" => Ok(Self::Compact),
            "pretty" | "verbose" => Ok(Self::Pretty),
            "bare" => Ok(Self::Bare),
            "json" | "jsonl" => Ok(Self::Json),
            _ => Err(format!(
                "Invalid log format '{s}'. Valid options: json, full, compact, bare or pretty"
            )),
        }
    }
}

fn log_level(level: Level) -> log::LevelFilter {
    match level {
        Level::TRACE => log::LevelFilter::Trace,
        Level::DEBUG => log::LevelFilter::Debug,
        Level::INFO => log::LevelFilter::Info,
        Level::WARN => log::LevelFilter::Warn,
        Level::ERROR => log::LevelFilter::Error,
    }
}

/// Forwards `log` records of dependencies into `tracing`.
fn init_log_bridge(env_filter: &EnvFilter) {
    let mut log_builder = tracing_log::LogTracer::builder()
        .with_interest_cache(tracing_log::InterestCacheConfig::default());
    if let Some(Some(max_level)) = env_filter.max_level_hint().map(LevelFilter::into_level) {
        log_builder = log_builder.with_max_level(log_level(max_level));
    }
    if log_builder.init().is_err() {
        eprintln!("Warning: the log -> tracing bridge is already set");
    }
}

/// Initializes the global tracing subscriber for the given filter and format.
///
/// An invalid filter falls back to `debug`, an invalid format to [`LogFormat::default`].
pub fn init_tracing(filter: &str, format: Option<String>) {
    let env_filter = EnvFilter::from_str(filter).unwrap_or_else(|_| {
        eprintln!("Warning: Invalid filter string '{filter}' passed, falling back to debug");
        EnvFilter::new("debug")
    });

    let log_format = format
        .and_then(|s| {
            s.parse::<LogFormat>()
                .map_err(|e| {
                    eprintln!("Warning: {e}");
                    eprintln!("Falling back to default format ({:?})", LogFormat::default());
                })
                .ok()
        })
        .unwrap_or_default();

    init_log_bridge(&env_filter);
    log_format.init(env_filter);
}

/// Mirrors the level given to `replacement` (e.g. `geostore=`) onto `geostore_core`,
/// unless `geostore_core` has its own directive.
#[must_use]
pub fn ensure_core_log_level_matches(env_filter: Option<String>, replacement: &'static str) -> String {
    let Some(rust_log) = env_filter else {
        return format!("{replacement}info,geostore_core=info");
    };
    if rust_log.contains("geostore_core=") {
        return rust_log;
    }
    match rust_log
        .split(',')
        .find_map(|s| s.strip_prefix(replacement))
    {
        Some(level) => format!("{rust_log},geostore_core={level}"),
        None => rust_log,
    }
}
