//! Stratus Logging
//!
//! Installs a `tracing` subscriber configured from the environment. Every
//! Stratus crate logs through `tracing`; this crate only decides where the
//! events go and how they look.
//!
//! # Usage
//!
//! ```rust,no_run
//! stratus_log::init();
//!
//! tracing::info!(region = "us-east-1", "provider configured");
//! ```
//!
//! # Environment Variables
//!
//! - `STRATUS_DEBUG=1` - Enable debug logging
//! - `STRATUS_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `STRATUS_LOG_FORMAT=pretty|json|compact` - Set output format
//! - `STRATUS_LOG_COLOR=1|0` - Enable/disable colors
//! - `RUST_LOG` - Full filter directives; takes precedence over the level

use once_cell::sync::Lazy;
use std::env;
use std::fmt;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;

// ============================================================================
// Log Levels
// ============================================================================

/// Minimum level of emitted events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Trace level (most verbose)
    Trace,
    Debug,
    Info,
    Warn,
    /// Error level (least verbose)
    Error,
    /// Off (no logging)
    Off,
}

impl Level {
    /// Parse a level name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(Level::Trace),
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" | "warning" => Some(Level::Warn),
            "error" => Some(Level::Error),
            "off" | "none" => Some(Level::Off),
            _ => None,
        }
    }

    /// Filter directive for this level.
    pub fn as_directive(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Off => "off",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_directive().to_uppercase())
    }
}

// ============================================================================
// Log Format
// ============================================================================

/// Output format for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Multi-line human readable output
    Pretty,
    /// Compact single-line format
    Compact,
    /// JSON format for structured logging
    Json,
}

impl Format {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Some(Format::Pretty),
            "compact" => Some(Format::Compact),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

static CONFIG: Lazy<LogConfig> = Lazy::new(LogConfig::from_env);

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Whether debug mode is enabled
    pub debug: bool,
    /// Minimum log level
    pub level: Level,
    /// Output format
    pub format: Format,
    /// Whether colors are enabled
    pub color: bool,
    /// Whether to include the event target
    pub target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: Level::Info,
            format: Format::Json,
            color: false, // JSON output doesn't use colors
            target: true,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |key: &str| lookup(key).map(|v| v == "1" || v.eq_ignore_ascii_case("true"));

        let debug = flag("STRATUS_DEBUG").unwrap_or(false);

        let level = lookup("STRATUS_LOG_LEVEL")
            .and_then(|s| Level::parse(&s))
            .unwrap_or(if debug { Level::Debug } else { Level::Info });

        let format = lookup("STRATUS_LOG_FORMAT")
            .and_then(|s| Format::parse(&s))
            .unwrap_or(Format::Json);

        let color = flag("STRATUS_LOG_COLOR")
            .unwrap_or_else(|| lookup("NO_COLOR").is_none() && lookup("TERM").is_some());

        let target = flag("STRATUS_LOG_TARGET").unwrap_or(true);

        Self {
            debug,
            level,
            format,
            color,
            target,
        }
    }

    /// Filter for this configuration. `RUST_LOG` wins when it is set and valid.
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.level.as_directive()))
    }
}

/// The configuration read from the environment on first use.
pub fn config() -> &'static LogConfig {
    &CONFIG
}

// ============================================================================
// Subscriber
// ============================================================================

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum LogError {
    /// A global subscriber is already installed.
    #[error("failed to install tracing subscriber: {0}")]
    Init(#[from] TryInitError),
}

type BoxedLayer = Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>;

fn fmt_layer(config: &LogConfig) -> BoxedLayer {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.target);

    match config.format {
        Format::Pretty => layer.pretty().with_ansi(config.color).boxed(),
        Format::Compact => layer.compact().with_ansi(config.color).boxed(),
        #[cfg(feature = "json")]
        Format::Json => layer.json().with_ansi(false).boxed(),
        #[cfg(not(feature = "json"))]
        Format::Json => layer.compact().with_ansi(false).boxed(),
    }
}

/// Build a subscriber for `config`.
pub fn subscriber(config: &LogConfig) -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::registry()
        .with(fmt_layer(config))
        .with(config.filter())
}

/// Install the subscriber for the environment configuration.
pub fn try_init() -> Result<(), LogError> {
    subscriber(config()).try_init()?;
    Ok(())
}

/// Install the subscriber, ignoring an already-installed global subscriber.
pub fn init() {
    let _ = try_init();
}
