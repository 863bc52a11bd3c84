//! Tracing setup for the command line front end
//!
//! Events go to a log file in the temp directory that is only created once
//! something is logged. The level comes from `ASSIGNMENT_EDITOR_LOG` and can
//! be changed at runtime.

mod file_writer;

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use strum::{Display, EnumIter};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, Registry};

use file_writer::LazyLogFile;

use crate::constants::{ENV_LOG_LEVEL, TRACE_LOG_FILENAME};

static CURRENT_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Warn.as_u8());

/// Targets of the HTTP stack whose connection chatter is filtered out
const NOISY_TARGETS: &[&str] = &["reqwest::", "hyper", "h2::", "rustls::", "want::"];

/// Filter layer driven by [`CURRENT_LEVEL`]
#[derive(Clone, Copy)]
struct LevelFilter;

impl<S> Layer<S> for LevelFilter
where
    S: Subscriber,
{
    fn enabled(&self, metadata: &tracing::Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        let target = metadata.target();
        if NOISY_TARGETS.iter().any(|noisy| target.starts_with(noisy)) {
            return false;
        }
        LogLevel::from(*metadata.level()).as_u8() <= CURRENT_LEVEL.load(Ordering::Relaxed)
    }
}

/// Verbosity of the trace log
#[derive(Display, EnumIter, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[strum(serialize_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Errors and warnings
    Warn,
    /// Progress messages
    Info,
    /// Request details
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    const fn as_u8(self) -> u8 {
        match self {
            Self::Error => 0,
            Self::Warn => 1,
            Self::Info => 2,
            Self::Debug => 3,
            Self::Trace => 4,
        }
    }

    /// Level named by `ASSIGNMENT_EDITOR_LOG`, `warn` when unset or invalid
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var(ENV_LOG_LEVEL)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(Self::Warn)
    }

    /// Level currently in effect
    #[must_use]
    pub fn current() -> Self {
        match CURRENT_LEVEL.load(Ordering::Relaxed) {
            0 => Self::Error,
            2 => Self::Info,
            3 => Self::Debug,
            4 => Self::Trace,
            _ => Self::Warn,
        }
    }

    /// Change the level at runtime
    pub fn set_current(self) {
        CURRENT_LEVEL.store(self.as_u8(), Ordering::Relaxed);
    }

    /// Path of the trace log file
    #[must_use]
    pub fn trace_log_path() -> PathBuf {
        std::env::temp_dir().join(TRACE_LOG_FILENAME)
    }

    /// Install the global subscriber writing to [`Self::trace_log_path`]
    ///
    /// Does nothing if a global subscriber is already set.
    pub fn init_file_tracing(self) {
        self.set_current();

        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(LazyLogFile::new(Self::trace_log_path()))
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true);

        let _ = Registry::default()
            .with(LevelFilter)
            .with(file_layer)
            .try_init();
    }
}

impl From<Level> for LogLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::ERROR => Self::Error,
            Level::WARN => Self::Warn,
            Level::INFO => Self::Info,
            Level::DEBUG => Self::Debug,
            Level::TRACE => Self::Trace,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(format!(
                "Invalid log level '{s}'. Valid levels are: error, warn, info, debug, trace"
            )),
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "tests fail by panicking"
)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_level_names_round_trip_through_display() {
        for level in LogLevel::iter() {
            assert_eq!(level.to_string().parse::<LogLevel>(), Ok(level));
        }
        assert_eq!(" DEBUG ".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_levels_are_ordered_by_verbosity() {
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Debug < LogLevel::Trace);
        assert_eq!(LogLevel::from(Level::INFO), LogLevel::Info);
    }
}
