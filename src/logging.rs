//! File logging for moodtune
//!
//! The TUI owns the terminal, so every event goes to `<log_dir>/moodtune.<date>.log`.
//! `RUST_LOG` replaces the default filter when set.

use std::path::Path;

use anyhow::Context;
use tracing::Subscriber;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

const LOG_FILE_PREFIX: &str = "moodtune";
const LOG_FILE_SUFFIX: &str = "log";

/// Session events at debug, dependencies at warn
pub const DEFAULT_FILTER: &str = "moodtune=debug,warn";

/// Install the global file subscriber.
///
/// Buffered lines are flushed when the returned guard drops, so `main` keeps it until exit.
pub fn init_logging(log_dir: &Path) -> anyhow::Result<WorkerGuard> {
    let (writer, guard) = file_writer(log_dir)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer(writer))
        .try_init()?;

    tracing::info!(dir = %log_dir.display(), "Logging initialized");
    Ok(guard)
}

/// Daily-rotated appender behind a background writer thread
fn file_writer(log_dir: &Path) -> anyhow::Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Unable to create log directory {}", log_dir.display()))?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .build(log_dir)
        .context("Unable to open log file")?;
    Ok(tracing_appender::non_blocking(appender))
}

fn file_layer<S>(writer: NonBlocking) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
}

/// Log a catalog API request with additional context
#[macro_export]
macro_rules! log_api_request {
    ($operation:expr, $($field:tt)*) => {
        tracing::debug!(operation = $operation, $($field)*, "API request started");
    };
}
