//! Tracing subscriber setup.
//!
//! Console output is always enabled. When `LOG_PATH` is set, the same events
//! are also written to `<LOG_PATH>/url_shortener.log.<YYYY-MM-DD>` through a
//! non-blocking writer that drops lines rather than stall a request when its
//! buffer is full.

use anyhow::{Context, Result};
use tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::config::Config;

const LOG_FILE_PREFIX: &str = "url_shortener.log";

/// Installs the global subscriber.
///
/// The returned guard flushes the file writer on drop, so keep it alive
/// until the process exits.
///
/// # Errors
///
/// Returns an error if `RUST_LOG` does not parse, the log directory cannot
/// be created, or a subscriber is already installed.
pub fn init(config: &Config) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(&config.log_level)
        .with_context(|| format!("Invalid RUST_LOG directive '{}'", config.log_level))?;
    let json = config.log_format == "json";

    let console = if json {
        fmt::layer().json().boxed()
    } else {
        fmt::layer().boxed()
    };

    let (file, guard) = match &config.log_path {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory '{dir}'"))?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = NonBlockingBuilder::default()
                .lossy(true)
                .finish(appender);

            let layer = if json {
                fmt::layer().json().with_writer(writer).boxed()
            } else {
                fmt::layer().with_ansi(false).with_writer(writer).boxed()
            };
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .context("Logging already configured")?;

    Ok(guard)
}
