//! Logging setup.

use signal_config::LoggingConfig;
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_FILE_PREFIX: &str = "signal-desk.log";

/// Install the global subscriber.
///
/// Console output goes to stderr so stdout stays free for command output.
/// With `directory` set, JSON lines are also written to a daily rolling file;
/// keep the returned guard alive until exit so buffered lines are flushed.
pub fn setup_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (file_writer, guard) = match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };
    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(writer)
    });

    if config.is_json() {
        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }

    if let Some(directory) = &config.directory {
        debug!("Writing JSON logs to {}/{}.*", directory, LOG_FILE_PREFIX);
    }
    guard
}
