//! Tracing setup: rolling log file plus, in text mode, a colored stdout copy

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::AppConfig;

/// Crates that are noisy at the service level: sqlx logs every statement
/// at info, hyper every connection at debug
const QUIET_TARGETS: &[&str] = &["sqlx=warn", "hyper=info", "tower=info"];

fn rotation(name: &str) -> Option<Rotation> {
    match name {
        "minutely" => Some(Rotation::MINUTELY),
        "hourly" => Some(Rotation::HOURLY),
        "daily" => Some(Rotation::DAILY),
        "never" => Some(Rotation::NEVER),
        _ => None,
    }
}

/// `<level>` followed by the per-crate overrides
fn filter_directives(level: &str) -> String {
    std::iter::once(level)
        .chain(QUIET_TARGETS.iter().copied())
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
/// Keep the guard alive for the whole process or buffered file output is lost.
pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    let known_rotation = rotation(&config.rotation);
    let file_appender = RollingFileAppender::new(
        known_rotation.clone().unwrap_or(Rotation::NEVER),
        &config.log_dir,
        &config.log_file,
    );
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(&config.log_level)));
    let registry = tracing_subscriber::registry().with(filter);

    if config.use_json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(writer)
                    .with_ansi(false),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(writer)
                    .with_ansi(false),
            )
            .with(fmt::layer().with_target(false))
            .init();
    }

    if known_rotation.is_none() {
        tracing::warn!(rotation = %config.rotation, "Unknown log rotation, not rotating");
    }
    guard
}
