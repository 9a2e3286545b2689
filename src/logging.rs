use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILE: &str = "bugwatch.log";

/// Filter used when `RUST_LOG` is unset: our own events at info (or debug),
/// dependencies only when they warn.
fn default_directives(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!("warn,bugwatch={}", level)
}

/// Split a log path into the rotation directory and file name prefix.
fn rotation_target(log_path: &Path) -> (PathBuf, PathBuf) {
    let dir = match log_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file = log_path
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));
    (dir, file)
}

/// Initialize the logging system
///
/// Human-readable events go to stderr. With `log_file`, the same events are
/// also written as JSON lines to a daily-rotated file. Keep the returned
/// guard alive until the process exits so buffered lines are flushed.
pub fn init(verbose: bool, log_file: Option<PathBuf>) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer);

    let Some(log_path) = log_file else {
        subscriber.init();
        return None;
    };

    let (dir, file) = rotation_target(&log_path);
    let _ = std::fs::create_dir_all(&dir);
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, file));

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .json();

    subscriber.with(file_layer).init();
    Some(guard)
}
