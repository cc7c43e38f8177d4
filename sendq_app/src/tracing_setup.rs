use std::io;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Initialise tracing with a non-blocking hourly file appender
///
/// With `with_stdout` a second ANSI-coloured layer mirrors the log to
/// the terminal. Respects `RUST_LOG`, falling back to `default_level`.
/// The returned guard must be held for the lifetime of the process or
/// buffered log lines are lost on exit.
pub fn init(app_name: &str, log_dir: &str, default_level: Level, with_stdout: bool) -> WorkerGuard {
    let _ = std::fs::create_dir_all(log_dir);

    let file_appender = tracing_appender::rolling::hourly(log_dir, format!("{app_name}.log"));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::builder().with_default_directive(default_level.into()).from_env_lossy();

    let file_layer =
        fmt::layer().with_writer(non_blocking).with_target(true).with_line_number(true).with_ansi(false).compact();

    let stdout_layer = with_stdout.then(|| fmt::layer().with_writer(io::stdout).with_target(true).with_ansi(true).compact());

    tracing_subscriber::registry().with(env_filter).with(file_layer).with(stdout_layer).init();

    guard
}
