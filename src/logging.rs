use once_cell::sync::OnceCell;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

// Flushes the file writer when dropped, so it lives for the whole process.
static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/// Initialise logging. With `debug` the default level is `debug` and can be
/// overridden through `RUST_LOG`; otherwise `info` is forced.
/// When `file` is given, output is mirrored there through a background writer.
pub fn init(debug: bool, file: Option<PathBuf>) {
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let file_layer = file.and_then(|path| {
        let dir = path.parent().map(PathBuf::from).unwrap_or_default();
        let name = path.file_name()?.to_owned();
        let appender = tracing_appender::rolling::never(dir, name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        if FILE_GUARD.set(guard).is_err() {
            // Logging was already initialised with a file; keep the first one.
            return None;
        }
        Some(fmt::layer().with_writer(writer).with_ansi(false))
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init();
}
