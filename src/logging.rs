use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Initialise logging.
///
/// The launcher must not add output of its own to the child's console, so
/// nothing is installed unless a log file is given or `debug` is set. With a
/// file the default level is `info`; `debug` raises it and lets `RUST_LOG`
/// override it. `debug` without a file logs to stderr.
pub fn init(debug: bool, file: Option<PathBuf>) {
    if file.is_none() && !debug {
        return;
    }

    let level = if debug { "debug" } else { "info" };
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    match file.and_then(|path| file_appender(&path)) {
        Some(appender) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(appender)
                .try_init();
        }
        None if debug => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init();
        }
        None => {}
    }
}

fn file_appender(path: &std::path::Path) -> Option<RollingFileAppender> {
    let name = path.file_name()?.to_string_lossy().into_owned();
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(dir)
        .ok()
}
