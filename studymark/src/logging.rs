//! Log setup.
//!
//! The terminal belongs to the viewer, so logs go to a daily rolling file
//! under `<data dir>/logs`. Filtering follows `STUDYMARK_LOG` with the
//! usual `EnvFilter` syntax, e.g. `STUDYMARK_LOG=lesson_core=debug`.

use std::{fs, path::Path};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const FILTER_ENV: &str = "STUDYMARK_LOG";

/// Installs the global subscriber. Keep the guard alive until exit or
/// buffered lines are lost.
pub fn init(data_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    let logs_dir = data_dir.map(|dir| dir.join("logs"));
    let ready = match logs_dir.as_deref() {
        Some(dir) => match fs::create_dir_all(dir) {
            Ok(()) => true,
            Err(e) => {
                eprintln!("Warning: could not create log dir {}: {}", dir.display(), e);
                false
            }
        },
        None => false,
    };

    match logs_dir.filter(|_| ready) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "studymark.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true)
                .with_filter(filter);
            let _ = tracing_subscriber::registry().with(file_layer).try_init();
            Some(guard)
        }
        None => {
            // No file to write to: only warnings and errors, on stderr.
            let console_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_filter(EnvFilter::new("warn"));
            let _ = tracing_subscriber::registry().with(console_layer).try_init();
            None
        }
    }
}
