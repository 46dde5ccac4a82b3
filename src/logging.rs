use std::fs;
use std::path::Path;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes console logging, plus a daily-rotated JSON log file when `log_dir` is given.
///
/// Production runs log JSON to the console as well.
pub fn init_logging(log_dir: Option<&Path>, production: bool) {
    // Respect RUST_LOG if set; otherwise info for our crate
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vendor_enrich=info,warn"));

    let console_layer = if production {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_target(true).with_writer(std::io::stderr).boxed()
    };

    let file_layer = log_dir.map(|dir| {
        let _ = fs::create_dir_all(dir);
        let file_appender = tracing_appender::rolling::daily(dir, "vendor_enrich.log");
        let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);
        // Keep the guard alive for the life of the process so logs are flushed on exit
        std::mem::forget(guard);
        fmt::layer().json().with_writer(non_blocking_writer)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();
}
