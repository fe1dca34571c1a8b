use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global `tracing` subscriber.
///
/// The level comes from `RUST_LOG` (default `info`), for example
/// `RUST_LOG=stitchlog=debug` to see normalization drops and duplicate
/// detections. `STITCHLOG_DEBUG` alone raises the default to `debug`.
pub fn init() {
    let default_level = if std::env::var(crate::libs::messages::macros::DEBUG_ENV).is_ok() {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Verbose subscriber bound to the test harness output.
pub fn init_test() {
    let _ = fmt().with_env_filter(EnvFilter::new("debug")).with_test_writer().try_init();
}
