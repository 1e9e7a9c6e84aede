//! Logging setup.
//!
//! The library only emits `tracing` events; the binary installs the
//! subscriber.

use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber.
///
/// # Environment
/// - `RUST_LOG`: filter directives (default: `info`),
///   e.g. `RUST_LOG=debug` or `RUST_LOG=u_timetable::scheduler=trace`
///
/// # Example
/// ```no_run
/// u_timetable::logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();
}

