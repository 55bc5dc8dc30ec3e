use std::io::stderr;

use tracing::Level;
use tracing_subscriber::fmt;

/// Log to stderr, keeping stdout for the report.
pub fn setup_logging(level: Level, json: bool) {
    let builder = fmt()
        .with_writer(stderr)
        .with_max_level(level)
        .with_target(false);

    if json {
        builder
            .json()
            .with_timer(fmt::time())
            .with_current_span(false)
            .with_span_list(false)
            .init()
    } else {
        builder.init()
    }
}
