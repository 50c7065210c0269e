use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// given level.
/// - `level`:  default filter, e.g. `info` or `dlog_bench=debug`
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let stdout_layer = fmt::layer().with_target(false).with_ansi(true);
    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .init();
}
