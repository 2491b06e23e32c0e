//! Tracing setup shared by the two binaries.

use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

/// Millisecond wall-clock stamp used by debug runs, e.g. `[14:03:59.123]`.
const DEBUG_TIME_FORMAT: &str = "[%H:%M:%S%.3f]";

/// Initialize the global subscriber.
///
/// Plain runs log bare lines; debug runs prefix every event with a
/// millisecond timestamp and default the filter to `debug` so the raw
/// poll/read diagnostics show up. `RUST_LOG` overrides either.
pub fn init(log_level: &str, debug: bool) {
    let default_level = if debug { "debug" } else { log_level };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if debug {
        builder
            .with_timer(ChronoLocal::new(DEBUG_TIME_FORMAT.to_owned()))
            .init();
    } else {
        builder.without_time().init();
    }
}
