//! One-shot connector binary: connect, send the request token, wait for
//! the reply, exit.
//!
//! Timeout, EOF, and read failures are reported but still exit zero;
//! only setup failures (address parse, connect, bad config) are fatal.

use std::process::ExitCode;
use tcp_oneshot::config::ConnectorConfig;
use tcp_oneshot::connector;
use tcp_oneshot::logging;
use tracing::error;

fn main() -> ExitCode {
    let config = match ConnectorConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init(&config.log_level, config.debug);

    match connector::exchange(&config) {
        Ok(_outcome) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Connector failed");
            ExitCode::FAILURE
        }
    }
}
