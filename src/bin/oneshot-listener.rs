//! One-shot listener binary: bind, accept one connection, answer one
//! request, exit.
//!
//! Exit code is zero for any completed exchange, including an empty
//! request; only setup failures (bind, listen, accept, bad config) are
//! fatal.

use std::process::ExitCode;
use tcp_oneshot::config::ListenerConfig;
use tcp_oneshot::listener::Listener;
use tcp_oneshot::logging;
use tracing::error;

fn main() -> ExitCode {
    let config = match ListenerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init(&config.log_level, config.debug);

    match serve(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Listener failed");
            ExitCode::FAILURE
        }
    }
}

fn serve(config: &ListenerConfig) -> std::io::Result<()> {
    let listener = Listener::bind(config)?;
    let _outcome = listener.serve_once()?;
    Ok(())
}
