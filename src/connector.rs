//! One-shot TCP connector.
//!
//! Connects, sends the fixed request token, then waits for the socket to
//! become readable with a bounded poll before performing a single read.
//! Readiness-based model: poll tells us when the socket is ready, then we
//! perform the read, so a silent server costs the timeout and nothing more.
//!
//! Every exchange outcome (reply, timeout, EOF, poll or read failure) is a
//! normal end state; only setup and connect failures are fatal.

use crate::config::ConnectorConfig;
use crate::protocol;
use mio::net::TcpStream as MioTcpStream;
use mio::{Events, Interest, Poll, Token};
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Read buffer size; replies are at most a few bytes.
const BUFFER_SIZE: usize = 1024;

const REPLY_TOKEN: Token = Token(0);

/// How the single exchange ended, after the connection was established.
#[derive(Debug)]
pub enum ExchangeOutcome {
    /// The peer answered; the raw reply bytes are reported as text.
    Replied(Vec<u8>),
    /// No readiness signal arrived within the timeout; nothing was read.
    TimedOut,
    /// The post-readiness read returned zero bytes (orderly EOF).
    PeerClosed,
    /// The readiness poll itself failed.
    WaitFailed(io::Error),
    /// The post-readiness read failed (e.g. connection reset).
    ReadFailed(io::Error),
}

/// Connect, send the request token once, and wait for the reply.
///
/// `Err` is reserved for the fatal setup class: address parsing, socket
/// creation, and connect. Everything after the connection is established
/// comes back as an [`ExchangeOutcome`].
pub fn exchange(config: &ConnectorConfig) -> io::Result<ExchangeOutcome> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let mut stream = TcpStream::connect(addr)?;
    info!(addr = %addr, "Connected");

    // Single write, no retry on partial write.
    match stream.write(protocol::REQUEST) {
        Ok(sent) => {
            info!(request = %String::from_utf8_lossy(protocol::REQUEST), bytes = sent, "Request sent");
        }
        Err(e) => {
            warn!(error = %e, "Failed to send request");
        }
    }

    let timeout = Duration::from_secs(config.timeout_secs);
    let outcome = wait_for_reply(stream, timeout);
    report(&outcome, config.timeout_secs);
    Ok(outcome)
}

/// Bounded readiness wait followed by exactly one read.
///
/// The stream is handed to mio for the poll, so it is switched to
/// non-blocking first. The stream drops (closes) when this returns.
fn wait_for_reply(stream: TcpStream, timeout: Duration) -> ExchangeOutcome {
    if let Err(e) = stream.set_nonblocking(true) {
        return ExchangeOutcome::WaitFailed(e);
    }
    let mut stream = MioTcpStream::from_std(stream);

    let mut poll = match Poll::new() {
        Ok(poll) => poll,
        Err(e) => return ExchangeOutcome::WaitFailed(e),
    };
    if let Err(e) = poll
        .registry()
        .register(&mut stream, REPLY_TOKEN, Interest::READABLE)
    {
        return ExchangeOutcome::WaitFailed(e);
    }

    let mut events = Events::with_capacity(4);
    if let Err(e) = poll.poll(&mut events, Some(timeout)) {
        debug!(errno = e.raw_os_error(), "poll failed");
        return ExchangeOutcome::WaitFailed(e);
    }

    let ready = events.iter().count();
    debug!(ready, "poll returned");

    if ready == 0 {
        return ExchangeOutcome::TimedOut;
    }

    let mut buf = [0u8; BUFFER_SIZE];
    match stream.read(&mut buf) {
        Ok(0) => {
            debug!(bytes = 0, "read returned");
            ExchangeOutcome::PeerClosed
        }
        Ok(n) => {
            debug!(bytes = n, "read returned");
            ExchangeOutcome::Replied(buf[..n].to_vec())
        }
        Err(e) => {
            debug!(errno = e.raw_os_error(), "read failed");
            ExchangeOutcome::ReadFailed(e)
        }
    }
}

fn report(outcome: &ExchangeOutcome, timeout_secs: u64) {
    match outcome {
        ExchangeOutcome::Replied(bytes) => {
            info!(reply = %String::from_utf8_lossy(bytes), bytes = bytes.len(), "Reply received");
        }
        ExchangeOutcome::TimedOut => {
            info!(timeout_secs, "Timed out waiting for reply");
        }
        ExchangeOutcome::PeerClosed => {
            info!("Connection closed by peer (EOF)");
        }
        ExchangeOutcome::WaitFailed(e) => {
            warn!(error = %e, "Readiness wait failed");
        }
        ExchangeOutcome::ReadFailed(e) => {
            warn!(error = %e, "Read failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectorConfig;

    fn test_config(port: u16) -> ConnectorConfig {
        ConnectorConfig {
            host: "127.0.0.1".to_string(),
            port,
            timeout_secs: 1,
            debug: false,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_bad_host_is_fatal() {
        let config = ConnectorConfig {
            host: "not-an-address".to_string(),
            ..test_config(8080)
        };
        let err = exchange(&config).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_connect_refused_is_fatal() {
        // Grab a free port, then close it again so nothing is listening.
        let probe = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = probe.local_addr().unwrap().port();
        drop(probe);

        assert!(exchange(&test_config(port)).is_err());
    }
}
