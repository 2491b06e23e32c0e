//! One-shot TCP listener.
//!
//! Binds a port, accepts exactly one connection, performs a single
//! read/reply cycle, and closes both sockets. There is no accept loop:
//! after the one exchange (or an empty request) the listener is done.

use crate::config::ListenerConfig;
use crate::protocol::{self, Reply};
use socket2::{Domain, Protocol as SockProtocol, SockRef, Socket, Type};
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Read buffer size; requests are at most a few bytes.
const BUFFER_SIZE: usize = 1024;

/// Listen backlog. One pending connection is all this server will ever take.
const BACKLOG: i32 = 3;

/// What happened on the single accepted connection.
#[derive(Debug)]
pub enum ServeOutcome {
    /// A non-empty request was read and answered.
    Replied { request: Vec<u8>, reply: Reply },
    /// The peer sent nothing (or the read failed); no reply was sent.
    EmptyRequest,
}

/// A bound, listening socket ready to serve exactly one connection.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
    reset_on_close: bool,
}

impl Listener {
    /// Bind and listen on the configured address.
    ///
    /// `SO_REUSEADDR` is set so a rerun does not trip over a socket still
    /// in TIME_WAIT from the previous exchange.
    pub fn bind(config: &ListenerConfig) -> io::Result<Listener> {
        let addr: SocketAddr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let socket = Socket::new(
            match addr {
                SocketAddr::V4(_) => Domain::IPV4,
                SocketAddr::V6(_) => Domain::IPV6,
            },
            Type::STREAM,
            Some(SockProtocol::TCP),
        )?;

        socket.set_reuse_address(true)?;
        socket.bind(&addr.into())?;
        socket.listen(BACKLOG)?;

        let listener: TcpListener = socket.into();
        info!(addr = %addr, "Listening");

        Ok(Listener {
            inner: listener,
            reset_on_close: config.reset,
        })
    }

    /// The address the listener actually bound (resolves port 0).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }

    /// Accept one connection, answer one request, close everything.
    ///
    /// Consumes the listener: when this returns, the accepted connection
    /// and the listening socket are both closed. Only the accept itself
    /// can fail fatally; read and write problems on the accepted
    /// connection are logged and folded into the outcome.
    pub fn serve_once(self) -> io::Result<ServeOutcome> {
        let (mut stream, peer) = self.inner.accept()?;
        info!(peer = %peer, "Client connected");

        let mut buf = [0u8; BUFFER_SIZE];
        let n = match stream.read(&mut buf) {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "Read failed, closing without reply");
                0
            }
        };

        let outcome = if n == 0 {
            info!("No request received, closing without reply");
            ServeOutcome::EmptyRequest
        } else {
            let request = &buf[..n];
            info!(request = %String::from_utf8_lossy(request), bytes = n, "Request received");

            let reply = protocol::reply_for(request);
            match stream.write(reply.as_bytes()) {
                Ok(sent) => {
                    info!(reply = %reply, bytes = sent, "Reply sent");
                }
                Err(e) => {
                    warn!(error = %e, "Failed to send reply");
                }
            }

            ServeOutcome::Replied {
                request: request.to_vec(),
                reply,
            }
        };

        self.close_connection(stream);
        // Listening socket closes when `self.inner` drops on return.
        Ok(outcome)
    }

    /// Close the accepted connection, abruptly if reset-on-close is set.
    ///
    /// Linger with a zero timeout makes the close send an RST instead of
    /// the orderly FIN handshake.
    fn close_connection(&self, stream: TcpStream) {
        if self.reset_on_close {
            match SockRef::from(&stream).set_linger(Some(Duration::from_secs(0))) {
                Ok(()) => info!("Forcing reset on close"),
                Err(e) => warn!(error = %e, "Failed to set linger, closing normally"),
            }
        }
        debug!("Closing accepted connection");
        drop(stream);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(reset: bool) -> ListenerConfig {
        ListenerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            reset,
            debug: false,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_bind_ephemeral_port() {
        let listener = Listener::bind(&test_config(false)).unwrap();
        let addr = listener.local_addr().unwrap();
        assert_ne!(addr.port(), 0);
        assert!(addr.ip().is_loopback());
    }

    #[test]
    fn test_bind_rejects_bad_host() {
        let config = ListenerConfig {
            host: "not-an-address".to_string(),
            ..test_config(false)
        };
        let err = Listener::bind(&config).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
