//! Wire tokens for the single request/reply exchange.
//!
//! The whole protocol is three fixed byte strings with no framing:
//! - Request: `ABCD` (connector to listener)
//! - Ack: `CDEF` (listener to connector, request matched)
//! - Error: `ERROR` (listener to connector, anything else)
//!
//! There is no terminator or length prefix; the token length itself is the
//! message boundary.

/// The only request the listener recognizes.
pub const REQUEST: &[u8] = b"ABCD";

/// Sent back when the request matched exactly.
pub const ACK: &[u8] = b"CDEF";

/// Sent back for any other non-empty request.
pub const REJECT: &[u8] = b"ERROR";

/// Reply chosen for a received request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Ack,
    Reject,
}

impl Reply {
    /// The exact bytes to put on the wire for this reply.
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            Reply::Ack => ACK,
            Reply::Reject => REJECT,
        }
    }
}

impl std::fmt::Display for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.as_bytes()))
    }
}

/// Pick the reply for a non-empty request.
///
/// Only an exact byte-for-byte match of the request token earns an `Ack`;
/// prefixes, suffixes, and case variants are all rejected.
pub fn reply_for(request: &[u8]) -> Reply {
    if request == REQUEST {
        Reply::Ack
    } else {
        Reply::Reject
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_request_is_acked() {
        assert_eq!(reply_for(b"ABCD"), Reply::Ack);
    }

    #[test]
    fn test_mismatch_is_rejected() {
        assert_eq!(reply_for(b"XYZ"), Reply::Reject);
        assert_eq!(reply_for(b"abcd"), Reply::Reject);
    }

    #[test]
    fn test_prefix_and_suffix_are_rejected() {
        assert_eq!(reply_for(b"ABC"), Reply::Reject);
        assert_eq!(reply_for(b"ABCDE"), Reply::Reject);
        assert_eq!(reply_for(b"ABCD\n"), Reply::Reject);
    }

    #[test]
    fn test_reply_bytes() {
        assert_eq!(Reply::Ack.as_bytes(), b"CDEF");
        assert_eq!(Reply::Reject.as_bytes(), b"ERROR");
        assert_eq!(Reply::Reject.as_bytes().len(), 5);
    }
}
