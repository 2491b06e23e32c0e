//! tcp-oneshot: a one-shot TCP request/reply demo pair.
//!
//! Two binaries share this crate:
//! - `oneshot-listener` accepts a single connection, answers a single
//!   request with a fixed token, and exits.
//! - `oneshot-connector` sends the fixed request, waits up to a bounded
//!   timeout for the reply, reports the outcome, and exits.
//!
//! Features:
//! - Fixed wire tokens (`ABCD` / `CDEF` / `ERROR`), no framing
//! - Bounded readiness poll on the connector side
//! - Optional reset-on-close (linger-0) on the listener side
//! - Configuration via CLI arguments or TOML file

pub mod config;
pub mod connector;
pub mod listener;
pub mod logging;
pub mod protocol;
