//! Client-facing transport layer
//!
//! Clients connect over TCP and speak a line protocol: one command per
//! line in, one JSON reply per line out. Decoded panel events are
//! broadcast to every connected client as JSON lines.

mod hub;
mod tcp_receiver;

pub use hub::ClientHub;
pub use tcp_receiver::TcpReceiver;

/// Opaque per-connection token. Correlates poll registrations, command
/// origins and reply delivery; its lifetime is the transport connection.
pub type SessionId = u64;
