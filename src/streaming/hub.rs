//! Connected-client registry
//!
//! Tracks one writer per session for reply delivery and event broadcast.
//! Sessions are registered when a TCP client connects and cleared when its
//! receiver thread exits.

use super::SessionId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::Write;
use std::net::TcpStream;
use std::sync::atomic::{AtomicU64, Ordering};

pub struct ClientHub {
    clients: Mutex<HashMap<SessionId, TcpStream>>,
    next_id: AtomicU64,
}

impl Default for ClientHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientHub {
    pub fn new() -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a connected client; the stored stream is an independent
    /// writer handle for the same socket
    pub fn register(&self, stream: &TcpStream) -> std::io::Result<SessionId> {
        let writer = stream.try_clone()?;
        let session = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.clients.lock().insert(session, writer);
        log::info!("Client session {} connected", session);
        Ok(session)
    }

    pub fn unregister(&self, session: SessionId) {
        if self.clients.lock().remove(&session).is_some() {
            log::info!("Client session {} disconnected", session);
        }
    }

    pub fn client_count(&self) -> usize {
        self.clients.lock().len()
    }

    /// Send one line to a single session. Returns false when the session is
    /// gone or the write failed (the session is dropped then).
    pub fn send(&self, session: SessionId, text: &str) -> bool {
        let mut clients = self.clients.lock();
        let Some(stream) = clients.get_mut(&session) else {
            return false;
        };
        if let Err(e) = writeln!(stream, "{}", text) {
            log::warn!("Client session {}: write failed ({}), dropping", session, e);
            clients.remove(&session);
            return false;
        }
        true
    }

    /// Send one line to every connected session, dropping dead ones
    pub fn broadcast(&self, text: &str) {
        let mut clients = self.clients.lock();
        let mut dead = Vec::new();
        for (session, stream) in clients.iter_mut() {
            if let Err(e) = writeln!(stream, "{}", text) {
                log::warn!("Client session {}: write failed ({}), dropping", session, e);
                dead.push(*session);
            }
        }
        for session in dead {
            clients.remove(&session);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader};
    use std::net::TcpListener;

    fn socket_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        let (server, _) = listener.accept().unwrap();
        (client, server)
    }

    #[test]
    fn test_send_and_broadcast() {
        let hub = ClientHub::new();
        let (client_a, server_a) = socket_pair();
        let (client_b, server_b) = socket_pair();
        let a = hub.register(&server_a).unwrap();
        let _b = hub.register(&server_b).unwrap();
        assert_eq!(hub.client_count(), 2);

        assert!(hub.send(a, "hello"));
        let mut reader = BufReader::new(client_a);
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        assert_eq!(line.trim_end(), "hello");

        hub.broadcast("event");
        line.clear();
        reader.read_line(&mut line).unwrap();
        assert_eq!(line.trim_end(), "event");
        let mut reader_b = BufReader::new(client_b);
        line.clear();
        reader_b.read_line(&mut line).unwrap();
        assert_eq!(line.trim_end(), "event");
    }

    #[test]
    fn test_send_to_unknown_session() {
        let hub = ClientHub::new();
        assert!(!hub.send(99, "nobody home"));
    }

    #[test]
    fn test_unregister() {
        let hub = ClientHub::new();
        let (_client, server) = socket_pair();
        let session = hub.register(&server).unwrap();
        hub.unregister(session);
        assert_eq!(hub.client_count(), 0);
        assert!(!hub.send(session, "gone"));
    }
}
