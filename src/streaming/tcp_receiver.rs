//! Per-client command reader
//!
//! One receiver runs per connected client, on its own thread. It reads
//! newline-delimited command lines and queues them with the commander;
//! replies go back through the hub to the issuing session.
//!
//! A 500ms read timeout keeps the loop responsive to the daemon shutdown
//! flag. Lines longer than the buffer limit drop the connection.

use super::{ClientHub, SessionId};
use crate::commander::{CommanderHandle, CommandOrigin};
use crate::error::Result;
use std::io::Read;
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Longest accepted command line
const MAX_LINE_LEN: usize = 8192;

pub struct TcpReceiver {
    commander: CommanderHandle,
    hub: Arc<ClientHub>,
    running: Arc<AtomicBool>,
}

impl TcpReceiver {
    pub fn new(commander: CommanderHandle, hub: Arc<ClientHub>, running: Arc<AtomicBool>) -> Self {
        Self {
            commander,
            hub,
            running,
        }
    }

    /// Run the receive loop for one connected client until it disconnects
    /// or the daemon shuts down
    pub fn run(&self, mut stream: TcpStream, session: SessionId) -> Result<()> {
        log::debug!("TCP receiver started for session {}", session);

        if let Err(e) = stream.set_read_timeout(Some(Duration::from_millis(500))) {
            log::warn!("Failed to set read timeout: {}", e);
        }

        let mut pending = Vec::new();
        let mut chunk = [0u8; 512];

        loop {
            if !self.running.load(Ordering::Relaxed) {
                break;
            }

            match stream.read(&mut chunk) {
                Ok(0) => {
                    log::debug!("Session {}: client closed the connection", session);
                    break;
                }
                Ok(n) => {
                    pending.extend_from_slice(&chunk[..n]);
                    self.dispatch_lines(&mut pending, session);
                    if pending.len() > MAX_LINE_LEN {
                        log::error!("Session {}: command line too long, dropping", session);
                        break;
                    }
                }
                Err(e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    continue;
                }
                Err(e) => {
                    log::debug!("Session {}: read error: {}", session, e);
                    break;
                }
            }
        }

        log::debug!("TCP receiver stopped for session {}", session);
        Ok(())
    }

    /// Queue every complete line in the buffer with the commander
    fn dispatch_lines(&self, pending: &mut Vec<u8>, session: SessionId) {
        while let Some(pos) = pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = pending.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_matches(['\r', '\n', ' ', '\t']);
            if line.is_empty() {
                continue;
            }

            log::info!("Session {}: command: {}", session, line);
            let hub = Arc::clone(&self.hub);
            self.commander
                .execute(CommandOrigin::Client(session), line, move |outcome| {
                    hub.send(session, &outcome.text);
                });
        }
    }
}
