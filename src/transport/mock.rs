//! Scripted panel transport for hardware-free testing
//!
//! [`MockPanel`] implements [`Transport`] and plays the role of the control
//! panel: blocks written by the receiver are parsed and handed to a script
//! closure, whose reply blocks are queued for the next read. A [`PanelFeed`]
//! handle lets a test inject unsolicited traffic (event reports) as if the
//! panel had sent it spontaneously.

use super::Transport;
use crate::error::Result;
use crate::sia::block::{FunctionCode, SiaBlock, BLOCK_OVERHEAD, HEADER_LENGTH_MASK};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Script closure: called once per block the daemon sends; returns the
/// panel's reply blocks in order.
pub type PanelScript = Box<dyn FnMut(FunctionCode, &[u8]) -> Vec<SiaBlock> + Send>;

/// In-memory panel double
pub struct MockPanel {
    script: PanelScript,
    inbox: Arc<Mutex<VecDeque<u8>>>,
    /// Accumulates written bytes until they form complete blocks
    outbuf: Vec<u8>,
}

/// Handle for injecting unsolicited panel traffic into a running [`MockPanel`]
#[derive(Clone)]
pub struct PanelFeed {
    inbox: Arc<Mutex<VecDeque<u8>>>,
}

impl PanelFeed {
    /// Queue a block as if the panel had sent it spontaneously
    pub fn inject(&self, block: &SiaBlock) {
        self.inbox.lock().extend(block.to_bytes());
    }

    /// Queue raw bytes (for corruption tests)
    pub fn inject_raw(&self, bytes: &[u8]) {
        self.inbox.lock().extend(bytes.iter().copied());
    }
}

impl MockPanel {
    pub fn new(script: PanelScript) -> (Self, PanelFeed) {
        let inbox = Arc::new(Mutex::new(VecDeque::new()));
        let feed = PanelFeed {
            inbox: Arc::clone(&inbox),
        };
        (
            Self {
                script,
                inbox,
                outbuf: Vec::new(),
            },
            feed,
        )
    }

    /// A panel that accepts every login and answers command blocks via
    /// `on_command(function_code, message)`.
    pub fn accepting(
        mut on_command: impl FnMut(FunctionCode, &[u8]) -> Vec<SiaBlock> + Send + 'static,
    ) -> (Self, PanelFeed) {
        Self::new(Box::new(move |fc, msg| {
            if fc == FunctionCode::RemoteLogin {
                vec![SiaBlock::new(FunctionCode::Configuration, b"AL4B1")]
            } else {
                on_command(fc, msg)
            }
        }))
    }

    /// A panel that rejects every block it is sent
    pub fn rejecting() -> (Self, PanelFeed) {
        Self::new(Box::new(|_, _| {
            vec![SiaBlock::new(FunctionCode::Reject, &[])]
        }))
    }

    /// A dead panel that never answers anything
    pub fn silent() -> (Self, PanelFeed) {
        Self::new(Box::new(|_, _| Vec::new()))
    }

    fn process_written(&mut self) {
        loop {
            if self.outbuf.len() < BLOCK_OVERHEAD {
                return;
            }
            let Some(fc) = FunctionCode::from_u8(self.outbuf[1]) else {
                self.outbuf.remove(0);
                continue;
            };
            let block_size = (self.outbuf[0] & HEADER_LENGTH_MASK) as usize + BLOCK_OVERHEAD;
            if self.outbuf.len() < block_size {
                return;
            }
            let message: Vec<u8> = self.outbuf[2..block_size - 1].to_vec();
            self.outbuf.drain(..block_size);

            // Ack/reject blocks from the daemon are terminal, not commands
            if matches!(
                fc,
                FunctionCode::Acknowledge
                    | FunctionCode::AltAcknowledge
                    | FunctionCode::Reject
                    | FunctionCode::AltReject
            ) {
                continue;
            }

            let replies = (self.script)(fc, &message);
            let mut inbox = self.inbox.lock();
            for block in replies {
                inbox.extend(block.to_bytes());
            }
        }
    }
}

impl Transport for MockPanel {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut inbox = self.inbox.lock();
        let mut n = 0;
        while n < buffer.len() {
            match inbox.pop_front() {
                Some(b) => {
                    buffer[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.outbuf.extend_from_slice(data);
        self.process_written();
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn available(&mut self) -> Result<usize> {
        Ok(self.inbox.lock().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepting_panel_answers_login_then_command() {
        let (mut panel, _feed) = MockPanel::accepting(|fc, msg| {
            assert_eq!(fc, FunctionCode::Control);
            assert_eq!(msg, b"SA1*1");
            vec![SiaBlock::new(FunctionCode::Acknowledge, &[])]
        });

        let login = SiaBlock::new(FunctionCode::RemoteLogin, b"543210").with_ack_request();
        panel.write(&login.to_bytes()).unwrap();
        let mut buf = [0u8; 64];
        let n = panel.read(&mut buf).unwrap();
        assert_eq!(buf[1], FunctionCode::Configuration as u8);
        assert!(n > 0);

        let cmd = SiaBlock::new(FunctionCode::Control, b"SA1*1").with_ack_request();
        panel.write(&cmd.to_bytes()).unwrap();
        let n = panel.read(&mut buf).unwrap();
        assert_eq!(n, 3);
        assert_eq!(buf[1], FunctionCode::Acknowledge as u8);
    }

    #[test]
    fn test_feed_injects_unsolicited_blocks() {
        let (mut panel, feed) = MockPanel::silent();
        feed.inject(&SiaBlock::new(FunctionCode::AccountId, b"42"));
        let mut buf = [0u8; 16];
        let n = panel.read(&mut buf).unwrap();
        assert_eq!(n, 7);
    }
}
