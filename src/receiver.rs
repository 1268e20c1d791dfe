//! Send/receive engine for the panel link
//!
//! # Architecture
//!
//! A single dedicated thread owns the serial transport and the SIA codec.
//! Outbound commands are queued as [`TransmitEntry`] values; the worker
//! drains the queue one entry at a time through a login/command exchange:
//!
//! ```text
//! IDLE ──queued entry──▶ LOGIN_SENT ──config block──▶ COMMAND_SENT ──ack/reply──▶ IDLE
//!                            │                            │
//!                        reject/timeout               reject/timeout
//!                      (retry, then drop)           (retry, then drop)
//! ```
//!
//! Every entry completion - success, rejection or timeout - is reported
//! through the entry's callback exactly once; command loss is never silent.
//!
//! # Timing
//!
//! The loop sleeps on a condition variable with an adaptive timeout: 100ms
//! by default, reduced by the time the iteration took, with a 50ms floor.
//! While a response is outstanding the floor is used, to keep added latency
//! minimal. The state machine only advances on iterations where the port
//! had nothing to read and no message is partially received (half-duplex
//! discipline).

use crate::sia::block::{FunctionCode, SiaBlock, BLOCK_ACK_TIMEOUT, BLOCK_RETRY_MAX};
use crate::sia::codec::{Decoded, SiaCodec};
use crate::sia::event::SiaEvent;
use crate::transport::Transport;
use crossbeam_channel::Sender;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Default time between send/receive loop iterations
const LOOP_DELAY_DEFAULT: Duration = Duration::from_millis(100);
/// Minimum time between send/receive loop iterations
const LOOP_DELAY_MIN: Duration = Duration::from_millis(50);

/// Outcome of a queued transmission, handed to the entry's callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransmitReply {
    /// The panel answered; the reply payload (empty for a plain acknowledge)
    Data(Vec<u8>),
    /// The command failed or was rejected after the retry bound
    Failed,
    /// The remote login was rejected after the retry bound
    LoginRejected,
    /// The remote login went unanswered after the retry bound
    LoginTimeout,
}

/// Function to call with the transmitter's answer or error status
pub type TransmitCallback = Box<dyn FnOnce(TransmitReply) + Send>;

/// A queued outbound SIA block
struct TransmitEntry {
    fc: FunctionCode,
    data: Vec<u8>,
    callback: TransmitCallback,
}

struct Shared {
    queue: Mutex<VecDeque<TransmitEntry>>,
    /// Wakes the worker out of its loop delay
    tick: Mutex<bool>,
    tick_cv: Condvar,
    shutdown: AtomicBool,
    /// True while a response is outstanding or a message is being received
    receiving: AtomicBool,
}

/// Handle used by the rest of the system to queue commands and query state
#[derive(Clone)]
pub struct ReceiverHandle {
    shared: Arc<Shared>,
}

impl ReceiverHandle {
    /// Append a command to the tail of the transmit queue
    pub fn send(&self, fc: FunctionCode, data: &[u8], callback: TransmitCallback) {
        let mut queue = self.shared.queue.lock();
        queue.push_back(TransmitEntry {
            fc,
            data: data.to_vec(),
            callback,
        });
        drop(queue);
        log::debug!("Receiver: command queue append: {}", printable(data));
        self.notify();
    }

    /// Prepend a command to the head of the transmit queue.
    ///
    /// Used by the polling engine's online-check probe; the probe jumps
    /// queued client commands but never an exchange already in flight.
    pub fn send_first(&self, fc: FunctionCode, data: &[u8], callback: TransmitCallback) {
        let mut queue = self.shared.queue.lock();
        queue.push_front(TransmitEntry {
            fc,
            data: data.to_vec(),
            callback,
        });
        drop(queue);
        log::debug!("Receiver: command queue prepend: {}", printable(data));
        self.notify();
    }

    /// True when the transmit queue is not empty
    pub fn is_transmitting(&self) -> bool {
        !self.shared.queue.lock().is_empty()
    }

    /// True while a response is outstanding or a frame is partially received
    pub fn is_receiving(&self) -> bool {
        self.shared.receiving.load(Ordering::Relaxed)
    }

    /// Break the current loop delay and start the next iteration immediately
    pub fn notify(&self) {
        let mut tick = self.shared.tick.lock();
        *tick = true;
        self.shared.tick_cv.notify_one();
    }
}

/// The receiver engine; owns the worker thread
pub struct Receiver {
    handle: ReceiverHandle,
    thread: Option<JoinHandle<()>>,
}

/// Response latch filled in by the codec trigger signals.
///
/// Triggers are only meaningful while `waiting` is set; stray responses
/// outside an exchange are ignored.
struct Latch {
    waiting: bool,
    rejected: bool,
    success: bool,
    buffer: Vec<u8>,
}

impl Latch {
    fn idle() -> Self {
        Self {
            waiting: false,
            rejected: false,
            success: false,
            buffer: Vec::new(),
        }
    }

    /// Arm the latch before sending a block
    fn arm(&mut self) {
        self.waiting = true;
        self.rejected = true;
        self.success = false;
        self.buffer.clear();
    }

    fn apply(&mut self, decoded: &Decoded) {
        if !self.waiting {
            return;
        }
        match decoded {
            Decoded::Ack => {
                self.waiting = false;
                self.rejected = false;
                self.success = true;
            }
            Decoded::Reject => {
                self.waiting = false;
                self.rejected = true;
                self.success = false;
            }
            Decoded::Configuration => {
                // Not the final block: the command itself follows
                self.waiting = false;
                self.rejected = false;
                self.success = false;
            }
            Decoded::Control(msg) | Decoded::Extended(msg) => {
                self.waiting = false;
                self.rejected = false;
                self.success = true;
                self.buffer = msg.clone();
            }
            Decoded::Event(_) => {}
        }
    }
}

/// Per-entry exchange phase
#[derive(Clone, Copy)]
enum Phase {
    Idle,
    /// Login block sent, waiting for a configuration or reject block
    WaitLogin { since: Instant },
    /// Command block sent, waiting for ack/reject/control/extended
    WaitCommand { since: Instant },
}

impl Receiver {
    /// Spawn the receiver worker thread.
    ///
    /// Decoded panel events are forwarded to `events` (the output stage).
    pub fn spawn(
        mut port: Box<dyn Transport>,
        mut codec: SiaCodec,
        events: Sender<SiaEvent>,
    ) -> crate::error::Result<Self> {
        let shared = Arc::new(Shared {
            queue: Mutex::new(VecDeque::new()),
            tick: Mutex::new(false),
            tick_cv: Condvar::new(),
            shutdown: AtomicBool::new(false),
            receiving: AtomicBool::new(false),
        });

        let worker_shared = Arc::clone(&shared);
        let thread = std::thread::Builder::new()
            .name("sia-receiver".to_string())
            .spawn(move || {
                run_loop(&worker_shared, &mut *port, &mut codec, &events);
                // Unblock anyone still waiting on a queued entry
                let mut queue = worker_shared.queue.lock();
                while let Some(entry) = queue.pop_front() {
                    (entry.callback)(TransmitReply::Failed);
                }
                log::debug!("Receiver thread exited normally");
            })
            .map_err(|e| crate::error::Error::Other(format!("Failed to spawn receiver thread: {}", e)))?;

        Ok(Self {
            handle: ReceiverHandle { shared },
            thread: Some(thread),
        })
    }

    pub fn handle(&self) -> ReceiverHandle {
        self.handle.clone()
    }

    /// Signal the worker to stop and join it
    pub fn shutdown(&mut self) {
        self.handle.shared.shutdown.store(true, Ordering::Relaxed);
        self.handle.notify();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for Receiver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_loop(
    shared: &Shared,
    port: &mut dyn Transport,
    codec: &mut SiaCodec,
    events: &Sender<SiaEvent>,
) {
    let mut buf = [0u8; 256];
    let mut phase = Phase::Idle;
    let mut latch = Latch::idle();
    let mut retry: u32 = 0;
    let mut loop_delay = LOOP_DELAY_DEFAULT;

    while !shared.shutdown.load(Ordering::Relaxed) {
        // Sleep until the next iteration or an explicit notify
        {
            let mut tick = shared.tick.lock();
            if !*tick {
                shared.tick_cv.wait_for(&mut tick, loop_delay);
            }
            *tick = false;
        }
        if shared.shutdown.load(Ordering::Relaxed) {
            break;
        }

        let iter_start = Instant::now();

        // Non-blocking read; decode whatever arrived
        let n = match port.read(&mut buf) {
            Ok(n) => n,
            Err(e) => {
                log::error!("Receiver: serial read error: {}", e);
                0
            }
        };

        if n > 0 {
            for decoded in codec.feed(&buf[..n], port) {
                match decoded {
                    Decoded::Event(event) => {
                        log::info!(
                            "Receiver: {} (0x{:02X}) {}{}",
                            event.raw.function_code().name(),
                            event.raw.function_code() as u8,
                            event.code.letters,
                            event
                                .ascii
                                .as_deref()
                                .map(|a| format!(" {}", a))
                                .unwrap_or_default()
                        );
                        if events.send(*event).is_err() {
                            log::error!("Receiver: output stage is gone, dropping event");
                        }
                    }
                    other => latch.apply(&other),
                }
            }
        } else if !codec.mid_message() {
            // Quiet link: advance the exchange state machine
            match phase {
                Phase::WaitLogin { since } => {
                    if !latch.waiting {
                        if latch.rejected {
                            retry += 1;
                            if retry > BLOCK_RETRY_MAX {
                                log::error!("Receiver: remote login rejected, dropping command");
                                complete_front(shared, TransmitReply::LoginRejected);
                                retry = 0;
                            } else {
                                log::error!(
                                    "Receiver: remote login rejected, trying again... ({})",
                                    retry
                                );
                            }
                            phase = Phase::Idle;
                        } else {
                            // Login accepted: send the queued command block
                            phase = send_front_command(shared, codec, port, &mut latch);
                        }
                    } else if since.elapsed() >= BLOCK_ACK_TIMEOUT {
                        retry += 1;
                        if retry >= BLOCK_RETRY_MAX {
                            log::error!(
                                "Receiver: remote login timed out after {}ms, dropping command ({})",
                                since.elapsed().as_millis(),
                                retry
                            );
                            complete_front(shared, TransmitReply::LoginTimeout);
                            retry = 0;
                        } else {
                            log::error!(
                                "Receiver: remote login timed out after {}ms, trying again... ({})",
                                since.elapsed().as_millis(),
                                retry
                            );
                        }
                        latch.waiting = false;
                        phase = Phase::Idle;
                    }
                }
                Phase::WaitCommand { since } => {
                    if !latch.waiting {
                        if latch.success {
                            complete_front(shared, TransmitReply::Data(latch.buffer.clone()));
                        } else {
                            log::error!("Receiver: command execution failed");
                            complete_front(shared, TransmitReply::Failed);
                        }
                        retry = 0;
                        phase = Phase::Idle;
                    } else if since.elapsed() >= BLOCK_ACK_TIMEOUT {
                        retry += 1;
                        if retry >= BLOCK_RETRY_MAX {
                            log::error!(
                                "Receiver: command timed out after {}ms, dropping command ({})",
                                since.elapsed().as_millis(),
                                retry
                            );
                            complete_front(shared, TransmitReply::Failed);
                            retry = 0;
                        } else {
                            log::debug!(
                                "Receiver: command timed out after {}ms, trying again... ({})",
                                since.elapsed().as_millis(),
                                retry
                            );
                        }
                        latch.waiting = false;
                        phase = Phase::Idle;
                    }
                }
                Phase::Idle => {
                    let has_work = !shared.queue.lock().is_empty();
                    if has_work {
                        latch.arm();
                        if codec.send_remote_login(port) {
                            phase = Phase::WaitLogin {
                                since: Instant::now(),
                            };
                        } else {
                            // Device write failure aborts the entry, no retry
                            latch = Latch::idle();
                            log::error!("Receiver: failed to send login block");
                            complete_front(shared, TransmitReply::Failed);
                            retry = 0;
                        }
                    }
                }
            }
        }

        shared
            .receiving
            .store(latch.waiting || codec.mid_message(), Ordering::Relaxed);

        // Use the floor delay while a response is outstanding, otherwise
        // subtract the iteration cost from the default delay
        loop_delay = if latch.waiting {
            LOOP_DELAY_MIN
        } else {
            LOOP_DELAY_DEFAULT
                .saturating_sub(iter_start.elapsed())
                .max(LOOP_DELAY_MIN)
        };
    }
}

/// Send the command block of the front queue entry, with ack request set.
///
/// A device write failure drops the entry immediately (no retry).
fn send_front_command(
    shared: &Shared,
    codec: &SiaCodec,
    port: &mut dyn Transport,
    latch: &mut Latch,
) -> Phase {
    let queue = shared.queue.lock();
    let Some(front) = queue.front() else {
        return Phase::Idle;
    };
    let block = SiaBlock::new(front.fc, &front.data).with_ack_request();
    log::debug!("Receiver: sending command: {}", printable(&front.data));
    drop(queue);

    latch.arm();
    if codec.send_block(&block, port) {
        Phase::WaitCommand {
            since: Instant::now(),
        }
    } else {
        *latch = Latch::idle();
        log::error!("Receiver: failed to send a command to the transmitter");
        complete_front(shared, TransmitReply::Failed);
        Phase::Idle
    }
}

/// Pop the front entry and invoke its callback with the outcome
fn complete_front(shared: &Shared, reply: TransmitReply) {
    let entry = shared.queue.lock().pop_front();
    if let Some(entry) = entry {
        (entry.callback)(reply);
    }
}

/// Replace non-printable characters for log output
fn printable(data: &[u8]) -> String {
    data.iter()
        .map(|&b| if (0x20..0x7F).contains(&b) { b as char } else { '.' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latch_ignores_triggers_when_not_waiting() {
        let mut latch = Latch::idle();
        latch.apply(&Decoded::Ack);
        assert!(!latch.success);

        latch.arm();
        latch.apply(&Decoded::Ack);
        assert!(latch.success);
        assert!(!latch.waiting);

        // A second trigger after completion is ignored
        latch.apply(&Decoded::Reject);
        assert!(latch.success);
    }

    #[test]
    fn test_latch_control_reply_captures_buffer() {
        let mut latch = Latch::idle();
        latch.arm();
        latch.apply(&Decoded::Control(b"SA*1".to_vec()));
        assert!(latch.success);
        assert_eq!(latch.buffer, b"SA*1");
    }

    #[test]
    fn test_latch_configuration_is_not_final() {
        let mut latch = Latch::idle();
        latch.arm();
        latch.apply(&Decoded::Configuration);
        assert!(!latch.waiting);
        assert!(!latch.rejected);
        assert!(!latch.success);
    }

    #[test]
    fn test_printable_filter() {
        assert_eq!(printable(b"SA1*1"), "SA1*1");
        assert_eq!(printable(&[0x01, b'E', b'V', 0x00]), ".EV.");
    }
}
