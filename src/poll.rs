//! Panel status polling engine
//!
//! Clients register what they want polled (areas, zones, outputs) and how
//! often. The engine polls at the minimum interval over all enabled clients
//! and queries the union of their requested items, one consolidated reply
//! per cycle delivered to every subscriber.
//!
//! # Cycle
//!
//! A cycle dispatches one commander query per requested item, tagged with
//! poll origin so the commander returns pre-parsed bare arrays instead of
//! JSON objects. Sub-results are collected over a per-cycle channel; the
//! cycle completes when all results arrived, or immediately when one
//! sub-query reports the panel offline. With nothing subscribed to poll,
//! a lightweight online-check probe (the event-flush command, queued at the
//! head of the transmit queue) stands in for the full cycle.
//!
//! Before a cycle starts the engine checks that the commander is idle and
//! the receiver is neither transmitting nor mid-receive; a failed guard
//! defers the cycle by a fixed backoff instead of retrying immediately.

use crate::commander::{CommandOrigin, CommanderHandle, PolledItem, ReplyType};
use crate::receiver::{ReceiverHandle, TransmitReply};
use crate::sia::block::FunctionCode;
use crate::streaming::SessionId;
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Poll interval used for clients that never set one
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
/// Loop delay while nobody is polling
const POLL_INTERVAL_IDLE: Duration = Duration::from_secs(180);
/// Backoff when a cycle has to be deferred (guards failed or still busy)
const POLL_RETRY_DELAY: Duration = Duration::from_secs(10);
/// Upper bound on waiting for one sub-query result
const RESULT_WAIT: Duration = Duration::from_secs(90);

/// Bitset of pollable item categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollItems(u8);

impl PollItems {
    pub const NOTHING: PollItems = PollItems(0);
    pub const AREAS: PollItems = PollItems(1 << 0);
    pub const ZONES: PollItems = PollItems(1 << 1);
    pub const OUTPUTS: PollItems = PollItems(1 << 2);
    pub const EVERYTHING: PollItems = PollItems(1 << 0 | 1 << 1 | 1 << 2);

    pub fn contains(&self, other: PollItems) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, other: PollItems) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: PollItems) {
        self.0 &= !other.0;
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of sub-queries a poll cycle issues for this set
    pub fn count(&self) -> usize {
        [PollItems::AREAS, PollItems::ZONES, PollItems::OUTPUTS]
            .iter()
            .filter(|i| self.contains(**i))
            .count()
    }
}

/// Per-subscriber polling state
struct PollClient {
    enabled: bool,
    interval: Duration,
    one_shot: bool,
    items: PollItems,
}

impl PollClient {
    fn new() -> Self {
        Self {
            enabled: false,
            interval: DEFAULT_POLL_INTERVAL,
            one_shot: false,
            items: PollItems::NOTHING,
        }
    }
}

struct Shared {
    clients: HashMap<SessionId, PollClient>,
    /// Union of all clients' items, recomputed when flagged dirty
    items: PollItems,
    items_changed: bool,
    /// Minimum interval over all enabled clients
    interval: Duration,
    interval_changed: bool,
    poll_on: bool,
    one_shot: bool,
    notified: bool,
}

struct Inner {
    shared: Mutex<Shared>,
    cv: Condvar,
    shutdown: AtomicBool,
}

/// Handle for mutating poll registrations (used by the commander and by the
/// transport layer on disconnect)
#[derive(Clone)]
pub struct PollHandle {
    inner: Arc<Inner>,
}

/// Delivery function for consolidated replies
pub type PollDelivery = Arc<dyn Fn(SessionId, &str) + Send + Sync>;

impl PollHandle {
    fn notify(&self) {
        let mut shared = self.inner.shared.lock();
        shared.notified = true;
        self.inner.cv.notify_one();
    }

    /// Start polling for this client; registers it first if unknown
    pub fn enable(&self, session: SessionId) -> bool {
        {
            let mut shared = self.inner.shared.lock();
            let client = shared.clients.entry(session).or_insert_with(PollClient::new);
            client.enabled = true;
            shared.poll_on = true;
        }
        self.notify();
        true
    }

    /// Deregister this client entirely
    pub fn disable(&self, session: SessionId) -> bool {
        let mut shared = self.inner.shared.lock();
        let removed = shared.clients.remove(&session).is_some();
        if shared.clients.is_empty() {
            shared.poll_on = false;
            shared.interval = DEFAULT_POLL_INTERVAL;
        }
        // Removing a client may change the union and the interval
        shared.items_changed = true;
        shared.interval_changed = true;
        removed
    }

    /// Set this client's poll interval
    pub fn set_interval(&self, session: SessionId, interval: Duration) -> bool {
        if interval.is_zero() {
            return false;
        }
        let wakeup;
        {
            let mut shared = self.inner.shared.lock();
            let client = shared.clients.entry(session).or_insert_with(PollClient::new);
            client.interval = interval;
            wakeup = client.enabled;
            shared.interval_changed = true;
        }
        if wakeup {
            self.notify();
        }
        true
    }

    /// Add items to this client's requested set. `NOTHING` clears the set,
    /// `EVERYTHING` selects all categories.
    pub fn set_items(&self, session: SessionId, items: PollItems) -> bool {
        let mut shared = self.inner.shared.lock();
        let client = shared.clients.entry(session).or_insert_with(PollClient::new);
        if items == PollItems::NOTHING {
            client.items = PollItems::NOTHING;
        } else if items == PollItems::EVERYTHING {
            client.items = PollItems::EVERYTHING;
        } else {
            client.items.insert(items);
        }
        shared.items_changed = true;
        true
    }

    /// Remove items from this client's requested set. The arguments mirror
    /// `set_items`: removing `NOTHING` selects everything, removing
    /// `EVERYTHING` clears the set.
    pub fn clear_items(&self, session: SessionId, items: PollItems) -> bool {
        let mut shared = self.inner.shared.lock();
        let client = shared.clients.entry(session).or_insert_with(PollClient::new);
        if items == PollItems::NOTHING {
            client.items = PollItems::EVERYTHING;
        } else if items == PollItems::EVERYTHING {
            client.items = PollItems::NOTHING;
        } else {
            client.items.remove(items);
        }
        shared.items_changed = true;
        true
    }

    /// Poll once on behalf of this client, then deregister it.
    ///
    /// A client that is already polling just gets its next cycle brought
    /// forward.
    pub fn one_shot(&self, session: SessionId) -> bool {
        {
            let mut shared = self.inner.shared.lock();
            let already_polling = shared.clients.get(&session).is_some_and(|c| c.enabled);
            if !already_polling {
                let client = shared.clients.entry(session).or_insert_with(PollClient::new);
                client.one_shot = true;
                shared.one_shot = true;
            }
        }
        self.notify();
        true
    }

    /// Forget a disconnected session
    pub fn remove_session(&self, session: SessionId) {
        self.disable(session);
    }

    /// The effective interval (minimum over all enabled clients)
    pub fn interval(&self) -> Duration {
        self.inner.shared.lock().interval
    }

    /// The effective item set (union over all clients)
    pub fn items(&self) -> PollItems {
        self.inner.shared.lock().items
    }
}

/// The polling engine; owns the worker thread
pub struct PollEngine {
    handle: PollHandle,
    thread: Option<JoinHandle<()>>,
}

/// One sub-query result flowing back into the cycle
struct PollResult {
    success: bool,
    item: Option<PolledItem>,
    text: String,
}

impl PollEngine {
    pub fn spawn(
        commander: CommanderHandle,
        receiver: ReceiverHandle,
        delivery: PollDelivery,
    ) -> crate::error::Result<Self> {
        let inner = Arc::new(Inner {
            shared: Mutex::new(Shared {
                clients: HashMap::new(),
                items: PollItems::NOTHING,
                items_changed: true,
                interval: DEFAULT_POLL_INTERVAL,
                interval_changed: false,
                poll_on: false,
                one_shot: false,
                notified: false,
            }),
            cv: Condvar::new(),
            shutdown: AtomicBool::new(false),
        });

        let handle = PollHandle {
            inner: Arc::clone(&inner),
        };
        let worker_handle = handle.clone();
        let thread = std::thread::Builder::new()
            .name("poll-engine".to_string())
            .spawn(move || {
                run_loop(&worker_handle, &commander, &receiver, &delivery);
                log::debug!("Poll thread exited normally");
            })
            .map_err(|e| crate::error::Error::Other(format!("Failed to spawn poll thread: {}", e)))?;

        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }

    pub fn handle(&self) -> PollHandle {
        self.handle.clone()
    }

    pub fn shutdown(&mut self) {
        self.handle.inner.shutdown.store(true, Ordering::Relaxed);
        self.handle.notify();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for PollEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_loop(
    handle: &PollHandle,
    commander: &CommanderHandle,
    receiver: &ReceiverHandle,
    delivery: &PollDelivery,
) {
    let inner = &handle.inner;
    let mut loop_delay = POLL_INTERVAL_IDLE;

    while !inner.shutdown.load(Ordering::Relaxed) {
        {
            let mut shared = inner.shared.lock();
            if !shared.notified {
                inner.cv.wait_for(&mut shared, loop_delay);
            }
            shared.notified = false;
        }
        if inner.shutdown.load(Ordering::Relaxed) {
            break;
        }

        // Guard conditions: never collide with an in-flight exchange
        if commander.is_busy() || receiver.is_transmitting() || receiver.is_receiving() {
            log::debug!("Poll: link is busy, delaying this iteration");
            loop_delay = POLL_RETRY_DELAY;
            continue;
        }

        let (items, poll_wanted, one_shot) = {
            let mut shared = inner.shared.lock();

            if shared.items_changed {
                let mut items = PollItems::NOTHING;
                for client in shared.clients.values() {
                    if client.items.contains(PollItems::AREAS) {
                        items.insert(PollItems::AREAS);
                    }
                    if client.items.contains(PollItems::ZONES) {
                        items.insert(PollItems::ZONES);
                    }
                    if client.items.contains(PollItems::OUTPUTS) {
                        items.insert(PollItems::OUTPUTS);
                    }
                }
                shared.items = items;
                shared.items_changed = false;
            }

            if shared.clients.is_empty() {
                shared.poll_on = false;
                shared.one_shot = false;
            }

            (shared.items, shared.poll_on, shared.one_shot)
        };

        if poll_wanted || one_shot {
            if items.is_empty() {
                probe_online(handle, receiver, delivery);
            } else {
                run_cycle(handle, commander, delivery, items);
            }
        }

        // Use the client with the shortest interval as the effective
        // interval, and keep polling only while someone wants us to
        {
            let mut shared = inner.shared.lock();
            if shared.interval_changed || shared.one_shot || shared.poll_on {
                let mut interval = shared.interval;
                let mut on = false;
                for client in shared.clients.values() {
                    if client.enabled {
                        if client.interval < interval {
                            interval = client.interval;
                        }
                        on = true;
                    }
                }
                shared.interval = interval;
                shared.interval_changed = false;
                shared.poll_on = on;
            }

            loop_delay = if shared.poll_on {
                shared.interval
            } else {
                POLL_INTERVAL_IDLE
            };
        }
    }
}

/// Issue one sub-query per requested item and assemble the consolidated
/// reply once every result arrived (or the panel went offline).
fn run_cycle(
    handle: &PollHandle,
    commander: &CommanderHandle,
    delivery: &PollDelivery,
    items: PollItems,
) {
    let (tx, rx) = crossbeam_channel::unbounded::<PollResult>();

    let mut expected = 0;
    for (flag, line) in [
        (PollItems::AREAS, "AREA 0 READY"),
        (PollItems::ZONES, "ZONES ALARM"),
        (PollItems::OUTPUTS, "OUTPUT GETALL"),
    ] {
        if items.contains(flag) {
            log::debug!("Poll: polling {}...", line);
            let tx = tx.clone();
            commander.execute(CommandOrigin::Poll, line, move |outcome| {
                let _ = tx.send(PollResult {
                    success: outcome.success,
                    item: outcome.item,
                    text: outcome.text,
                });
            });
            expected += 1;
        }
    }
    drop(tx);

    let mut areas: Option<String> = None;
    let mut zones: Option<String> = None;
    let mut outputs: Option<String> = None;
    let mut online = true;

    for _ in 0..expected {
        match rx.recv_timeout(RESULT_WAIT) {
            Ok(result) if result.success => match result.item {
                Some(PolledItem::Areas) => areas = Some(result.text),
                Some(PolledItem::Zones) => zones = Some(result.text),
                Some(PolledItem::Outputs) => outputs = Some(result.text),
                None => log::error!("Poll: sub-query result carries no item tag"),
            },
            Ok(_) => {
                // Panel offline: deliver immediately, forget partial results
                log::debug!("Poll: panel is offline!");
                online = false;
                break;
            }
            Err(_) => {
                log::error!("Poll: timed out waiting for a sub-query result");
                online = false;
                break;
            }
        }
    }

    let reply = if online {
        consolidated_reply(true, areas.as_deref(), zones.as_deref(), outputs.as_deref())
    } else {
        consolidated_reply(false, None, None, None)
    };

    deliver_and_prune(handle, delivery, &reply);
}

/// With nothing to poll, check the panel is alive with the event-flush
/// command. The probe jumps the queue but not an exchange in flight.
fn probe_online(handle: &PollHandle, receiver: &ReceiverHandle, delivery: &PollDelivery) {
    let (tx, rx) = crossbeam_channel::bounded(1);
    // The probe payload carries a trailing NUL
    receiver.send_first(
        FunctionCode::Extended,
        b"EV*\0",
        Box::new(move |reply| {
            let _ = tx.send(reply);
        }),
    );

    let online = match rx.recv_timeout(RESULT_WAIT) {
        Ok(TransmitReply::Data(_)) => true,
        // A failed or rejected command still proves the link is up;
        // only a login timeout means the panel is unreachable
        Ok(TransmitReply::Failed) | Ok(TransmitReply::LoginRejected) => true,
        Ok(TransmitReply::LoginTimeout) | Err(_) => false,
    };
    log::debug!("Poll: panel is {}", if online { "online" } else { "offline!" });

    let reply = consolidated_reply(online, None, None, None);
    deliver_and_prune(handle, delivery, &reply);
}

/// Deliver a consolidated reply to every subscribed client and drop
/// one-shot clients afterwards
fn deliver_and_prune(handle: &PollHandle, delivery: &PollDelivery, reply: &str) {
    let mut shared = handle.inner.shared.lock();

    let recipients: Vec<SessionId> = shared
        .clients
        .iter()
        .filter(|(_, c)| c.enabled || c.one_shot)
        .map(|(id, _)| *id)
        .collect();
    let one_shots: Vec<SessionId> = shared
        .clients
        .iter()
        .filter(|(_, c)| c.one_shot)
        .map(|(id, _)| *id)
        .collect();

    for session in &one_shots {
        shared.clients.remove(session);
    }
    if !one_shots.is_empty() {
        shared.one_shot = false;
        shared.items_changed = true;
        shared.interval_changed = true;
    }
    if shared.clients.is_empty() {
        shared.poll_on = false;
        shared.interval = DEFAULT_POLL_INTERVAL;
    }
    drop(shared);

    for session in recipients {
        delivery(session, reply);
    }
}

/// The consolidated per-cycle reply; absent arrays are sent as `[0]`
fn consolidated_reply(
    online: bool,
    areas: Option<&str>,
    zones: Option<&str>,
    outputs: Option<&str>,
) -> String {
    const EMPTY: &str = "[0]";
    format!(
        concat!(
            "{{\"typeId\":{},\"typeDesc\":\"{}\",",
            "\"panelIsOnline\":{},",
            "\"haveAreaState\":{},\"haveZoneState\":{},\"haveOutputState\":{},",
            "\"areaState\":{},\"zoneState\":{},\"outputState\":{}}}"
        ),
        ReplyType::PollReply.id(),
        ReplyType::PollReply.desc(),
        online as u8,
        areas.is_some() as u8,
        zones.is_some() as u8,
        outputs.is_some() as u8,
        areas.unwrap_or(EMPTY),
        zones.unwrap_or(EMPTY),
        outputs.unwrap_or(EMPTY),
    )
}
