//! End-to-end tests against a scripted panel
//!
//! These drive the full stack - receiver engine, galaxy facade, commander
//! worker and poll engine - over the mock transport, with the panel's side
//! of every exchange scripted.

use raksha_sia::commander::{Commander, CommanderHandle, CommandOrigin, CommandOutcome, PolledItem};
use raksha_sia::galaxy::Galaxy;
use raksha_sia::poll::{PollDelivery, PollEngine};
use raksha_sia::receiver::{Receiver, TransmitReply};
use raksha_sia::sia::block::{FunctionCode, SiaBlock};
use raksha_sia::sia::codec::SiaCodec;
use raksha_sia::sia::event::SiaEvent;
use raksha_sia::transport::mock::{MockPanel, PanelFeed};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

const TEST_WAIT: Duration = Duration::from_secs(30);

struct Stack {
    receiver: Receiver,
    commander: CommanderHandle,
    _commander_worker: Commander,
    poll: PollEngine,
    delivered: crossbeam_channel::Receiver<(u64, String)>,
    events: crossbeam_channel::Receiver<SiaEvent>,
}

fn stack(panel: MockPanel) -> Stack {
    let (events_tx, events_rx) = crossbeam_channel::unbounded();
    let receiver = Receiver::spawn(
        Box::new(panel),
        SiaCodec::new("543210", false),
        events_tx,
    )
    .unwrap();
    let galaxy = Arc::new(Galaxy::new(receiver.handle(), false));

    let (commander, queue) = CommanderHandle::channel();
    let (delivered_tx, delivered_rx) = crossbeam_channel::unbounded();
    let delivery: PollDelivery = Arc::new(move |session, text: &str| {
        let _ = delivered_tx.send((session, text.to_string()));
    });
    let poll = PollEngine::spawn(commander.clone(), receiver.handle(), delivery).unwrap();
    let commander_worker = Commander::spawn(queue, commander.clone(), galaxy, poll.handle()).unwrap();

    Stack {
        receiver,
        commander,
        _commander_worker: commander_worker,
        poll,
        delivered: delivered_rx,
        events: events_rx,
    }
}

fn run_command(stack: &Stack, origin: CommandOrigin, line: &str) -> CommandOutcome {
    let (tx, rx) = crossbeam_channel::bounded(1);
    stack.commander.execute(origin, line, move |outcome| {
        let _ = tx.send(outcome);
    });
    rx.recv_timeout(TEST_WAIT).expect("command did not complete")
}

/// A panel holding 32 area armed flags and 32 output state bytes
fn stateful_panel() -> (MockPanel, PanelFeed) {
    let mut armed = [b'0'; 32];
    let outputs: [u8; 32] = {
        let mut o = [0u8; 32];
        o[0] = 0x11; // output 1001 on
        o
    };

    MockPanel::accepting(move |fc, msg| {
        let text = String::from_utf8_lossy(msg).into_owned();
        match fc {
            FunctionCode::Control => {
                if text == "SA" {
                    // All areas armed state: 'SA*' + 32 digits
                    let mut reply = b"SA*".to_vec();
                    reply.extend_from_slice(&armed);
                    vec![SiaBlock::new(FunctionCode::Control, &reply)]
                } else if text == "OR1000" {
                    // All outputs: 'OR1000*' + 32 state bytes
                    let mut reply = b"OR1000*".to_vec();
                    reply.extend_from_slice(&outputs);
                    vec![SiaBlock::new(FunctionCode::Control, &reply)]
                } else if let Some(rest) = text.strip_prefix("SA") {
                    // Area action: 'SA<blknum>*<action>'
                    if let Some((area, action)) = rest.split_once('*') {
                        if let (Ok(area), "1") = (area.parse::<usize>(), action) {
                            if (1..=32).contains(&area) {
                                armed[area - 1] = b'1';
                            }
                        }
                    }
                    vec![SiaBlock::new(FunctionCode::Acknowledge, &[])]
                } else {
                    vec![SiaBlock::new(FunctionCode::Reject, &[])]
                }
            }
            FunctionCode::Extended => {
                if text.starts_with("EV") {
                    vec![SiaBlock::new(FunctionCode::Acknowledge, &[])]
                } else if text == "ZS101" {
                    let mut reply = b"ZS101*".to_vec();
                    reply.extend_from_slice(&[0u8; 35]);
                    vec![SiaBlock::new(FunctionCode::Extended, &reply)]
                } else if text == "ZS102" {
                    let mut reply = b"ZS102*".to_vec();
                    reply.extend_from_slice(&[0u8; 33]);
                    vec![SiaBlock::new(FunctionCode::Extended, &reply)]
                } else {
                    vec![SiaBlock::new(FunctionCode::Reject, &[])]
                }
            }
            _ => vec![SiaBlock::new(FunctionCode::Reject, &[])],
        }
    })
}

#[test]
fn test_retry_bound_on_rejecting_panel() {
    let (panel, _feed) = MockPanel::rejecting();
    let (events_tx, _events_rx) = crossbeam_channel::unbounded();
    let receiver = Receiver::spawn(
        Box::new(panel),
        SiaCodec::new("543210", false),
        events_tx,
    )
    .unwrap();

    let calls = Arc::new(AtomicU32::new(0));
    let calls_cb = Arc::clone(&calls);
    let (tx, rx) = crossbeam_channel::bounded(1);
    receiver.handle().send(
        FunctionCode::Control,
        b"SA1*1",
        Box::new(move |reply| {
            calls_cb.fetch_add(1, Ordering::SeqCst);
            let _ = tx.send(reply);
        }),
    );

    // The callback fires exactly once with the login-rejected signal
    let reply = rx.recv_timeout(TEST_WAIT).expect("callback never fired");
    assert_eq!(reply, TransmitReply::LoginRejected);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // The entry is gone from the queue
    std::thread::sleep(Duration::from_millis(200));
    assert!(!receiver.handle().is_transmitting());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_area_set_then_state_end_to_end() {
    let (panel, _feed) = stateful_panel();
    let mut stack = stack(panel);

    // Arm area 1; the panel acknowledges
    let outcome = run_command(&stack, CommandOrigin::Client(1), "AREA 1 SET");
    assert!(outcome.success, "arm failed: {}", outcome.text);
    let parsed: serde_json::Value = serde_json::from_str(&outcome.text).unwrap();
    assert_eq!(parsed["success"], 1);
    assert_eq!(parsed["command"], "AREA 1 SET");

    // All-areas state now reports area 1 set and the rest unset
    let outcome = run_command(&stack, CommandOrigin::Client(1), "AREA 0 STATE");
    assert!(outcome.success, "state query failed: {}", outcome.text);
    let parsed: serde_json::Value = serde_json::from_str(&outcome.text).unwrap();
    assert_eq!(parsed["typeId"], 4);
    let states = parsed["areaState"].as_array().unwrap();
    assert_eq!(states.len(), 32);
    assert_eq!(states[0], 1);
    for state in &states[1..] {
        assert_eq!(*state, 0);
    }

    stack.poll.shutdown();
    stack.receiver.shutdown();
}

#[test]
fn test_output_getall_dual_format() {
    let (panel, _feed) = stateful_panel();
    let mut stack = stack(panel);

    // Poll origin: a bracketed 32-value array literal, tagged with the item
    let outcome = run_command(&stack, CommandOrigin::Poll, "OUTPUT GETALL");
    assert!(outcome.success);
    assert_eq!(outcome.item, Some(PolledItem::Outputs));
    assert!(outcome.text.starts_with('['), "not a bare array: {}", outcome.text);
    let values: Vec<u32> = serde_json::from_str(&outcome.text).unwrap();
    assert_eq!(values.len(), 32);
    assert_eq!(values[0], 0x11);

    // Client origin: a JSON object carrying a typeId
    let outcome = run_command(&stack, CommandOrigin::Client(1), "OUTPUT GETALL");
    assert!(outcome.success);
    assert_eq!(outcome.item, None);
    let parsed: serde_json::Value = serde_json::from_str(&outcome.text).unwrap();
    assert_eq!(parsed["typeId"], 17);
    assert_eq!(parsed["outputState"].as_array().unwrap().len(), 32);

    stack.poll.shutdown();
    stack.receiver.shutdown();
}

#[test]
fn test_unknown_command_and_bad_arguments() {
    let (panel, _feed) = stateful_panel();
    let mut stack = stack(panel);

    let outcome = run_command(&stack, CommandOrigin::Client(1), "FROBNICATE 1");
    assert!(!outcome.success);
    let parsed: serde_json::Value = serde_json::from_str(&outcome.text).unwrap();
    assert_eq!(parsed["replyText"], "No such command!");

    let outcome = run_command(&stack, CommandOrigin::Client(1), "AREA 1");
    assert!(!outcome.success);
    let parsed: serde_json::Value = serde_json::from_str(&outcome.text).unwrap();
    assert_eq!(parsed["replyText"], "requires an (other) argument!");

    let outcome = run_command(&stack, CommandOrigin::Client(1), "AREA 1 DISCO");
    let parsed: serde_json::Value = serde_json::from_str(&outcome.text).unwrap();
    assert_eq!(parsed["replyText"], "No such area action!");

    let outcome = run_command(&stack, CommandOrigin::Client(1), "OUTPUT 1001 ON 99");
    let parsed: serde_json::Value = serde_json::from_str(&outcome.text).unwrap();
    assert_eq!(parsed["replyText"], "No such area!");

    stack.poll.shutdown();
    stack.receiver.shutdown();
}

#[test]
fn test_zones_alarm_spans_two_subrequests() {
    let (panel, _feed) = stateful_panel();
    let mut stack = stack(panel);

    let outcome = run_command(&stack, CommandOrigin::Client(1), "ZONES ALARM");
    assert!(outcome.success, "zones query failed: {}", outcome.text);
    let parsed: serde_json::Value = serde_json::from_str(&outcome.text).unwrap();
    assert_eq!(parsed["typeId"], 12);
    assert_eq!(parsed["zoneState"].as_array().unwrap().len(), 65);

    stack.poll.shutdown();
    stack.receiver.shutdown();
}

#[test]
fn test_event_report_reaches_output_stage() {
    let (panel, feed) = stateful_panel();
    let mut stack = stack(panel);

    // The panel reports an alarm on its own initiative
    feed.inject(&SiaBlock::new(FunctionCode::AccountId, b"1234"));
    feed.inject(&SiaBlock::new(
        FunctionCode::NewEvent,
        b"ti10:30:00/ri1/BA1011",
    ));

    let event = stack
        .events
        .recv_timeout(TEST_WAIT)
        .expect("event never reached the output stage");
    assert_eq!(event.account_id, 1234);
    assert_eq!(event.code.letters, "BA");
    assert_eq!(event.area_id, Some(1));
    assert_eq!(event.address_number, Some(1011));

    stack.poll.shutdown();
    stack.receiver.shutdown();
}

#[test]
fn test_poll_one_shot_delivers_consolidated_reply() {
    let (panel, _feed) = stateful_panel();
    let mut stack = stack(panel);

    // A one-shot request with no items registered runs the online probe
    stack.poll.handle().one_shot(5);

    let (session, reply) = stack
        .delivered
        .recv_timeout(TEST_WAIT)
        .expect("no consolidated reply delivered");
    assert_eq!(session, 5);
    let parsed: serde_json::Value = serde_json::from_str(&reply).unwrap();
    assert_eq!(parsed["typeId"], 18);
    assert_eq!(parsed["panelIsOnline"], 1);
    assert_eq!(parsed["haveAreaState"], 0);

    // One-shot clients are deregistered after delivery: no second reply
    assert!(stack
        .delivered
        .recv_timeout(Duration::from_millis(500))
        .is_err());

    stack.poll.shutdown();
    stack.receiver.shutdown();
}
