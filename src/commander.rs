//! Client command dispatcher
//!
//! A single worker thread drains a FIFO of pending commands. Each command
//! is a whitespace-tokenized text line (`AREA 1 SET`, `ZONES READY`,
//! `OUTPUT GETALL`, ...); the keyword and up to five arguments are
//! case-normalized, dispatched to the matching panel operation, and the
//! outcome is formatted as a single-line JSON reply.
//!
//! Commands issued by the polling engine are tagged with
//! [`CommandOrigin::Poll`]; state queries then return a bare value array
//! (pre-parsed, so the poll engine never has to decode a JSON object) and
//! the outcome carries which item category the array describes.

use crate::galaxy::{
    AreaAction, Galaxy, SiaModule, ZoneAction, ZoneProgram, ZonesQuery,
};
use crate::poll::{PollHandle, PollItems};
use crate::streaming::SessionId;
use crossbeam_channel::{Receiver as ChannelReceiver, Sender};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Where a command came from; decides the reply formatting mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOrigin {
    /// A connected client session; replies are JSON objects
    Client(SessionId),
    /// The polling engine; state queries reply with bare arrays
    Poll,
}

impl CommandOrigin {
    fn is_poll(&self) -> bool {
        matches!(self, CommandOrigin::Poll)
    }
}

/// Item category of a poll-mode state query result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolledItem {
    Areas,
    Zones,
    Outputs,
}

/// The outcome of one executed command
#[derive(Debug)]
pub struct CommandOutcome {
    /// Whether the underlying operation succeeded
    pub success: bool,
    /// For poll-origin state queries: which category `text` describes
    pub item: Option<PolledItem>,
    /// The formatted reply line
    pub text: String,
}

/// A queued unit of work for the dispatcher
pub struct PendingCommand {
    pub origin: CommandOrigin,
    pub line: String,
    pub reply: Box<dyn FnOnce(CommandOutcome) + Send>,
}

/// `typeId` values carried by JSON replies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyType {
    Sia,
    Standard,
    Help,
    AreaArmedState,
    AllAreasArmedStates,
    AreaAlarmState,
    AllAreasAlarmStates,
    AreaReadyState,
    AllAreasReadyStates,
    ZoneOmittedState,
    SingleZoneState,
    AllZonesReadyStates,
    AllZonesAlarmStates,
    AllZonesOpenStates,
    AllZonesTamperStates,
    AllZonesResistanceStates,
    AllZonesOmittedStates,
    AllOutputStates,
    PollReply,
    AuthorizationRequired,
    AuthenticationAccepted,
}

impl ReplyType {
    pub fn id(&self) -> u32 {
        use ReplyType::*;
        match self {
            Sia => 0,
            Standard => 1,
            Help => 2,
            AreaArmedState => 3,
            AllAreasArmedStates => 4,
            AreaAlarmState => 5,
            AllAreasAlarmStates => 6,
            AreaReadyState => 7,
            AllAreasReadyStates => 8,
            ZoneOmittedState => 9,
            SingleZoneState => 10,
            AllZonesReadyStates => 11,
            AllZonesAlarmStates => 12,
            AllZonesOpenStates => 13,
            AllZonesTamperStates => 14,
            AllZonesResistanceStates => 15,
            AllZonesOmittedStates => 16,
            AllOutputStates => 17,
            PollReply => 18,
            AuthorizationRequired => 19,
            AuthenticationAccepted => 20,
        }
    }

    /// Descriptive string sent as `typeDesc`
    pub fn desc(&self) -> &'static str {
        use ReplyType::*;
        match self {
            Sia => "reserved",
            Standard => "default",
            Help => "help command",
            AreaArmedState => "area armed state",
            AllAreasArmedStates => "areas armed states",
            AreaAlarmState => "area alarm state",
            AllAreasAlarmStates => "areas alarm states",
            AreaReadyState => "area ready state",
            AllAreasReadyStates => "areas ready states",
            ZoneOmittedState => "zone omitted state",
            SingleZoneState => "zone state",
            AllZonesReadyStates => "zones ready state",
            AllZonesAlarmStates => "zones alarm state",
            AllZonesOpenStates => "zones open state",
            AllZonesTamperStates => "zones tamper state",
            AllZonesResistanceStates => "zones low/high resistance state",
            AllZonesOmittedStates => "zones omitted state",
            AllOutputStates => "output states",
            PollReply => "polling loop",
            AuthorizationRequired => "authorization required",
            AuthenticationAccepted => "authentication accepted",
        }
    }
}

/// Translation list from zone type name to zone type number. Includes the
/// localized names programmed into installer keypads.
const ZONE_TYPE_NAMES: &[(u32, &str)] = &[
    (1, "FINAL"), (2, "EXIT"), (3, "INTRUDER"), (4, "24-HOURS"),
    (5, "SECURITY"), (6, "DUAL"), (7, "ENTRY"), (8, "PUSH-SET"),
    (9, "KEYSWITCH"), (10, "SECURE-FINAL"), (11, "PART-FINAL"), (12, "PART-ENTRY"),
    (13, "PA"), (14, "PA-SILENT"), (15, "PA-DELAY"), (16, "PA-DELAY-SILENT"),
    (17, "LINK"), (18, "SPARE"), (19, "FIRE"), (20, "TAMPER"),
    (21, "BELL-TAMPER"), (22, "BEAM-PAIR"), (23, "BATTERY-LOW"), (24, "LINE-FAIL"),
    (25, "AC-FAIL"), (26, "LOG"), (27, "REMOTE-ACCESS"), (28, "VIDEO"),
    (29, "VIDEO-EXIT"), (30, "INTRUDER-DELAY"), (31, "LOG-DELAY"), (32, "SET-LOG"),
    (33, "CUSTOM-A"), (34, "CUSTOM-B"), (35, "EXITGUARD"), (36, "MASK"),
    (37, "URGENT"), (38, "PA-UNSET"), (39, "KEYSWITCH-RESET"), (40, "BELL-FAIL"),
    (41, "INTR-LOW"), (42, "INTR-HIGH"), (43, "PSU-FAULT"), (47, "VIBRATION"),
    (48, "ATM-1"), (49, "ATM-2"), (50, "ATM-3"), (51, "ATM-4"),
    (52, "ALARM-EXTEND"),
    // Localized keypad names
    (1, "LAATSTE"), (2, "VOLGZONE"), (3, "INBRAAK"), (4, "24-UUR"),
    (6, "INBR.DUBB"), (7, "IN/UIT"), (8, "PULS-AAN"), (9, "SLEUTEL"),
    (10, "SEC/LTSTE"), (11, "DL/LTSTE"), (12, "DL/IN-UIT"), (13, "PANIEK"),
    (14, "PA-STIL"), (15, "PA-VERT."), (16, "PA-VER/ST"), (17, "LINK-ING."),
    (18, "RESERVE"), (19, "BRAND"), (20, "SABOTAGE"), (21, "SIR.-SAB."),
    (22, "BEAMPAAR"), (23, "ACCU-LAAG"), (24, "LIJN-FOUT"), (25, "230VAC"),
    (26, "GEHEUGEN"), (27, "RS-TOEG."), (29, "VIDEOVOLG"), (30, "INBR-VERT"),
    (31, "GEH-VERTR"), (32, "GEH.-ING."), (35, "BEWAKING"), (36, "AFDEK"),
    (38, "PA-UIT"), (39, "SLS-RESET"), (40, "SIR-FOUT"), (41, "INBR-LAAG"),
    (42, "INBR-HOOG"), (43, "PSU-FOUT"), (47, "KLUISDET."), (52, "ALARM-EXT"),
    (4, "24UUR"), (6, "INBR-DUBB"), (7, "IN-UIT"), (10, "SEC-LTSTE"),
    (11, "DL-LTSTE"), (12, "DL-IN-UIT"), (15, "PA-VERT"), (17, "LINK-ING"),
    (21, "SIR-SAB"), (27, "RS-TOEG"), (32, "GEH-ING"), (47, "KLUISDET"),
];

/// Handle for queueing commands with the dispatcher
#[derive(Clone)]
pub struct CommanderHandle {
    tx: Sender<PendingCommand>,
    executing: Arc<AtomicBool>,
}

impl CommanderHandle {
    /// Create the command queue; the receiving end goes to
    /// [`Commander::spawn`]
    pub fn channel() -> (Self, ChannelReceiver<PendingCommand>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (
            Self {
                tx,
                executing: Arc::new(AtomicBool::new(false)),
            },
            rx,
        )
    }

    /// Queue a command line for execution
    pub fn execute(
        &self,
        origin: CommandOrigin,
        line: impl Into<String>,
        reply: impl FnOnce(CommandOutcome) + Send + 'static,
    ) {
        let pending = PendingCommand {
            origin,
            line: line.into(),
            reply: Box::new(reply),
        };
        if self.tx.send(pending).is_err() {
            log::error!("Commander: worker is gone, dropping command");
        }
    }

    /// True while commands are queued or one is executing
    pub fn is_busy(&self) -> bool {
        !self.tx.is_empty() || self.executing.load(Ordering::Relaxed)
    }
}

/// The command dispatcher; owns the worker thread
pub struct Commander {
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Commander {
    /// Spawn the dispatcher worker
    pub fn spawn(
        rx: ChannelReceiver<PendingCommand>,
        handle: CommanderHandle,
        galaxy: Arc<Galaxy>,
        poll: PollHandle,
    ) -> crate::error::Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let worker_shutdown = Arc::clone(&shutdown);

        let thread = std::thread::Builder::new()
            .name("commander".to_string())
            .spawn(move || {
                while !worker_shutdown.load(Ordering::Relaxed) {
                    match rx.recv_timeout(Duration::from_millis(500)) {
                        Ok(pending) => {
                            handle.executing.store(true, Ordering::Relaxed);
                            let outcome =
                                exec_command(&pending.line, pending.origin, &galaxy, &poll);
                            handle.executing.store(false, Ordering::Relaxed);
                            (pending.reply)(outcome);
                        }
                        Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
                        Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
                    }
                }
                log::debug!("Commander thread exited normally");
            })
            .map_err(|e| {
                crate::error::Error::Other(format!("Failed to spawn commander thread: {}", e))
            })?;

        Ok(Self {
            shutdown,
            thread: Some(thread),
        })
    }

    pub fn shutdown(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for Commander {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Determine if `s` is a valid area argument: `0` (all areas), plain
/// decimal 1-32, or letter-block notation `A1`..`D8` mapping to 1-32.
pub fn parse_area(s: &str) -> Option<u32> {
    let bytes = s.as_bytes();
    let value = match bytes.first() {
        Some(b'A') => ascii_number(&bytes[1..]),
        Some(b'B') => ascii_number(&bytes[1..]) + 8,
        Some(b'C') => ascii_number(&bytes[1..]) + 16,
        Some(b'D') => ascii_number(&bytes[1..]) + 24,
        _ => ascii_number(bytes),
    };
    if value > 32 {
        None
    } else {
        Some(value)
    }
}

/// Determine if `s` is a zone type (symbolic name or number 0-99) or a
/// 4-digit zone number (any number above 999).
pub fn parse_zone_or_type(s: &str) -> Option<u32> {
    if s == "0" {
        return Some(0);
    }
    for (number, name) in ZONE_TYPE_NAMES {
        if *name == s {
            return Some(*number);
        }
    }
    // Not in the list; numbers below 100 are types, above 999 zones
    if s.as_bytes().first().is_some_and(|b| b.is_ascii_digit()) {
        let number = ascii_number(s.as_bytes());
        if number < 100 || number > 999 {
            return Some(number);
        }
    }
    None
}

fn ascii_number(s: &[u8]) -> u32 {
    let mut value: u32 = 0;
    for &b in s {
        if b.is_ascii_digit() {
            value = value.wrapping_mul(10).wrapping_add((b - b'0') as u32);
        } else {
            break;
        }
    }
    value
}

/// The default JSON reply to a command: success/failure plus the echoed
/// command text
fn report_exec(success: bool, command: &str) -> CommandOutcome {
    CommandOutcome {
        success,
        item: None,
        text: json!({
            "typeId": ReplyType::Standard.id(),
            "typeDesc": ReplyType::Standard.desc(),
            "success": success as u8,
            "command": command,
            "replyText": "",
        })
        .to_string(),
    }
}

/// The uniform error reply: echoed command plus a short reason
fn command_error(command: &str, reason: &str) -> CommandOutcome {
    CommandOutcome {
        success: false,
        item: None,
        text: json!({
            "typeId": ReplyType::Standard.id(),
            "typeDesc": ReplyType::Standard.desc(),
            "success": 0,
            "command": command,
            "replyText": reason,
        })
        .to_string(),
    }
}

const MISSING_ARGUMENT: &str = "requires an (other) argument!";

fn states_reply(reply_type: ReplyType, key: &str, states: &[u32]) -> String {
    let mut obj = serde_json::Map::new();
    obj.insert("typeId".to_string(), reply_type.id().into());
    obj.insert("typeDesc".to_string(), reply_type.desc().into());
    obj.insert(key.to_string(), json!(states));
    serde_json::Value::Object(obj).to_string()
}

fn bare_array(states: &[u32]) -> String {
    serde_json::to_string(states).unwrap_or_else(|_| "[0]".to_string())
}

/// Parse and execute one command line
fn exec_command(
    line: &str,
    origin: CommandOrigin,
    galaxy: &Galaxy,
    poll: &PollHandle,
) -> CommandOutcome {
    // The command string as received is echoed back in replies
    let echoed = line;

    let mut rest = line;
    let command = match next_token(&mut rest) {
        Some(t) => t.to_uppercase(),
        None => return command_error(echoed, "No such command!"),
    };
    let arg1 = next_token(&mut rest).map(|t| t.to_uppercase());
    let arg2 = next_token(&mut rest).map(|t| t.to_uppercase());
    let arg3 = next_token(&mut rest).map(|t| t.to_uppercase());
    let arg4 = next_token(&mut rest).map(|t| t.to_uppercase());
    let arg5 = next_token(&mut rest).map(|t| t.to_uppercase());
    // Free-text remainder, kept verbatim (zone descriptions)
    let argn = {
        let r = rest.trim_matches([' ', '\t']);
        if r.is_empty() {
            None
        } else {
            Some(r)
        }
    };

    match command.as_str() {
        "HELP" => CommandOutcome {
            success: true,
            item: None,
            text: json!({
                "typeId": ReplyType::Help.id(),
                "typeDesc": ReplyType::Help.desc(),
                "success": 1,
                "command": echoed,
                "helpText": "Commands: HELP, AREA <nr> <action>, ZONE <nr> <action>, \
                             ZONES <state>, OUTPUT <nr> <action> [area], OUTPUT GETALL, \
                             POLL <action> [interval|item], CODE-ALARM <module>",
            })
            .to_string(),
        },
        "AREA" => exec_area(echoed, origin, galaxy, arg1.as_deref(), arg2.as_deref()),
        "ZONE" => exec_zone(
            echoed,
            galaxy,
            arg1.as_deref(),
            arg2.as_deref(),
            arg3.as_deref(),
            arg4.as_deref(),
            arg5.as_deref(),
            argn,
        ),
        "ZONES" => exec_zones(echoed, origin, galaxy, arg1.as_deref()),
        "OUTPUT" => exec_output(
            echoed,
            origin,
            galaxy,
            arg1.as_deref(),
            arg2.as_deref(),
            arg3.as_deref(),
        ),
        "POLL" => exec_poll(echoed, origin, poll, arg1.as_deref(), arg2.as_deref()),
        "CODE-ALARM" => exec_code_alarm(echoed, galaxy, arg1.as_deref()),
        _ => command_error(echoed, "No such command!"),
    }
}

/// Take the next space/tab-delimited token
fn next_token<'a>(rest: &mut &'a str) -> Option<&'a str> {
    let trimmed = rest.trim_start_matches([' ', '\t']);
    if trimmed.is_empty() {
        *rest = trimmed;
        return None;
    }
    let end = trimmed.find([' ', '\t']).unwrap_or(trimmed.len());
    let (token, tail) = trimmed.split_at(end);
    *rest = tail;
    Some(token)
}

/// AREA <nr> <action>
fn exec_area(
    echoed: &str,
    origin: CommandOrigin,
    galaxy: &Galaxy,
    arg1: Option<&str>,
    arg2: Option<&str>,
) -> CommandOutcome {
    let (Some(arg1), Some(arg2)) = (arg1, arg2) else {
        return command_error(echoed, MISSING_ARGUMENT);
    };

    let area = parse_area(arg1);

    let action = match arg2 {
        "UNSET" => Some(AreaAction::Unset),
        "SET" => Some(AreaAction::Set),
        "PARTIAL" => Some(AreaAction::PartSet),
        "RESET" => Some(AreaAction::Reset),
        "ABORT" => Some(AreaAction::AbortSet),
        "FORCE" => Some(AreaAction::ForceSet),
        _ => None,
    };
    if let Some(action) = action {
        let Some(area) = area else {
            return report_exec(false, echoed);
        };
        return report_exec(galaxy.area_action(area, action).is_ok(), echoed);
    }

    match arg2 {
        "STATE" => {
            let Some(area) = area else {
                return report_exec(false, echoed);
            };
            if area == 0 {
                match galaxy.all_areas_armed() {
                    Ok(states) => {
                        let states: Vec<u32> = states.iter().map(|s| *s as u32).collect();
                        all_areas_outcome(origin, ReplyType::AllAreasArmedStates, &states)
                    }
                    Err(_) => report_exec(false, echoed),
                }
            } else {
                match galaxy.area_armed_state(area) {
                    Ok(state) => single_area_outcome(ReplyType::AreaArmedState, state as u32),
                    Err(_) => report_exec(false, echoed),
                }
            }
        }
        "ALARM" => {
            let Some(area) = area else {
                return report_exec(false, echoed);
            };
            match galaxy.all_areas_alarm() {
                Ok(states) => {
                    let states: Vec<u32> = states.iter().map(|s| *s as u32).collect();
                    if area == 0 {
                        all_areas_outcome(origin, ReplyType::AllAreasAlarmStates, &states)
                    } else {
                        single_area_outcome(ReplyType::AreaAlarmState, states[area as usize - 1])
                    }
                }
                Err(_) => report_exec(false, echoed),
            }
        }
        "READY" => {
            let Some(area) = area else {
                return report_exec(false, echoed);
            };
            match galaxy.all_areas_ready() {
                Ok(states) => {
                    let states: Vec<u32> = states.iter().map(|s| *s as u32).collect();
                    if area == 0 {
                        all_areas_outcome(origin, ReplyType::AllAreasReadyStates, &states)
                    } else {
                        single_area_outcome(ReplyType::AreaReadyState, states[area as usize - 1])
                    }
                }
                Err(_) => report_exec(false, echoed),
            }
        }
        _ => command_error(echoed, "No such area action!"),
    }
}

fn all_areas_outcome(origin: CommandOrigin, reply_type: ReplyType, states: &[u32]) -> CommandOutcome {
    if origin.is_poll() {
        CommandOutcome {
            success: true,
            item: Some(PolledItem::Areas),
            text: bare_array(states),
        }
    } else {
        CommandOutcome {
            success: true,
            item: None,
            text: states_reply(reply_type, "areaState", states),
        }
    }
}

fn single_area_outcome(reply_type: ReplyType, state: u32) -> CommandOutcome {
    CommandOutcome {
        success: true,
        item: None,
        text: json!({
            "typeId": reply_type.id(),
            "typeDesc": reply_type.desc(),
            "areaState": state,
        })
        .to_string(),
    }
}

/// ZONE <nr> <action> [...]
#[allow(clippy::too_many_arguments)]
fn exec_zone(
    echoed: &str,
    galaxy: &Galaxy,
    arg1: Option<&str>,
    arg2: Option<&str>,
    arg3: Option<&str>,
    arg4: Option<&str>,
    arg5: Option<&str>,
    argn: Option<&str>,
) -> CommandOutcome {
    let (Some(arg1), Some(arg2)) = (arg1, arg2) else {
        return command_error(echoed, MISSING_ARGUMENT);
    };

    let zone = parse_zone_or_type(arg1);

    match arg2 {
        "UNOMIT" | "OMIT" => {
            let Some(zone) = zone else {
                return report_exec(false, echoed);
            };
            let action = if arg2 == "OMIT" {
                ZoneAction::Omit
            } else {
                ZoneAction::Unomit
            };
            report_exec(galaxy.zone_action(zone, action).is_ok(), echoed)
        }
        "ISOMIT" => {
            let Some(zone) = zone else {
                return report_exec(false, echoed);
            };
            match galaxy.zone_is_omit(zone) {
                Ok(state) => CommandOutcome {
                    success: true,
                    item: None,
                    text: json!({
                        "typeId": ReplyType::ZoneOmittedState.id(),
                        "typeDesc": ReplyType::ZoneOmittedState.desc(),
                        "zoneNumber": zone,
                        "omitState": state as u32,
                    })
                    .to_string(),
                },
                Err(_) => report_exec(false, echoed),
            }
        }
        "STATE" => {
            let Some(zone) = zone else {
                return report_exec(false, echoed);
            };
            match galaxy.zone_state(zone) {
                Ok(state) => CommandOutcome {
                    success: true,
                    item: None,
                    text: json!({
                        "typeId": ReplyType::SingleZoneState.id(),
                        "typeDesc": ReplyType::SingleZoneState.desc(),
                        "zoneNumber": zone,
                        "zoneState": state as u32,
                    })
                    .to_string(),
                },
                Err(_) => report_exec(false, echoed),
            }
        }
        "PARAMETER" => {
            // ZONE <nr> PARAMETER <option> <flag>
            let on = match arg4 {
                Some("ON") => true,
                Some("OFF") => false,
                _ => return command_error(echoed, "invalid ZONE PARAMETER flag!"),
            };
            let program = match arg3 {
                Some("SOAK-TEST") => {
                    if on {
                        ZoneProgram::SoakTestOn
                    } else {
                        ZoneProgram::SoakTestOff
                    }
                }
                Some("PART-SET") => {
                    if on {
                        ZoneProgram::PartSetOn
                    } else {
                        ZoneProgram::PartSetOff
                    }
                }
                _ => return command_error(echoed, "invalid ZONE PARAMETER option!"),
            };
            let Some(zone) = zone else {
                return report_exec(false, echoed);
            };
            report_exec(
                galaxy.set_zone_state(zone, program, 0, 0, None).is_ok(),
                echoed,
            )
        }
        "SET" => {
            // ZONE <nr> SET <state> [<blknum> <type> [desc]]
            let mut area = 0;
            let mut zone_type = 0;
            if let Some(arg4) = arg4 {
                area = match parse_area(arg4) {
                    Some(a) => a,
                    None => return command_error(echoed, "argument 4 must be a valid area!"),
                };
                zone_type = arg5.and_then(parse_zone_or_type).unwrap_or(0);
                if zone_type == 0 || zone_type >= 100 || area == 0 {
                    return command_error(echoed, "invalid argument!");
                }
            }
            let program = match arg3 {
                Some("OPEN") => ZoneProgram::ForceOpen,
                Some("CLOSED") => ZoneProgram::ForceClosed,
                Some("OPEN-CLOSE") => ZoneProgram::ForceOpenAndClose,
                Some("TAMPER") => ZoneProgram::ForceTamper,
                _ => return command_error(echoed, "invalid ZONE SET state!"),
            };
            let Some(zone) = zone else {
                return report_exec(false, echoed);
            };
            report_exec(
                galaxy
                    .set_zone_state(zone, program, area, zone_type, argn)
                    .is_ok(),
                echoed,
            )
        }
        _ => command_error(echoed, "No such zone action!"),
    }
}

/// ZONES <state>
fn exec_zones(
    echoed: &str,
    origin: CommandOrigin,
    galaxy: &Galaxy,
    arg1: Option<&str>,
) -> CommandOutcome {
    let Some(arg1) = arg1 else {
        return command_error(echoed, MISSING_ARGUMENT);
    };

    // The reply typeId is the all-zones base plus the query index
    let (query, reply_type) = match arg1 {
        "READY" => (ZonesQuery::Ready, ReplyType::AllZonesReadyStates),
        "ALARM" => (ZonesQuery::Alarm, ReplyType::AllZonesAlarmStates),
        "OPEN" => (ZonesQuery::Open, ReplyType::AllZonesOpenStates),
        "TAMPER" => (ZonesQuery::Tamper, ReplyType::AllZonesTamperStates),
        "RSTATE" => (ZonesQuery::Resistance, ReplyType::AllZonesResistanceStates),
        "OMITTED" => (ZonesQuery::Omitted, ReplyType::AllZonesOmittedStates),
        _ => return command_error(echoed, "No such zones action!"),
    };

    match galaxy.all_zones(query) {
        Ok(states) => {
            let states: Vec<u32> = states.iter().map(|&b| b as u32).collect();
            if origin.is_poll() {
                CommandOutcome {
                    success: true,
                    item: Some(PolledItem::Zones),
                    text: bare_array(&states),
                }
            } else {
                CommandOutcome {
                    success: true,
                    item: None,
                    text: states_reply(reply_type, "zoneState", &states),
                }
            }
        }
        Err(_) => report_exec(false, echoed),
    }
}

/// OUTPUT GETALL | OUTPUT <nr> <action> [area]
fn exec_output(
    echoed: &str,
    origin: CommandOrigin,
    galaxy: &Galaxy,
    arg1: Option<&str>,
    arg2: Option<&str>,
    arg3: Option<&str>,
) -> CommandOutcome {
    if arg1 == Some("GETALL") {
        return match galaxy.all_outputs() {
            Ok(states) => {
                let states: Vec<u32> = states.iter().map(|&b| b as u32).collect();
                if origin.is_poll() {
                    CommandOutcome {
                        success: true,
                        item: Some(PolledItem::Outputs),
                        text: bare_array(&states),
                    }
                } else {
                    CommandOutcome {
                        success: true,
                        item: None,
                        text: states_reply(ReplyType::AllOutputStates, "outputState", &states),
                    }
                }
            }
            Err(_) => report_exec(false, echoed),
        };
    }

    let (Some(arg1), Some(arg2)) = (arg1, arg2) else {
        return command_error(echoed, MISSING_ARGUMENT);
    };

    // All areas unless specified
    let arg3 = arg3.unwrap_or("0");
    let Some(area) = parse_area(arg3) else {
        return command_error(echoed, "No such area!");
    };

    let on = match arg2 {
        "ON" => true,
        "OFF" => false,
        _ => return command_error(echoed, "No such output action!"),
    };

    let nr = ascii_number(arg1.as_bytes());
    report_exec(galaxy.output_action(nr, on, area).is_ok(), echoed)
}

/// POLL <action> [interval|item]
fn exec_poll(
    echoed: &str,
    origin: CommandOrigin,
    poll: &PollHandle,
    arg1: Option<&str>,
    arg2: Option<&str>,
) -> CommandOutcome {
    let Some(arg1) = arg1 else {
        return command_error(echoed, MISSING_ARGUMENT);
    };

    // Poll registrations are tied to a client session
    let CommandOrigin::Client(session) = origin else {
        return report_exec(false, echoed);
    };

    // ADD and REMOVE explicitly need the item argument
    if matches!(arg1, "ADD" | "REMOVE") && arg2.is_none() {
        return command_error(echoed, MISSING_ARGUMENT);
    }
    let arg2 = arg2.unwrap_or("");

    let item = match arg2 {
        "NONE" => Some(PollItems::NOTHING),
        "AREAS" => Some(PollItems::AREAS),
        "ZONES" => Some(PollItems::ZONES),
        "OUTPUTS" => Some(PollItems::OUTPUTS),
        "ALL" => Some(PollItems::EVERYTHING),
        _ => None,
    };
    // If it was not an item it is the interval
    let interval = if item.is_none() {
        ascii_number(arg2.as_bytes())
    } else {
        0
    };

    match arg1 {
        "OFF" => report_exec(poll.disable(session), echoed),
        "ON" => {
            if interval == 0 {
                report_exec(false, echoed)
            } else {
                poll.set_interval(session, Duration::from_secs(interval as u64));
                report_exec(poll.enable(session), echoed)
            }
        }
        "ADD" => report_exec(
            poll.set_items(session, item.unwrap_or(PollItems::NOTHING)),
            echoed,
        ),
        "REMOVE" => report_exec(
            poll.clear_items(session, item.unwrap_or(PollItems::NOTHING)),
            echoed,
        ),
        "ONCE" => report_exec(poll.one_shot(session), echoed),
        _ => command_error(echoed, "No such poll action!"),
    }
}

/// CODE-ALARM <module>
fn exec_code_alarm(echoed: &str, galaxy: &Galaxy, arg1: Option<&str>) -> CommandOutcome {
    let Some(arg1) = arg1 else {
        return command_error(echoed, MISSING_ARGUMENT);
    };
    let module = match arg1 {
        "TELECOM" => SiaModule::Telecom,
        "RS232" => SiaModule::Rs232,
        "MONITOR" => SiaModule::Monitor,
        "ALL" => SiaModule::All,
        _ => return command_error(echoed, "No such comm. module!"),
    };
    report_exec(galaxy.wrong_code_alarm(module).is_ok(), echoed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_area_decimal() {
        assert_eq!(parse_area("0"), Some(0));
        assert_eq!(parse_area("1"), Some(1));
        assert_eq!(parse_area("32"), Some(32));
        assert_eq!(parse_area("33"), None);
    }

    #[test]
    fn test_parse_area_letter_blocks() {
        assert_eq!(parse_area("A1"), Some(1));
        assert_eq!(parse_area("A8"), Some(8));
        assert_eq!(parse_area("B1"), Some(9));
        assert_eq!(parse_area("C5"), Some(21));
        assert_eq!(parse_area("D8"), Some(32));
        assert_eq!(parse_area("D9"), None);
    }

    #[test]
    fn test_parse_zone_or_type() {
        assert_eq!(parse_zone_or_type("0"), Some(0));
        assert_eq!(parse_zone_or_type("FIRE"), Some(19));
        assert_eq!(parse_zone_or_type("BRAND"), Some(19));
        assert_eq!(parse_zone_or_type("PA-SILENT"), Some(14));
        assert_eq!(parse_zone_or_type("42"), Some(42));
        // 1000 and up is a zone number, not a type
        assert_eq!(parse_zone_or_type("1011"), Some(1011));
        // 100-999 is neither
        assert_eq!(parse_zone_or_type("100"), None);
        assert_eq!(parse_zone_or_type("999"), None);
        assert_eq!(parse_zone_or_type("WHATEVER"), None);
    }

    #[test]
    fn test_next_token_handles_tabs_and_runs() {
        let mut rest = "  AREA\t1 \t SET  trailing words ";
        assert_eq!(next_token(&mut rest), Some("AREA"));
        assert_eq!(next_token(&mut rest), Some("1"));
        assert_eq!(next_token(&mut rest), Some("SET"));
        assert_eq!(next_token(&mut rest), Some("trailing"));
        assert_eq!(next_token(&mut rest), Some("words"));
        assert_eq!(next_token(&mut rest), None);
    }

    #[test]
    fn test_report_exec_shape() {
        let outcome = report_exec(true, "AREA 1 SET");
        let parsed: serde_json::Value = serde_json::from_str(&outcome.text).unwrap();
        assert_eq!(parsed["typeId"], 1);
        assert_eq!(parsed["typeDesc"], "default");
        assert_eq!(parsed["success"], 1);
        assert_eq!(parsed["command"], "AREA 1 SET");
        assert_eq!(parsed["replyText"], "");
    }

    #[test]
    fn test_command_error_shape() {
        let outcome = command_error("area", MISSING_ARGUMENT);
        assert!(!outcome.success);
        let parsed: serde_json::Value = serde_json::from_str(&outcome.text).unwrap();
        assert_eq!(parsed["success"], 0);
        assert_eq!(parsed["command"], "area");
        assert_eq!(parsed["replyText"], "requires an (other) argument!");
    }

    #[test]
    fn test_reply_type_ids_are_contiguous() {
        assert_eq!(ReplyType::Standard.id(), 1);
        assert_eq!(ReplyType::AllZonesReadyStates.id(), 11);
        // The ZONES reply ids are the base plus the query index
        assert_eq!(ReplyType::AllZonesOmittedStates.id(), 16);
        assert_eq!(ReplyType::PollReply.id(), 18);
        assert_eq!(ReplyType::PollReply.desc(), "polling loop");
    }

    #[test]
    fn test_bare_array_format() {
        assert_eq!(bare_array(&[1, 0, 2]), "[1,0,2]");
    }
}
