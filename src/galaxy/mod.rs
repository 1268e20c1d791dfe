//! High-level panel operations
//!
//! [`Galaxy`] is a synchronous facade over the asynchronous receiver: each
//! operation formats the command string for its wire grammar, queues it with
//! a per-call completion channel, and blocks until the receiver's callback
//! delivers the reply. Concurrent calls are safe; they serialize through
//! the receiver's FIFO.
//!
//! The per-operation wire grammars and reply offsets are contract with the
//! panel firmware and are kept exactly as observed (`SA`, `SB`, `OR`, `ZS`
//! and `EV` command families).

pub mod numbering;

use crate::error::{Error, Result};
use crate::receiver::{ReceiverHandle, TransmitReply};
use crate::sia::block::FunctionCode;
use numbering::{is_output, is_zone, merge_first, merge_second, ZsLayout};
use std::time::Duration;

/// Upper bound on how long a facade call waits for its callback. The
/// receiver always completes an entry well within this (retries included);
/// the timeout only guards against the engine dying mid-exchange.
const REPLY_WAIT: Duration = Duration::from_secs(60);

/// Galaxy area actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum AreaAction {
    Unset = 0,
    Set = 1,
    PartSet = 2,
    Reset = 3,
    AbortSet = 4,
    ForceSet = 5,
}

/// Galaxy area armed states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum AreaArmedState {
    Unset = 0,
    Set = 1,
    PartSet = 2,
}

impl AreaArmedState {
    fn from_wire(b: u8) -> Self {
        match b {
            b'1' => AreaArmedState::Set,
            b'2' => AreaArmedState::PartSet,
            _ => AreaArmedState::Unset,
        }
    }
}

/// Galaxy area ready states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum AreaReadyState {
    Unset = 0,
    Set = 1,
    PartSet = 2,
    ReadyToSet = 3,
    TimeLocked = 4,
}

impl AreaReadyState {
    fn from_wire(b: u8) -> Self {
        match b {
            b'1' => AreaReadyState::Set,
            b'2' => AreaReadyState::PartSet,
            b'3' => AreaReadyState::ReadyToSet,
            b'4' => AreaReadyState::TimeLocked,
            _ => AreaReadyState::Unset,
        }
    }
}

/// Galaxy area alarm states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum AreaAlarmState {
    Normal = 0,
    Alarm = 1,
    ResetRequired = 2,
}

impl AreaAlarmState {
    fn from_wire(b: u8) -> Self {
        match b {
            b'1' => AreaAlarmState::Alarm,
            b'2' => AreaAlarmState::ResetRequired,
            _ => AreaAlarmState::Normal,
        }
    }
}

/// Galaxy zone actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ZoneAction {
    Unomit = 0,
    Omit = 1,
}

/// Galaxy zone states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ZoneState {
    TamperSc = 0,
    LowR = 1,
    Closed = 2,
    HighR = 3,
    Open = 4,
    TamperOc = 5,
    Masked = 6,
    TamperCv = 7,
    Fault = 8,
}

impl ZoneState {
    fn from_u32(v: u32) -> Option<Self> {
        Some(match v {
            0 => ZoneState::TamperSc,
            1 => ZoneState::LowR,
            2 => ZoneState::Closed,
            3 => ZoneState::HighR,
            4 => ZoneState::Open,
            5 => ZoneState::TamperOc,
            6 => ZoneState::Masked,
            7 => ZoneState::TamperCv,
            8 => ZoneState::Fault,
            _ => return None,
        })
    }
}

/// Panel SIA communication modules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiaModule {
    Telecom,
    Rs232,
    Monitor,
    All,
}

impl SiaModule {
    /// Module selector suffix for the EV command family; empty selects all
    fn wire(&self) -> &'static str {
        match self {
            SiaModule::Telecom => "0",
            SiaModule::Rs232 => "1",
            SiaModule::Monitor => "2",
            SiaModule::All => "",
        }
    }
}

/// Zone programming operations for `set_zone_state`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ZoneProgram {
    SoakTestOff = 0,
    SoakTestOn = 1,
    PartSetOff = 2,
    PartSetOn = 3,
    ForceOpen = 4,
    ForceClosed = 5,
    ForceOpenAndClose = 6,
    ForceTamper = 7,
}

impl ZoneProgram {
    fn is_force(&self) -> bool {
        matches!(
            self,
            ZoneProgram::ForceOpen
                | ZoneProgram::ForceClosed
                | ZoneProgram::ForceOpenAndClose
                | ZoneProgram::ForceTamper
        )
    }
}

/// All-zones state query variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZonesQuery {
    Ready,
    Alarm,
    Open,
    Tamper,
    Resistance,
    Omitted,
    Masked,
    Fault,
}

impl ZonesQuery {
    fn layout(&self) -> ZsLayout {
        match self {
            ZonesQuery::Ready => numbering::ZS_READY,
            ZonesQuery::Alarm => numbering::ZS_ALARM,
            ZonesQuery::Open => numbering::ZS_OPEN,
            ZonesQuery::Tamper => numbering::ZS_TAMPER,
            ZonesQuery::Resistance => numbering::ZS_RSTATE,
            ZonesQuery::Omitted => numbering::ZS_OMITTED,
            ZonesQuery::Masked => numbering::ZS_MASKED,
            ZonesQuery::Fault => numbering::ZS_FAULT,
        }
    }
}

/// Synchronous facade over the receiver engine
pub struct Galaxy {
    receiver: ReceiverHandle,
    dip8: bool,
}

impl Galaxy {
    pub fn new(receiver: ReceiverHandle, dip8: bool) -> Self {
        Self { receiver, dip8 }
    }

    /// True only when `nr` is a valid 4-digit zone number for this panel
    pub fn is_zone(&self, nr: u32) -> bool {
        is_zone(nr, self.dip8)
    }

    /// True only when `nr` is a valid 4-digit output number
    pub fn is_output(&self, nr: u32) -> bool {
        is_output(nr)
    }

    /// Queue a command and block until the receiver reports its outcome
    fn transact(&self, fc: FunctionCode, command: &[u8]) -> Result<Vec<u8>> {
        let (tx, rx) = crossbeam_channel::bounded(1);
        self.receiver.send(
            fc,
            command,
            Box::new(move |reply| {
                let _ = tx.send(reply);
            }),
        );
        match rx.recv_timeout(REPLY_WAIT) {
            Ok(TransmitReply::Data(data)) => Ok(data),
            Ok(TransmitReply::Failed) => Err(Error::CommandFailed),
            Ok(TransmitReply::LoginRejected) => Err(Error::LoginRejected),
            Ok(TransmitReply::LoginTimeout) => Err(Error::LoginTimeout),
            Err(_) => Err(Error::CommandFailed),
        }
    }

    /// Perform an area action on area 1-32, or on all areas (0)
    pub fn area_action(&self, area: u32, action: AreaAction) -> Result<()> {
        if area > 32 {
            return Err(Error::InvalidParameter(format!("area {}", area)));
        }
        let cmd = area_action_command(area, action);
        self.transact(FunctionCode::Control, cmd.as_bytes())?;
        Ok(())
    }

    /// Get the armed state of a single area (1-32)
    pub fn area_armed_state(&self, area: u32) -> Result<AreaArmedState> {
        if area == 0 || area > 32 {
            return Err(Error::InvalidParameter(format!("area {}", area)));
        }
        let reply = self.transact(FunctionCode::Control, format!("SA{}", area).as_bytes())?;
        // Reply: 'SAx*y'
        let idx = if area < 10 { 4 } else { 5 };
        let b = *reply
            .get(idx)
            .ok_or(Error::MalformedReply("area state reply too short"))?;
        Ok(AreaArmedState::from_wire(b))
    }

    /// Get the armed state of all 32 areas
    pub fn all_areas_armed(&self) -> Result<[AreaArmedState; 32]> {
        let reply = self.transact(FunctionCode::Control, b"SA")?;
        // Reply: 'SA*' followed by 32 state digits
        let digits = reply
            .get(3..35)
            .ok_or(Error::MalformedReply("areas armed reply too short"))?;
        let mut state = [AreaArmedState::Unset; 32];
        for (s, &b) in state.iter_mut().zip(digits) {
            *s = AreaArmedState::from_wire(b);
        }
        Ok(state)
    }

    /// Get the alarm state of all 32 areas
    pub fn all_areas_alarm(&self) -> Result<[AreaAlarmState; 32]> {
        let reply = self.transact(FunctionCode::Control, b"SA91")?;
        // Reply: 'SA91*' followed by 32 state digits
        let digits = reply
            .get(5..37)
            .ok_or(Error::MalformedReply("areas alarm reply too short"))?;
        let mut state = [AreaAlarmState::Normal; 32];
        for (s, &b) in state.iter_mut().zip(digits) {
            *s = AreaAlarmState::from_wire(b);
        }
        Ok(state)
    }

    /// Get the ready state of all 32 areas (Galaxy V4.00 and up)
    pub fn all_areas_ready(&self) -> Result<[AreaReadyState; 32]> {
        let reply = self.transact(FunctionCode::Control, b"SA92")?;
        // Reply: 'SA92*' followed by 32 state digits
        let digits = reply
            .get(5..37)
            .ok_or(Error::MalformedReply("areas ready reply too short"))?;
        let mut state = [AreaReadyState::Unset; 32];
        for (s, &b) in state.iter_mut().zip(digits) {
            *s = AreaReadyState::from_wire(b);
        }
        Ok(state)
    }

    /// Omit or un-omit a zone (4-digit number) or zone type (1-100)
    pub fn zone_action(&self, zone: u32, action: ZoneAction) -> Result<()> {
        if !self.is_zone(zone) && !(1..=100).contains(&zone) {
            return Err(Error::InvalidParameter(format!("zone {}", zone)));
        }
        let cmd = format!("SB{}*{}", zone, action as u32);
        self.transact(FunctionCode::Control, cmd.as_bytes())?;
        Ok(())
    }

    /// Get the omit state of a zone
    pub fn zone_is_omit(&self, zone: u32) -> Result<ZoneAction> {
        if !self.is_zone(zone) {
            return Err(Error::InvalidParameter(format!("zone {}", zone)));
        }
        let reply = self.transact(FunctionCode::Control, format!("SB{}", zone).as_bytes())?;
        // Reply: 'SBxxxx*y'
        match reply.get(7) {
            Some(b'1') => Ok(ZoneAction::Omit),
            Some(_) => Ok(ZoneAction::Unomit),
            None => Err(Error::MalformedReply("zone omit reply too short")),
        }
    }

    /// Get the state of a single zone
    pub fn zone_state(&self, zone: u32) -> Result<ZoneState> {
        if !self.is_zone(zone) {
            return Err(Error::InvalidParameter(format!("zone {}", zone)));
        }
        let reply = self.transact(FunctionCode::Extended, format!("ZS{}", zone).as_bytes())?;
        // Reply: 'ZSxxxx*s'
        let digits = reply
            .get(7..)
            .ok_or(Error::MalformedReply("zone state reply too short"))?;
        ZoneState::from_u32(ascii_number(digits))
            .ok_or(Error::MalformedReply("unknown zone state value"))
    }

    /// Switch an output by 4-digit number, by type (1-100, restricted to
    /// `area` unless 0) or all outputs at once (`nr` 0)
    pub fn output_action(&self, nr: u32, on: bool, area: u32) -> Result<()> {
        let cmd = output_action_command(nr, on, area)?;
        self.transact(FunctionCode::Control, &cmd)?;
        Ok(())
    }

    /// Get the state of all outputs; each bit of the 32-byte buffer is one
    /// output, two RIOs per byte
    pub fn all_outputs(&self) -> Result<[u8; 32]> {
        let reply = self.transact(FunctionCode::Control, b"OR1000")?;
        // Reply: 'OR1000*' followed by 32 state bytes
        let bytes = reply
            .get(7..39)
            .ok_or(Error::MalformedReply("outputs reply too short"))?;
        let mut state = [0u8; 32];
        state.copy_from_slice(bytes);
        Ok(state)
    }

    /// Get one of the all-zones state bitmaps; each bit of the 65-byte
    /// buffer is one zone, one RIO per byte.
    ///
    /// Every query spans two wire sub-requests; when the first fails the
    /// second is not attempted.
    pub fn all_zones(&self, query: ZonesQuery) -> Result<[u8; 65]> {
        let layout = query.layout();
        let mut state = [0u8; 65];

        let first = self.transact(FunctionCode::Extended, layout.first.as_bytes())?;
        if !merge_first(&mut state, &first, layout.first_base, self.dip8) {
            return Err(Error::MalformedReply("zones state reply too short"));
        }

        let second = self.transact(FunctionCode::Extended, layout.second.as_bytes())?;
        if !merge_second(&mut state, &second, layout.second_base) {
            return Err(Error::MalformedReply("zones state reply too short"));
        }

        Ok(state)
    }

    /// Program a zone flag or force a (virtual) zone state.
    ///
    /// `zone` may be a zone type (1-100) or 0 (all zones) only for the
    /// flag programs; the force programs need a real zone number. `area`
    /// and `zone_type` tag a forced zone and are used together or not at
    /// all; `desc` (up to 16 characters) additionally needs both.
    pub fn set_zone_state(
        &self,
        zone: u32,
        program: ZoneProgram,
        area: u32,
        zone_type: u32,
        desc: Option<&str>,
    ) -> Result<()> {
        let cmd = set_zone_state_command(zone, program, area, zone_type, desc, self.dip8)?;
        self.transact(FunctionCode::Extended, cmd.as_bytes())?;
        Ok(())
    }

    /// Reprocess `nr` (1-1000, or 0 for all) events for the given module
    pub fn reprocess_events(&self, nr: u32, module: SiaModule) -> Result<()> {
        let nr = if nr > 1000 { 0 } else { nr };
        let cmd = format!("EV{}*{}", nr, module.wire());
        self.transact(FunctionCode::Extended, cmd.as_bytes())?;
        Ok(())
    }

    /// Flush all events for the given module
    pub fn flush_events(&self, module: SiaModule) -> Result<()> {
        let cmd = format!("EV*{}", module.wire());
        self.transact(FunctionCode::Extended, cmd.as_bytes())?;
        Ok(())
    }

    /// Get the number of events the given module still has to process
    pub fn check_events(&self, module: SiaModule) -> Result<u32> {
        let cmd = format!("EV{}", module.wire());
        let reply = self.transact(FunctionCode::Extended, cmd.as_bytes())?;
        // Reply: 'EVx*y'
        let digits = reply
            .get(2..)
            .ok_or(Error::MalformedReply("event count reply too short"))?;
        Ok(ascii_number(digits))
    }

    /// Generate a wrong-code alarm on the given module
    pub fn wrong_code_alarm(&self, module: SiaModule) -> Result<()> {
        let cmd = format!("EV20000*{}", module.wire());
        self.transact(FunctionCode::Extended, cmd.as_bytes())?;
        Ok(())
    }
}

/// Wire string for an area action: `SA<blknum>*<action>`, or `SA*<action>`
/// for all areas
pub(crate) fn area_action_command(area: u32, action: AreaAction) -> String {
    if area == 0 {
        format!("SA*{}", action as u32)
    } else {
        format!("SA{}*{}", area, action as u32)
    }
}

/// Wire payload for an output action.
///
/// Outputs addressed by 4-digit number are switched through the OR1000/
/// OR1001 mask writes: a 34- (first two lines) or 32-byte (last two lines)
/// buffer of 0x01 fillers with one mask byte selecting the output bit.
/// The byte position arithmetic, including the 2-byte hole between the
/// on-board and external RIOs, is panel wire contract.
pub(crate) fn output_action_command(nr: u32, on: bool, area: u32) -> Result<Vec<u8>> {
    if is_output(nr) {
        let line = 1 + ((nr / 1000).wrapping_sub(1) & 3);
        let rio = ((nr - line * 1000) / 10) & 15;
        let op = 1 + ((nr - line * 1000 - rio * 10 - 1) & 3);
        let three_digit = ((line - 1) << 6) + (rio << 2) + op;

        let output_bit = 1u8 << (op - 1);
        let mask = output_bit << 4;
        let value = if on { mask | output_bit } else { mask };

        let mut cmd: Vec<u8>;
        let pos;
        if three_digit < 129 {
            cmd = b"OR1000*".to_vec();
            cmd.extend(std::iter::repeat(1u8).take(34));
            let mut p = 7 + rio as usize;
            if line > 1 {
                p += 16;
            }
            if !(line == 1 && rio < 2) {
                p += 2; // 2 byte hole between onboard and external RIOs
            }
            pos = p;
        } else {
            cmd = b"OR1001*".to_vec();
            cmd.extend(std::iter::repeat(1u8).take(32));
            let mut p = 7 + rio as usize;
            if line > 3 {
                p += 16;
            }
            pos = p;
        }
        cmd[pos] = value;
        Ok(cmd)
    } else if (1..=100).contains(&nr) {
        // By type, optionally restricted to one area
        if area > 32 {
            return Err(Error::InvalidParameter(format!("area {}", area)));
        }
        let cmd = if area == 0 {
            format!("OR{}*{}", nr, on as u32)
        } else {
            format!("OR{}*{}G{}", nr, on as u32, area)
        };
        Ok(cmd.into_bytes())
    } else if nr == 0 {
        // All outputs
        if area > 32 {
            return Err(Error::InvalidParameter(format!("area {}", area)));
        }
        let cmd = if area == 0 {
            format!("OR*{}", on as u32)
        } else {
            format!("OR*{}G{}", on as u32, area)
        };
        Ok(cmd.into_bytes())
    } else {
        Err(Error::InvalidParameter(format!("output {}", nr)))
    }
}

/// Wire string for a zone programming command:
/// `ZS<zone>*<prg>[<blknum><type>[<desc>]]`
pub(crate) fn set_zone_state_command(
    zone: u32,
    program: ZoneProgram,
    area: u32,
    zone_type: u32,
    desc: Option<&str>,
    dip8: bool,
) -> Result<String> {
    if program.is_force() {
        if !is_zone(zone, dip8) {
            return Err(Error::InvalidParameter(format!("zone {}", zone)));
        }
        // area and zone_type are used together or not at all
        let (area, zone_type, desc) = if area == 0 || zone_type == 0 {
            (0, 0, None)
        } else {
            (area, zone_type, desc)
        };
        if area != 0 {
            match desc {
                Some(desc) => {
                    let desc: String = desc.chars().take(16).collect();
                    Ok(format!(
                        "ZS{}*{}{:02}{:02}{}",
                        zone, program as u32, area, zone_type, desc
                    ))
                }
                None => Ok(format!(
                    "ZS{}*{}{:02}{:02}",
                    zone, program as u32, area, zone_type
                )),
            }
        } else {
            Ok(format!("ZS{}*{}", zone, program as u32))
        }
    } else {
        if zone > 100 && !is_zone(zone, dip8) {
            return Err(Error::InvalidParameter(format!("zone {}", zone)));
        }
        if zone == 0 {
            Ok(format!("ZS*{}", program as u32))
        } else {
            Ok(format!("ZS{}*{}", zone, program as u32))
        }
    }
}

/// Parse leading ASCII digits (C strtol semantics, base 10, no sign)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_action_wire_strings() {
        // Selected area: "SA<blknum>*<action>"
        assert_eq!(area_action_command(1, AreaAction::Set), "SA1*1");
        assert_eq!(area_action_command(32, AreaAction::Unset), "SA32*0");
        assert_eq!(area_action_command(7, AreaAction::ForceSet), "SA7*5");
        // All areas: "SA*<action>"
        assert_eq!(area_action_command(0, AreaAction::Reset), "SA*3");
        assert_eq!(area_action_command(0, AreaAction::AbortSet), "SA*4");
    }

    #[test]
    fn test_output_action_by_type_and_all() {
        assert_eq!(output_action_command(5, true, 0).unwrap(), b"OR5*1");
        assert_eq!(output_action_command(5, false, 3).unwrap(), b"OR5*0G3");
        assert_eq!(output_action_command(0, true, 0).unwrap(), b"OR*1");
        assert_eq!(output_action_command(0, false, 12).unwrap(), b"OR*0G12");
        assert!(output_action_command(0, true, 33).is_err());
    }

    #[test]
    fn test_output_action_by_number_first_block() {
        // Output 1001: line 1, RIO 0, output 1 -> mask byte at offset 7
        let cmd = output_action_command(1001, true, 0).unwrap();
        assert_eq!(&cmd[..7], b"OR1000*");
        assert_eq!(cmd.len(), 7 + 34);
        assert_eq!(cmd[7], 0x10 | 0x01);
        assert!(cmd[8..].iter().all(|&b| b == 1));

        // Off keeps the mask but clears the output bit
        let cmd = output_action_command(1001, false, 0).unwrap();
        assert_eq!(cmd[7], 0x10);
    }

    #[test]
    fn test_output_action_by_number_line2_hole() {
        // Output 2012: line 2, RIO 1, output 2.
        // Offset 7 + rio(1) + line>1(16) + hole(2) = 26
        let cmd = output_action_command(2012, true, 0).unwrap();
        assert_eq!(&cmd[..7], b"OR1000*");
        assert_eq!(cmd[26], 0x20 | 0x02);
    }

    #[test]
    fn test_output_action_by_number_second_block() {
        // Output 3011: line 3, RIO 1, output 1 -> OR1001 block, offset 8
        let cmd = output_action_command(3011, true, 0).unwrap();
        assert_eq!(&cmd[..7], b"OR1001*");
        assert_eq!(cmd.len(), 7 + 32);
        assert_eq!(cmd[8], 0x10 | 0x01);
    }

    #[test]
    fn test_set_zone_state_flag_programs() {
        assert_eq!(
            set_zone_state_command(0, ZoneProgram::SoakTestOn, 0, 0, None, false).unwrap(),
            "ZS*1"
        );
        assert_eq!(
            set_zone_state_command(1011, ZoneProgram::PartSetOff, 0, 0, None, false).unwrap(),
            "ZS1011*2"
        );
        // Zone types are allowed for flag programs
        assert_eq!(
            set_zone_state_command(19, ZoneProgram::SoakTestOff, 0, 0, None, false).unwrap(),
            "ZS19*0"
        );
    }

    #[test]
    fn test_set_zone_state_force_programs() {
        assert_eq!(
            set_zone_state_command(1011, ZoneProgram::ForceOpen, 0, 0, None, false).unwrap(),
            "ZS1011*4"
        );
        assert_eq!(
            set_zone_state_command(1011, ZoneProgram::ForceTamper, 3, 19, None, false).unwrap(),
            "ZS1011*70319"
        );
        assert_eq!(
            set_zone_state_command(1011, ZoneProgram::ForceClosed, 3, 19, Some("HALLWAY"), false)
                .unwrap(),
            "ZS1011*50319HALLWAY"
        );
        // Partial area/type tagging is dropped as a pair
        assert_eq!(
            set_zone_state_command(1011, ZoneProgram::ForceOpen, 3, 0, Some("X"), false).unwrap(),
            "ZS1011*4"
        );
        // Force programs need a real zone
        assert!(set_zone_state_command(19, ZoneProgram::ForceOpen, 0, 0, None, false).is_err());
    }

    #[test]
    fn test_module_wire_selectors() {
        assert_eq!(SiaModule::Telecom.wire(), "0");
        assert_eq!(SiaModule::Rs232.wire(), "1");
        assert_eq!(SiaModule::Monitor.wire(), "2");
        assert_eq!(SiaModule::All.wire(), "");
    }

    #[test]
    fn test_ascii_number() {
        assert_eq!(ascii_number(b"123*"), 123);
        assert_eq!(ascii_number(b"0"), 0);
        assert_eq!(ascii_number(b"x12"), 0);
        assert_eq!(ascii_number(b""), 0);
    }

    #[test]
    fn test_state_parsers() {
        assert_eq!(AreaArmedState::from_wire(b'0'), AreaArmedState::Unset);
        assert_eq!(AreaArmedState::from_wire(b'1'), AreaArmedState::Set);
        assert_eq!(AreaArmedState::from_wire(b'2'), AreaArmedState::PartSet);
        assert_eq!(AreaReadyState::from_wire(b'3'), AreaReadyState::ReadyToSet);
        assert_eq!(AreaReadyState::from_wire(b'4'), AreaReadyState::TimeLocked);
        assert_eq!(AreaAlarmState::from_wire(b'2'), AreaAlarmState::ResetRequired);
        assert_eq!(ZoneState::from_u32(8), Some(ZoneState::Fault));
        assert_eq!(ZoneState::from_u32(9), None);
    }
}
