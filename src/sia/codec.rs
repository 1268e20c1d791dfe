//! SIA DC-03 message codec
//!
//! Decodes the byte stream from the panel into discrete SIA blocks and
//! assembles blocks into complete messages (account id block + event block,
//! plus an ASCII block at SIA level 3 and up). A single read may deliver
//! nothing, a partial frame, one frame or several frames; partial state is
//! kept across calls to [`SiaCodec::feed`].
//!
//! Only enough of the protocol to listen to Galaxy panels is implemented;
//! no other transmitters have been tested.

use crate::sia::block::{
    FunctionCode, SiaBlock, BLOCK_MAX, BLOCK_OVERHEAD, HEADER_FLAG_ACK_REQUEST, HEADER_LENGTH_MASK,
};
use crate::sia::event::{lookup_event_code, EventCode, SiaEvent};
use crate::transport::Transport;

/// Separator between data code packets inside an info block
const PACKET_SEPARATOR: u8 = 0x2F; // '/'

/// Items produced by the decode path.
///
/// `Event` is a complete panel report; the rest are trigger signals for the
/// receiver's send/receive state machine and are only meaningful while a
/// response is outstanding.
#[derive(Debug)]
pub enum Decoded {
    Event(Box<SiaEvent>),
    Ack,
    Reject,
    Configuration,
    Control(Vec<u8>),
    Extended(Vec<u8>),
}

/// Fields of a message under assembly
#[derive(Default)]
struct PartialEvent {
    code: Option<&'static EventCode>,
    date: Option<String>,
    time: Option<String>,
    subscriber_id: Option<u32>,
    area_id: Option<u32>,
    peripheral_id: Option<u32>,
    automated_id: Option<u32>,
    telephone_id: Option<u32>,
    level: Option<u32>,
    value: Option<u32>,
    path: Option<u32>,
    route_group: Option<u32>,
    sub_subscriber: Option<u32>,
    address_number: Option<u32>,
    units: Option<u32>,
    units_type: Option<String>,
    ascii: Option<String>,
}

/// Stateful SIA codec
pub struct SiaCodec {
    /// Input accumulator
    buf: Vec<u8>,
    /// SIA level of the transmitter (autodetected from configuration blocks)
    level: u8,
    /// Remote access code for the login block
    remote_code: String,
    /// Use the alternative acknowledge/reject function codes
    alt_control_blocks: bool,
    /// Account id of the message under assembly
    account_id: i32,
    /// True between the account id block and the end of the message.
    /// While set, the link is receive-only (half-duplex discipline).
    have_account_id: bool,
    /// Fields of the message under assembly
    current: PartialEvent,
    /// Raw copy of the last event block, attached to the finished event
    remember: Option<SiaBlock>,
}

impl SiaCodec {
    pub fn new(remote_code: &str, alt_control_blocks: bool) -> Self {
        if alt_control_blocks {
            log::info!("Using alternative SIA acknowledge and reject blocks");
        }
        Self {
            buf: Vec::with_capacity(BLOCK_MAX * 2),
            level: 2,
            remote_code: remote_code.to_string(),
            alt_control_blocks,
            account_id: -1,
            have_account_id: false,
            current: PartialEvent::default(),
            remember: None,
        }
    }

    /// True while a message is partially received (account id seen but the
    /// event/ASCII blocks not yet). The receiver must not transmit then.
    pub fn mid_message(&self) -> bool {
        self.have_account_id
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    fn set_level(&mut self, level: u8) {
        if level != self.level {
            log::debug!("SIA level autodetect: {}", level);
            self.level = level;
        }
    }

    /// Serialize and send a block, with parity recomputed.
    ///
    /// Returns false on a device write failure.
    pub fn send_block(&self, block: &SiaBlock, port: &mut dyn Transport) -> bool {
        let bytes = block.to_bytes();
        match port.write(&bytes) {
            Ok(n) if n == bytes.len() => true,
            Ok(n) => {
                log::error!(
                    "SendBlock('{}' [0x{:02X}]) failed after sending {}/{} bytes",
                    block.function_code().name(),
                    block.function_code() as u8,
                    n,
                    bytes.len()
                );
                false
            }
            Err(e) => {
                log::error!(
                    "SendBlock('{}' [0x{:02X}]) failed: {}",
                    block.function_code().name(),
                    block.function_code() as u8,
                    e
                );
                false
            }
        }
    }

    /// Send the remote login block with the configured access code
    pub fn send_remote_login(&self, port: &mut dyn Transport) -> bool {
        let block =
            SiaBlock::new(FunctionCode::RemoteLogin, self.remote_code.as_bytes()).with_ack_request();
        self.send_block(&block, port)
    }

    fn send_ack(&self, port: &mut dyn Transport) {
        log::debug!("SIA: sending Acknowledge");
        let fc = if self.alt_control_blocks {
            FunctionCode::AltAcknowledge
        } else {
            FunctionCode::Acknowledge
        };
        self.send_block(&SiaBlock::new(fc, &[]), port);
    }

    fn send_reject(&self, port: &mut dyn Transport) {
        log::debug!("SIA: sending Reject");
        let fc = if self.alt_control_blocks {
            FunctionCode::AltReject
        } else {
            FunctionCode::Reject
        };
        self.send_block(&SiaBlock::new(fc, &[]), port);
    }

    /// Feed received bytes into the accumulator and decode as many blocks as
    /// possible. Acknowledge/reject replies to the panel are written through
    /// `port` as a side effect.
    pub fn feed(&mut self, data: &[u8], port: &mut dyn Transport) -> Vec<Decoded> {
        let mut out = Vec::new();
        self.buf.extend_from_slice(data);

        loop {
            if self.buf.len() < BLOCK_OVERHEAD {
                break;
            }

            let Some(fc) = FunctionCode::from_u8(self.buf[1]) else {
                // Not a valid SIA function code: shift one byte and resync
                log::error!("SIA: unknown function code (0x{:02X})", self.buf[1]);
                self.buf.remove(0);
                continue;
            };

            let block_size = (self.buf[0] & HEADER_LENGTH_MASK) as usize + BLOCK_OVERHEAD;
            if self.buf.len() < block_size {
                break; // wait for more data
            }

            // Column parity check over everything but the parity byte itself
            let mut parity = 0xFFu8;
            for &b in &self.buf[..block_size - 1] {
                parity ^= b;
            }
            if parity != self.buf[block_size - 1] {
                log::error!("SIA: discarding block, invalid column parity");
                self.buf.remove(0);
                // Reject any pending command and tell the panel
                out.push(Decoded::Reject);
                self.send_reject(port);
                continue;
            }

            let header = self.buf[0];
            let message: Vec<u8> = self.buf[2..block_size - 1].to_vec();

            // Keep the raw event block around so the finished event can carry
            // it; account and ASCII blocks do not replace it.
            if fc != FunctionCode::AccountId && fc != FunctionCode::Ascii {
                // Parity zeroed in the stored copy
                self.remember = Some(SiaBlock::from_wire(header, fc, &message, 0));
            }

            self.buf.drain(..block_size);

            let handled = self.decode_block(fc, &message, &mut out);

            // Send an acknowledge or reject in reply when the block asks for
            // one. Response-type blocks never get acknowledged themselves.
            if header & HEADER_FLAG_ACK_REQUEST != 0 {
                match fc {
                    FunctionCode::Reject
                    | FunctionCode::AltReject
                    | FunctionCode::Acknowledge
                    | FunctionCode::AltAcknowledge
                    | FunctionCode::Configuration
                    | FunctionCode::Control
                    | FunctionCode::Extended => {}
                    _ => {
                        if handled {
                            self.send_ack(port);
                        } else {
                            self.send_reject(port);
                        }
                    }
                }
            }
            if !handled {
                log::error!(
                    "SIA: failed to decode data block, function code 0x{:02X}",
                    fc as u8
                );
            }

            // A complete message needs an account id and an event, plus an
            // ASCII block at level 3 and up.
            if self.have_account_id {
                if self.current.code.is_some() && (self.level < 3 || self.current.ascii.is_some()) {
                    out.push(Decoded::Event(Box::new(self.take_event())));
                }
            } else if self.current.code.is_some() || self.current.ascii.is_some() {
                // An event or ASCII block without an account id: too late to
                // attach it to the previous message. This happens once while
                // autodetecting the SIA level.
                log::debug!(
                    "SIA: discarding block for previous level {} message",
                    self.level
                );
                self.current.code = None;
                self.current.ascii = None;
                if self.level < 3 {
                    self.set_level(3);
                }
            }
        }

        // A stalled parse (header byte pointing past everything the line
        // delivers) must not grow the accumulator forever
        if self.buf.len() > BLOCK_MAX * 2 {
            log::error!(
                "SIA: input buffer overrun, discarding {} bytes",
                self.buf.len()
            );
            self.buf.clear();
        }

        out
    }

    /// Decode one parity-checked block. Returns false when the block type is
    /// recognized but not supported (the panel gets a reject if it asked for
    /// an acknowledgement).
    fn decode_block(&mut self, fc: FunctionCode, message: &[u8], out: &mut Vec<Decoded>) -> bool {
        use FunctionCode::*;
        match fc {
            Acknowledge | AltAcknowledge => {
                log::debug!("SIA: received Acknowledge");
                out.push(Decoded::Ack);
                true
            }
            Reject | AltReject => {
                log::debug!("SIA: received Reject");
                out.push(Decoded::Reject);
                true
            }
            Control => {
                out.push(Decoded::Control(message.to_vec()));
                true
            }
            Configuration => {
                // Autodetect the SIA level from an 'ALx' marker
                for w in message.windows(3) {
                    if w[0] == b'A' && w[1] == b'L' && w[2].is_ascii_digit() {
                        let lvl = w[2] - b'0';
                        if lvl > self.level {
                            self.set_level(lvl);
                        }
                    }
                }
                out.push(Decoded::Configuration);
                true
            }
            NewEvent | OldEvent => {
                self.decode_packet(message);
                true
            }
            AccountId => {
                if self.have_account_id {
                    log::debug!(
                        "SIA: received an account id but we already have one ({}), replaced",
                        self.account_id
                    );
                }
                let text = String::from_utf8_lossy(message);
                match text.trim().parse::<i32>() {
                    Ok(id) => {
                        self.account_id = id;
                        self.have_account_id = true;
                        true
                    }
                    Err(_) => {
                        log::error!("SIA: unparsable account id block: {:?}", text);
                        false
                    }
                }
            }
            Ascii => {
                self.current.ascii = Some(String::from_utf8_lossy(message).into_owned());
                true
            }
            Extended => {
                out.push(Decoded::Extended(message.to_vec()));
                true
            }
            EndOfData | Wait | Abort | Res3 | Res4 | Res5 | AckAndStandby | AckAndDisconnect => {
                log::debug!("SIA: ignoring system block '{}'", fc.name());
                true
            }
            Environmental | Program | RemoteLogin | OriginId | ListenIn | VchnRequest
            | VchnFrame | Video => {
                log::debug!("SIA: unsupported block '{}'", fc.name());
                false
            }
        }
    }

    /// Decode the data code packets of an info block.
    ///
    /// Packet grammar: `TTAAAA*UUUUUUuu` where TT is a two letter event code,
    /// AAAA an optional address number, and `*UUUUUUuu` an optional units
    /// number with type. Modifier packets (`da`, `ti`, `id`, `ri`, `pi`,
    /// `ai`, `ph`, `lv`, `va`, `pt`, `rg`, `ss`) act on the packets that
    /// follow them within the same block. Packets are separated by '/'.
    ///
    /// Galaxy panels send address numbers in base 10.
    fn decode_packet(&mut self, packet: &[u8]) {
        let mut p = packet;

        while p.len() >= 2 {
            let code = [p[0], p[1]];
            p = &p[2..];

            match &code {
                b"da" => {
                    // daMM-DD-YY
                    if p.len() >= 8 {
                        let month = atoi(&p[0..2]);
                        let day = atoi(&p[3..5]);
                        let year = atoi(&p[6..8]);
                        p = &p[8..];
                        self.current.date = Some(format!("{:02}-{:02}-{:02}", month, day, year));
                    } else {
                        log::error!("SIA: failed to decode date modifier");
                        p = skip_to_separator(p);
                    }
                    p = skip_separator(p);
                }
                b"ti" => {
                    // tiHH:MM[:SS] - seconds and the colons are optional
                    if p.len() >= 4 {
                        let hours = atoi(&p[0..2]);
                        p = &p[2..];
                        if p.first() == Some(&b':') {
                            p = &p[1..];
                        }
                        let minutes = atoi(&p[0..2.min(p.len())]);
                        p = &p[2.min(p.len())..];
                        let mut seconds = 0;
                        if !p.is_empty() && p[0] != PACKET_SEPARATOR {
                            if p.first() == Some(&b':') {
                                p = &p[1..];
                            }
                            seconds = atoi(&p[0..2.min(p.len())]);
                            p = &p[2.min(p.len())..];
                        }
                        p = skip_separator(p);
                        self.current.time =
                            Some(format!("{:02}:{:02}:{:02}", hours, minutes, seconds));
                    } else {
                        log::error!("SIA: failed to decode time modifier");
                        p = skip_separator(skip_to_separator(p));
                    }
                }
                b"id" => self.current.subscriber_id = Some(take_number(&mut p, 4)),
                b"ri" => self.current.area_id = Some(take_number(&mut p, 4)),
                b"pi" => self.current.peripheral_id = Some(take_number(&mut p, 4)),
                b"ai" => self.current.automated_id = Some(take_number(&mut p, 4)),
                b"ph" => self.current.telephone_id = Some(take_number(&mut p, 4)),
                b"lv" => self.current.level = Some(take_number(&mut p, 4)),
                b"va" => self.current.value = Some(take_number(&mut p, 4)),
                b"pt" => self.current.path = Some(take_number(&mut p, 3)),
                b"rg" => self.current.route_group = Some(take_number(&mut p, 2)),
                b"ss" => self.current.sub_subscriber = Some(take_number(&mut p, 4)),
                _ => {
                    let letters = String::from_utf8_lossy(&code).into_owned();
                    let Some(event) = lookup_event_code(&letters) else {
                        // Unknown event or modifier: log and skip the packet
                        log::error!("SIA: failed to decode packet: {}", letters);
                        p = skip_separator(skip_to_separator(p));
                        continue;
                    };
                    self.current.code = Some(event);

                    // AAAA*UUUUUUuu
                    let mut address = Vec::new();
                    let mut units = Vec::new();
                    let mut units_type = Vec::new();
                    if !p.is_empty() && p[0] != PACKET_SEPARATOR {
                        while address.len() < 4
                            && !p.is_empty()
                            && p[0] != PACKET_SEPARATOR
                            && p[0] != b'*'
                        {
                            address.push(p[0]);
                            p = &p[1..];
                        }
                        if p.first() == Some(&b'*') {
                            p = &p[1..];
                            while units.len() < 6
                                && !p.is_empty()
                                && p[0] != PACKET_SEPARATOR
                                && p[0].is_ascii_digit()
                            {
                                units.push(p[0]);
                                p = &p[1..];
                            }
                            while units_type.len() < 2 && !p.is_empty() && p[0] != PACKET_SEPARATOR
                            {
                                units_type.push(p[0]);
                                p = &p[1..];
                            }
                            self.current.units = Some(atoi(&units));
                            self.current.units_type =
                                Some(String::from_utf8_lossy(&units_type).into_owned());
                        }
                    }
                    p = skip_separator(p);

                    let nr = atoi(&address);
                    self.current.address_number = if nr == 0 { None } else { Some(nr) };
                }
            }
        }
    }

    /// Move the finished message out and reset for the next one
    fn take_event(&mut self) -> SiaEvent {
        let current = std::mem::take(&mut self.current);
        let raw = self
            .remember
            .take()
            .unwrap_or_else(|| SiaBlock::from_wire(0, FunctionCode::NewEvent, &[], 0));
        let account_id = self.account_id;
        self.account_id = -1;
        self.have_account_id = false;

        SiaEvent {
            raw,
            account_id,
            // take_event is only called when a code is present
            code: current.code.unwrap_or(&crate::sia::event::EVENT_CODES[0]),
            date: current.date,
            time: current.time,
            subscriber_id: current.subscriber_id,
            area_id: current.area_id,
            peripheral_id: current.peripheral_id,
            automated_id: current.automated_id,
            telephone_id: current.telephone_id,
            level: current.level,
            value: current.value,
            path: current.path,
            route_group: current.route_group,
            sub_subscriber: current.sub_subscriber,
            address_number: current.address_number,
            units: current.units,
            units_type: current.units_type,
            ascii: current.ascii,
        }
    }
}

/// C-style atoi: parse leading ASCII digits, anything else is 0
fn atoi(s: &[u8]) -> u32 {
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

/// Consume up to `max` characters of a numeric modifier field, honouring the
/// packet separator, then consume the separator itself if present.
fn take_number(p: &mut &[u8], max: usize) -> u32 {
    let mut field = Vec::new();
    if !p.is_empty() {
        field.push(p[0]);
        *p = &p[1..];
    }
    while field.len() < max && !p.is_empty() && p[0] != PACKET_SEPARATOR {
        field.push(p[0]);
        *p = &p[1..];
    }
    if p.first() == Some(&PACKET_SEPARATOR) {
        *p = &p[1..];
    }
    atoi(&field)
}

fn skip_to_separator(mut p: &[u8]) -> &[u8] {
    while !p.is_empty() && p[0] != PACKET_SEPARATOR {
        p = &p[1..];
    }
    p
}

fn skip_separator(p: &[u8]) -> &[u8] {
    if p.first() == Some(&PACKET_SEPARATOR) {
        &p[1..]
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;

    /// Transport that records writes and never has anything to read
    struct RecordingPort {
        written: Vec<u8>,
    }

    impl RecordingPort {
        fn new() -> Self {
            Self { written: Vec::new() }
        }
    }

    impl Transport for RecordingPort {
        fn read(&mut self, _buffer: &mut [u8]) -> Result<usize> {
            Ok(0)
        }
        fn write(&mut self, data: &[u8]) -> Result<usize> {
            self.written.extend_from_slice(data);
            Ok(data.len())
        }
        fn flush(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn frames(blocks: &[SiaBlock]) -> Vec<u8> {
        blocks.iter().flat_map(|b| b.to_bytes()).collect()
    }

    #[test]
    fn test_decode_complete_message() {
        let mut codec = SiaCodec::new("543210", false);
        let mut port = RecordingPort::new();

        let bytes = frames(&[
            SiaBlock::new(FunctionCode::AccountId, b"1234"),
            SiaBlock::new(FunctionCode::NewEvent, b"ri1/id42/BA1011"),
        ]);

        let decoded = codec.feed(&bytes, &mut port);
        assert_eq!(decoded.len(), 1);
        let Decoded::Event(ev) = &decoded[0] else {
            panic!("expected an event, got {:?}", decoded[0]);
        };
        assert_eq!(ev.account_id, 1234);
        assert_eq!(ev.code.letters, "BA");
        assert_eq!(ev.area_id, Some(1));
        assert_eq!(ev.subscriber_id, Some(42));
        assert_eq!(ev.address_number, Some(1011));
        assert_eq!(ev.peripheral_id, None);
        assert!(!codec.mid_message());
    }

    #[test]
    fn test_partial_frames_across_reads() {
        let mut codec = SiaCodec::new("543210", false);
        let mut port = RecordingPort::new();

        let bytes = frames(&[
            SiaBlock::new(FunctionCode::AccountId, b"42"),
            SiaBlock::new(FunctionCode::NewEvent, b"CL1"),
        ]);

        // Feed one byte at a time; only the final byte completes the message
        let mut total = Vec::new();
        for &b in &bytes[..bytes.len() - 1] {
            total.extend(codec.feed(&[b], &mut port));
        }
        assert!(total.is_empty());
        // Mid-message between the account block and the event block
        assert!(codec.mid_message());

        let decoded = codec.feed(&bytes[bytes.len() - 1..], &mut port);
        assert_eq!(decoded.len(), 1);
        assert!(matches!(decoded[0], Decoded::Event(_)));
    }

    #[test]
    fn test_corrupt_parity_discards_frame() {
        let mut codec = SiaCodec::new("543210", false);
        let mut port = RecordingPort::new();

        let mut bytes = frames(&[SiaBlock::new(FunctionCode::AccountId, b"1234")]);
        let last = bytes.len() - 2;
        bytes[last] ^= 0xA5; // corrupt one message byte

        let decoded = codec.feed(&bytes, &mut port);
        // No event, no account id remembered
        assert!(!decoded.iter().any(|d| matches!(d, Decoded::Event(_))));
        assert!(!codec.mid_message());
        // A reject went back to the panel
        assert!(!port.written.is_empty());

        // Decoding resumes at the next valid frame
        let good = frames(&[
            SiaBlock::new(FunctionCode::AccountId, b"7"),
            SiaBlock::new(FunctionCode::NewEvent, b"OP5"),
        ]);
        let decoded = codec.feed(&good, &mut port);
        assert!(decoded.iter().any(|d| matches!(d, Decoded::Event(_))));
    }

    #[test]
    fn test_garbage_resync() {
        let mut codec = SiaCodec::new("543210", false);
        let mut port = RecordingPort::new();

        let mut bytes = vec![0x00, 0x01, 0xFE];
        bytes.extend(frames(&[
            SiaBlock::new(FunctionCode::AccountId, b"9"),
            SiaBlock::new(FunctionCode::NewEvent, b"BR3"),
        ]));

        let decoded = codec.feed(&bytes, &mut port);
        assert!(decoded.iter().any(|d| matches!(d, Decoded::Event(_))));
    }

    #[test]
    fn test_control_and_extended_triggers() {
        let mut codec = SiaCodec::new("543210", false);
        let mut port = RecordingPort::new();

        let bytes = frames(&[
            SiaBlock::new(FunctionCode::Control, b"SA*1"),
            SiaBlock::new(FunctionCode::Extended, b"ZS1*abc"),
        ]);
        let decoded = codec.feed(&bytes, &mut port);
        assert!(matches!(&decoded[0], Decoded::Control(m) if m == b"SA*1"));
        assert!(matches!(&decoded[1], Decoded::Extended(m) if m == b"ZS1*abc"));
    }

    #[test]
    fn test_event_block_is_acknowledged() {
        let mut codec = SiaCodec::new("543210", false);
        let mut port = RecordingPort::new();

        let bytes = frames(&[SiaBlock::new(FunctionCode::NewEvent, b"JT").with_ack_request()]);
        codec.feed(&bytes, &mut port);

        // Acknowledge block: [0x00] [0x38] [parity]
        assert_eq!(port.written.len(), 3);
        assert_eq!(port.written[1], FunctionCode::Acknowledge as u8);
    }

    #[test]
    fn test_alt_acknowledge_selected_by_config() {
        let mut codec = SiaCodec::new("543210", true);
        let mut port = RecordingPort::new();

        let bytes = frames(&[SiaBlock::new(FunctionCode::NewEvent, b"JT").with_ack_request()]);
        codec.feed(&bytes, &mut port);
        assert_eq!(port.written[1], FunctionCode::AltAcknowledge as u8);
    }

    #[test]
    fn test_level_autodetect_from_configuration() {
        let mut codec = SiaCodec::new("543210", false);
        let mut port = RecordingPort::new();

        assert_eq!(codec.level(), 2);
        let bytes = frames(&[SiaBlock::new(FunctionCode::Configuration, b"AL4B1")]);
        let decoded = codec.feed(&bytes, &mut port);
        assert!(matches!(decoded[0], Decoded::Configuration));
        assert_eq!(codec.level(), 4);
    }

    #[test]
    fn test_level3_message_needs_ascii_block() {
        let mut codec = SiaCodec::new("543210", false);
        let mut port = RecordingPort::new();
        codec.feed(
            &frames(&[SiaBlock::new(FunctionCode::Configuration, b"AL3")]),
            &mut port,
        );

        let decoded = codec.feed(
            &frames(&[
                SiaBlock::new(FunctionCode::AccountId, b"55"),
                SiaBlock::new(FunctionCode::NewEvent, b"ti10:42:00/BA1011"),
            ]),
            &mut port,
        );
        // Incomplete until the ASCII block arrives
        assert!(decoded.is_empty());
        assert!(codec.mid_message());

        let decoded = codec.feed(
            &frames(&[SiaBlock::new(FunctionCode::Ascii, b"INTRUDER ZONE A")]),
            &mut port,
        );
        assert_eq!(decoded.len(), 1);
        let Decoded::Event(ev) = &decoded[0] else {
            panic!("expected event");
        };
        assert_eq!(ev.ascii.as_deref(), Some("INTRUDER ZONE A"));
        assert_eq!(ev.time.as_deref(), Some("10:42:00"));
    }

    #[test]
    fn test_date_and_units_decoding() {
        let mut codec = SiaCodec::new("543210", false);
        let mut port = RecordingPort::new();

        let decoded = codec.feed(
            &frames(&[
                SiaBlock::new(FunctionCode::AccountId, b"1"),
                SiaBlock::new(FunctionCode::NewEvent, b"da03-15-25/YB12*55se"),
            ]),
            &mut port,
        );
        let Decoded::Event(ev) = &decoded[0] else {
            panic!("expected event");
        };
        assert_eq!(ev.date.as_deref(), Some("03-15-25"));
        assert_eq!(ev.code.letters, "YB");
        assert_eq!(ev.address_number, Some(12));
        assert_eq!(ev.units, Some(55));
        assert_eq!(ev.units_type.as_deref(), Some("se"));
    }

    #[test]
    fn test_roundtrip_preserves_identity() {
        // Encoding a block and decoding the same bytes yields an event with
        // identical account id, letter code and optional-field flags.
        let mut codec = SiaCodec::new("543210", false);
        let mut port = RecordingPort::new();

        let bytes = frames(&[
            SiaBlock::new(FunctionCode::AccountId, b"8899"),
            SiaBlock::new(FunctionCode::OldEvent, b"ri17/CG4002"),
        ]);
        let decoded = codec.feed(&bytes, &mut port);
        let Decoded::Event(ev) = &decoded[0] else {
            panic!("expected event");
        };
        assert_eq!(ev.account_id, 8899);
        assert_eq!(ev.code.letters, "CG");
        assert_eq!(ev.area_id, Some(17));
        assert!(ev.date.is_none());
        assert!(ev.subscriber_id.is_none());
    }
}
