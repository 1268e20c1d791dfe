//! SIA data block framing
//!
//! Wire format: `[HEADER] [FUNCTION CODE] [MESSAGE...] [PARITY]`
//!
//! The header byte packs the message length (bits 0-5), an
//! acknowledge-request flag (bit 6) and a reverse-channel flag (bit 7).
//! Parity is the XOR of 0xFF, the header, the function code and every
//! message byte, and is recomputed on every send.

/// Max number of bytes in the message part of a SIA block
pub const DATABLOCK_MAX: usize = 63;
/// Number of overhead bytes in a SIA block (header + function code + parity)
pub const BLOCK_OVERHEAD: usize = 3;
/// Max number of bytes in a complete SIA block
pub const BLOCK_MAX: usize = DATABLOCK_MAX + BLOCK_OVERHEAD;

/// Bitmask to get the message length from the block header
pub const HEADER_LENGTH_MASK: u8 = 0x3F;
/// Header flag: the sender expects an acknowledge block in reply
pub const HEADER_FLAG_ACK_REQUEST: u8 = 0x40;
/// Header flag: reverse channel enable
pub const HEADER_FLAG_REVERSE_CHANNEL: u8 = 0x80;

/// The number of times to keep trying to send a block
pub const BLOCK_RETRY_MAX: u32 = 4;

/// How long to wait for a block acknowledgement before timing out.
///
/// The SIA specification allows 2.5 seconds; that budget is for telephone
/// lines, so a direct serial link uses a little less.
pub const BLOCK_ACK_TIMEOUT: std::time::Duration = std::time::Duration::from_millis(2000);

/// SIA function codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FunctionCode {
    // System blocks
    EndOfData = 0x30,
    Wait = 0x31,
    Abort = 0x32,
    Res3 = 0x33,
    Res4 = 0x34,
    Res5 = 0x35,
    AckAndStandby = 0x36,
    AckAndDisconnect = 0x37,
    Acknowledge = 0x38,
    AltAcknowledge = 0x08,
    Reject = 0x39,
    AltReject = 0x09,
    // Info blocks
    Control = 0x43,
    Environmental = 0x45,
    NewEvent = 0x4E,
    OldEvent = 0x4F,
    Program = 0x50,
    // Special blocks
    Configuration = 0x40,
    RemoteLogin = 0x3F,
    AccountId = 0x23,
    OriginId = 0x26,
    Ascii = 0x41,
    Extended = 0x58,
    ListenIn = 0x4C,
    VchnRequest = 0x56,
    VchnFrame = 0x76,
    Video = 0x49,
}

impl FunctionCode {
    /// Decode a wire byte into a function code
    pub fn from_u8(byte: u8) -> Option<Self> {
        use FunctionCode::*;
        Some(match byte {
            0x30 => EndOfData,
            0x31 => Wait,
            0x32 => Abort,
            0x33 => Res3,
            0x34 => Res4,
            0x35 => Res5,
            0x36 => AckAndStandby,
            0x37 => AckAndDisconnect,
            0x38 => Acknowledge,
            0x08 => AltAcknowledge,
            0x39 => Reject,
            0x09 => AltReject,
            0x43 => Control,
            0x45 => Environmental,
            0x4E => NewEvent,
            0x4F => OldEvent,
            0x50 => Program,
            0x40 => Configuration,
            0x3F => RemoteLogin,
            0x23 => AccountId,
            0x26 => OriginId,
            0x41 => Ascii,
            0x58 => Extended,
            0x4C => ListenIn,
            0x56 => VchnRequest,
            0x76 => VchnFrame,
            0x49 => Video,
            _ => return None,
        })
    }

    /// Human readable name of the function code
    pub fn name(&self) -> &'static str {
        use FunctionCode::*;
        match self {
            EndOfData => "End of data",
            Wait => "Wait",
            Abort => "Abort",
            Res3 | Res4 | Res5 => "Reserved",
            AckAndStandby => "Acknowledge and stand-by",
            AckAndDisconnect => "Acknowledge and disconnect",
            Acknowledge | AltAcknowledge => "Acknowledge",
            Reject | AltReject => "Reject",
            Control => "Control",
            Environmental => "Environmental",
            NewEvent => "New event",
            OldEvent => "Old event",
            Program => "Program",
            Configuration => "Configuration",
            RemoteLogin => "Remote login",
            AccountId => "Account ID",
            OriginId => "Origin ID",
            Ascii => "ASCII",
            Extended => "Extended data",
            ListenIn => "Listen in",
            VchnRequest => "Video channel request",
            VchnFrame => "Video channel frame data",
            Video => "Video",
        }
    }
}

/// A single SIA data block
#[derive(Debug, Clone)]
pub struct SiaBlock {
    header: u8,
    function_code: FunctionCode,
    message: Vec<u8>,
    parity: u8,
}

impl SiaBlock {
    /// Create a block with the given function code and message.
    ///
    /// Messages longer than [`DATABLOCK_MAX`] are truncated.
    pub fn new(function_code: FunctionCode, message: &[u8]) -> Self {
        let len = message.len().min(DATABLOCK_MAX);
        let mut block = Self {
            header: len as u8,
            function_code,
            message: message[..len].to_vec(),
            parity: 0xFF,
        };
        block.generate_parity();
        block
    }

    /// Set the acknowledge-request flag
    pub fn with_ack_request(mut self) -> Self {
        self.header |= HEADER_FLAG_ACK_REQUEST;
        self.generate_parity();
        self
    }

    /// Build a block from already-validated wire fields (used by the codec)
    pub(crate) fn from_wire(header: u8, function_code: FunctionCode, message: &[u8], parity: u8) -> Self {
        Self {
            header,
            function_code,
            message: message.to_vec(),
            parity,
        }
    }

    pub fn function_code(&self) -> FunctionCode {
        self.function_code
    }

    pub fn header(&self) -> u8 {
        self.header
    }

    /// Message length from the header length bits
    pub fn message_len(&self) -> usize {
        (self.header & HEADER_LENGTH_MASK) as usize
    }

    pub fn message(&self) -> &[u8] {
        &self.message
    }

    pub fn ack_requested(&self) -> bool {
        self.header & HEADER_FLAG_ACK_REQUEST != 0
    }

    pub fn parity(&self) -> u8 {
        self.parity
    }

    /// Compute the column parity over header, function code and message
    pub fn compute_parity(&self) -> u8 {
        let mut parity = 0xFFu8;
        parity ^= self.header;
        parity ^= self.function_code as u8;
        for &b in &self.message[..self.message_len().min(self.message.len())] {
            parity ^= b;
        }
        parity
    }

    /// (Re)generate the parity field
    pub fn generate_parity(&mut self) {
        self.parity = self.compute_parity();
    }

    /// Serialize the block to wire bytes, with parity recomputed
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(BLOCK_OVERHEAD + self.message_len());
        out.push(self.header);
        out.push(self.function_code as u8);
        out.extend_from_slice(&self.message[..self.message_len().min(self.message.len())]);
        out.push(self.compute_parity());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_layout() {
        let block = SiaBlock::new(FunctionCode::Control, b"SA1*1");
        let bytes = block.to_bytes();
        // [len] [0x43] [S A 1 * 1] [parity]
        assert_eq!(bytes.len(), 5 + BLOCK_OVERHEAD);
        assert_eq!(bytes[0], 5);
        assert_eq!(bytes[1], 0x43);
        assert_eq!(&bytes[2..7], b"SA1*1");
    }

    #[test]
    fn test_parity_covers_all_fields() {
        let block = SiaBlock::new(FunctionCode::AccountId, b"1234");
        let mut parity = 0xFFu8;
        parity ^= 4; // header: length 4, no flags
        parity ^= 0x23;
        for b in b"1234" {
            parity ^= b;
        }
        assert_eq!(block.to_bytes().last().copied(), Some(parity));
    }

    #[test]
    fn test_ack_request_flag_in_header_and_parity() {
        let plain = SiaBlock::new(FunctionCode::Control, b"SA");
        let flagged = SiaBlock::new(FunctionCode::Control, b"SA").with_ack_request();
        assert!(!plain.ack_requested());
        assert!(flagged.ack_requested());
        assert_eq!(flagged.header() & HEADER_LENGTH_MASK, 2);
        // Parity must change with the header bit
        assert_ne!(plain.parity(), flagged.parity());
    }

    #[test]
    fn test_message_truncated_at_max() {
        let long = vec![b'x'; 100];
        let block = SiaBlock::new(FunctionCode::Ascii, &long);
        assert_eq!(block.message_len(), DATABLOCK_MAX);
        assert_eq!(block.to_bytes().len(), BLOCK_MAX);
    }

    #[test]
    fn test_function_code_round_trip() {
        for byte in 0u8..=0xFF {
            if let Some(fc) = FunctionCode::from_u8(byte) {
                assert_eq!(fc as u8, byte);
            }
        }
        assert!(FunctionCode::from_u8(0x00).is_none());
        assert!(FunctionCode::from_u8(0x5A).is_none());
    }
}
