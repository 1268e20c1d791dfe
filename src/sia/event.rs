//! Decoded SIA events
//!
//! A [`SiaEvent`] is one complete panel report: an account block followed by
//! an event block (and an ASCII block at SIA level 3 and up), decoded from
//! the data code packet grammar. Optional modifier fields are `Option`s;
//! a field is only meaningful when it is `Some`.
//!
//! [`EVENT_CODES`] is the table of all two-letter event codes the decoder
//! understands. The table contents are wire contract with the panel and are
//! not derived from anything else in this crate.

use crate::sia::block::SiaBlock;
use serde::Serialize;

/// What the address number of an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AddressKind {
    Unused,
    Zone,
    Area,
    User,
    Door,
    DealerId,
    Expander,
    Line,
    Relay,
    Point,
    Printer,
    MfrDefined,
}

impl AddressKind {
    /// Label used in the JSON encoding of an event
    pub fn label(&self) -> &'static str {
        match self {
            AddressKind::Unused => "Unused",
            AddressKind::Zone => "Zone",
            AddressKind::Area => "Area",
            AddressKind::User => "User",
            AddressKind::Door => "Door",
            AddressKind::DealerId => "Dealer ID",
            AddressKind::Expander => "Expander",
            AddressKind::Line => "Line",
            AddressKind::Relay => "Relay",
            AddressKind::Point => "Point",
            AddressKind::Printer => "Printer",
            AddressKind::MfrDefined => "Manufacturer defined",
        }
    }
}

/// One entry in the event code table
#[derive(Debug)]
pub struct EventCode {
    /// SIA 2-letter code
    pub letters: &'static str,
    /// SIA code name
    pub name: &'static str,
    /// SIA code description
    pub desc: &'static str,
    /// What the address field refers to for this code
    pub address: AddressKind,
}

const fn ec(
    letters: &'static str,
    name: &'static str,
    desc: &'static str,
    address: AddressKind,
) -> EventCode {
    EventCode {
        letters,
        name,
        desc,
        address,
    }
}

/// Look up a 2-letter event code
pub fn lookup_event_code(letters: &str) -> Option<&'static EventCode> {
    EVENT_CODES.iter().find(|e| e.letters == letters)
}

/// A single decoded SIA event
#[derive(Debug, Clone)]
pub struct SiaEvent {
    /// The raw event data block (parity zeroed)
    pub raw: SiaBlock,
    /// The account number (always present)
    pub account_id: i32,
    /// The event code
    pub code: &'static EventCode,
    /// Date the event took place (MM-DD-YY), from the `da` modifier
    pub date: Option<String>,
    /// Time the event took place (HH:MM:SS), from the `ti` modifier
    pub time: Option<String>,
    /// Subscriber (user) number, from the `id` modifier
    pub subscriber_id: Option<u32>,
    /// Area (partition) number, from the `ri` modifier
    pub area_id: Option<u32>,
    /// Physical device number, from the `pi` modifier
    pub peripheral_id: Option<u32>,
    /// Timer or function id, from the `ai` modifier
    pub automated_id: Option<u32>,
    /// Index of the telephone number used, from the `ph` modifier
    pub telephone_id: Option<u32>,
    /// Quantitative or qualitative level, from the `lv` modifier
    pub level: Option<u32>,
    /// Numerical value associated with the event, from the `va` modifier
    pub value: Option<u32>,
    /// Communication path number, from the `pt` modifier
    pub path: Option<u32>,
    /// Failed path grouping, from the `rg` modifier
    pub route_group: Option<u32>,
    /// User category number, from the `ss` modifier
    pub sub_subscriber: Option<u32>,
    /// Address number from the data packet (`None` when absent or zero)
    pub address_number: Option<u32>,
    /// Units number and type, from the `*UUUUUUuu` packet suffix
    pub units: Option<u32>,
    pub units_type: Option<String>,
    /// Text from an ASCII block (SIA level 3 and up)
    pub ascii: Option<String>,
}

pub static EVENT_CODES: [EventCode; 221] = [
    ec("AR", "AR restoral", "AC power has been restored", AddressKind::Unused),
    ec("AT", "AC trouble", "AC power has failed", AddressKind::Unused),
    ec("BA", "Burglary alarm", "Burglary zone has been violated while armed", AddressKind::Zone),
    ec("BB", "Burglary bypass", "Burglary zone has been bypassed", AddressKind::Zone),
    ec("BC", "Burglary cancel", "Alarm has been canceled", AddressKind::User),
    ec("BH", "Burglary alarm restoral", "Alarm condition eliminated", AddressKind::Zone),
    ec("BJ", "Burglary trouble restoral", "Trouble condition eliminated", AddressKind::Zone),
    ec("BR", "Burglary restoral", "Alarm/trouble condition eliminated", AddressKind::Zone),
    ec("BS", "Burglary supervisory", "Unsafe intrusion detection system condition", AddressKind::Zone),
    ec("BT", "Burglary trouble", "Burglary trouble condition was activated", AddressKind::Zone),
    ec("BU", "Burglary unbypass", "Zone bypass has been removed", AddressKind::Zone),
    ec("BV", "Burglary verified", "More than 3 Burglary zones has been triggered", AddressKind::Zone),
    ec("BX", "Burglary test", "Burglary zone activated during testing", AddressKind::Zone),
    ec("CA", "Automatic closing", "System armed automatically", AddressKind::Area),
    ec("CE", "Closing extend", "Extended closing time", AddressKind::User),
    ec("CF", "Forced closing", "System armed, zones not ready", AddressKind::User),
    ec("CG", "Close area", "System has been partially armed", AddressKind::User),
    ec("CI", "Fail to close", "An area has not been armed at the end of the closing window", AddressKind::User),
    ec("CJ", "Late close", "An area was armed after the closing window", AddressKind::User),
    ec("CK", "Early close", "An area was armed before the closing window", AddressKind::User),
    ec("CL", "Closing report", "System armed", AddressKind::User),
    ec("CP", "Automatic closing", "System armed automatically", AddressKind::User),
    ec("CR", "Recent closing", "An alarm occurred within 5 minutes after the system was armed", AddressKind::Unused),
    ec("CS", "Closing switch", "System was armed by keyswitch", AddressKind::Zone),
    ec("CT", "Late to open", "System was not disarmed on time", AddressKind::Area),
    ec("CW", "Force armed", "Header for force armed sesssion, force point msg. may follow", AddressKind::Area),
    ec("CZ", "Point closing", "A point (a opposed to a whole area or account) has closed/armed", AddressKind::Zone),
    ec("DC", "Access closed", "Access to all users prohibited", AddressKind::Door),
    ec("DD", "Access denied", "Access denied, unknown code", AddressKind::Door),
    ec("DF", "Door forced", "Door opened without access request", AddressKind::Door),
    ec("DG", "Access granted", "Door access granted", AddressKind::Door),
    ec("DK", "Access lockout", "Door access denied, known code", AddressKind::Door),
    ec("DO", "Access open", "Door access to authorised users allowed", AddressKind::Door),
    ec("DR", "Door restoral", "Door access alarm/trouble condition eliminated", AddressKind::Door),
    ec("DS", "Door station", "Identifies door for next report", AddressKind::Door),
    ec("DT", "Access trouble", "Access system trouble", AddressKind::Unused),
    ec("DU", "Dealer ID", "Zone description gives dealer ID #", AddressKind::DealerId),
    ec("EA", "Exit alarm", "An exit zone remained violated at the end of the exit delay period", AddressKind::Zone),
    ec("EE", "Exit error", "An exit zone remained violated at the end of the exit delay period", AddressKind::User),
    ec("ER", "Expansion restoral", "Expansion device trouble eliminated", AddressKind::Expander),
    ec("ET", "Expansion trouble", "Expansion device trouble", AddressKind::Expander),
    ec("FA", "Fire alarm", "Fire condition detected", AddressKind::Zone),
    ec("FB", "Fire bypass", "Zone has been bypassed", AddressKind::Zone),
    ec("FH", "Fire alarm restore", "Alarm condition eliminated", AddressKind::Zone),
    ec("FI", "Fire test begin", "The transmitter area's fire test has begun", AddressKind::Area),
    ec("FJ", "Fire trouble restore", "Trouble condition eliminated", AddressKind::Zone),
    ec("FK", "Fire test end", "The transmitter area's fire test has ended", AddressKind::Area),
    ec("FR", "Fire restoral", "Alarm/trouble condition has been eliminated", AddressKind::Zone),
    ec("FS", "Fire supervisory", "Unsafe fire detection system condition", AddressKind::Zone),
    ec("FT", "Fire trouble", "Zone disabled by fault", AddressKind::Zone),
    ec("FU", "Fire unbypass", "Bypass has been removed", AddressKind::Zone),
    ec("FX", "Fire test", "Fire zone activated during test", AddressKind::Zone),
    ec("FY", "Missing fire trouble", "A fire point is now logically missing", AddressKind::Zone),
    ec("GA", "Gas alarm", "Gas alarm condition detected", AddressKind::Zone),
    ec("GB", "Gas bypass", "Zone has been bypassed", AddressKind::Zone),
    ec("GH", "Gas alarm restore", "Alarm condition eliminated", AddressKind::Zone),
    ec("GJ", "Gas trouble restore", "Trouble condition eliminated", AddressKind::Zone),
    ec("GR", "Gas alarm/trouble restore", "Alarm/trouble condition has been eliminated", AddressKind::Zone),
    ec("GS", "Gas supervisory", "Unsafe gas detection system condition", AddressKind::Zone),
    ec("GT", "Gas trouble", "Zone disabled by fault", AddressKind::Zone),
    ec("GU", "Gas unbypass", "Bypass has been removed", AddressKind::Zone),
    ec("GX", "Gas test gas", "Zone activated during test", AddressKind::Zone),
    ec("HA", "Hold-up alarm", "Silent alarm, user under duress", AddressKind::Zone),
    ec("HB", "Hold-up bypass", "Zone has been bypassed", AddressKind::Zone),
    ec("HH", "Hold-up alarm restoral", "Alarm condition eliminated", AddressKind::Zone),
    ec("HJ", "Hold-up trouble restoral", "Trouble condition eliminated", AddressKind::Zone),
    ec("HR", "Hold-up restoral", "Alarm/trouble condition eliminated", AddressKind::Zone),
    ec("HS", "Hold-up supervisory", "Unsafe hold-up system condition", AddressKind::Zone),
    ec("HT", "Hold-up trouble", "Zone disable by fault", AddressKind::Zone),
    ec("HU", "Hold-up unbypass", "Bypass has been removed", AddressKind::Zone),
    ec("JA", "User code tamper", "Too many unsuccessfull attempts made to enter a user ID", AddressKind::Area),
    ec("JD", "Date changed", "The date was changed in the transmitter/receiver", AddressKind::User),
    ec("JH", "Holiday changed", "The transmitters holiday schedule has been changed", AddressKind::User),
    ec("JL", "Log threshold", "The transmitters log memory has reached its threshold level", AddressKind::Unused),
    ec("JO", "Log overflow", "The transmitters log memory has overflowed", AddressKind::Unused),
    ec("JR", "Schedule execute", "An automatic scheduled event was executed", AddressKind::Area),
    ec("JS", "Schedule change", "An automatic schedule was changed", AddressKind::Area),
    ec("JT", "Time changed", "The time was changed in the tranmitter/receiver", AddressKind::User),
    ec("JV", "User code change", "A user's code has been changed", AddressKind::User),
    ec("JX", "User code delete", "A user's code has been removed", AddressKind::User),
    ec("KA", "Heat alarm", "High temperature detected on premise", AddressKind::Zone),
    ec("KB", "Heat bypass", "Zone has been bypassed", AddressKind::Zone),
    ec("KH", "Heat alarm restore", "Alarm condition eliminated", AddressKind::Zone),
    ec("KJ", "Heat trouble restore", "Trouble condition eliminated", AddressKind::Zone),
    ec("KR", "Heat restoral", "Alarm/trouble condition eliminated", AddressKind::Zone),
    ec("KS", "Heat supervisory", "Unsafe heat detection system condition", AddressKind::Zone),
    ec("KT", "Heat trouble", "Zone disabled by fault", AddressKind::Zone),
    ec("KU", "Heat unbypass", "Bypass has been removed", AddressKind::Zone),
    ec("LB", "Local program", "Begin local programming", AddressKind::Unused),
    ec("LD", "Local program denied", "Access code incorrect", AddressKind::Unused),
    ec("LE", "Listen-in ended", "The listen-in session has been terminated", AddressKind::Unused),
    ec("LF", "Listen-in begin", "The listen-in session with the receiver has begun", AddressKind::Unused),
    ec("LR", "Phone line resoral", "Phone line restored to service", AddressKind::Line),
    ec("LS", "Local program", "Local programming successfull", AddressKind::Unused),
    ec("LT", "Phone line trouble", "Phone line report", AddressKind::Line),
    ec("LU", "Local program fail", "Local programming unsuccessfull", AddressKind::Unused),
    ec("LX", "Local program ended", "A local programming session has been terminated", AddressKind::Unused),
    ec("MA", "Medical alarm", "Emergency assistance request", AddressKind::Zone),
    ec("MB", "Medical bypass", "Zone has been bypassed", AddressKind::Zone),
    ec("MH", "Medical alarm restore", "Alarm condition eliminated", AddressKind::Zone),
    ec("MJ", "Medical trouble restore", "Trouble condition eliminated", AddressKind::Zone),
    ec("MR", "Medical restoral", "Alarm/trouble condition eliminated", AddressKind::Zone),
    ec("MS", "Medical supervisory", "Unsafe system condition exists", AddressKind::Zone),
    ec("MT", "Medical trouble", "Zone disabled by fault", AddressKind::Zone),
    ec("MU", "Medical unbypass", "Bypass has been removed", AddressKind::Zone),
    ec("NA", "No activity", "There has been no activity for a programmed amount of time", AddressKind::Unused),
    ec("NF", "Force perimeter arm", "Some zones/points not ready", AddressKind::Area),
    ec("NL", "Perimeter armed", "An area has been perimeter armed", AddressKind::Area),
    ec("OA", "Automatic opening", "System has disarmed automatically", AddressKind::Area),
    ec("OC", "Cancel report", "Untyped zone cancel", AddressKind::User),
    ec("OG", "Open area", "System has been partially disarmed", AddressKind::Area),
    ec("OI", "Fail to open", "An area has not been armed at the end of the opening window", AddressKind::Area),
    ec("OJ", "Late open", "An area was disarmed after the opening window", AddressKind::User),
    ec("OK", "Early open", "An area was disarmed before the opening window", AddressKind::User),
    ec("OP", "Opening report", "Account was disarmed", AddressKind::User),
    ec("OR", "Disarm from alarm", "Account in alarm was reset/disarmed", AddressKind::User),
    ec("OS", "Opening keyswitch", "Account has been disarmed by keyswitch zone", AddressKind::Zone),
    ec("OT", "Late to close", "System was not armed on time", AddressKind::User),
    ec("OZ", "Point opening", "A point, rather then a full area or account was disarmed", AddressKind::Zone),
    ec("PA", "Panic alarm", "Emergency assistance request, manually activated", AddressKind::Zone),
    ec("PB", "Panic bypass", "Panic zone has been bypassed", AddressKind::Zone),
    ec("PH", "Panic alarm restore", "Alarm condition eliminated", AddressKind::Zone),
    ec("PJ", "Panic trouble restore", "Trouble condition eliminated", AddressKind::Zone),
    ec("PR", "Panic restoral", "Alarm/trouble condition eliminated", AddressKind::Zone),
    ec("PS", "Panic Supervisory", "Unsafe system condition exists", AddressKind::Zone),
    ec("PT", "Panic trouble", "Zone disabled by fault", AddressKind::Zone),
    ec("PU", "Panic unbypass", "Panic zone bypass has been removed", AddressKind::Zone),
    ec("QA", "Emergency alarm", "Emergency assistance request, manually activated", AddressKind::Zone),
    ec("QB", "Emergency bypass", "Zone has been bypassed", AddressKind::Zone),
    ec("QH", "Emergency alarm restore", "Alarm condition eliminated", AddressKind::Zone),
    ec("QJ", "Emergency trouble restore", "Trouble condition eliminated", AddressKind::Zone),
    ec("QR", "Emergency restoral", "Alarm/trouble condition eliminated", AddressKind::Zone),
    ec("QS", "Emergency Supervisory", "Unsafe system condition exists", AddressKind::Zone),
    ec("QT", "Emergency trouble", "Zone disabled by fault", AddressKind::Zone),
    ec("QU", "Emergency unbypass", "Zone bypass has been removed", AddressKind::Zone),
    ec("RA", "Remote programmer call failed", "Transmitter failed to communicate with the remote programmer", AddressKind::Unused),
    ec("RB", "Remote program begin", "Remote programming session initiated", AddressKind::Unused),
    ec("RC", "Relay close", "The relay specified in the address field (optional) has energised", AddressKind::Relay),
    ec("RD", "Remote program denied", "Access passcode incorrect", AddressKind::Unused),
    ec("RN", "Remote reset", "Transmitter was reset via a remote programmer", AddressKind::Unused),
    ec("RO", "Relay open", "The relay specified in the address field (optional) has de-energised", AddressKind::Relay),
    ec("RP", "Automatic test", "Automatic communication test report", AddressKind::Unused),
    ec("RR", "Power up", "System lost power, is now restored", AddressKind::Unused),
    ec("RS", "Remote program success", "Remote programming successful", AddressKind::Unused),
    ec("RT", "Data lost", "Dailer data lost, transmission error", AddressKind::Line),
    ec("RU", "Remote program fail", "Remote programming unsuccessful", AddressKind::Unused),
    ec("RX", "Manual test", "Manual communication test report", AddressKind::User),
    ec("SA", "Sprinkler alarm", "Sprinkler flow condition exists", AddressKind::Zone),
    ec("SB", "Sprinkler bypass", "Sprinkler zone has been bypassed", AddressKind::Zone),
    ec("SH", "Sprinkler alarm restore", "Alarm condition eliminated", AddressKind::Zone),
    ec("SJ", "Sprinkler trouble restore", "Trouble condition eliminated", AddressKind::Zone),
    ec("SR", "Sprinkler restoral", "Alarm/trouble condition eliminated", AddressKind::Zone),
    ec("SS", "Sprinkler Supervisory", "Unsafe sprinkler system condition exists", AddressKind::Zone),
    ec("ST", "Sprinkler trouble", "Zone disabled by fault", AddressKind::Zone),
    ec("SU", "Sprinkler unbypass", "Sprinkler zone bypass has been removed", AddressKind::Zone),
    ec("TA", "Tamper Alarm", "Alarm equipment enclosure opened", AddressKind::Zone),
    ec("TB", "Tamper bypass", "Tamper detection has been bypassed", AddressKind::Zone),
    ec("TE", "Test end", "Communicator restored to normal operation", AddressKind::Unused),
    ec("TR", "Tamper restoral", "Alarm equipment enclosure has been closed", AddressKind::Zone),
    ec("TS", "Test start", "Communicator taken out of operation", AddressKind::Zone),
    ec("TU", "Tamper unbypass", "Tamper detection bypass has been removed", AddressKind::Zone),
    ec("TX", "Test report", "An unspecified (manual or automatic) communicator test", AddressKind::Zone),
    ec("UA", "Untyped zone alarm", "Alarm condition from zone of unknown type ", AddressKind::Zone),
    ec("UB", "Untyped zone bypass", "Zone of unknown type has been bypassed", AddressKind::Zone),
    ec("UH", "Untyped alarm restoral", "Alarm condition eliminated", AddressKind::Zone),
    ec("UJ", "Untyped trouble restoral", "Trouble condition eliminated", AddressKind::Zone),
    ec("UR", "Untyped alarm/trouble restoral", "Alarm/trouble condition eliminated", AddressKind::Zone),
    ec("US", "Untyped zone supervisory", "Unsafe condition from zone of unknown type", AddressKind::Zone),
    ec("UT", "Untyped zone trouble", "Trouble condition from zone of unknown type", AddressKind::Zone),
    ec("UU", "Untyped zone unbypass", "Bypass of unknown zone has been removed", AddressKind::Zone),
    ec("UX", "Undefined alarm", "An undefined alarm condition has occured", AddressKind::Unused),
    ec("UY", "Untyped missing trouble", "A point which was not armed is now logically missing", AddressKind::Zone),
    ec("UZ", "Untyped missing alarm", "A point which was armed is now logically missing", AddressKind::Zone),
    ec("VI", "Printer paper in", "Transmitter or receiver paper in, printer X", AddressKind::Printer),
    ec("VO", "Printer paper out", "Transmitter or receiver paper out, printer X", AddressKind::Printer),
    ec("VR", "Printer restore", "Transmitter or receiver trouble restored, printer X", AddressKind::Printer),
    ec("VT", "Printer trouble", "Transmitter or receiver trouble, printer X", AddressKind::Printer),
    ec("VX", "Printer test", "Transmitter or receiver test, printer X", AddressKind::Printer),
    ec("VY", "Printer on line", "The receiver's printer is now on line", AddressKind::Unused),
    ec("VZ", "Printer off line", "The receiver's printer is now off line", AddressKind::Unused),
    ec("WA", "Water alarm", "Water detected at premise", AddressKind::Zone),
    ec("WB", "Water bypass", "Water detection zone has been bypassed", AddressKind::Zone),
    ec("WH", "Water alarm restoral", "Alarm condition eliminated", AddressKind::Zone),
    ec("WJ", "Water trouble restoral", "Trouble condition eliminated", AddressKind::Zone),
    ec("WR", "Water restoral", "Alarm/trouble condition has been eliminated", AddressKind::Zone),
    ec("WS", "Water supervisory", "Unsafe water detection system detected", AddressKind::Zone),
    ec("WT", "Water trouble", "Zone disabled by fault", AddressKind::Zone),
    ec("WU", "Water unbypass", "Water detection bypass has been removed", AddressKind::Zone),
    ec("XE", "Extra point", "The panel has sensed an extra point not specified for this site", AddressKind::Point),
    ec("XF", "Extra RF point", "The panel has sensed an extra RF point not specified for this site", AddressKind::Point),
    ec("XI", "Sensor reset", "A user has reset a sensor", AddressKind::Zone),
    ec("XR", "TX battery restoral", "Low battery in wireless transmitter has been corrected", AddressKind::Zone),
    ec("XT", "TX battery trouble", "Low battery in wireless transmitter", AddressKind::Zone),
    ec("XW", "Forced point", "A point was forced out of the system at arm time", AddressKind::Zone),
    ec("YB", "Busy seconds", "Percent of time receiver's line card is on line", AddressKind::Line),
    ec("YC", "Communication fail", "Receiver and transmitter", AddressKind::Unused),
    ec("YD", "RX line card trouble", "A line card identified by the passed address is in trouble", AddressKind::Line),
    ec("YE", "RX line card restoral", "A line card identified by the passed address has restored", AddressKind::Line),
    ec("YF", "Parameter checksum fail", "System data corrupted", AddressKind::Unused),
    ec("YG", "Parameter changed", "A tranmitter's parameters have been changed", AddressKind::Unused),
    ec("YK", "Communication restoral", "The transmitter has resumed communication with a receiver", AddressKind::Unused),
    ec("YM", "System battery missing", "The tranmitter/receiver battery is missing", AddressKind::Unused),
    ec("YN", "Invalid report", "The transmitter has send a packet with invalid data", AddressKind::Unused),
    ec("YO", "Unknown message", "An unknown message was received from automation or the printer", AddressKind::Unused),
    ec("YP", "Power supply trouble", "The transmitter/receiver has a problem with the power supply", AddressKind::Unused),
    ec("YQ", "Power supply restored", "The transmitter/receiver power supply has restored", AddressKind::Unused),
    ec("YR", "System battery restoral", "Low battery has been corrected", AddressKind::Unused),
    ec("YS", "Communication trouble", "Receiver and transmitter", AddressKind::Unused),
    ec("YT", "System battery trouble", "Low battery in control panel/communicator", AddressKind::Unused),
    ec("YW", "Watchdog reset", "The transmitter created an internal reset", AddressKind::Unused),
    ec("YX", "Service required", "A transmitter/receiver needs service", AddressKind::Unused),
    ec("YY", "Status report", "This is a header for an account status report transmission", AddressKind::Unused),
    ec("YZ", "Service completed", "Required transmitter/receiver service completed", AddressKind::MfrDefined),
    ec("ZA", "Freeze alarm", "Low temperature detected at premise", AddressKind::Zone),
    ec("ZB", "Freeze bypass", "Low temperature detection has been bypassed", AddressKind::Zone),
    ec("ZH", "Freeze alarm restoral", "Alarm condition eliminated", AddressKind::Zone),
    ec("ZJ", "Freeze trouble restoral", "Trouble condition eliminated", AddressKind::Zone),
    ec("ZR", "Freeze restoral", "Alarm/trouble condition has been eliminated", AddressKind::Zone),
    ec("ZS", "Freeze supervisory", "Unsafe freeze detection system condition detected", AddressKind::Zone),
    ec("ZT", "Freeze trouble", "Zone disabled by fault", AddressKind::Zone),
    ec("ZU", "Freeze unbypass", "Low temperature detection bypass removed", AddressKind::Zone),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_codes() {
        let ba = lookup_event_code("BA").unwrap();
        assert_eq!(ba.name, "Burglary alarm");
        assert_eq!(ba.address, AddressKind::Zone);

        let cl = lookup_event_code("CL").unwrap();
        assert_eq!(cl.name, "Closing report");
    }

    #[test]
    fn test_lookup_unknown_code() {
        assert!(lookup_event_code("QQ").is_none());
        assert!(lookup_event_code("").is_none());
    }

    #[test]
    fn test_codes_are_two_letters() {
        for code in EVENT_CODES.iter() {
            assert_eq!(code.letters.len(), 2, "bad code {:?}", code.letters);
        }
    }
}
