//! SIA DC-03 protocol support

pub mod block;
pub mod codec;
pub mod event;

pub use block::{FunctionCode, SiaBlock};
pub use codec::{Decoded, SiaCodec};
pub use event::{lookup_event_code, AddressKind, EventCode, SiaEvent, EVENT_CODES};
