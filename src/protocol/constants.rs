pub const REQUEST_START_BYTE: u8 = 0x2F;
pub const RESPONSE_START_BYTE: u8 = 0x2E;

/// Start byte, command, address, length prefix and checksum.
pub const REQUEST_OVERHEAD: usize = 7;
/// Request overhead plus the ack byte.
pub const RESPONSE_OVERHEAD: usize = 8;

pub const MAX_PAYLOAD_LEN: usize = u8::MAX as usize;

pub const DEFAULT_PAYLOAD: [u8; 1] = [0];
