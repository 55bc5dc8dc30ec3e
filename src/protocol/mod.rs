//! Framing of the BLHeli 4-way interface protocol.
//!
//! Requests start with `0x2F`, responses with `0x2E`. Both carry a command
//! opcode, a big-endian address and a length prefixed payload. Responses add
//! an ack byte, and every frame ends with a big-endian CRC16/XMODEM of all
//! the preceding bytes.

mod checksum;
mod command;
mod constants;
mod device;
mod frame;
mod payload;


pub use checksum::frame_checksum;
pub use command::{Ack, Command};
pub use constants::{DEFAULT_PAYLOAD, RESPONSE_OVERHEAD};
pub use device::{BootMode, ChipFamily, DeviceId};
pub use frame::{Direction, Frame};
pub use payload::{parse_payload, request_shape, response_shape, Payload, PayloadShape};
