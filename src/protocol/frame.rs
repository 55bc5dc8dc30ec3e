use bytes::{BufMut, Bytes, BytesMut};
use nom::{
    bytes::complete::take,
    combinator::{all_consuming, flat_map, map},
    number::complete::{be_u16, u8},
    sequence::tuple,
    Finish, IResult,
};

use super::{
    checksum::frame_checksum,
    command::{Ack, Command},
    constants::{
        DEFAULT_PAYLOAD, MAX_PAYLOAD_LEN, REQUEST_OVERHEAD, REQUEST_START_BYTE,
        RESPONSE_OVERHEAD, RESPONSE_START_BYTE,
    },
};
use crate::error::{DecodingError, DeviceError, EncodingError};

pub type ParserResult<'a, O> = IResult<&'a [u8], O>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Request,
    Response,
}

impl Direction {
    pub fn start_byte(self) -> u8 {
        match self {
            Direction::Request => REQUEST_START_BYTE,
            Direction::Response => RESPONSE_START_BYTE,
        }
    }
}

/// A single 4-way message. The checksum is computed on construction, so a
/// `Frame` is always internally consistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    direction: Direction,
    command: Command,
    address: u16,
    payload: Bytes,
    ack: Option<Ack>,
    crc: u16,
}

/// Wire fields before any of them are validated.
struct RawFrame<'a> {
    start: u8,
    command: u8,
    address: u16,
    payload: &'a [u8],
    ack: Option<u8>,
    crc: u16,
}

/// A one byte count followed by that many bytes.
pub(super) fn payload_field(input: &[u8]) -> ParserResult<&[u8]> {
    flat_map(u8, take)(input)
}

fn request_layout(input: &[u8]) -> ParserResult<RawFrame> {
    map(
        tuple((u8, u8, be_u16, payload_field, be_u16)),
        |(start, command, address, payload, crc)| RawFrame {
            start,
            command,
            address,
            payload,
            ack: None,
            crc,
        },
    )(input)
}

fn response_layout(input: &[u8]) -> ParserResult<RawFrame> {
    map(
        tuple((u8, u8, be_u16, payload_field, u8, be_u16)),
        |(start, command, address, payload, ack, crc)| RawFrame {
            start,
            command,
            address,
            payload,
            ack: Some(ack),
            crc,
        },
    )(input)
}

impl Frame {
    fn new(
        direction: Direction,
        command: Command,
        address: u16,
        payload: Bytes,
        ack: Option<Ack>,
    ) -> Result<Frame, EncodingError> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(EncodingError::OversizedPayload(payload.len()));
        }
        let mut frame = Frame {
            direction,
            command,
            address,
            payload,
            ack,
            crc: 0,
        };
        let mut buf = BytesMut::with_capacity(frame.len());
        frame.serialize_body(&mut buf);
        frame.crc = frame_checksum(&buf);
        Ok(frame)
    }

    pub fn request(
        command: Command,
        address: u16,
        payload: impl Into<Bytes>,
    ) -> Result<Frame, EncodingError> {
        Frame::new(Direction::Request, command, address, payload.into(), None)
    }

    pub fn response(
        command: Command,
        address: u16,
        payload: impl Into<Bytes>,
        ack: Ack,
    ) -> Result<Frame, EncodingError> {
        Frame::new(
            Direction::Response,
            command,
            address,
            payload.into(),
            Some(ack),
        )
    }

    /// Encode a request frame ready to be written to the interface.
    pub fn build(command: Command, address: u16, payload: &[u8]) -> Result<Bytes, EncodingError> {
        Ok(Frame::request(command, address, Bytes::copy_from_slice(payload))?.to_bytes())
    }

    /// Same as [`Frame::build`], looking the command up by its protocol name.
    pub fn build_named(name: &str, address: u16, payload: &[u8]) -> Result<Bytes, EncodingError> {
        Frame::build(name.parse()?, address, payload)
    }

    /// Encode a request with the default address and payload.
    pub fn build_default(command: Command) -> Result<Bytes, EncodingError> {
        Frame::build(command, 0, &DEFAULT_PAYLOAD)
    }

    /// Parse and validate a frame received from the interface.
    pub fn parse(buf: &[u8]) -> Result<Frame, DecodingError> {
        Frame::decode(buf, Direction::Response)
    }

    /// Parse and validate a frame sent to the interface.
    pub fn parse_request(buf: &[u8]) -> Result<Frame, DecodingError> {
        Frame::decode(buf, Direction::Request)
    }

    fn decode(buf: &[u8], direction: Direction) -> Result<Frame, DecodingError> {
        if buf.is_empty() {
            return Err(DecodingError::Empty);
        }

        let layout: fn(&[u8]) -> ParserResult<RawFrame> = match direction {
            Direction::Request => request_layout,
            Direction::Response => response_layout,
        };
        let (_, raw) = all_consuming(layout)(buf).finish()?;

        if raw.start != direction.start_byte() {
            return Err(DecodingError::InvalidStartByte(raw.start));
        }

        let expected = frame_checksum(&buf[..buf.len() - 2]);
        if raw.crc != expected {
            return Err(DecodingError::InvalidChecksum {
                expected,
                found: raw.crc,
            });
        }

        Ok(Frame {
            direction,
            command: Command::try_from(raw.command)?,
            address: raw.address,
            payload: Bytes::copy_from_slice(raw.payload),
            ack: raw.ack.map(Ack::try_from).transpose()?,
            crc: raw.crc,
        })
    }

    fn serialize_body(&self, buf: &mut BytesMut) {
        buf.put_u8(self.direction.start_byte());
        buf.put_u8(self.command.opcode());
        buf.put_u16(self.address);
        buf.put_u8(self.payload.len() as u8);
        buf.put_slice(&self.payload);
        if let Some(ack) = self.ack {
            buf.put_u8(ack.into());
        }
    }

    /// Serialize the frame and write it into a buffer
    pub fn serialize(&self, buf: &mut BytesMut) {
        self.serialize_body(buf);
        buf.put_u16(self.crc);
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.len());
        self.serialize(&mut buf);
        buf.freeze()
    }

    /// Encoded length of the frame.
    pub fn len(&self) -> usize {
        let overhead = match self.direction {
            Direction::Request => REQUEST_OVERHEAD,
            Direction::Response => RESPONSE_OVERHEAD,
        };
        overhead + self.payload.len()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn command(&self) -> Command {
        self.command
    }

    pub fn address(&self) -> u16 {
        self.address
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn ack(&self) -> Option<Ack> {
        self.ack
    }

    pub fn crc(&self) -> u16 {
        self.crc
    }

    /// Fails if the device reported anything but `ok` for this frame.
    pub fn check_ack(&self) -> Result<(), DeviceError> {
        match self.ack {
            Some(ack) if !ack.is_ok() => Err(DeviceError::Nack {
                command: self.command,
                ack,
            }),
            _ => Ok(()),
        }
    }
}
