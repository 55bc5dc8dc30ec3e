use bytes::Bytes;
use nom::{
    combinator::{map, map_res},
    number::complete::u8,
    sequence::tuple,
    Finish,
};

use super::{
    command::Command,
    device::{BootMode, DeviceId},
    frame::{payload_field, Direction, Frame, ParserResult},
};
use crate::error::DecodingError;

/// Layout of the payload carried by a given command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    EscChannel,
    PageNumber,
    Length,
    Block,
    DeviceId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    EscChannel(u8),
    PageNumber(u8),
    Length(u8),
    /// Length prefixed block, without its prefix.
    Block(Bytes),
    DeviceId(DeviceId),
    /// Commands without a registered shape.
    Raw(Bytes),
}

pub fn request_shape(command: Command) -> Option<PayloadShape> {
    match command {
        Command::DeviceReset | Command::DeviceC2ckLow | Command::InterfaceSetMode => {
            Some(PayloadShape::EscChannel)
        }
        Command::DevicePageErase => Some(PayloadShape::PageNumber),
        Command::DeviceRead | Command::DeviceReadEeprom => Some(PayloadShape::Length),
        Command::DeviceWrite | Command::DeviceWriteEeprom => Some(PayloadShape::Block),
        _ => None,
    }
}

pub fn response_shape(command: Command) -> Option<PayloadShape> {
    match command {
        Command::DeviceInitFlash => Some(PayloadShape::DeviceId),
        _ => None,
    }
}

fn device_id(input: &[u8]) -> ParserResult<DeviceId> {
    map_res(
        tuple((u8, u8, u8, u8)),
        |(hi_sign, lo_sign, boot_msg, mode)| {
            BootMode::try_from(mode).map(|mode| DeviceId {
                hi_sign,
                lo_sign,
                boot_msg,
                mode,
            })
        },
    )(input)
}

impl PayloadShape {
    fn parse(self, input: &[u8]) -> ParserResult<Payload> {
        match self {
            PayloadShape::EscChannel => map(u8, Payload::EscChannel)(input),
            PayloadShape::PageNumber => map(u8, Payload::PageNumber)(input),
            PayloadShape::Length => map(u8, Payload::Length)(input),
            PayloadShape::Block => {
                map(payload_field, |b: &[u8]| {
                    Payload::Block(Bytes::copy_from_slice(b))
                })(input)
            }
            PayloadShape::DeviceId => map(device_id, Payload::DeviceId)(input),
        }
    }
}

/// Interpret the payload of a frame according to its command. The request or
/// response table is picked from the frame direction.
pub fn parse_payload(frame: &Frame) -> Result<Payload, DecodingError> {
    let shape = match frame.direction() {
        Direction::Request => request_shape(frame.command()),
        Direction::Response => response_shape(frame.command()),
    };

    let Some(shape) = shape else {
        return Ok(Payload::Raw(frame.payload().clone()));
    };

    match shape.parse(frame.payload()).finish() {
        Ok((rest, payload)) if rest.is_empty() => Ok(payload),
        _ => Err(DecodingError::InvalidPayload(frame.command())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Ack;

    #[test]
    fn it_decodes_the_init_flash_identification() {
        let frame = Frame::response(
            Command::DeviceInitFlash,
            0,
            vec![0xF3, 0x30, 0xAA, 0x00],
            Ack::Ok,
        )
        .unwrap();

        let payload = parse_payload(&frame).unwrap();
        assert_eq!(
            payload,
            Payload::DeviceId(DeviceId {
                hi_sign: 0xF3,
                lo_sign: 0x30,
                boot_msg: 0xAA,
                mode: BootMode::SiLabsC2,
            })
        );
    }

    #[test]
    fn it_rejects_an_unknown_boot_mode() {
        let frame = Frame::response(
            Command::DeviceInitFlash,
            0,
            vec![0xF3, 0x30, 0xAA, 0x07],
            Ack::Ok,
        )
        .unwrap();

        let err = parse_payload(&frame).unwrap_err();
        assert_eq!(err, DecodingError::InvalidPayload(Command::DeviceInitFlash));
    }

    #[test]
    fn it_rejects_a_payload_that_is_not_fully_consumed() {
        let frame = Frame::response(
            Command::DeviceInitFlash,
            0,
            vec![0xF3, 0x30, 0xAA, 0x01, 0x00],
            Ack::Ok,
        )
        .unwrap();
        assert!(parse_payload(&frame).is_err());

        let frame = Frame::request(Command::DeviceReset, 0, vec![0x01, 0x02]).unwrap();
        assert!(parse_payload(&frame).is_err());
    }

    #[test]
    fn it_rejects_a_short_payload() {
        let frame =
            Frame::response(Command::DeviceInitFlash, 0, vec![0xF3, 0x30], Ack::Ok).unwrap();
        assert!(parse_payload(&frame).is_err());
    }

    #[test]
    fn it_decodes_request_payloads() {
        let frame = Frame::request(Command::DeviceReset, 0, vec![0x02]).unwrap();
        assert_eq!(parse_payload(&frame).unwrap(), Payload::EscChannel(2));

        let frame = Frame::request(Command::DevicePageErase, 0, vec![0x0D]).unwrap();
        assert_eq!(parse_payload(&frame).unwrap(), Payload::PageNumber(0x0D));

        let frame = Frame::request(Command::DeviceRead, 0x1A00, vec![0x70]).unwrap();
        assert_eq!(parse_payload(&frame).unwrap(), Payload::Length(0x70));

        let frame = Frame::request(Command::DeviceWrite, 0x1A00, vec![3, 1, 2, 3]).unwrap();
        assert_eq!(
            parse_payload(&frame).unwrap(),
            Payload::Block(Bytes::from_static(&[1, 2, 3]))
        );

        let frame = Frame::request(Command::DeviceWriteEeprom, 0, vec![0]).unwrap();
        assert_eq!(parse_payload(&frame).unwrap(), Payload::Block(Bytes::new()));
    }

    #[test]
    fn it_rejects_a_block_that_disagrees_with_its_count() {
        for payload in [vec![5, 1], vec![1, 1, 2], vec![]] {
            let frame = Frame::request(Command::DeviceWrite, 0x1A00, payload).unwrap();
            assert_eq!(
                parse_payload(&frame),
                Err(DecodingError::InvalidPayload(Command::DeviceWrite))
            );
        }
    }

    #[test]
    fn it_returns_raw_bytes_for_unregistered_commands() {
        let frame =
            Frame::response(Command::InterfaceGetName, 0, b"\x04ABCD".to_vec(), Ack::Ok).unwrap();
        assert_eq!(
            parse_payload(&frame).unwrap(),
            Payload::Raw(Bytes::from_static(b"\x04ABCD"))
        );

        // device_reset only has a request shape
        let frame = Frame::response(Command::DeviceReset, 0, vec![0x00, 0x01], Ack::Ok).unwrap();
        assert_eq!(
            parse_payload(&frame).unwrap(),
            Payload::Raw(Bytes::from_static(&[0x00, 0x01]))
        );
    }

    #[test]
    fn it_registers_a_single_response_shape() {
        let registered: Vec<_> = Command::ALL
            .into_iter()
            .filter(|c| response_shape(*c).is_some())
            .collect();
        assert_eq!(registered, [Command::DeviceInitFlash]);
    }
}
