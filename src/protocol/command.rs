use std::{fmt::Display, str::FromStr};

use serde::Serialize;

use crate::error::{DecodingError, EncodingError};

/// 4-way interface opcodes.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    InterfaceTestAlive = 0x30,
    ProtocolGetVersion = 0x31,
    InterfaceGetName = 0x32,
    InterfaceGetVersion = 0x33,
    InterfaceExit = 0x34,
    DeviceReset = 0x35,
    DeviceInitFlash = 0x37,
    DeviceEraseAll = 0x38,
    DevicePageErase = 0x39,
    DeviceRead = 0x3A,
    DeviceWrite = 0x3B,
    DeviceC2ckLow = 0x3C,
    DeviceReadEeprom = 0x3D,
    DeviceWriteEeprom = 0x3E,
    InterfaceSetMode = 0x3F,
}

impl Command {
    pub const ALL: [Command; 15] = [
        Command::InterfaceTestAlive,
        Command::ProtocolGetVersion,
        Command::InterfaceGetName,
        Command::InterfaceGetVersion,
        Command::InterfaceExit,
        Command::DeviceReset,
        Command::DeviceInitFlash,
        Command::DeviceEraseAll,
        Command::DevicePageErase,
        Command::DeviceRead,
        Command::DeviceWrite,
        Command::DeviceC2ckLow,
        Command::DeviceReadEeprom,
        Command::DeviceWriteEeprom,
        Command::InterfaceSetMode,
    ];

    pub fn opcode(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Command::InterfaceTestAlive => "interface_test_alive",
            Command::ProtocolGetVersion => "protocol_get_version",
            Command::InterfaceGetName => "interface_get_name",
            Command::InterfaceGetVersion => "interface_get_version",
            Command::InterfaceExit => "interface_exit",
            Command::DeviceReset => "device_reset",
            Command::DeviceInitFlash => "device_init_flash",
            Command::DeviceEraseAll => "device_erase_all",
            Command::DevicePageErase => "device_page_erase",
            Command::DeviceRead => "device_read",
            Command::DeviceWrite => "device_write",
            Command::DeviceC2ckLow => "device_c2ck_low",
            Command::DeviceReadEeprom => "device_read_eeprom",
            Command::DeviceWriteEeprom => "device_write_eeprom",
            Command::InterfaceSetMode => "interface_set_mode",
        }
    }
}

impl TryFrom<u8> for Command {
    type Error = DecodingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Command::ALL
            .into_iter()
            .find(|c| c.opcode() == value)
            .ok_or(DecodingError::UnknownCommand(value))
    }
}

impl From<Command> for u8 {
    fn from(val: Command) -> Self {
        val.opcode()
    }
}

impl FromStr for Command {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| EncodingError::UnknownCommand(s.to_owned()))
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Status byte closing every response frame.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Ack {
    Ok = 0x00,
    InvalidCommand = 0x02,
    InvalidCrc = 0x03,
    VerifyError = 0x04,
    InvalidChannel = 0x08,
    InvalidParam = 0x09,
    GeneralError = 0x0F,
}

impl Ack {
    pub fn is_ok(self) -> bool {
        self == Ack::Ok
    }

    pub fn name(self) -> &'static str {
        match self {
            Ack::Ok => "ok",
            Ack::InvalidCommand => "invalid_command",
            Ack::InvalidCrc => "invalid_crc",
            Ack::VerifyError => "verify_error",
            Ack::InvalidChannel => "invalid_channel",
            Ack::InvalidParam => "invalid_param",
            Ack::GeneralError => "general_error",
        }
    }
}

impl TryFrom<u8> for Ack {
    type Error = DecodingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Ack::Ok),
            0x02 => Ok(Ack::InvalidCommand),
            0x03 => Ok(Ack::InvalidCrc),
            0x04 => Ok(Ack::VerifyError),
            0x08 => Ok(Ack::InvalidChannel),
            0x09 => Ok(Ack::InvalidParam),
            0x0F => Ok(Ack::GeneralError),
            v => Err(DecodingError::UnknownAck(v)),
        }
    }
}

impl From<Ack> for u8 {
    fn from(val: Ack) -> Self {
        val as u8
    }
}

impl Display for Ack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
