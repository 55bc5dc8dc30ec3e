use std::io::Error as IoError;

use nom::error::{Error as NomError, ErrorKind};
use thiserror::Error;

use crate::protocol::{Ack, Command};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),
    #[error("Decoding error: {0}")]
    Decoding(#[from] DecodingError),
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("unknown command {0:?}")]
    UnknownCommand(String),
    #[error("payload of {0} bytes does not fit a one byte length prefix")]
    OversizedPayload(usize),
    #[error("invalid value {value:?} for {field}")]
    InvalidValue { field: &'static str, value: String },
    #[error("{field} is {len} bytes long, at most {max} fit")]
    TextTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodingError {
    #[error("null length frame")]
    Empty,
    #[error("malformed frame ({0:?})")]
    Malformed(ErrorKind),
    #[error("invalid start byte ({0:#04x})")]
    InvalidStartByte(u8),
    #[error("unknown command ({0:#04x})")]
    UnknownCommand(u8),
    #[error("unknown ack ({0:#04x})")]
    UnknownAck(u8),
    #[error("invalid crc ({found:04x}, expected {expected:04x})")]
    InvalidChecksum { expected: u16, found: u16 },
    #[error("failed to parse {0} payload")]
    InvalidPayload(Command),
    #[error("expected {expected} bytes, got {found}")]
    InvalidLength { expected: usize, found: usize },
    #[error("unknown {field} value {value:#x}")]
    InvalidValue { field: &'static str, value: u16 },
    #[error("{0} is not valid UTF-8")]
    InvalidText(&'static str),
}

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("failed to connect to {port}: {reason}")]
    Open { port: String, reason: String },
    #[error("not connected")]
    NotConnected,
    #[error("no response within timeout")]
    Timeout,
    #[error(transparent)]
    Io(#[from] IoError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("{command} failed with status {ack}")]
    Nack { command: Command, ack: Ack },
    #[error("invalid ESC #{esc} type {family}")]
    UnexpectedFamily { esc: u8, family: String },
    #[error("ESC #{esc} is out of range, {count} configured")]
    InvalidInstance { esc: u8, count: u8 },
    #[error("{0} is not supported by this interface")]
    Unsupported(&'static str),
}

impl From<NomError<&[u8]>> for DecodingError {
    fn from(value: NomError<&[u8]>) -> Self {
        DecodingError::Malformed(value.code)
    }
}

impl From<IoError> for Error {
    fn from(value: IoError) -> Self {
        Error::Connection(ConnectionError::Io(value))
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        core::mem::discriminant(self) == core::mem::discriminant(other)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
