//! Connection to a 4-way interface and the request/response exchanges it
//! supports. Exactly one exchange is in flight at any time.


use std::{fmt::Display, mem, time::Duration};

use bytes::Bytes;
use tokio::time::sleep;
use tracing::{debug, info, instrument, trace};

use crate::{
    error::{ConnectionError, DecodingError, Result},
    protocol::{parse_payload, ChipFamily, Command, Frame, Payload, RESPONSE_OVERHEAD},
    transport::{SerialLink, SerialOpener},
};

/// Bytes requested from the line when the response size is not known.
pub const DEFAULT_RESPONSE_LENGTH: usize = 64;

/// Pacing delays imposed by the interface and the ESCs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Wait after opening the port, before flushing it.
    pub settle: Duration,
    /// Wait after each command, so the device can process it.
    pub command: Duration,
    /// Wait after an ESC reset, so it can reboot.
    pub reboot: Duration,
    /// Serial read timeout.
    pub read_timeout: Duration,
}

impl Timing {
    /// No pacing at all. Only meaningful against simulated devices.
    pub fn immediate() -> Timing {
        Timing {
            settle: Duration::ZERO,
            command: Duration::ZERO,
            reboot: Duration::ZERO,
            read_timeout: Duration::from_millis(10),
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            settle: Duration::from_millis(500),
            command: Duration::from_millis(100),
            reboot: Duration::from_millis(1000),
            read_timeout: Duration::from_millis(1000),
        }
    }
}

struct Hex<'a>(&'a [u8]);

impl Display for Hex<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.iter().try_for_each(|b| write!(f, "{:02x}", b))
    }
}

enum State<L> {
    Disconnected,
    Connected(L),
}

pub struct Session<O: SerialOpener> {
    opener: O,
    port: String,
    baudrate: u32,
    timing: Timing,
    state: State<O::Link>,
}

impl<O: SerialOpener> Session<O> {
    pub fn new(opener: O, port: impl Into<String>, baudrate: u32, timing: Timing) -> Session<O> {
        Session {
            opener,
            port: port.into(),
            baudrate,
            timing,
            state: State::Disconnected,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, State::Connected(_))
    }

    /// Open the serial port, let the line settle and drop anything already
    /// buffered.
    #[instrument(skip(self), fields(port = %self.port, baudrate = self.baudrate))]
    pub async fn connect(&mut self) -> Result<()> {
        let mut link = self
            .opener
            .open(&self.port, self.baudrate, self.timing.read_timeout)
            .await
            .map_err(|e| ConnectionError::Open {
                port: self.port.clone(),
                reason: e.to_string(),
            })?;
        info!("Connected to {} at {} baud", self.port, self.baudrate);

        sleep(self.timing.settle).await;
        link.clear_input().await?;
        self.state = State::Connected(link);
        Ok(())
    }

    /// Close the serial port. Does nothing when already disconnected.
    pub fn disconnect(&mut self) {
        if let State::Connected(link) = mem::replace(&mut self.state, State::Disconnected) {
            drop(link);
            info!("Disconnected from {}", self.port);
        }
    }

    fn link(&mut self) -> Result<&mut O::Link> {
        match &mut self.state {
            State::Connected(link) => Ok(link),
            State::Disconnected => Err(ConnectionError::NotConnected.into()),
        }
    }

    pub async fn send_command(&mut self, command: Command, address: u16, payload: &[u8]) -> Result<()> {
        let frame = Frame::build(command, address, payload)?;
        trace!("-> {}", Hex(&frame));
        self.link()?.write(frame).await?;
        sleep(self.timing.command).await;
        Ok(())
    }

    /// Read up to `expected_length` bytes and parse them as a response frame.
    pub async fn read_response(&mut self, expected_length: usize) -> Result<Frame> {
        let buf = self.link()?.read(expected_length).await?;
        trace!("<- {}", Hex(&buf));
        if buf.is_empty() {
            return Err(ConnectionError::Timeout.into());
        }
        Ok(Frame::parse(&buf)?)
    }

    async fn exchange(
        &mut self,
        command: Command,
        address: u16,
        payload: &[u8],
        expected_length: usize,
    ) -> Result<Frame> {
        self.send_command(command, address, payload).await?;
        let response = self.read_response(expected_length).await?;
        debug!(ack = ?response.ack(), "{} exchanged", command);
        Ok(response)
    }

    /// Exchange a command and fail unless the device acknowledged it.
    async fn acknowledged(&mut self, command: Command, address: u16, payload: &[u8]) -> Result<Frame> {
        let response = self
            .exchange(command, address, payload, DEFAULT_RESPONSE_LENGTH)
            .await?;
        response.check_ack()?;
        Ok(response)
    }

    /// Put an ESC in flash mode and report which chip family it belongs to.
    pub async fn init_flash(&mut self, esc: u8) -> Result<ChipFamily> {
        let response = self.acknowledged(Command::DeviceInitFlash, 0, &[esc]).await?;
        match parse_payload(&response)? {
            Payload::DeviceId(id) => {
                debug!(
                    esc,
                    signature = format_args!("{:04x}", id.signature()),
                    mode = ?id.mode,
                    "Flash initialised"
                );
                Ok(id.family())
            }
            _ => Err(DecodingError::InvalidPayload(Command::DeviceInitFlash).into()),
        }
    }

    pub async fn erase_page(&mut self, page: u8) -> Result<()> {
        self.acknowledged(Command::DevicePageErase, 0, &[page]).await?;
        Ok(())
    }

    /// Write a block to flash. The ack of the returned frame is left for the
    /// caller to inspect.
    pub async fn write_memory(&mut self, address: u16, data: &[u8]) -> Result<Frame> {
        self.exchange(Command::DeviceWrite, address, data, DEFAULT_RESPONSE_LENGTH)
            .await
    }

    pub async fn read_memory(&mut self, address: u16, length: u8) -> Result<Bytes> {
        let response = self
            .exchange(
                Command::DeviceRead,
                address,
                &[length],
                length as usize + RESPONSE_OVERHEAD,
            )
            .await?;
        response.check_ack()?;
        Ok(response.payload().clone())
    }

    /// Reset an ESC, leaving flash mode, and wait for it to reboot.
    pub async fn reset_esc(&mut self, esc: u8) -> Result<()> {
        self.acknowledged(Command::DeviceReset, 0, &[esc]).await?;
        sleep(self.timing.reboot).await;
        Ok(())
    }

    pub async fn get_name(&mut self) -> Result<String> {
        let response = self.acknowledged(Command::InterfaceGetName, 0, &[0]).await?;
        let text = response.payload().get(1..).unwrap_or_default();
        String::from_utf8(text.to_vec())
            .map_err(|_| DecodingError::InvalidText("interface name").into())
    }

    /// Check the interface answers. ESCs acknowledge with a startup tone.
    pub async fn test_alive(&mut self) -> Result<()> {
        self.acknowledged(Command::InterfaceTestAlive, 0, &[0]).await?;
        Ok(())
    }
}
