use std::{
    collections::VecDeque,
    io,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};

use crate::{
    eeprom::{CONFIG_ADDRESS, CONFIG_SIZE, PAGE_SIZE},
    protocol::{Ack, BootMode, ChipFamily, Command, Frame},
    transport::{SerialLink, SerialOpener},
};

pub const INTERFACE_NAME: &str = "m4wFCIntf";

const PAGE_LEN: usize = PAGE_SIZE as usize;

/// One simulated ESC. Only the flash page holding the configuration block
/// is modelled.
#[derive(Debug, Clone)]
pub struct EscSim {
    mode: BootMode,
    page: Vec<u8>,
    failure: Option<(Command, Ack)>,
}

impl EscSim {
    pub fn silabs(image: [u8; CONFIG_SIZE]) -> EscSim {
        EscSim::with_mode(BootMode::SiLabsBLB, image)
    }

    pub fn atmel(image: [u8; CONFIG_SIZE]) -> EscSim {
        EscSim::with_mode(BootMode::AtmelBLB, image)
    }

    fn with_mode(mode: BootMode, image: [u8; CONFIG_SIZE]) -> EscSim {
        let mut page = vec![0xFF; PAGE_LEN];
        page[..CONFIG_SIZE].copy_from_slice(&image);
        EscSim {
            mode,
            page,
            failure: None,
        }
    }

    /// Answer `command` with `ack` instead of executing it.
    pub fn failing(mut self, command: Command, ack: Ack) -> EscSim {
        self.failure = Some((command, ack));
        self
    }

    fn signature(&self) -> [u8; 2] {
        match self.mode.family() {
            ChipFamily::Silabs => [0xF3, 0x30],
            ChipFamily::Atmel => [0x93, 0x07],
        }
    }

    fn offset(address: u16, len: usize) -> Option<usize> {
        let start = address.checked_sub(CONFIG_ADDRESS)? as usize;
        (start + len <= PAGE_LEN).then_some(start)
    }
}

#[derive(Debug, Default)]
struct RigState {
    escs: Vec<EscSim>,
    selected: Option<usize>,
    requests: Vec<Frame>,
    pending: VecDeque<u8>,
    opened: usize,
}

impl RigState {
    fn handle(&mut self, request: &Frame) -> Frame {
        let (ack, payload) = self.execute(request);
        let payload = if payload.is_empty() {
            Bytes::from_static(&[0])
        } else {
            payload
        };
        Frame::response(request.command(), request.address(), payload, ack)
            .expect("simulated responses fit a frame")
    }

    fn execute(&mut self, request: &Frame) -> (Ack, Bytes) {
        let arg = request.payload().first().copied().unwrap_or_default();

        let target = match request.command() {
            Command::DeviceInitFlash | Command::DeviceReset => Some(arg as usize),
            _ => self.selected,
        };
        if let Some((command, ack)) = target
            .and_then(|i| self.escs.get(i))
            .and_then(|esc| esc.failure)
        {
            if command == request.command() {
                return (ack, Bytes::new());
            }
        }

        match request.command() {
            Command::InterfaceTestAlive => (Ack::Ok, Bytes::new()),
            Command::InterfaceGetName => {
                let mut buf = BytesMut::new();
                buf.put_u8(INTERFACE_NAME.len() as u8);
                buf.put_slice(INTERFACE_NAME.as_bytes());
                (Ack::Ok, buf.freeze())
            }
            Command::DeviceInitFlash => match self.escs.get(arg as usize) {
                Some(esc) => {
                    let [hi, lo] = esc.signature();
                    let id = Bytes::copy_from_slice(&[hi, lo, 0xAA, esc.mode as u8]);
                    self.selected = Some(arg as usize);
                    (Ack::Ok, id)
                }
                None => (Ack::InvalidChannel, Bytes::new()),
            },
            Command::DeviceReset => {
                self.selected = None;
                (Ack::Ok, Bytes::new())
            }
            Command::DeviceRead => self.with_selected(|esc| {
                let len = arg as usize;
                match EscSim::offset(request.address(), len) {
                    Some(start) => (Ack::Ok, Bytes::copy_from_slice(&esc.page[start..start + len])),
                    None => (Ack::InvalidParam, Bytes::new()),
                }
            }),
            Command::DevicePageErase => self.with_selected(|esc| {
                if u32::from(arg) * u32::from(PAGE_SIZE) == u32::from(CONFIG_ADDRESS) {
                    esc.page.fill(0xFF);
                    (Ack::Ok, Bytes::new())
                } else {
                    (Ack::InvalidParam, Bytes::new())
                }
            }),
            Command::DeviceWrite => self.with_selected(|esc| {
                let data = request.payload();
                let Some(start) = EscSim::offset(request.address(), data.len()) else {
                    return (Ack::InvalidParam, Bytes::new());
                };
                // Programming can only clear bits.
                let cells = &mut esc.page[start..start + data.len()];
                cells.iter_mut().zip(data.iter()).for_each(|(c, d)| *c &= d);
                if cells == data.as_ref() {
                    (Ack::Ok, Bytes::new())
                } else {
                    (Ack::VerifyError, Bytes::new())
                }
            }),
            _ => (Ack::InvalidCommand, Bytes::new()),
        }
    }

    fn with_selected<F>(&mut self, op: F) -> (Ack, Bytes)
    where
        F: FnOnce(&mut EscSim) -> (Ack, Bytes),
    {
        match self.selected.and_then(|i| self.escs.get_mut(i)) {
            Some(esc) => op(esc),
            None => (Ack::InvalidChannel, Bytes::new()),
        }
    }
}

/// A simulated 4-way interface with a set of ESCs behind it.
#[derive(Debug, Clone, Default)]
pub struct Rig {
    state: Arc<Mutex<RigState>>,
}

impl Rig {
    pub fn new(escs: impl IntoIterator<Item = EscSim>) -> Rig {
        let state = RigState {
            escs: escs.into_iter().collect(),
            ..Default::default()
        };
        Rig {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// `count` SiLabs ESCs holding the same configuration block.
    pub fn uniform(count: usize, image: [u8; CONFIG_SIZE]) -> Rig {
        Rig::new((0..count).map(|_| EscSim::silabs(image)))
    }

    fn lock(&self) -> MutexGuard<'_, RigState> {
        self.state.lock().unwrap()
    }

    pub fn opener(&self) -> RigOpener {
        RigOpener { rig: self.clone() }
    }

    /// Current configuration block of an ESC.
    pub fn image(&self, esc: usize) -> [u8; CONFIG_SIZE] {
        let mut image = [0; CONFIG_SIZE];
        image.copy_from_slice(&self.lock().escs[esc].page[..CONFIG_SIZE]);
        image
    }

    /// Commands received so far, oldest first.
    pub fn commands(&self) -> Vec<Command> {
        self.lock().requests.iter().map(Frame::command).collect()
    }

    pub fn requests(&self) -> Vec<Frame> {
        self.lock().requests.clone()
    }

    pub fn times_opened(&self) -> usize {
        self.lock().opened
    }
}

#[derive(Debug, Clone)]
pub struct RigOpener {
    rig: Rig,
}

#[async_trait]
impl SerialOpener for RigOpener {
    type Link = RigLink;

    async fn open(&self, _port: &str, _baudrate: u32, _timeout: Duration) -> io::Result<RigLink> {
        self.rig.lock().opened += 1;
        Ok(RigLink {
            rig: self.rig.clone(),
        })
    }
}

#[derive(Debug)]
pub struct RigLink {
    rig: Rig,
}

#[async_trait]
impl SerialLink for RigLink {
    async fn write(&mut self, buf: Bytes) -> io::Result<()> {
        let mut state = self.rig.lock();
        let request = Frame::parse_request(&buf)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let response = state.handle(&request);
        state.requests.push(request);
        state.pending.extend(response.to_bytes());
        Ok(())
    }

    async fn read(&mut self, max_len: usize) -> io::Result<Bytes> {
        let mut state = self.rig.lock();
        let n = max_len.min(state.pending.len());
        Ok(state.pending.drain(..n).collect())
    }

    async fn clear_input(&mut self) -> io::Result<()> {
        self.rig.lock().pending.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eeprom::sample_image;

    async fn exchange(link: &mut RigLink, command: Command, address: u16, payload: &[u8]) -> Frame {
        link.write(Frame::build(command, address, payload).unwrap())
            .await
            .unwrap();
        let buf = link.read(512).await.unwrap();
        Frame::parse(&buf).unwrap()
    }

    #[tokio::test]
    async fn it_serves_the_configuration_block_of_the_selected_esc() {
        let rig = Rig::uniform(2, sample_image());
        let mut link = rig.opener().open("sim", 115200, Duration::ZERO).await.unwrap();

        let init = exchange(&mut link, Command::DeviceInitFlash, 0, &[1]).await;
        assert_eq!(init.ack(), Some(Ack::Ok));
        assert_eq!(init.payload().as_ref(), [0xF3, 0x30, 0xAA, 0x01]);

        let read = exchange(&mut link, Command::DeviceRead, CONFIG_ADDRESS, &[CONFIG_SIZE as u8]).await;
        assert_eq!(read.payload().as_ref(), sample_image());
    }

    #[tokio::test]
    async fn it_rejects_unknown_channels() {
        let rig = Rig::uniform(1, sample_image());
        let mut link = rig.opener().open("sim", 115200, Duration::ZERO).await.unwrap();

        let init = exchange(&mut link, Command::DeviceInitFlash, 0, &[4]).await;
        assert_eq!(init.ack(), Some(Ack::InvalidChannel));
    }

    #[tokio::test]
    async fn it_only_clears_bits_when_writing_without_erasing() {
        let rig = Rig::uniform(1, sample_image());
        let mut link = rig.opener().open("sim", 115200, Duration::ZERO).await.unwrap();
        exchange(&mut link, Command::DeviceInitFlash, 0, &[0]).await;

        let write = exchange(&mut link, Command::DeviceWrite, CONFIG_ADDRESS, &[0xFF]).await;
        assert_eq!(write.ack(), Some(Ack::VerifyError));

        let erase = exchange(&mut link, Command::DevicePageErase, 0, &[0x0D]).await;
        assert_eq!(erase.ack(), Some(Ack::Ok));
        let write = exchange(&mut link, Command::DeviceWrite, CONFIG_ADDRESS, &[0x42]).await;
        assert_eq!(write.ack(), Some(Ack::Ok));
        assert_eq!(rig.image(0)[0], 0x42);
        assert_eq!(rig.image(0)[1], 0xFF);
    }

    #[tokio::test]
    async fn it_drops_pending_input_when_cleared() {
        let rig = Rig::uniform(1, sample_image());
        let mut link = rig.opener().open("sim", 115200, Duration::ZERO).await.unwrap();

        link.write(Frame::build_default(Command::InterfaceTestAlive).unwrap())
            .await
            .unwrap();
        link.clear_input().await.unwrap();

        assert!(link.read(64).await.unwrap().is_empty());
        assert_eq!(rig.commands(), [Command::InterfaceTestAlive]);
    }
}
