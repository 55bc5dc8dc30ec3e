use std::{io, time::Duration};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    time::{timeout_at, Instant},
};
use tokio_serial::{ClearBuffer, SerialPort, SerialPortBuilderExt, SerialStream};
use tracing::trace;

use super::traits::{SerialLink, SerialOpener};

/// Opens 8N1 serial ports through `tokio-serial`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialPortOpener;

#[derive(Debug)]
pub struct SerialPortLink {
    stream: SerialStream,
    timeout: Duration,
}

#[async_trait]
impl SerialOpener for SerialPortOpener {
    type Link = SerialPortLink;

    async fn open(&self, port: &str, baudrate: u32, timeout: Duration) -> io::Result<SerialPortLink> {
        let stream = tokio_serial::new(port, baudrate)
            .timeout(timeout)
            .open_native_async()?;
        Ok(SerialPortLink { stream, timeout })
    }
}

#[async_trait]
impl SerialLink for SerialPortLink {
    async fn write(&mut self, buf: Bytes) -> io::Result<()> {
        self.stream.write_all(&buf).await?;
        self.stream.flush().await
    }

    async fn read(&mut self, max_len: usize) -> io::Result<Bytes> {
        let deadline = Instant::now() + self.timeout;
        let mut buf = BytesMut::zeroed(max_len);
        let mut filled = 0;

        while filled < max_len {
            match timeout_at(deadline, self.stream.read(&mut buf[filled..])).await {
                Ok(Ok(0)) => break,
                Ok(Ok(n)) => filled += n,
                Ok(Err(e)) => return Err(e),
                Err(_) => {
                    trace!(filled, max_len, "Read timed out");
                    break;
                }
            }
        }

        buf.truncate(filled);
        Ok(buf.freeze())
    }

    async fn clear_input(&mut self) -> io::Result<()> {
        self.stream.clear(ClearBuffer::Input)?;
        Ok(())
    }
}
