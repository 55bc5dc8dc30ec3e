use std::io::Result;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use mockall::automock;

#[automock]
#[async_trait]
pub trait SerialLink: Send {
    async fn write(&mut self, buf: Bytes) -> Result<()>;
    /// Read at most `max_len` bytes. Returns whatever arrived once the read
    /// timeout elapses, which may be nothing.
    async fn read(&mut self, max_len: usize) -> Result<Bytes>;
    /// Discard any pending input.
    async fn clear_input(&mut self) -> Result<()>;
}

#[automock(type Link = MockSerialLink;)]
#[async_trait]
pub trait SerialOpener: Send + Sync {
    type Link: SerialLink;

    async fn open(&self, port: &str, baudrate: u32, timeout: Duration) -> Result<Self::Link>;
}
