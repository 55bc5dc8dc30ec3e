//! Configuration workflows over a connected session, dispatched on the chip
//! family of the ESCs.

mod atmel;
mod observer;
mod silabs;

use serde::Serialize;
use tracing::info;

pub use atmel::Atmel;
pub use observer::{LogObserver, Observer};
pub use silabs::Silabs;

#[cfg(test)]
pub use observer::MockObserver;

use crate::{
    eeprom::{CommonConfig, DeviceInfo, EscConfig},
    error::Result,
    protocol::ChipFamily,
    session::Session,
    transport::SerialOpener,
};

/// Configuration of a single ESC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EscReport {
    pub info: DeviceInfo,
    pub common: CommonConfig,
    pub config: EscConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EscEntry {
    pub esc: u8,
    pub info: DeviceInfo,
    pub config: EscConfig,
}

/// Configuration of every ESC of a rig. `common` is taken from the first ESC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RigReport {
    pub common: CommonConfig,
    pub escs: Vec<EscEntry>,
}

pub enum Interface<O: SerialOpener> {
    Silabs(Silabs<O>),
    Atmel(Atmel<O>),
}

impl<O: SerialOpener> Interface<O> {
    pub fn new(
        family: ChipFamily,
        session: Session<O>,
        count: u8,
        observer: Box<dyn Observer>,
    ) -> Interface<O> {
        match family {
            ChipFamily::Silabs => Interface::Silabs(Silabs::new(session, count, observer)),
            ChipFamily::Atmel => Interface::Atmel(Atmel::new(session)),
        }
    }

    pub fn family(&self) -> ChipFamily {
        match self {
            Interface::Silabs(_) => ChipFamily::Silabs,
            Interface::Atmel(_) => ChipFamily::Atmel,
        }
    }

    fn session(&mut self) -> &mut Session<O> {
        match self {
            Interface::Silabs(inner) => inner.session(),
            Interface::Atmel(inner) => inner.session(),
        }
    }

    /// Open the session and check the interface answers.
    pub async fn connect(&mut self) -> Result<()> {
        let session = self.session();
        session.connect().await?;
        session.test_alive().await?;
        let name = session.get_name().await?;
        info!("Interface {:?} is alive", name);
        Ok(())
    }

    pub fn disconnect(&mut self) {
        self.session().disconnect()
    }

    /// Check an ESC belongs to the family of this interface.
    pub async fn probe_esc(&mut self, esc: u8) -> Result<()> {
        match self {
            Interface::Silabs(inner) => inner.probe_esc(esc).await,
            Interface::Atmel(inner) => inner.probe_esc(esc).await,
        }
    }

    pub async fn read_config(&mut self, esc: u8) -> Result<EscReport> {
        match self {
            Interface::Silabs(inner) => inner.read_config(esc).await,
            Interface::Atmel(inner) => inner.read_config(esc).await,
        }
    }

    pub async fn read_config_all(&mut self) -> Result<RigReport> {
        match self {
            Interface::Silabs(inner) => inner.read_config_all().await,
            Interface::Atmel(inner) => inner.read_config_all().await,
        }
    }

    pub async fn write_config<K, V>(&mut self, esc: u8, params: &[(K, V)]) -> Result<()>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        match self {
            Interface::Silabs(inner) => inner.write_config(esc, params).await,
            Interface::Atmel(inner) => inner.write_config(esc, params).await,
        }
    }

    pub async fn write_config_all<K, V>(&mut self, params: &[(K, V)]) -> Result<()>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        match self {
            Interface::Silabs(inner) => inner.write_config_all(params).await,
            Interface::Atmel(inner) => inner.write_config_all(params).await,
        }
    }
}
