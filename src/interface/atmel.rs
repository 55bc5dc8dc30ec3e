use super::{EscReport, RigReport};
use crate::{
    error::{DeviceError, Result},
    session::Session,
    transport::SerialOpener,
};

/// Atmel based ESCs. The interface can be reached, configuration is not
/// implemented.
pub struct Atmel<O: SerialOpener> {
    session: Session<O>,
}

impl<O: SerialOpener> Atmel<O> {
    pub fn new(session: Session<O>) -> Atmel<O> {
        Atmel { session }
    }

    pub fn session(&mut self) -> &mut Session<O> {
        &mut self.session
    }

    pub async fn probe_esc(&mut self, _esc: u8) -> Result<()> {
        Err(DeviceError::Unsupported("probe_esc").into())
    }

    pub async fn read_config(&mut self, _esc: u8) -> Result<EscReport> {
        Err(DeviceError::Unsupported("read_config").into())
    }

    pub async fn read_config_all(&mut self) -> Result<RigReport> {
        Err(DeviceError::Unsupported("read_config_all").into())
    }

    pub async fn write_config<K, V>(&mut self, _esc: u8, _params: &[(K, V)]) -> Result<()> {
        Err(DeviceError::Unsupported("write_config").into())
    }

    pub async fn write_config_all<K, V>(&mut self, _params: &[(K, V)]) -> Result<()> {
        Err(DeviceError::Unsupported("write_config_all").into())
    }
}
