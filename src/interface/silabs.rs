use tracing::{debug, info, instrument};

use super::{observer::Observer, EscEntry, EscReport, RigReport};
use crate::{
    eeprom::{group_fields, ConfigImage, Patch, CONFIG_ADDRESS, CONFIG_SIZE, PAGE_SIZE},
    error::{DeviceError, Result},
    protocol::ChipFamily,
    session::Session,
    transport::SerialOpener,
};

const CONFIG_PAGE: u8 = (CONFIG_ADDRESS / PAGE_SIZE) as u8;

/// Configuration of SiLabs based ESCs, one at a time.
pub struct Silabs<O: SerialOpener> {
    session: Session<O>,
    count: u8,
    observer: Box<dyn Observer>,
}

impl<O: SerialOpener> Silabs<O> {
    pub fn new(session: Session<O>, count: u8, observer: Box<dyn Observer>) -> Silabs<O> {
        Silabs {
            session,
            count,
            observer,
        }
    }

    pub fn session(&mut self) -> &mut Session<O> {
        &mut self.session
    }

    fn check_instance(&self, esc: u8) -> Result<()> {
        if esc < self.count {
            Ok(())
        } else {
            Err(DeviceError::InvalidInstance {
                esc,
                count: self.count,
            }
            .into())
        }
    }

    /// Put an ESC in flash mode. An ESC of another family is reset before
    /// failing.
    async fn enter_flash(&mut self, esc: u8) -> Result<()> {
        let family = self.session.init_flash(esc).await?;
        if family != ChipFamily::Silabs {
            self.session.reset_esc(esc).await?;
            return Err(DeviceError::UnexpectedFamily {
                esc,
                family: family.to_string(),
            }
            .into());
        }
        Ok(())
    }

    async fn read_image(&mut self) -> Result<ConfigImage> {
        let raw = self
            .session
            .read_memory(CONFIG_ADDRESS, CONFIG_SIZE as u8)
            .await?;
        Ok(ConfigImage::decode(&raw)?)
    }

    /// Check an ESC answers as a SiLabs device, then let it reboot.
    pub async fn probe_esc(&mut self, esc: u8) -> Result<()> {
        self.check_instance(esc)?;
        self.enter_flash(esc).await?;
        self.session.reset_esc(esc).await
    }

    #[instrument(skip(self))]
    pub async fn read_config(&mut self, esc: u8) -> Result<EscReport> {
        self.check_instance(esc)?;
        self.enter_flash(esc).await?;
        let image = self.read_image().await?;
        let (info, common, config) = group_fields(&image);
        self.session.reset_esc(esc).await?;

        info!("Read configuration of ESC #{} ({})", esc, info.name);
        Ok(EscReport {
            info,
            common,
            config,
        })
    }

    /// Read every ESC and check they share the common configuration of the
    /// first one.
    pub async fn read_config_all(&mut self) -> Result<RigReport> {
        self.check_instance(0)?;

        let first = self.read_config(0).await?;
        let common = first.common;
        let mut escs = vec![EscEntry {
            esc: 0,
            info: first.info,
            config: first.config,
        }];

        for esc in 1..self.count {
            let report = self.read_config(esc).await?;
            let differences = common.differences(&report.common);
            if !differences.is_empty() {
                self.observer.common_config_mismatch(esc, &differences);
            }
            escs.push(EscEntry {
                esc,
                info: report.info,
                config: report.config,
            });
        }

        Ok(RigReport { common, escs })
    }

    /// Patch the named fields of one ESC. Unknown names are reported and
    /// skipped.
    #[instrument(skip(self, params))]
    pub async fn write_config<K, V>(&mut self, esc: u8, params: &[(K, V)]) -> Result<()>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.check_instance(esc)?;
        let patch = Patch::parse(params)?;
        for name in &patch.unknown {
            self.observer.unknown_parameter(esc, name);
        }

        self.enter_flash(esc).await?;
        let mut image = self.read_image().await?;
        patch.apply(&mut image);
        let encoded = image.encode()?;
        debug!(settings = patch.settings.len(), "Configuration patched");

        self.session.erase_page(CONFIG_PAGE).await?;
        self.session
            .write_memory(CONFIG_ADDRESS, &encoded)
            .await?
            .check_ack()?;
        self.session.reset_esc(esc).await?;

        info!("Wrote configuration of ESC #{}", esc);
        Ok(())
    }

    /// Write every ESC in order, stopping at the first failure.
    pub async fn write_config_all<K, V>(&mut self, params: &[(K, V)]) -> Result<()>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.check_instance(0)?;
        for esc in 0..self.count {
            self.write_config(esc, params).await?;
        }
        Ok(())
    }
}
